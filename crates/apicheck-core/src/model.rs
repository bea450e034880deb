//! Immutable snapshots of one introspected type and the types in its signatures.

use std::fmt;

use crate::error::ModelError;

pub(crate) const ROOT_TYPE: &str = "java.lang.Object";

/// Java modifier bits. The values match `java.lang.reflect.Modifier` (and the class-file
/// access flags they were defined from).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u16);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const PUBLIC: Modifiers = Modifiers(0x0001);
    pub const PRIVATE: Modifiers = Modifiers(0x0002);
    pub const PROTECTED: Modifiers = Modifiers(0x0004);
    pub const STATIC: Modifiers = Modifiers(0x0008);
    pub const FINAL: Modifiers = Modifiers(0x0010);
    pub const SYNCHRONIZED: Modifiers = Modifiers(0x0020);
    pub const VOLATILE: Modifiers = Modifiers(0x0040);
    pub const TRANSIENT: Modifiers = Modifiers(0x0080);
    pub const NATIVE: Modifiers = Modifiers(0x0100);
    pub const INTERFACE: Modifiers = Modifiers(0x0200);
    pub const ABSTRACT: Modifiers = Modifiers(0x0400);
    pub const STRICT: Modifiers = Modifiers(0x0800);

    /// Source order used by `Modifier.toString`.
    const KEYWORDS: [(Modifiers, &'static str); 12] = [
        (Self::PUBLIC, "public"),
        (Self::PROTECTED, "protected"),
        (Self::PRIVATE, "private"),
        (Self::ABSTRACT, "abstract"),
        (Self::STATIC, "static"),
        (Self::FINAL, "final"),
        (Self::TRANSIENT, "transient"),
        (Self::VOLATILE, "volatile"),
        (Self::SYNCHRONIZED, "synchronized"),
        (Self::NATIVE, "native"),
        (Self::STRICT, "strictfp"),
        (Self::INTERFACE, "interface"),
    ];

    pub const fn from_bits(bits: u16) -> Self {
        Modifiers(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Modifiers) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    pub const fn without(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 & !other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_private(self) -> bool {
        self.contains(Self::PRIVATE)
    }

    pub fn keywords(self) -> impl Iterator<Item = &'static str> {
        Self::KEYWORDS
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, keyword)| keyword)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, keyword) in self.keywords().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(keyword)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Modifiers({self})")
    }
}

/// A type as it occurs in a signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeReference {
    /// A class, interface or primitive (`int`, `void`) by binary name, with its type arguments.
    Named {
        name: String,
        args: Vec<TypeReference>,
    },
    /// `element[]…[]`; `element` is never itself an array.
    Array {
        element: Box<TypeReference>,
        dimensions: usize,
    },
    /// A use of a type variable. `bounds` are only rendered when explicitly requested, and
    /// providers leave them empty where they never are (inside type arguments).
    TypeVariable {
        name: String,
        bounds: Vec<TypeReference>,
    },
    Wildcard(WildcardBound),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<TypeReference>),
    Super(Box<TypeReference>),
}

impl TypeReference {
    pub fn named(name: impl Into<String>) -> Self {
        TypeReference::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeReference>) -> Self {
        TypeReference::Named {
            name: name.into(),
            args,
        }
    }

    pub fn object() -> Self {
        Self::named(ROOT_TYPE)
    }

    /// Wraps `element` in `dimensions` array levels, merging with an existing array element.
    pub fn array(element: TypeReference, dimensions: usize) -> Self {
        if dimensions == 0 {
            return element;
        }
        match element {
            TypeReference::Array {
                element,
                dimensions: inner,
            } => TypeReference::Array {
                element,
                dimensions: inner + dimensions,
            },
            element => TypeReference::Array {
                element: Box::new(element),
                dimensions,
            },
        }
    }

    pub fn type_var(name: impl Into<String>, bounds: Vec<TypeReference>) -> Self {
        TypeReference::TypeVariable {
            name: name.into(),
            bounds,
        }
    }

    /// Builds a wildcard from optional bounds as reported by reflection-style providers.
    /// Both bounds at once cannot be expressed in Java and is rejected.
    pub fn wildcard(
        upper: Option<TypeReference>,
        lower: Option<TypeReference>,
    ) -> Result<Self, ModelError> {
        let bound = match (upper, lower) {
            (None, None) => WildcardBound::Unbounded,
            (Some(upper), None) => WildcardBound::Extends(Box::new(upper)),
            (None, Some(lower)) => WildcardBound::Super(Box::new(lower)),
            (Some(upper), Some(lower)) => {
                return Err(ModelError::ConflictingWildcardBounds {
                    upper: format!("{upper:?}"),
                    lower: format!("{lower:?}"),
                })
            }
        };
        Ok(TypeReference::Wildcard(bound))
    }

    /// `java.lang.Object` with no arguments.
    pub fn is_root(&self) -> bool {
        matches!(self, TypeReference::Named { name, args } if name == ROOT_TYPE && args.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    /// Compared as an unordered collection.
    pub bounds: Vec<TypeReference>,
}

impl TypeParameter {
    pub fn new(name: impl Into<String>, bounds: Vec<TypeReference>) -> Self {
        Self {
            name: name.into(),
            bounds,
        }
    }

    /// A parameter whose only bound is `Object`.
    pub fn unbounded(name: impl Into<String>) -> Self {
        Self::new(name, vec![TypeReference::object()])
    }

    /// The type variable this parameter declares, carrying its bounds.
    pub fn as_reference(&self) -> TypeReference {
        TypeReference::type_var(self.name.clone(), self.bounds.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub modifiers: Modifiers,
    pub name: String,
    pub ty: TypeReference,
    pub synthetic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDescriptor {
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeParameter>,
    pub params: Vec<TypeReference>,
    pub synthetic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub modifiers: Modifiers,
    pub name: String,
    pub type_params: Vec<TypeParameter>,
    pub params: Vec<TypeReference>,
    pub return_type: TypeReference,
    pub synthetic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NestedKind {
    /// A member type declared by name.
    Named,
    /// An anonymous or local class; never compared.
    SyntheticLocal,
}

/// A direct member type. The differ loads the full descriptor by `name` when it recurses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedTypeDescriptor {
    /// Binary name, e.g. `com.example.Box$Node`.
    pub name: String,
    pub simple_name: String,
    pub modifiers: Modifiers,
    pub synthetic: bool,
    pub kind: NestedKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Binary name, e.g. `com.example.Box` or `com.example.Box$Node`.
    pub name: String,
    pub modifiers: Modifiers,
    /// `None` for the unnamed package.
    pub package: Option<String>,
    /// `None` for root types and interfaces.
    pub supertype: Option<TypeReference>,
    pub interfaces: Vec<TypeReference>,
    pub type_params: Vec<TypeParameter>,
    pub fields: Vec<FieldDescriptor>,
    pub constructors: Vec<ConstructorDescriptor>,
    pub methods: Vec<MethodDescriptor>,
    pub nested_types: Vec<NestedTypeDescriptor>,
}

impl TypeDescriptor {
    /// A `public class` extending `Object` with no members; the package is derived from `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            package: package_of(&name),
            name,
            modifiers: Modifiers::PUBLIC,
            supertype: Some(TypeReference::object()),
            interfaces: Vec::new(),
            type_params: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            nested_types: Vec::new(),
        }
    }

    pub fn is_interface(&self) -> bool {
        self.modifiers.contains(Modifiers::INTERFACE)
    }

    /// `interface` or `class`, as Java prints a type's kind.
    pub fn kind_keyword(&self) -> &'static str {
        if self.is_interface() {
            "interface"
        } else {
            "class"
        }
    }
}

/// Package of a binary name: everything before the last `.` of the top-level class.
pub(crate) fn package_of(binary_name: &str) -> Option<String> {
    let top_level = binary_name.split('$').next().unwrap_or(binary_name);
    top_level
        .rsplit_once('.')
        .map(|(package, _)| package.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_render_in_java_order() {
        let mods = Modifiers::FINAL | Modifiers::STATIC | Modifiers::PUBLIC;
        assert_eq!(mods.to_string(), "public static final");
        assert_eq!(
            (Modifiers::INTERFACE | Modifiers::ABSTRACT | Modifiers::PUBLIC).to_string(),
            "public abstract interface"
        );
        assert_eq!(Modifiers::NONE.to_string(), "");
    }

    #[test]
    fn array_dimensions_merge() {
        let int2 = TypeReference::array(TypeReference::named("int"), 2);
        let int3 = TypeReference::array(int2, 1);
        assert_eq!(
            int3,
            TypeReference::Array {
                element: Box::new(TypeReference::named("int")),
                dimensions: 3
            }
        );
        assert_eq!(
            TypeReference::array(TypeReference::named("int"), 0),
            TypeReference::named("int")
        );
    }

    #[test]
    fn wildcard_rejects_two_bounds() {
        assert_eq!(
            TypeReference::wildcard(None, None).unwrap(),
            TypeReference::Wildcard(WildcardBound::Unbounded)
        );
        assert!(matches!(
            TypeReference::wildcard(Some(TypeReference::object()), None).unwrap(),
            TypeReference::Wildcard(WildcardBound::Extends(_))
        ));
        let err = TypeReference::wildcard(
            Some(TypeReference::named("java.lang.Number")),
            Some(TypeReference::named("java.lang.Integer")),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::ConflictingWildcardBounds { .. }));
    }

    #[test]
    fn package_is_taken_from_the_top_level_class() {
        assert_eq!(package_of("Box"), None);
        assert_eq!(package_of("com.example.Box"), Some("com.example".to_string()));
        assert_eq!(
            package_of("com.example.Box$Node"),
            Some("com.example".to_string())
        );
        assert_eq!(TypeDescriptor::new("a.B").package.as_deref(), Some("a"));
    }
}
