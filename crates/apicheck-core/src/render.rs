//! Canonical textual signatures.
//!
//! Every string produced here is a pure function of the input, the side, the bounds flag
//! and the resolver state, so two equal APIs always render to equal strings.

use crate::model::{
    ConstructorDescriptor, FieldDescriptor, MethodDescriptor, Modifiers, TypeParameter,
    TypeReference, WildcardBound,
};
use crate::resolver::NameResolver;

const IMPLICIT_PACKAGE: &str = "java.lang.";

/// Which API a type reference was read from. Only reference-side names go through the
/// resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Reference,
    Candidate,
}

#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    resolver: &'a NameResolver,
}

impl<'a> Renderer<'a> {
    pub fn new(resolver: &'a NameResolver) -> Self {
        Self { resolver }
    }

    pub fn render(&self, ty: &TypeReference, side: Side, include_bounds: bool) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty, side, include_bounds);
        out
    }

    /// Display form of a binary name: resolved (reference side only), then without the
    /// implicit `java.lang.` package.
    pub fn name(&self, name: &str, side: Side) -> String {
        let resolved = match side {
            Side::Reference => self.resolver.resolve(name),
            Side::Candidate => name.to_string(),
        };
        match resolved.strip_prefix(IMPLICIT_PACKAGE) {
            Some(short) => short.to_string(),
            None => resolved,
        }
    }

    fn write_type(&self, out: &mut String, ty: &TypeReference, side: Side, include_bounds: bool) {
        match ty {
            TypeReference::Named { name, args } => {
                out.push_str(&self.name(name, side));
                if !args.is_empty() {
                    out.push('<');
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.push(',');
                        }
                        self.write_type(out, arg, side, false);
                    }
                    out.push('>');
                }
            }
            TypeReference::Array {
                element,
                dimensions,
            } => {
                self.write_type(out, element, side, include_bounds);
                for _ in 0..*dimensions {
                    out.push_str("[]");
                }
            }
            TypeReference::TypeVariable { name, bounds } => {
                out.push_str(name);
                let trivial = bounds.is_empty() || (bounds.len() == 1 && bounds[0].is_root());
                if include_bounds && !trivial {
                    out.push_str(" extends ");
                    for (i, bound) in bounds.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.write_type(out, bound, side, true);
                    }
                }
            }
            TypeReference::Wildcard(bound) => {
                out.push('?');
                match bound {
                    WildcardBound::Unbounded => {}
                    WildcardBound::Super(lower) => {
                        out.push_str(" super ");
                        self.write_type(out, lower, side, include_bounds);
                    }
                    WildcardBound::Extends(upper) if upper.is_root() => {}
                    WildcardBound::Extends(upper) => {
                        out.push_str(" extends ");
                        self.write_type(out, upper, side, include_bounds);
                    }
                }
            }
        }
    }

    /// `<T extends Comparable<T>,U>`, or `(none)` for an empty list.
    pub fn type_parameters(&self, params: &[TypeParameter], side: Side) -> String {
        if params.is_empty() {
            return "(none)".to_string();
        }
        let rendered: Vec<String> = params
            .iter()
            .map(|p| self.render(&p.as_reference(), side, true))
            .collect();
        format!("<{}>", rendered.join(","))
    }

    /// `[mods ]Type name`
    pub fn field(&self, field: &FieldDescriptor, side: Side) -> String {
        let mut out = modifier_prefix(field.modifiers);
        self.write_type(&mut out, &field.ty, side, false);
        out.push(' ');
        out.push_str(&field.name);
        out
    }

    /// `[mods ][<tps> ]Name(P1,P2)`; `display_name` is the candidate's name so that only the
    /// parameter lists decide a match.
    pub fn constructor(
        &self,
        constructor: &ConstructorDescriptor,
        display_name: &str,
        side: Side,
    ) -> String {
        let mut out = modifier_prefix(constructor.modifiers);
        self.write_member_type_params(&mut out, &constructor.type_params, side);
        out.push_str(display_name);
        self.write_params(&mut out, &constructor.params, side);
        out
    }

    /// `[mods ][<tps> ]Ret name(P1,P2)`
    pub fn method(&self, method: &MethodDescriptor, side: Side) -> String {
        let mut out = modifier_prefix(method.modifiers);
        self.write_member_type_params(&mut out, &method.type_params, side);
        self.write_type(&mut out, &method.return_type, side, false);
        out.push(' ');
        out.push_str(&method.name);
        self.write_params(&mut out, &method.params, side);
        out
    }

    fn write_member_type_params(&self, out: &mut String, params: &[TypeParameter], side: Side) {
        if !params.is_empty() {
            out.push_str(&self.type_parameters(params, side));
            out.push(' ');
        }
    }

    fn write_params(&self, out: &mut String, params: &[TypeReference], side: Side) {
        out.push('(');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.write_type(out, param, side, false);
        }
        out.push(')');
    }
}

fn modifier_prefix(modifiers: Modifiers) -> String {
    if modifiers.is_empty() {
        String::new()
    } else {
        format!("{modifiers} ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolver() -> NameResolver {
        NameResolver::new("AGAPIBox", "Box", "AGAPI")
    }

    fn comparable_of(t: TypeReference) -> TypeReference {
        TypeReference::generic("java.lang.Comparable", vec![t])
    }

    #[test]
    fn named_types_resolve_only_on_the_reference_side() {
        let r = resolver();
        let renderer = Renderer::new(&r);
        let ty = TypeReference::generic(
            "java.util.Map",
            vec![
                TypeReference::named("java.lang.String"),
                TypeReference::named("AGAPIBox$Node"),
            ],
        );
        assert_eq!(
            renderer.render(&ty, Side::Reference, false),
            "java.util.Map<String,Box$Node>"
        );
        assert_eq!(
            renderer.render(&ty, Side::Candidate, false),
            "java.util.Map<String,AGAPIBox$Node>"
        );
    }

    #[test]
    fn arrays_append_one_token_per_dimension() {
        let r = resolver();
        let renderer = Renderer::new(&r);
        let ty = TypeReference::array(TypeReference::named("AGAPIBox"), 2);
        assert_eq!(renderer.render(&ty, Side::Reference, false), "Box[][]");
        let ints = TypeReference::array(TypeReference::named("int"), 1);
        assert_eq!(renderer.render(&ints, Side::Candidate, false), "int[]");
    }

    #[test]
    fn type_variable_bounds_only_when_requested_and_non_trivial() {
        let r = resolver();
        let renderer = Renderer::new(&r);
        let t = TypeReference::type_var(
            "T",
            vec![comparable_of(TypeReference::type_var("T", vec![]))],
        );
        assert_eq!(renderer.render(&t, Side::Candidate, false), "T");
        assert_eq!(
            renderer.render(&t, Side::Candidate, true),
            "T extends Comparable<T>"
        );

        let plain = TypeReference::type_var("U", vec![TypeReference::object()]);
        assert_eq!(renderer.render(&plain, Side::Candidate, true), "U");

        let multi = TypeReference::type_var(
            "V",
            vec![
                TypeReference::named("java.lang.Number"),
                TypeReference::named("java.io.Serializable"),
            ],
        );
        assert_eq!(
            renderer.render(&multi, Side::Candidate, true),
            "V extends Number, java.io.Serializable"
        );
    }

    #[test]
    fn wildcards() {
        let r = resolver();
        let renderer = Renderer::new(&r);
        let render = |ty: TypeReference| renderer.render(&ty, Side::Reference, false);

        assert_eq!(render(TypeReference::wildcard(None, None).unwrap()), "?");
        assert_eq!(
            render(TypeReference::wildcard(Some(TypeReference::object()), None).unwrap()),
            "?"
        );
        assert_eq!(
            render(
                TypeReference::wildcard(Some(TypeReference::named("AGAPIBox")), None).unwrap()
            ),
            "? extends Box"
        );
        assert_eq!(
            render(
                TypeReference::wildcard(None, Some(TypeReference::named("java.lang.Integer")))
                    .unwrap()
            ),
            "? super Integer"
        );
    }

    #[test]
    fn member_signatures() {
        let r = resolver();
        let renderer = Renderer::new(&r);
        let t = TypeParameter::new("T", vec![comparable_of(TypeReference::type_var("T", vec![]))]);

        let field = FieldDescriptor {
            modifiers: Modifiers::PROTECTED,
            name: "size".to_string(),
            ty: TypeReference::named("int"),
            synthetic: false,
        };
        assert_eq!(renderer.field(&field, Side::Reference), "protected int size");

        let package_private = FieldDescriptor {
            modifiers: Modifiers::NONE,
            ..field
        };
        assert_eq!(renderer.field(&package_private, Side::Reference), "int size");

        let method = MethodDescriptor {
            modifiers: Modifiers::PUBLIC | Modifiers::STATIC,
            name: "max".to_string(),
            type_params: vec![t.clone()],
            params: vec![
                TypeReference::named("AGAPIBox"),
                TypeReference::type_var("T", vec![]),
            ],
            return_type: TypeReference::type_var("T", vec![]),
            synthetic: false,
        };
        assert_eq!(
            renderer.method(&method, Side::Reference),
            "public static <T extends Comparable<T>> T max(Box,T)"
        );

        let constructor = ConstructorDescriptor {
            modifiers: Modifiers::PUBLIC,
            type_params: vec![],
            params: vec![TypeReference::named("int")],
            synthetic: false,
        };
        assert_eq!(
            renderer.constructor(&constructor, "Box", Side::Reference),
            "public Box(int)"
        );

        assert_eq!(renderer.type_parameters(&[], Side::Reference), "(none)");
        assert_eq!(
            renderer.type_parameters(&[t, TypeParameter::unbounded("U")], Side::Reference),
            "<T extends Comparable<T>,U>"
        );
    }
}
