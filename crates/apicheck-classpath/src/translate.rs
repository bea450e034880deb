//! `ClassFile` → `TypeDescriptor`, following what `java.lang.reflect` reports for the same
//! class.

use apicheck_classfile::{
    access, internal_name_to_binary, parse_class_signature, parse_field_descriptor,
    parse_field_signature, parse_method_descriptor, parse_method_signature, ClassFile,
    ClassMember, ClassTypeSignature, FieldType, FieldTypeSignature, InnerClassInfo, ReturnType,
    TypeArgument, TypeSignature,
};
use apicheck_core::{
    ConstructorDescriptor, FieldDescriptor, MethodDescriptor, Modifiers, NestedKind,
    NestedTypeDescriptor, TypeDescriptor, TypeParameter, TypeReference, WildcardBound,
};

const CLASS_MODIFIERS: u16 = access::ACC_PUBLIC
    | access::ACC_PRIVATE
    | access::ACC_PROTECTED
    | access::ACC_STATIC
    | access::ACC_FINAL
    | access::ACC_INTERFACE
    | access::ACC_ABSTRACT
    | access::ACC_STRICT;
const FIELD_MODIFIERS: u16 = access::ACC_PUBLIC
    | access::ACC_PRIVATE
    | access::ACC_PROTECTED
    | access::ACC_STATIC
    | access::ACC_FINAL
    | access::ACC_VOLATILE
    | access::ACC_TRANSIENT;
const CONSTRUCTOR_MODIFIERS: u16 = access::ACC_PUBLIC | access::ACC_PRIVATE | access::ACC_PROTECTED;
const METHOD_MODIFIERS: u16 = access::ACC_PUBLIC
    | access::ACC_PRIVATE
    | access::ACC_PROTECTED
    | access::ACC_STATIC
    | access::ACC_FINAL
    | access::ACC_SYNCHRONIZED
    | access::ACC_NATIVE
    | access::ACC_ABSTRACT
    | access::ACC_STRICT;

const CONSTRUCTOR_NAME: &str = "<init>";
const STATIC_INITIALIZER_NAME: &str = "<clinit>";

pub fn translate_class(class: &ClassFile) -> apicheck_classfile::Result<TypeDescriptor> {
    let name = internal_name_to_binary(&class.this_class);
    let mut ty = TypeDescriptor::new(name);

    // Member classes report the flags from their own InnerClasses entry (that is where
    // `private`, `protected` and `static` live).
    let flags = class
        .own_inner_class_entry()
        .map_or(class.access_flags, |entry| entry.access_flags);
    ty.modifiers = Modifiers::from_bits(flags & CLASS_MODIFIERS);

    let signature = class
        .signature
        .as_deref()
        .map(parse_class_signature)
        .transpose()?;
    let class_params: &[apicheck_classfile::TypeParameter] = signature
        .as_ref()
        .map_or(&[], |sig| sig.type_params.as_slice());
    let mut scope = TypeVarScope::new(class_params);

    ty.type_params = scope.declare(class_params);
    ty.supertype = match (&signature, &class.super_class) {
        _ if ty.is_interface() => None,
        (_, None) => None,
        (Some(sig), Some(_)) => Some(scope.class_type(&sig.super_class)),
        (None, Some(super_class)) => Some(TypeReference::named(internal_name_to_binary(
            super_class,
        ))),
    };
    ty.interfaces = match &signature {
        Some(sig) => sig
            .interfaces
            .iter()
            .map(|interface| scope.class_type(interface))
            .collect(),
        None => class
            .interfaces
            .iter()
            .map(|interface| TypeReference::named(internal_name_to_binary(interface)))
            .collect(),
    };

    for field in &class.fields {
        ty.fields.push(translate_field(&mut scope, field)?);
    }

    for method in &class.methods {
        match method.name.as_str() {
            STATIC_INITIALIZER_NAME => {}
            CONSTRUCTOR_NAME => ty.constructors.push(translate_constructor(class_params, method)?),
            _ => ty.methods.push(translate_method(class_params, method)?),
        }
    }

    ty.nested_types = class
        .inner_classes
        .iter()
        .filter_map(|entry| nested_entry(&class.this_class, entry))
        .collect();

    Ok(ty)
}

fn translate_field(
    scope: &mut TypeVarScope<'_>,
    field: &ClassMember,
) -> apicheck_classfile::Result<FieldDescriptor> {
    let ty = match &field.signature {
        Some(sig) => scope.field_type(&parse_field_signature(sig)?),
        None => descriptor_type(&parse_field_descriptor(&field.descriptor)?),
    };
    Ok(FieldDescriptor {
        modifiers: Modifiers::from_bits(field.access_flags & FIELD_MODIFIERS),
        name: field.name.clone(),
        ty,
        synthetic: field.is_synthetic(),
    })
}

/// Type parameters, parameter types and return type of a method or constructor.
struct Callable {
    type_params: Vec<TypeParameter>,
    params: Vec<TypeReference>,
    return_type: TypeReference,
}

fn translate_callable(
    class_params: &[apicheck_classfile::TypeParameter],
    member: &ClassMember,
) -> apicheck_classfile::Result<Callable> {
    match &member.signature {
        Some(sig) => {
            let sig = parse_method_signature(sig)?;
            let mut scope = TypeVarScope::new(class_params).with_method(&sig.type_params);
            Ok(Callable {
                type_params: scope.declare(&sig.type_params),
                params: sig.params.iter().map(|p| scope.type_sig(p)).collect(),
                return_type: match &sig.return_type {
                    Some(ret) => scope.type_sig(ret),
                    None => TypeReference::named("void"),
                },
            })
        }
        None => {
            let desc = parse_method_descriptor(&member.descriptor)?;
            Ok(Callable {
                type_params: Vec::new(),
                params: desc.params.iter().map(descriptor_type).collect(),
                return_type: match &desc.return_type {
                    ReturnType::Void => TypeReference::named("void"),
                    ReturnType::Type(ty) => descriptor_type(ty),
                },
            })
        }
    }
}

fn translate_constructor(
    class_params: &[apicheck_classfile::TypeParameter],
    member: &ClassMember,
) -> apicheck_classfile::Result<ConstructorDescriptor> {
    let callable = translate_callable(class_params, member)?;
    Ok(ConstructorDescriptor {
        modifiers: Modifiers::from_bits(member.access_flags & CONSTRUCTOR_MODIFIERS),
        type_params: callable.type_params,
        params: callable.params,
        synthetic: member.is_synthetic(),
    })
}

fn translate_method(
    class_params: &[apicheck_classfile::TypeParameter],
    member: &ClassMember,
) -> apicheck_classfile::Result<MethodDescriptor> {
    let callable = translate_callable(class_params, member)?;
    Ok(MethodDescriptor {
        modifiers: Modifiers::from_bits(member.access_flags & METHOD_MODIFIERS),
        name: member.name.clone(),
        type_params: callable.type_params,
        params: callable.params,
        return_type: callable.return_type,
        // Bridges duplicate a real method with erased types.
        synthetic: member.is_synthetic() || member.is_bridge_method(),
    })
}

/// Declared member classes, plus local and anonymous classes tagged so they are never compared.
fn nested_entry(owner: &str, entry: &InnerClassInfo) -> Option<NestedTypeDescriptor> {
    if entry.inner_class == owner {
        return None;
    }
    let tail = entry
        .inner_class
        .strip_prefix(owner)
        .and_then(|rest| rest.strip_prefix('$'));

    let kind = match (&entry.outer_class, tail) {
        (Some(outer), Some(tail)) if outer == owner => {
            if tail.starts_with(|c: char| c.is_ascii_digit()) {
                NestedKind::SyntheticLocal
            } else {
                NestedKind::Named
            }
        }
        // Local and anonymous classes carry no outer class.
        (None, Some(tail)) if !tail.contains('$') => NestedKind::SyntheticLocal,
        _ => return None,
    };

    let simple_name = entry
        .inner_name
        .clone()
        .or_else(|| tail.map(str::to_string))
        .unwrap_or_default();
    Some(NestedTypeDescriptor {
        name: internal_name_to_binary(&entry.inner_class),
        simple_name,
        modifiers: Modifiers::from_bits(entry.access_flags & CLASS_MODIFIERS),
        synthetic: entry.access_flags & access::ACC_SYNTHETIC != 0,
        kind,
    })
}

fn descriptor_type(ty: &FieldType) -> TypeReference {
    match ty {
        FieldType::Base(base) => TypeReference::named(base.keyword()),
        FieldType::Object(internal) => TypeReference::named(internal_name_to_binary(internal)),
        FieldType::Array(element) => TypeReference::array(descriptor_type(element), 1),
    }
}

/// Type variables visible from one generic declaration: the method's own parameters shadow
/// the class's.
///
/// A variable carries its bounds only where bounds can be rendered: in a member type or a
/// bound. Inside type arguments it is emitted bare, which keeps the expansion linear in
/// the declaration and cuts `T extends Comparable<T>`. `expanding` cuts the remaining
/// cycles through bare variable bounds (`<A extends B, B extends A>`).
struct TypeVarScope<'s> {
    class: &'s [apicheck_classfile::TypeParameter],
    method: &'s [apicheck_classfile::TypeParameter],
    expanding: Vec<String>,
}

impl<'s> TypeVarScope<'s> {
    fn new(class: &'s [apicheck_classfile::TypeParameter]) -> Self {
        Self {
            class,
            method: &[],
            expanding: Vec::new(),
        }
    }

    fn with_method(mut self, method: &'s [apicheck_classfile::TypeParameter]) -> Self {
        self.method = method;
        self
    }

    fn lookup(&self, name: &str) -> Option<&'s apicheck_classfile::TypeParameter> {
        self.method
            .iter()
            .chain(self.class.iter())
            .find(|param| param.name == name)
    }

    fn declare(&mut self, params: &[apicheck_classfile::TypeParameter]) -> Vec<TypeParameter> {
        params
            .iter()
            .map(|param| {
                self.expanding.push(param.name.clone());
                let bounds = self.bounds(param);
                self.expanding.pop();
                TypeParameter::new(param.name.clone(), bounds)
            })
            .collect()
    }

    /// Declared bounds, or `Object` when none were written.
    fn bounds(&mut self, param: &apicheck_classfile::TypeParameter) -> Vec<TypeReference> {
        let mut bounds: Vec<TypeReference> = param
            .class_bound
            .iter()
            .chain(param.interface_bounds.iter())
            .map(|bound| self.field_type(bound))
            .collect();
        if bounds.is_empty() {
            bounds.push(TypeReference::object());
        }
        bounds
    }

    fn type_var(&mut self, name: &str) -> TypeReference {
        if self.expanding.iter().any(|open| open == name) {
            return TypeReference::type_var(name, Vec::new());
        }
        let Some(param) = self.lookup(name) else {
            // Declared by an enclosing class or method we do not have in scope.
            return TypeReference::type_var(name, Vec::new());
        };
        self.expanding.push(name.to_string());
        let bounds = self.bounds(param);
        self.expanding.pop();
        TypeReference::type_var(name, bounds)
    }

    fn type_sig(&mut self, sig: &TypeSignature) -> TypeReference {
        match sig {
            TypeSignature::Base(base) => TypeReference::named(base.keyword()),
            TypeSignature::Reference(field) => self.field_type(field),
        }
    }

    fn field_type(&mut self, sig: &FieldTypeSignature) -> TypeReference {
        match sig {
            FieldTypeSignature::Class(class) => self.class_type(class),
            FieldTypeSignature::Array(element) => TypeReference::array(self.type_sig(element), 1),
            FieldTypeSignature::TypeVariable(name) => self.type_var(name),
        }
    }

    /// Like [`field_type`](Self::field_type), but type variables come without bounds.
    fn argument_type(&mut self, sig: &FieldTypeSignature) -> TypeReference {
        match sig {
            FieldTypeSignature::Class(class) => self.class_type(class),
            FieldTypeSignature::Array(element) => {
                let element = match element.as_ref() {
                    TypeSignature::Base(base) => TypeReference::named(base.keyword()),
                    TypeSignature::Reference(field) => self.argument_type(field),
                };
                TypeReference::array(element, 1)
            }
            FieldTypeSignature::TypeVariable(name) => {
                TypeReference::type_var(name.as_str(), Vec::new())
            }
        }
    }

    /// Arguments of an inner-class type are those of its innermost segment.
    fn class_type(&mut self, sig: &ClassTypeSignature) -> TypeReference {
        let args = sig
            .type_arguments()
            .iter()
            .map(|arg| self.type_argument(arg))
            .collect();
        TypeReference::generic(internal_name_to_binary(&sig.internal_name()), args)
    }

    fn type_argument(&mut self, arg: &TypeArgument) -> TypeReference {
        match arg {
            TypeArgument::Any => TypeReference::Wildcard(WildcardBound::Unbounded),
            TypeArgument::Exact(ty) => self.argument_type(ty),
            TypeArgument::Extends(ty) => {
                TypeReference::Wildcard(WildcardBound::Extends(Box::new(self.argument_type(ty))))
            }
            TypeArgument::Super(ty) => {
                TypeReference::Wildcard(WildcardBound::Super(Box::new(self.argument_type(ty))))
            }
        }
    }
}
