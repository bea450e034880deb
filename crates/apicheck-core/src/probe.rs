//! Point queries against a single descriptor, for callers that need to assert one member
//! rather than diff a whole type.

use crate::model::{Modifiers, TypeDescriptor, TypeReference};
use crate::render::{Renderer, Side};
use crate::resolver::NameResolver;

/// True iff `ty` declares a method `name(params)` returning `return_type` whose modifiers
/// include all of `required` and none of `forbidden`. Types compare by their rendered form.
pub fn has_method(
    ty: &TypeDescriptor,
    name: &str,
    params: &[TypeReference],
    return_type: &TypeReference,
    required: Modifiers,
    forbidden: Modifiers,
) -> bool {
    let resolver = identity_resolver(ty);
    let renderer = Renderer::new(&resolver);
    let wanted_params = render_all(&renderer, params);
    let wanted_return = renderer.render(return_type, Side::Candidate, false);

    ty.methods.iter().any(|method| {
        method.name == name
            && render_all(&renderer, &method.params) == wanted_params
            && renderer.render(&method.return_type, Side::Candidate, false) == wanted_return
            && method.modifiers.contains(required)
            && !method.modifiers.intersects(forbidden)
    })
}

/// True iff `ty` declares a non-private constructor taking exactly `params`.
pub fn has_constructor(ty: &TypeDescriptor, params: &[TypeReference]) -> bool {
    let resolver = identity_resolver(ty);
    let renderer = Renderer::new(&resolver);
    let wanted = render_all(&renderer, params);

    ty.constructors
        .iter()
        .any(|ctor| !ctor.modifiers.is_private() && render_all(&renderer, &ctor.params) == wanted)
}

fn identity_resolver(ty: &TypeDescriptor) -> NameResolver {
    NameResolver::new(ty.name.clone(), ty.name.clone(), "")
}

fn render_all(renderer: &Renderer<'_>, types: &[TypeReference]) -> Vec<String> {
    types
        .iter()
        .map(|ty| renderer.render(ty, Side::Candidate, false))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstructorDescriptor, MethodDescriptor};

    fn counter() -> TypeDescriptor {
        let mut ty = TypeDescriptor::new("Counter");
        ty.methods.push(MethodDescriptor {
            modifiers: Modifiers::PUBLIC | Modifiers::STATIC,
            name: "of".to_string(),
            type_params: vec![],
            params: vec![TypeReference::named("int")],
            return_type: TypeReference::named("Counter"),
            synthetic: false,
        });
        ty.constructors.push(ConstructorDescriptor {
            modifiers: Modifiers::PRIVATE,
            type_params: vec![],
            params: vec![],
            synthetic: false,
        });
        ty.constructors.push(ConstructorDescriptor {
            modifiers: Modifiers::NONE,
            type_params: vec![],
            params: vec![TypeReference::named("int")],
            synthetic: false,
        });
        ty
    }

    #[test]
    fn method_probe_checks_signature_and_modifiers() {
        let ty = counter();
        let int = [TypeReference::named("int")];
        let ret = TypeReference::named("Counter");
        assert!(has_method(&ty, "of", &int, &ret, Modifiers::STATIC, Modifiers::PRIVATE));
        assert!(!has_method(&ty, "of", &int, &ret, Modifiers::FINAL, Modifiers::NONE));
        assert!(!has_method(&ty, "of", &int, &ret, Modifiers::NONE, Modifiers::STATIC));
        assert!(!has_method(&ty, "of", &[], &ret, Modifiers::NONE, Modifiers::NONE));
        assert!(!has_method(
            &ty,
            "of",
            &int,
            &TypeReference::named("void"),
            Modifiers::NONE,
            Modifiers::NONE
        ));
    }

    #[test]
    fn constructor_probe_skips_private_constructors() {
        let ty = counter();
        assert!(has_constructor(&ty, &[TypeReference::named("int")]));
        assert!(!has_constructor(&ty, &[]));
    }
}
