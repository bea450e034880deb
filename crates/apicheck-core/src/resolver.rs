use std::collections::BTreeMap;

use crate::error::ResolverError;

/// Maps reference-side binary names to the candidate names they stand for.
///
/// A resolver is never shared in place: nested comparisons receive an
/// [`extended`](NameResolver::extended) copy, so aliases added for one nested type are
/// invisible to its siblings while everything added by ancestors stays visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameResolver {
    aliases: BTreeMap<String, String>,
    marker: String,
}

impl NameResolver {
    pub fn new(
        reference_root: impl Into<String>,
        candidate_root: impl Into<String>,
        marker: impl Into<String>,
    ) -> Self {
        let mut aliases = BTreeMap::new();
        aliases.insert(reference_root.into(), candidate_root.into());
        Self {
            aliases,
            marker: marker.into(),
        }
    }

    pub fn alias(&self, reference: &str) -> Option<&str> {
        self.aliases.get(reference).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Returns a copy with one more alias. Re-adding an identical alias is a no-op.
    pub fn extended(
        &self,
        reference: impl Into<String>,
        candidate: impl Into<String>,
    ) -> Result<Self, ResolverError> {
        let reference = reference.into();
        let candidate = candidate.into();
        if let Some(existing) = self.aliases.get(&reference) {
            if *existing != candidate {
                return Err(ResolverError::AliasCollision {
                    reference,
                    existing: existing.clone(),
                    requested: candidate,
                });
            }
            return Ok(self.clone());
        }

        let mut next = self.clone();
        next.aliases.insert(reference, candidate);
        Ok(next)
    }

    /// Resolves a reference-side binary name. Lookups fall back, in order, to an exact alias,
    /// the marker convention, resolving the outer name of an `Outer$Inner` name, and finally
    /// the name itself (library types belong to neither API).
    pub fn resolve(&self, name: &str) -> String {
        if let Some(alias) = self.alias(name) {
            return alias.to_string();
        }
        if let Some(stripped) = self.strip_marker(name) {
            return stripped;
        }
        if let Some((outer, inner)) = name.split_once('$') {
            return format!("{}${inner}", self.resolve(outer));
        }
        name.to_string()
    }

    fn strip_marker(&self, name: &str) -> Option<String> {
        if self.marker.is_empty() {
            return None;
        }
        let (package, simple) = match name.rsplit_once('.') {
            Some((package, simple)) => (Some(package), simple),
            None => (None, name),
        };
        let rest = simple.strip_prefix(self.marker.as_str())?;
        if rest.is_empty() {
            return None;
        }
        Some(match package {
            Some(package) => format!("{package}.{rest}"),
            None => rest.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> NameResolver {
        NameResolver::new("AGAPIBox", "Box", "AGAPI")
    }

    #[test]
    fn exact_alias_wins() {
        let r = NameResolver::new("RefBox", "Box", "AGAPI");
        assert_eq!(r.resolve("RefBox"), "Box");
    }

    #[test]
    fn marker_is_stripped_from_the_simple_name() {
        let r = resolver();
        assert_eq!(r.resolve("AGAPIList"), "List");
        assert_eq!(r.resolve("com.example.AGAPIList"), "com.example.List");
        assert_eq!(r.resolve("AGAPIBox$Node"), "Box$Node");
        // The bare marker is not a reference name.
        assert_eq!(r.resolve("AGAPI"), "AGAPI");
    }

    #[test]
    fn nested_names_resolve_through_their_outer_name() {
        let r = NameResolver::new("pkg.Reference", "pkg.Candidate", "AGAPI");
        assert_eq!(r.resolve("pkg.Reference$Node"), "pkg.Candidate$Node");
        assert_eq!(r.resolve("pkg.Reference$Node$Leaf"), "pkg.Candidate$Node$Leaf");
    }

    #[test]
    fn library_names_are_left_alone() {
        let r = resolver();
        assert_eq!(r.resolve("java.util.List"), "java.util.List");
        assert_eq!(r.resolve("java.util.Map$Entry"), "java.util.Map$Entry");
        assert_eq!(r.resolve("int"), "int");
    }

    #[test]
    fn extension_copies_and_never_mutates_the_parent() {
        let root = NameResolver::new("Reference", "Candidate", "");
        let left = root.extended("Reference$A", "Candidate$Left").unwrap();
        let right = root.extended("Reference$B", "Candidate$Right").unwrap();

        assert_eq!(root.len(), 1);
        assert_eq!(left.resolve("Reference$A"), "Candidate$Left");
        // Siblings don't see each other's aliases but do see the ancestor's.
        assert_eq!(right.resolve("Reference$A"), "Candidate$A");
        assert_eq!(right.resolve("Reference"), "Candidate");
    }

    #[test]
    fn conflicting_alias_is_rejected() {
        let r = resolver();
        assert_eq!(r.extended("AGAPIBox", "Box").unwrap(), r);
        let err = r.extended("AGAPIBox", "Crate").unwrap_err();
        assert_eq!(
            err,
            ResolverError::AliasCollision {
                reference: "AGAPIBox".to_string(),
                existing: "Box".to_string(),
                requested: "Crate".to_string(),
            }
        );
    }
}
