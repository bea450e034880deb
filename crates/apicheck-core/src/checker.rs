use crate::error::CheckError;
use crate::facets::TypeComparison;
use crate::provider::IntrospectionProvider;
use crate::report::{BatchReport, PairOutcome, TypeReport};
use crate::resolver::NameResolver;

pub const DEFAULT_REFERENCE_MARKER: &str = "AGAPI";

/// Candidate method signatures that existing reference types never declare. Removed from the
/// candidate side before the methods facet is diffed.
const LEGACY_IGNORED_METHODS: &[&str] = &["public T put(Integer,T)"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSettings {
    /// Prefix on a reference type's simple name (`AGAPIFoo` for `Foo`).
    pub reference_marker: String,
    /// Canonical method signatures, exactly as rendered for the candidate.
    pub ignored_candidate_methods: Vec<String>,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            reference_marker: DEFAULT_REFERENCE_MARKER.to_string(),
            ignored_candidate_methods: LEGACY_IGNORED_METHODS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Entry point for comparing candidate types against their references.
#[derive(Debug, Clone)]
pub struct ApiChecker<P> {
    provider: P,
    settings: CheckSettings,
}

impl<P: IntrospectionProvider> ApiChecker<P> {
    pub fn new(provider: P) -> Self {
        Self::with_settings(provider, CheckSettings::default())
    }

    pub fn with_settings(provider: P, settings: CheckSettings) -> Self {
        Self { provider, settings }
    }

    /// `Ok(true)` iff every facet of the pair, including nested types, matches.
    pub fn compare_types(
        &self,
        candidate: &str,
        reference: &str,
        print: bool,
    ) -> Result<bool, CheckError> {
        Ok(self.report(candidate, reference, print)?.passed())
    }

    /// Loads both types and runs every facet. With `print == false` failing facets may stop
    /// early and carry no diff text.
    pub fn report(
        &self,
        candidate: &str,
        reference: &str,
        print: bool,
    ) -> Result<TypeReport, CheckError> {
        if candidate == reference {
            return Err(CheckError::SameType(candidate.to_string()));
        }
        let candidate_type = self.provider.load_type(candidate)?;
        let reference_type = self.provider.load_type(reference)?;
        let resolver = NameResolver::new(
            reference_type.name.clone(),
            candidate_type.name.clone(),
            self.settings.reference_marker.clone(),
        );

        let report = TypeComparison::new(
            &self.provider,
            &self.settings,
            &candidate_type,
            &reference_type,
            resolver,
            print,
        )
        .check_all()?;

        tracing::info!(
            target: "apicheck.core",
            candidate,
            reference,
            passed = report.passed(),
            "compared types"
        );
        Ok(report)
    }

    /// Checks each candidate against the reference named by [`reference_name_for`]. A pair
    /// that fails to load is recorded and the remaining pairs still run.
    pub fn check_batch<S: AsRef<str>>(&self, candidates: &[S], print: bool) -> BatchReport {
        let outcomes = candidates
            .iter()
            .map(|candidate| {
                let candidate = candidate.as_ref();
                let reference = reference_name_for(candidate, &self.settings.reference_marker);
                let result = self.report(candidate, &reference, print);
                if let Err(err) = &result {
                    tracing::warn!(
                        target: "apicheck.core",
                        candidate,
                        reference = %reference,
                        error = %err,
                        "pair could not be checked"
                    );
                }
                PairOutcome {
                    candidate: candidate.to_string(),
                    reference,
                    result,
                }
            })
            .collect();
        BatchReport { outcomes }
    }
}

/// Inserts `marker` before the top-level simple name: `pkg.Foo$Node` becomes
/// `pkg.AGAPIFoo$Node`.
pub fn reference_name_for(candidate: &str, marker: &str) -> String {
    let (top_level, member) = match candidate.find('$') {
        Some(index) => candidate.split_at(index),
        None => (candidate, ""),
    };
    match top_level.rsplit_once('.') {
        Some((package, simple)) => format!("{package}.{marker}{simple}{member}"),
        None => format!("{marker}{top_level}{member}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::model::{MethodDescriptor, Modifiers, TypeDescriptor, TypeReference};
    use crate::provider::InMemoryProvider;

    #[test]
    fn reference_names() {
        assert_eq!(reference_name_for("Foo", "AGAPI"), "AGAPIFoo");
        assert_eq!(reference_name_for("a.b.Foo", "AGAPI"), "a.b.AGAPIFoo");
        assert_eq!(reference_name_for("a.Foo$Node", "AGAPI"), "a.AGAPIFoo$Node");
        assert_eq!(reference_name_for("Foo", "Ref"), "RefFoo");
    }

    #[test]
    fn missing_reference_is_a_load_error() {
        let provider = InMemoryProvider::new().with(TypeDescriptor::new("Box"));
        let checker = ApiChecker::new(provider);
        assert_eq!(
            checker.compare_types("Box", "AGAPIBox", true),
            Err(CheckError::Load(LoadError::NotFound("AGAPIBox".to_string())))
        );
    }

    #[test]
    fn legacy_put_is_ignored_on_the_candidate_only() {
        let put = MethodDescriptor {
            modifiers: Modifiers::PUBLIC,
            name: "put".to_string(),
            type_params: vec![],
            params: vec![
                TypeReference::named("java.lang.Integer"),
                TypeReference::type_var("T", vec![]),
            ],
            return_type: TypeReference::type_var("T", vec![]),
            synthetic: false,
        };
        let mut candidate = TypeDescriptor::new("Table");
        candidate.methods.push(put.clone());
        let reference = TypeDescriptor::new("AGAPITable");
        let checker = ApiChecker::new(InMemoryProvider::new().with(candidate).with(reference));
        assert_eq!(checker.compare_types("Table", "AGAPITable", true), Ok(true));

        let mut reversed = TypeDescriptor::new("AGAPIMap");
        reversed.methods.push(put);
        let checker = ApiChecker::new(
            InMemoryProvider::new()
                .with(TypeDescriptor::new("Map"))
                .with(reversed),
        );
        assert_eq!(checker.compare_types("Map", "AGAPIMap", true), Ok(false));
    }

    #[test]
    fn a_type_is_never_its_own_reference() {
        let provider = InMemoryProvider::new().with(TypeDescriptor::new("Counter"));
        let checker = ApiChecker::new(&provider);
        assert_eq!(
            checker.compare_types("Counter", "Counter", true),
            Err(CheckError::SameType("Counter".to_string()))
        );

        let unmarked = CheckSettings {
            reference_marker: String::new(),
            ..CheckSettings::default()
        };
        let batch = ApiChecker::with_settings(&provider, unmarked).check_batch(&["Counter"], true);
        assert!(!batch.passed());
        assert_eq!(
            batch.to_string(),
            "Counter: Counter cannot be checked against itself.\n\
             One or more API checks failed.\n"
        );
    }

    #[test]
    fn batch_continues_after_a_load_failure() {
        let provider = InMemoryProvider::new()
            .with(TypeDescriptor::new("Box"))
            .with(TypeDescriptor::new("AGAPIBox"))
            .with(TypeDescriptor::new("Crate"));
        let batch = ApiChecker::new(provider).check_batch(&["Crate", "Box"], true);
        assert_eq!(batch.outcomes.len(), 2);
        assert!(!batch.outcomes[0].passed());
        assert!(batch.outcomes[1].passed());
        assert!(!batch.passed());
    }
}
