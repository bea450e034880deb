//! Verdicts and the human-readable diff text.

use std::fmt;

use crate::error::CheckError;

const BULLET: &str = "  *  ";

/// One structurally significant part of a type's API, in checking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    TypeParameters,
    Supertype,
    Package,
    Modifiers,
    Fields,
    Interfaces,
    Constructors,
    Methods,
    NestedTypes,
}

impl Facet {
    pub const ALL: [Facet; 9] = [
        Facet::TypeParameters,
        Facet::Supertype,
        Facet::Package,
        Facet::Modifiers,
        Facet::Fields,
        Facet::Interfaces,
        Facet::Constructors,
        Facet::Methods,
        Facet::NestedTypes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Facet::TypeParameters => "type-parameters",
            Facet::Supertype => "supertype",
            Facet::Package => "package",
            Facet::Modifiers => "modifiers",
            Facet::Fields => "fields",
            Facet::Interfaces => "interfaces",
            Facet::Constructors => "constructors",
            Facet::Methods => "methods",
            Facet::NestedTypes => "nested-types",
        }
    }

    /// Headings for the `(missing, extra)` blocks of set-valued facets.
    pub(crate) fn set_headings(self) -> Option<(&'static str, &'static str)> {
        match self {
            Facet::Fields => Some((
                "The following fields are missing:",
                "The following fields should be made private:",
            )),
            Facet::Interfaces => Some((
                "The following interfaces are missing:",
                "The following interfaces should not be implemented:",
            )),
            Facet::Constructors => Some((
                "The following constructors are missing:",
                "The following constructors should be removed:",
            )),
            Facet::Methods => Some((
                "The following methods are missing:",
                "The following methods should be removed or made private:",
            )),
            Facet::NestedTypes => Some((
                "The following nested classes are missing:",
                "The following nested classes should be made private:",
            )),
            Facet::TypeParameters | Facet::Supertype | Facet::Package | Facet::Modifiers => None,
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A heading followed by bulleted items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffBlock {
    pub heading: String,
    pub items: Vec<String>,
}

impl DiffBlock {
    pub fn new(heading: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            heading: heading.into(),
            items,
        }
    }
}

impl fmt::Display for DiffBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.heading)?;
        for item in &self.items {
            writeln!(f, "{BULLET}{item}")?;
        }
        writeln!(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetReport {
    pub facet: Facet,
    pub passed: bool,
    /// Empty when the facet passed or the check ran without printing.
    pub blocks: Vec<DiffBlock>,
}

impl FacetReport {
    pub fn pass(facet: Facet) -> Self {
        Self {
            facet,
            passed: true,
            blocks: Vec::new(),
        }
    }

    pub fn fail(facet: Facet, blocks: Vec<DiffBlock>) -> Self {
        Self {
            facet,
            passed: false,
            blocks,
        }
    }
}

/// Result of comparing one candidate/reference pair, including its nested types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReport {
    pub candidate: String,
    pub reference: String,
    pub facets: Vec<FacetReport>,
    /// Reports for matched nested types, printed after this type's own facets.
    pub nested: Vec<TypeReport>,
}

impl TypeReport {
    /// Every facet passed, including every nested comparison.
    pub fn passed(&self) -> bool {
        self.facets.iter().all(|facet| facet.passed) && self.nested.iter().all(TypeReport::passed)
    }

    pub fn facet(&self, facet: Facet) -> Option<&FacetReport> {
        self.facets.iter().find(|report| report.facet == facet)
    }

    /// Facets that failed on this type (not its nested types).
    pub fn failed_facets(&self) -> impl Iterator<Item = Facet> + '_ {
        self.facets
            .iter()
            .filter(|report| !report.passed)
            .map(|report| report.facet)
    }
}

impl fmt::Display for TypeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Testing {}.java", self.candidate)?;
        for block in self.facets.iter().flat_map(|facet| &facet.blocks) {
            write!(f, "{block}")?;
        }
        for nested in &self.nested {
            write!(f, "{nested}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairOutcome {
    pub candidate: String,
    pub reference: String,
    pub result: Result<TypeReport, CheckError>,
}

impl PairOutcome {
    pub fn passed(&self) -> bool {
        matches!(&self.result, Ok(report) if report.passed())
    }
}

impl fmt::Display for PairOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(report) => write!(f, "{report}"),
            Err(err) => writeln!(f, "{}: {err}.", self.candidate),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<PairOutcome>,
}

impl BatchReport {
    /// Every pair loaded and passed. An empty batch passes.
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(PairOutcome::passed)
    }

    pub fn summary(&self) -> &'static str {
        if self.passed() {
            "All API checks passed."
        } else {
            "One or more API checks failed."
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            write!(f, "{outcome}")?;
        }
        writeln!(f, "{}", self.summary())
    }
}
