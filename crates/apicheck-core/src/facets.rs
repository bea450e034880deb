//! Facet checks for one candidate/reference pair.

use std::collections::{BTreeMap, BTreeSet};

use crate::checker::CheckSettings;
use crate::diff::{bounds_match_unordered, SetDiff};
use crate::error::CheckError;
use crate::model::{Modifiers, NestedKind, NestedTypeDescriptor, TypeDescriptor, TypeReference};
use crate::provider::IntrospectionProvider;
use crate::render::{Renderer, Side};
use crate::report::{DiffBlock, Facet, FacetReport, TypeReport};
use crate::resolver::NameResolver;

/// Compares one pair of loaded descriptors. Owns its resolver; nested comparisons get an
/// extended copy.
pub(crate) struct TypeComparison<'a, P: ?Sized> {
    provider: &'a P,
    settings: &'a CheckSettings,
    candidate: &'a TypeDescriptor,
    reference: &'a TypeDescriptor,
    resolver: NameResolver,
    print: bool,
}

impl<'a, P: IntrospectionProvider + ?Sized> TypeComparison<'a, P> {
    pub(crate) fn new(
        provider: &'a P,
        settings: &'a CheckSettings,
        candidate: &'a TypeDescriptor,
        reference: &'a TypeDescriptor,
        resolver: NameResolver,
        print: bool,
    ) -> Self {
        Self {
            provider,
            settings,
            candidate,
            reference,
            resolver,
            print,
        }
    }

    /// Runs every facet in order. Only load and resolver failures abort; mismatches are
    /// recorded and checking moves on to the next facet.
    pub(crate) fn check_all(&self) -> Result<TypeReport, CheckError> {
        let mut facets = vec![
            self.type_parameters(),
            self.supertype(),
            self.package(),
            self.modifiers(),
            self.fields(),
            self.interfaces(),
            self.constructors(),
            self.methods(),
        ];
        let (nested_facet, nested) = self.nested_types()?;
        facets.push(nested_facet);

        for facet in &facets {
            tracing::debug!(
                target: "apicheck.core",
                candidate = %self.candidate.name,
                facet = %facet.facet,
                passed = facet.passed,
                "checked facet"
            );
        }

        Ok(TypeReport {
            candidate: self.candidate.name.clone(),
            reference: self.reference.name.clone(),
            facets,
            nested,
        })
    }

    fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.resolver)
    }

    fn type_parameters(&self) -> FacetReport {
        let renderer = self.renderer();
        let candidate = &self.candidate.type_params;
        let reference = &self.reference.type_params;

        let same = candidate.len() == reference.len()
            && candidate.iter().zip(reference).all(|(cand, refr)| {
                cand.name == refr.name
                    && bounds_match_unordered(&renderer, &cand.bounds, &refr.bounds)
            });
        if same {
            return FacetReport::pass(Facet::TypeParameters);
        }

        let blocks = self.blocks(|| {
            vec![DiffBlock::new(
                "Wrong type parameters:",
                vec![
                    format!("Expected: {}", renderer.type_parameters(reference, Side::Reference)),
                    format!("Received: {}", renderer.type_parameters(candidate, Side::Candidate)),
                ],
            )]
        });
        FacetReport::fail(Facet::TypeParameters, blocks)
    }

    fn supertype(&self) -> FacetReport {
        let renderer = self.renderer();
        let render = |ty: &Option<TypeReference>, side| match ty {
            Some(ty) => renderer.render(ty, side, false),
            None => "(none)".to_string(),
        };
        let expected = render(&self.reference.supertype, Side::Reference);
        let found = render(&self.candidate.supertype, Side::Candidate);
        if expected == found {
            return FacetReport::pass(Facet::Supertype);
        }

        let blocks = self.blocks(|| {
            vec![DiffBlock::new(
                "Superclasses do not match up:",
                vec![format!("{expected} expected, {found} found.")],
            )]
        });
        FacetReport::fail(Facet::Supertype, blocks)
    }

    fn package(&self) -> FacetReport {
        if self.candidate.package == self.reference.package {
            return FacetReport::pass(Facet::Package);
        }

        let describe = |package: &Option<String>| match package {
            Some(package) => format!("package {package}"),
            None => "(default package)".to_string(),
        };
        let blocks = self.blocks(|| {
            vec![DiffBlock::new(
                "Packages do not match up:",
                vec![format!(
                    "{} expected, {} found.",
                    describe(&self.reference.package),
                    describe(&self.candidate.package)
                )],
            )]
        });
        FacetReport::fail(Facet::Package, blocks)
    }

    fn modifiers(&self) -> FacetReport {
        // `interface` alone is not reported as a modifier difference.
        let candidate = self.candidate.modifiers.without(Modifiers::INTERFACE);
        let reference = self.reference.modifiers.without(Modifiers::INTERFACE);
        if candidate.to_string() == reference.to_string() {
            return FacetReport::pass(Facet::Modifiers);
        }

        let name = &self.candidate.name;
        let blocks = self.blocks(|| {
            let declaration = |mods: Modifiers, kind: &str| {
                if mods.is_empty() {
                    format!("{kind} {name}")
                } else {
                    format!("{mods} {kind} {name}")
                }
            };
            vec![DiffBlock::new(
                "The class has the wrong modifiers:",
                vec![format!(
                    "{} should be {}",
                    declaration(candidate, self.candidate.kind_keyword()),
                    declaration(reference, self.reference.kind_keyword())
                )],
            )]
        });
        FacetReport::fail(Facet::Modifiers, blocks)
    }

    fn fields(&self) -> FacetReport {
        let renderer = self.renderer();
        let collect = |ty: &TypeDescriptor, side| -> BTreeSet<String> {
            ty.fields
                .iter()
                .filter(|field| !field.modifiers.is_private() && !field.synthetic)
                .map(|field| renderer.field(field, side))
                .collect()
        };
        self.set_facet(
            Facet::Fields,
            collect(self.candidate, Side::Candidate),
            collect(self.reference, Side::Reference),
        )
    }

    fn interfaces(&self) -> FacetReport {
        let renderer = self.renderer();
        let collect = |ty: &TypeDescriptor, side| -> BTreeSet<String> {
            ty.interfaces
                .iter()
                .map(|interface| renderer.render(interface, side, false))
                .collect()
        };
        self.set_facet(
            Facet::Interfaces,
            collect(self.candidate, Side::Candidate),
            collect(self.reference, Side::Reference),
        )
    }

    fn constructors(&self) -> FacetReport {
        let renderer = self.renderer();
        let display_name = self.candidate.name.as_str();
        let collect = |ty: &TypeDescriptor, side| -> BTreeSet<String> {
            ty.constructors
                .iter()
                .filter(|ctor| !ctor.modifiers.is_private() && !ctor.synthetic)
                .map(|ctor| renderer.constructor(ctor, display_name, side))
                .collect()
        };
        self.set_facet(
            Facet::Constructors,
            collect(self.candidate, Side::Candidate),
            collect(self.reference, Side::Reference),
        )
    }

    fn methods(&self) -> FacetReport {
        let renderer = self.renderer();
        let collect = |ty: &TypeDescriptor, side| -> BTreeSet<String> {
            ty.methods
                .iter()
                .filter(|method| !method.modifiers.is_private() && !method.synthetic)
                .map(|method| renderer.method(method, side))
                .collect()
        };
        let mut candidate = collect(self.candidate, Side::Candidate);
        for ignored in &self.settings.ignored_candidate_methods {
            candidate.remove(ignored);
        }
        self.set_facet(
            Facet::Methods,
            candidate,
            collect(self.reference, Side::Reference),
        )
    }

    fn nested_types(&self) -> Result<(FacetReport, Vec<TypeReport>), CheckError> {
        let candidate = comparable_nested(self.candidate);
        let reference = comparable_nested(self.reference);
        if candidate.is_empty() && reference.is_empty() {
            return Ok((FacetReport::pass(Facet::NestedTypes), Vec::new()));
        }

        let diff = SetDiff::compute(&key_set(&candidate), &key_set(&reference));
        let names_match = diff.passes();
        if !self.print && !names_match {
            return Ok((FacetReport::fail(Facet::NestedTypes, Vec::new()), Vec::new()));
        }

        let mut reports = Vec::new();
        for simple in &diff.matches {
            let (Some(cand_entry), Some(ref_entry)) = (candidate.get(simple), reference.get(simple))
            else {
                continue;
            };
            let report = self.compare_nested(cand_entry, ref_entry)?;
            let passed = report.passed();
            reports.push(report);
            if !self.print && !passed {
                break;
            }
        }

        let passed = names_match && reports.iter().all(TypeReport::passed);
        let facet = if passed {
            FacetReport::pass(Facet::NestedTypes)
        } else {
            FacetReport::fail(Facet::NestedTypes, self.set_blocks(Facet::NestedTypes, &diff))
        };
        Ok((facet, reports))
    }

    fn compare_nested(
        &self,
        candidate: &NestedTypeDescriptor,
        reference: &NestedTypeDescriptor,
    ) -> Result<TypeReport, CheckError> {
        let candidate = self.provider.load_type(&candidate.name)?;
        let reference = self.provider.load_type(&reference.name)?;
        let resolver = self
            .resolver
            .extended(reference.name.clone(), candidate.name.clone())?;
        tracing::debug!(
            target: "apicheck.core",
            candidate = %candidate.name,
            reference = %reference.name,
            "comparing nested type"
        );
        TypeComparison::new(
            self.provider,
            self.settings,
            &candidate,
            &reference,
            resolver,
            self.print,
        )
        .check_all()
    }

    /// Cardinality first when not printing, then a full set diff.
    fn set_facet(
        &self,
        facet: Facet,
        candidate: BTreeSet<String>,
        reference: BTreeSet<String>,
    ) -> FacetReport {
        if !self.print && candidate.len() != reference.len() {
            return FacetReport::fail(facet, Vec::new());
        }
        let diff = SetDiff::compute(&candidate, &reference);
        if diff.passes() {
            FacetReport::pass(facet)
        } else {
            FacetReport::fail(facet, self.set_blocks(facet, &diff))
        }
    }

    fn set_blocks(&self, facet: Facet, diff: &SetDiff) -> Vec<DiffBlock> {
        let Some((missing, extra)) = facet.set_headings() else {
            return Vec::new();
        };
        self.blocks(|| {
            let mut blocks = Vec::new();
            if !diff.missing.is_empty() {
                blocks.push(DiffBlock::new(missing, diff.missing.iter().cloned().collect()));
            }
            if !diff.extra.is_empty() {
                blocks.push(DiffBlock::new(extra, diff.extra.iter().cloned().collect()));
            }
            blocks
        })
    }

    fn blocks(&self, build: impl FnOnce() -> Vec<DiffBlock>) -> Vec<DiffBlock> {
        if self.print {
            build()
        } else {
            Vec::new()
        }
    }
}

/// Nested entries that take part in comparison, keyed by their name relative to the owner.
fn comparable_nested(owner: &TypeDescriptor) -> BTreeMap<String, &NestedTypeDescriptor> {
    let prefix = format!("{}$", owner.name);
    owner
        .nested_types
        .iter()
        .filter(|nested| {
            nested.kind == NestedKind::Named && !nested.synthetic && !nested.modifiers.is_private()
        })
        .filter_map(|nested| {
            let key = nested
                .name
                .strip_prefix(prefix.as_str())
                .unwrap_or(nested.simple_name.as_str());
            match key.chars().next() {
                Some(first) if !first.is_ascii_digit() => Some((key.to_string(), nested)),
                _ => None,
            }
        })
        .collect()
}

fn key_set(entries: &BTreeMap<String, &NestedTypeDescriptor>) -> BTreeSet<String> {
    entries.keys().cloned().collect()
}
