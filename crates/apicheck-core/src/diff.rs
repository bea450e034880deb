use std::collections::BTreeSet;

use crate::model::TypeReference;
use crate::render::{Renderer, Side};

/// Outcome of comparing two canonical signature sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetDiff {
    /// In the reference but not the candidate.
    pub missing: BTreeSet<String>,
    /// In the candidate but not the reference.
    pub extra: BTreeSet<String>,
    pub matches: BTreeSet<String>,
    candidate_len: usize,
    reference_len: usize,
}

impl SetDiff {
    pub fn compute(candidate: &BTreeSet<String>, reference: &BTreeSet<String>) -> Self {
        Self {
            missing: reference.difference(candidate).cloned().collect(),
            extra: candidate.difference(reference).cloned().collect(),
            matches: candidate.intersection(reference).cloned().collect(),
            candidate_len: candidate.len(),
            reference_len: reference.len(),
        }
    }

    /// Every signature matched and neither side has anything left over.
    pub fn passes(&self) -> bool {
        self.matches.len() == self.candidate_len && self.candidate_len == self.reference_len
    }
}

/// Matches two bound lists as unordered collections: each reference bound claims the first
/// unclaimed candidate bound that renders identically (with bounds).
pub(crate) fn bounds_match_unordered(
    renderer: &Renderer<'_>,
    candidate: &[TypeReference],
    reference: &[TypeReference],
) -> bool {
    if candidate.len() != reference.len() {
        return false;
    }
    let candidate: Vec<String> = candidate
        .iter()
        .map(|b| renderer.render(b, Side::Candidate, true))
        .collect();
    let mut claimed = vec![false; candidate.len()];

    reference.iter().all(|bound| {
        let wanted = renderer.render(bound, Side::Reference, true);
        let slot = candidate
            .iter()
            .enumerate()
            .position(|(i, c)| !claimed[i] && *c == wanted);
        match slot {
            Some(i) => {
                claimed[i] = true;
                true
            }
            None => false,
        }
    })
}
