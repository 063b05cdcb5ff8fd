use std::collections::HashSet;

use serde::Serialize;

use quintet_graph::Triple;

/// Additions and removals produced by one verb.
///
/// Both lists are duplicate free and disjoint: a triple that would be both
/// removed and added is kept as an addition only, so applying removals then
/// additions leaves it present either way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuadDelta {
  additions: Vec<Triple>,
  removals: Vec<Triple>,
}

impl QuadDelta {
  pub fn new(
    additions: impl IntoIterator<Item = Triple>,
    removals: impl IntoIterator<Item = Triple>,
  ) -> Self {
    let mut seen = HashSet::new();
    let additions: Vec<Triple> = additions
      .into_iter()
      .filter(|t| seen.insert(t.clone()))
      .collect();

    let mut removed = HashSet::new();
    let removals = removals
      .into_iter()
      .filter(|t| !seen.contains(t) && removed.insert(t.clone()))
      .collect();

    Self {
      additions,
      removals,
    }
  }

  pub fn empty() -> Self {
    Self::default()
  }

  pub fn additions(&self) -> &[Triple] {
    &self.additions
  }

  pub fn removals(&self) -> &[Triple] {
    &self.removals
  }

  pub fn is_empty(&self) -> bool {
    self.additions.is_empty() && self.removals.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use quintet_graph::{Term, vocab};

  #[test]
  fn test_removal_that_is_re_added_is_dropped() {
    let delta = QuadDelta::new(
      [Triple::token("A"), Triple::marker("A", vocab::COMPLETED_AT, "tx")],
      [Triple::token("A")],
    );
    assert!(delta.removals().is_empty());
    assert_eq!(delta.additions().len(), 2);
  }

  #[test]
  fn test_duplicates_collapse_in_order() {
    let delta = QuadDelta::new(
      [Triple::token("B"), Triple::token("C"), Triple::token("B")],
      [
        Triple::new("A", vocab::HAS_TOKEN, Term::boolean(true)),
        Triple::token("A"),
      ],
    );
    assert_eq!(delta.additions(), &[Triple::token("B"), Triple::token("C")]);
    assert_eq!(delta.removals(), &[Triple::token("A")]);
  }

  #[test]
  fn test_empty() {
    assert!(QuadDelta::empty().is_empty());
    assert!(!QuadDelta::new([], [Triple::token("A")]).is_empty());
  }
}
