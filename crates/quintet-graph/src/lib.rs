//! Quintet Graph
//!
//! An in-memory set of `(subject, predicate, object)` triples. The same store
//! holds the static topology of a workflow (flow edges, split/join markers,
//! predicates on edges) and its dynamic state (token placement, completion and
//! voiding markers).
//!
//! Completion-style markers are append-only: once a `completedAt`, `voidedAt`
//! or `consumed` triple has been inserted it can never be removed, and every
//! such insertion is recorded in an ordered marker log.

mod error;
mod graph;
mod query;
mod term;
pub mod vocab;

pub use error::GraphError;
pub use graph::Graph;
pub use query::{Bindings, PatternTerm, TriplePattern};
pub use term::{Literal, NodeId, Term, Triple};
