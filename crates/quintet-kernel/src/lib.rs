//! Quintet Kernel
//!
//! The verb kernel computes what a task firing would do, without doing it.
//! Each of the five verbs is a pure function
//! `(graph, task, context, parameters) -> QuadDelta`:
//!
//! - **Transmute** moves the task's token to its successors.
//! - **Copy** activates every successor at once, or spawns instances.
//! - **Filter** routes to the flows whose predicates hold.
//! - **Await** fires a join once enough sources have completed.
//! - **Void** cancels tokens in a scope.
//!
//! The graph is only ever borrowed immutably here. Applying a delta is the
//! transaction manager's job.

mod config;
mod context;
mod delta;
mod error;
mod stimulus;
pub mod topology;
pub mod verbs;

pub use config::{Threshold, Trigger, Verb, VerbConfig};
pub use context::{GENESIS_HASH, TransactionContext};
pub use delta::QuadDelta;
pub use error::VerbError;
pub use stimulus::Stimulus;
pub use verbs::execute;

pub use quintet_ontology::VerbKind;
