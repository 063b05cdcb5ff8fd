//! Quintet Driver
//!
//! The semantic driver decides which verb a task runs. It reads the task's
//! structural markers from the case graph, turns them into a lookup against
//! the pattern ontology, and instantiates the single matching mapping as a
//! [`quintet_kernel::VerbConfig`], filling in data-dependent parameters such as
//! a runtime instance count or quorum.
//!
//! Resolution never mutates anything and keeps no per-task state.

mod driver;
mod error;

pub use driver::{Resolver, SemanticDriver, Signature};
pub use error::ResolveError;
