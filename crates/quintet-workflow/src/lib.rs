//! Quintet Workflow
//!
//! This crate turns a `quintet-config` workflow definition into the static
//! part of a case graph. Compilation validates the definition first:
//! - every flow, region member, trigger and cancellation target names a
//!   declared node
//! - node identifiers are unique across tasks, signals and regions
//! - every flow predicate parses
//!
//! The result is a [`Topology`]: a graph of structural triples (reified flows,
//! split/join markers, pattern annotations, trigger relations, multi-instance
//! and quorum settings, cancellation regions) plus the tasks that receive a
//! token when a case starts.

mod error;
mod topology;

pub use error::WorkflowError;
pub use topology::{Topology, flow_id};
