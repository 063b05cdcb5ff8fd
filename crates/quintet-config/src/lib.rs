//! Quintet Config
//!
//! This crate contains the serializable workflow configuration types for Quintet.
//! These types describe a process topology before it is compiled into graph
//! triples by `quintet-workflow`.
//!
//! Configuration can be loaded from:
//! - JSON files (via CLI with `quintet run workflow.json`)
//! - Any other store that hands over the same JSON document
//!
//! Nothing here knows about verbs or patterns: a task only declares its
//! structural markers (split/join type, explicit pattern, trigger relation)
//! and the resolver decides what those mean.

mod enums;
mod error;
mod flow;
mod kernel;
mod task;
mod workflow;

pub use enums::{ControlType, TriggerMode};
pub use error::ConfigError;
pub use flow::{FlowDef, RegionDef};
pub use kernel::KernelConfig;
pub use task::{InstancesDef, TaskDef};
pub use workflow::WorkflowDef;
