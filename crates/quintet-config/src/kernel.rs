use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Settings for the execution kernel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelConfig {
  /// Turtle file with the pattern ontology. The built-in dataset is used
  /// when unset.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ontology_path: Option<PathBuf>,
}
