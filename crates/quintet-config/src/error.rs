use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid workflow json in {path}: {source}")]
  Json {
    path: String,
    #[source]
    source: serde_json::Error,
  },
}
