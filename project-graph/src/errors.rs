use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serde json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("language service error: {0}")]
    Service(String),

    #[error("no pubspec.yaml found above {0}")]
    ManifestNotFound(PathBuf),

    #[error("package path does not exist: {0}")]
    PackageNotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, GraphError>;
