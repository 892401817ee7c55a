use project_graph::errors::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LspError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("utf8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("serde json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("lsp protocol error: {0}")]
    Protocol(&'static str),

    #[error("process spawn error: {0}")]
    Spawn(String),

    #[error("server error for {method}: {message}")]
    Server { method: String, message: String },

    #[error("language server lock poisoned")]
    Poisoned,

    #[error("blocking task failed: {0}")]
    Join(String),
}

pub type Result<T> = std::result::Result<T, LspError>;

impl From<LspError> for GraphError {
    fn from(err: LspError) -> Self {
        GraphError::Service(err.to_string())
    }
}
