use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not found: {entity} for {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wrap an I/O error together with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Lookup failures are soft: callers log them and continue with empty data.
    pub fn is_soft(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Validation(format!("malformed JSON: {err}"))
    }
}
