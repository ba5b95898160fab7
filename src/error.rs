use thiserror::Error;

/// Main error type for the litepg translator
#[derive(Error, Debug)]
pub enum LitepgError {
    #[error("Source catalog unavailable: {message}")]
    Connectivity { message: String },

    #[error("Cannot emit {object}: {message}")]
    Emission { object: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Source catalog error: {0}")]
    Source(#[from] sqlx::Error),

    #[error("Target database error: {0}")]
    Target(#[from] tokio_postgres::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type LitepgResult<T> = Result<T, LitepgError>;

impl LitepgError {
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity { message: message.into() }
    }

    pub fn emission(object: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Emission {
            object: object.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Whether the failure came from opening or querying the source catalog
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. } | Self::Source(_))
    }
}
