use crate::protocol::ElementHandle;
use thiserror::Error;

/// Errors raised by a `Page` implementation.
#[derive(Debug, Error)]
pub enum DomError {
    #[error("Element {0} is no longer attached to the document")]
    StaleElement(ElementHandle),

    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),

    #[error("Page not ready")]
    NotReady,

    #[error("Operation not supported: {0}")]
    NotSupported(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl DomError {
    pub fn is_stale(&self) -> bool {
        matches!(self, DomError::StaleElement(_))
    }
}
