use parley_common::error::DomError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SequencerError {
    /// No editable region exists, so neither typing nor submitting can run.
    #[error("Could not find comment input")]
    InputNotFound,

    #[error(transparent)]
    Dom(#[from] DomError),
}
