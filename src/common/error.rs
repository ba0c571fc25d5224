use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The proposed topology cannot be selected from. Not retryable.
    #[error("invalid cluster configuration: {0}")]
    InvalidConfiguration(String),

    /// The current pass has no candidates left.
    #[error("no remaining candidates in the current selection pass")]
    ExhaustedSelection,
}

pub type Result<T, E = SelectorError> = std::result::Result<T, E>;
