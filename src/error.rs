use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoTaskError {
    #[error("none of {0} is set")]
    MissingCredential(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("task submission failed: {0}")]
    Submission(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("failed to persist result: {0}")]
    Persist(String),
    #[error("config error: {0}")]
    Config(#[from] ::config::ConfigError),
}

impl VideoTaskError {
    /// Only a missing credential stops the process with a non-zero exit
    /// code. Every other failure is reported and the process exits cleanly.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingCredential(_))
    }
}
