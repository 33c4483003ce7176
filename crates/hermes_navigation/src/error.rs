use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Navigation session is not active")]
    NotActive,
    #[error("Navigation session is already active")]
    AlreadyActive,
    #[error("Navigation session already reached its destination")]
    Completed,
    #[error("Invalid fix timestamp: {0}")]
    InvalidTimestamp(#[from] jiff::Error),
}
