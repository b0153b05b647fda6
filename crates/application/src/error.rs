use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UseCaseError {
    /// The primary argument of the operation was absent.
    #[error("invalid argument: {0} is required")]
    InvalidArgument(&'static str),
}
