// src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Remote call failed: {0}")]
    Remote(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Not signed in. Run `cloudnotes sign-in` first")]
    NotAuthenticated,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Problems detected locally, before anything is sent to the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("Unsupported image type '{0}': use JPEG, PNG or WebP")]
    UnsupportedImageType(String),
    #[error("Image is too large ({size} bytes): the limit is {limit} bytes")]
    ImageTooLarge { size: usize, limit: usize },
}
