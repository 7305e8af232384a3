// src/application/auth.rs
use crate::domain::{DomainError, Session};

/// Access to the session issued by the auth provider.
///
/// Everything that talks to the backend is only reachable through a
/// [`Session`] obtained here; without one, callers get
/// [`DomainError::NotAuthenticated`].
pub trait Authenticator {
    fn session(&self) -> Result<Session, DomainError>;

    fn sign_in(&self, session: &Session) -> Result<(), DomainError>;

    fn sign_out(&self) -> Result<(), DomainError>;
}
