// src/infrastructure/session.rs
use crate::application::Authenticator;
use crate::domain::{DomainError, Session};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Keeps the current session as a JSON file.
///
/// A missing file means nobody is signed in.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Authenticator for FileSessionStore {
    fn session(&self) -> Result<Session, DomainError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.path, "No session file");
                return Err(DomainError::NotAuthenticated);
            }
            Err(e) => {
                return Err(DomainError::Config(format!(
                    "Failed to read session file {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let session: Session = serde_json::from_str(&content).map_err(|e| {
            DomainError::Config(format!(
                "Session file {} is corrupt: {}",
                self.path.display(),
                e
            ))
        })?;
        if session.token.is_empty() {
            return Err(DomainError::NotAuthenticated);
        }
        Ok(session)
    }

    fn sign_in(&self, session: &Session) -> Result<(), DomainError> {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(session)?;
            std::fs::write(&self.path, json)
        };
        write().map_err(|e| {
            DomainError::Config(format!(
                "Failed to write session file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        info!(username = %session.username, "Signed in");
        Ok(())
    }

    fn sign_out(&self) -> Result<(), DomainError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Signed out");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Config(format!(
                "Failed to remove session file {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session() -> Session {
        Session {
            username: "alice".to_string(),
            token: "eyJ.token".to_string(),
        }
    }

    #[test]
    fn given_no_file_when_getting_session_then_not_authenticated() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path().join("session.json"));

        assert!(matches!(store.session(), Err(DomainError::NotAuthenticated)));
    }

    #[test]
    fn given_signed_in_when_getting_session_then_returns_it() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path().join("sub").join("session.json"));

        store.sign_in(&session()).unwrap();

        assert_eq!(store.session().unwrap(), session());
    }

    #[test]
    fn given_signed_in_when_signing_out_then_session_is_gone() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path().join("session.json"));
        store.sign_in(&session()).unwrap();

        store.sign_out().unwrap();

        assert!(!store.path().exists());
        assert!(matches!(store.session(), Err(DomainError::NotAuthenticated)));
        // Signing out twice is fine
        assert!(store.sign_out().is_ok());
    }

    #[test]
    fn given_corrupt_file_when_getting_session_then_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FileSessionStore::new(&path).session(),
            Err(DomainError::Config(_))
        ));
    }

    #[test]
    fn given_session_when_debug_printing_then_token_is_redacted() {
        let output = format!("{:?}", session());

        assert!(!output.contains("eyJ.token"));
        assert!(output.contains("alice"));
    }
}
