// src/application/storage.rs
use crate::domain::DomainError;
use async_trait::async_trait;

/// Blob store holding note images, addressed by key.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, key: &str, content_type: &str, bytes: Vec<u8>)
        -> Result<(), DomainError>;

    /// Time-limited URL under which the object can be displayed
    async fn resolve_url(&self, key: &str) -> Result<String, DomainError>;

    async fn remove(&self, key: &str) -> Result<(), DomainError>;
}
