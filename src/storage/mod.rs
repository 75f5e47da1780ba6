//! Object storage for uploaded note files.

mod cloudinary;
mod memory;

pub use cloudinary::{public_id_from_url, CloudinaryConfig, CloudinaryStorage, DEFAULT_CLOUDINARY_BASE_URL};
pub use memory::{MemoryStorage, StorageCall};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File upload failed: {0}")]
    Upload(String),
    #[error("File deletion failed: {0}")]
    Delete(String),
    #[error("Cannot derive a file id from {0}")]
    InvalidUrl(String),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("Storage service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A stored object: its public URL and the provider's id for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        folder: &str,
    ) -> Result<StoredFile, StorageError>;

    /// Removes the object previously returned at `url`.
    async fn delete(&self, url: &str) -> Result<(), StorageError>;
}

/// Used when no storage credentials are configured; every call fails.
pub struct DisabledStorage;

#[async_trait]
impl ObjectStorage for DisabledStorage {
    async fn upload(&self, _: Vec<u8>, _: &str, _: &str) -> Result<StoredFile, StorageError> {
        Err(StorageError::NotConfigured("File storage"))
    }

    async fn delete(&self, _: &str) -> Result<(), StorageError> {
        Err(StorageError::NotConfigured("File storage"))
    }
}
