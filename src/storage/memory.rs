use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{ObjectStorage, StorageError, StoredFile};

/// One recorded storage operation, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Upload { folder: String, filename: String },
    Delete { url: String },
}

/// Process-local object store that records every call.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    objects: HashMap<String, Vec<u8>>,
    calls: Vec<StorageCall>,
    fail_deletes: bool,
    fail_uploads: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<StorageCall> {
        self.lock().calls.clone()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().objects.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.lock().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.lock().fail_deletes = fail;
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.lock().fail_uploads = fail;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory storage lock poisoned")
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        folder: &str,
    ) -> Result<StoredFile, StorageError> {
        let mut inner = self.lock();
        inner.calls.push(StorageCall::Upload {
            folder: folder.to_string(),
            filename: filename.to_string(),
        });
        if inner.fail_uploads {
            return Err(StorageError::Upload("simulated failure".to_string()));
        }

        let public_id = format!("{folder}/{}", Uuid::new_v4());
        let url = format!("memory://storage/raw/upload/v1/{public_id}/{filename}");
        inner.objects.insert(url.clone(), bytes);
        Ok(StoredFile { url, public_id })
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let mut inner = self.lock();
        inner.calls.push(StorageCall::Delete {
            url: url.to_string(),
        });
        if inner.fail_deletes {
            return Err(StorageError::Delete("simulated failure".to_string()));
        }
        inner.objects.remove(url);
        Ok(())
    }
}
