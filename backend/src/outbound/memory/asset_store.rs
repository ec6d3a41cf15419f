//! Asset store keeping bytes in process memory.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::domain::AssetId;
use crate::domain::ports::{AssetFolder, AssetStore, AssetStoreError, Transformation};
use crate::outbound::media_store::transformation_segment;

#[derive(Debug, Default)]
struct Ledger {
    assets: HashMap<AssetId, Bytes>,
    deleted: Vec<AssetId>,
}

/// In-memory [`AssetStore`] that records every delete request.
///
/// While [`set_unavailable`](Self::set_unavailable) is on, every call fails
/// with [`AssetStoreError::Unavailable`]; delete attempts are still recorded.
#[derive(Debug, Default)]
pub struct InMemoryAssetStore {
    ledger: Mutex<Ledger>,
    unavailable: AtomicBool,
}

impl InMemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Identifiers passed to `delete`, in call order.
    pub fn deleted(&self) -> Vec<AssetId> {
        self.ledger
            .lock()
            .map(|ledger| ledger.deleted.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.ledger
            .lock()
            .map(|ledger| ledger.assets.contains_key(id))
            .unwrap_or_default()
    }

    /// Number of assets currently held.
    pub fn len(&self) -> usize {
        self.ledger
            .lock()
            .map(|ledger| ledger.assets.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<(), AssetStoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(AssetStoreError::unavailable("in-memory store switched off"))
        } else {
            Ok(())
        }
    }

    fn ledger(&self) -> Result<std::sync::MutexGuard<'_, Ledger>, AssetStoreError> {
        self.ledger
            .lock()
            .map_err(|_| AssetStoreError::unavailable("asset ledger poisoned"))
    }
}

#[async_trait]
impl AssetStore for InMemoryAssetStore {
    async fn store(
        &self,
        bytes: Bytes,
        _content_type: &str,
        folder: AssetFolder,
    ) -> Result<AssetId, AssetStoreError> {
        self.check_available()?;
        let id = AssetId::new(format!("{}/{}", folder.as_str(), Uuid::new_v4().simple()))
            .map_err(|err| AssetStoreError::rejected(err.to_string()))?;
        self.ledger()?.assets.insert(id.clone(), bytes);
        Ok(id)
    }

    async fn delete(&self, id: &AssetId) -> Result<(), AssetStoreError> {
        let mut ledger = self.ledger()?;
        ledger.deleted.push(id.clone());
        self.check_available()?;
        ledger.assets.remove(id);
        Ok(())
    }

    fn url(&self, id: &AssetId, transformation: &Transformation) -> String {
        match transformation_segment(transformation) {
            Some(segment) => format!("memory://assets/{segment}/{id}"),
            None => format!("memory://assets/{id}"),
        }
    }
}
