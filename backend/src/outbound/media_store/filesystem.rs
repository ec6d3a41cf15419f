//! Asset store writing into a capability-scoped local directory.
//!
//! Assets live at `<root>/<folder>/<uuid>.<ext>` and are served by an
//! external static file server mounted at the configured base URL.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use cap_std::{ambient_authority, fs::Dir};
use uuid::Uuid;

use super::{extension_for, transformation_segment};
use crate::domain::AssetId;
use crate::domain::ports::{AssetFolder, AssetStore, AssetStoreError, Transformation};

/// Local directory asset store.
#[derive(Clone)]
pub struct FilesystemAssetStore {
    root: Arc<Dir>,
    base_url: String,
}

impl FilesystemAssetStore {
    /// Open (creating if needed) `root` and serve its files under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when the directory cannot be created or opened.
    pub fn open(root: impl AsRef<Path>, base_url: impl Into<String>) -> io::Result<Self> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            root: Arc::new(dir),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    async fn blocking<T, F>(&self, work: F) -> Result<T, AssetStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> io::Result<T> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || work(&root))
            .await
            .map_err(|err| AssetStoreError::unavailable(format!("asset task aborted: {err}")))?
            .map_err(map_io_error)
    }
}

fn map_io_error(error: io::Error) -> AssetStoreError {
    match error.kind() {
        io::ErrorKind::PermissionDenied | io::ErrorKind::InvalidInput => {
            AssetStoreError::rejected(error.to_string())
        }
        _ => AssetStoreError::unavailable(error.to_string()),
    }
}

#[async_trait]
impl AssetStore for FilesystemAssetStore {
    async fn store(
        &self,
        bytes: Bytes,
        content_type: &str,
        folder: AssetFolder,
    ) -> Result<AssetId, AssetStoreError> {
        let folder = folder.as_str();
        let relative = format!(
            "{folder}/{}.{}",
            Uuid::new_v4().simple(),
            extension_for(content_type)
        );
        let target = relative.clone();
        self.blocking(move |root| {
            root.create_dir_all(folder)?;
            root.write(&target, &bytes)
        })
        .await?;

        AssetId::new(relative).map_err(|err| AssetStoreError::rejected(err.to_string()))
    }

    async fn delete(&self, id: &AssetId) -> Result<(), AssetStoreError> {
        let target = id.as_str().to_owned();
        self.blocking(move |root| match root.remove_file(&target) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        })
        .await
    }

    fn url(&self, id: &AssetId, transformation: &Transformation) -> String {
        // The static server ignores the query; it lets clients tell
        // renditions apart in caches.
        match transformation_segment(transformation) {
            Some(segment) => format!("{}/{id}?t={segment}", self.base_url),
            None => format!("{}/{id}", self.base_url),
        }
    }
}
