//! Upload sources accepted by the ingestion pipeline.

use bytes::Bytes;

use crate::domain::AssetId;

/// Either freshly uploaded bytes or a reference to an asset already held by
/// the asset store.
///
/// Fresh uploads are validated and inspected; existing assets pass through
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    /// Bytes received from the client.
    Fresh {
        bytes: Bytes,
        content_type: String,
        filename: Option<String>,
    },
    /// Asset previously stored remotely.
    Existing(AssetId),
}

impl UploadSource {
    /// Convenience constructor for fresh uploads.
    pub fn fresh(
        bytes: impl Into<Bytes>,
        content_type: impl Into<String>,
        filename: Option<String>,
    ) -> Self {
        Self::Fresh {
            bytes: bytes.into(),
            content_type: content_type.into(),
            filename,
        }
    }

    /// Raw bytes for fresh uploads.
    pub fn bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Fresh { bytes, .. } => Some(bytes),
            Self::Existing(_) => None,
        }
    }

    /// Client-supplied filename, if any.
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::Fresh { filename, .. } => filename.as_deref(),
            Self::Existing(_) => None,
        }
    }

    /// Declared MIME type for fresh uploads.
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Self::Fresh { content_type, .. } => Some(content_type.as_str()),
            Self::Existing(_) => None,
        }
    }
}
