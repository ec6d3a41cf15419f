//! Port for the remote store holding image bytes.
//!
//! The store hands out opaque [`AssetId`]s and renders delivery URLs for
//! derived renditions. Deleting an unknown asset succeeds.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::AssetId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by asset store adapters.
    pub enum AssetStoreError {
        /// Store could not be reached or timed out.
        Unavailable { message: String } => "asset store unavailable: {message}",
        /// Store refused the request.
        Rejected { message: String } => "asset store rejected the request: {message}",
    }
}

/// Logical folder an asset is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetFolder {
    Photos,
    ProjectCovers,
    Avatars,
}

impl AssetFolder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Photos => "photos",
            Self::ProjectCovers => "project_covers",
            Self::Avatars => "avatars",
        }
    }
}

/// How a rendition is fitted to its target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropMode {
    /// Cover the box exactly, cropping overflow.
    Fill,
    /// Shrink to fit inside the box; never upscale.
    Limit,
    /// Face-aware square thumbnail.
    Thumb,
}

/// Quality and format hints left to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    Auto,
}

/// Rendition descriptor passed to [`AssetStore::url`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transformation {
    pub crop: Option<CropMode>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<Hint>,
    pub format: Option<Hint>,
}

impl Transformation {
    /// The stored asset, unmodified.
    pub const ORIGINAL: Self = Self {
        crop: None,
        width: None,
        height: None,
        quality: None,
        format: None,
    };

    const fn boxed(crop: CropMode, width: u32, height: u32) -> Self {
        Self {
            crop: Some(crop),
            width: Some(width),
            height: Some(height),
            quality: None,
            format: None,
        }
    }

    const fn auto(self) -> Self {
        Self {
            quality: Some(Hint::Auto),
            format: Some(Hint::Auto),
            ..self
        }
    }

    /// 300×300 fill for grids.
    pub const fn thumbnail() -> Self {
        Self::boxed(CropMode::Fill, 300, 300).auto()
    }

    /// At most 1200×1200 for the lightbox view.
    pub const fn gallery() -> Self {
        Self::boxed(CropMode::Limit, 1200, 1200).auto()
    }

    /// 1200×630 fill for project covers.
    pub const fn cover() -> Self {
        Self::boxed(CropMode::Fill, 1200, 630)
    }

    /// 150×150 thumbnail for avatars.
    pub const fn avatar() -> Self {
        Self::boxed(CropMode::Thumb, 150, 150)
    }

    pub fn is_original(&self) -> bool {
        *self == Self::ORIGINAL
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Persist `bytes` under `folder`, returning a stable identifier.
    async fn store(
        &self,
        bytes: Bytes,
        content_type: &str,
        folder: AssetFolder,
    ) -> Result<AssetId, AssetStoreError>;

    /// Remove an asset. Missing assets are not an error.
    async fn delete(&self, id: &AssetId) -> Result<(), AssetStoreError>;

    /// Delivery URL for a rendition of `id`.
    fn url(&self, id: &AssetId, transformation: &Transformation) -> String;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Transformation::thumbnail(), Some(CropMode::Fill), 300, 300, true)]
    #[case(Transformation::gallery(), Some(CropMode::Limit), 1200, 1200, true)]
    #[case(Transformation::cover(), Some(CropMode::Fill), 1200, 630, false)]
    #[case(Transformation::avatar(), Some(CropMode::Thumb), 150, 150, false)]
    fn presets_describe_their_box(
        #[case] preset: Transformation,
        #[case] crop: Option<CropMode>,
        #[case] width: u32,
        #[case] height: u32,
        #[case] auto: bool,
    ) {
        assert_eq!(preset.crop, crop);
        assert_eq!((preset.width, preset.height), (Some(width), Some(height)));
        assert_eq!(preset.quality.is_some(), auto);
        assert!(!preset.is_original());
    }

    #[rstest]
    fn folder_names_are_stable() {
        assert_eq!(AssetFolder::Photos.as_str(), "photos");
        assert_eq!(AssetFolder::ProjectCovers.as_str(), "project_covers");
        assert_eq!(AssetFolder::Avatars.as_str(), "avatars");
    }
}
