//! Upload ingestion: validate, then extract metadata.

use std::sync::Arc;

use tracing::{Span, debug};

use super::{
    EXISTING_PHOTO, MediaPolicy, MediaValidationError, UploadSource, exif_tags, image_dimensions,
    title_from_filename,
};
use crate::domain::ExifData;

/// Metadata derived from one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoMetadata {
    pub title: String,
    /// Size in bytes; unknown for existing assets.
    pub byte_size: Option<u64>,
    /// Declared MIME type; unknown for existing assets.
    pub content_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub exif: Option<ExifData>,
}

/// Validator plus extractors, sharing one logging span.
///
/// The pipeline is synchronous and CPU-bound; async callers should run it
/// on the blocking pool.
#[derive(Debug, Clone)]
pub struct MediaPipeline {
    policy: Arc<MediaPolicy>,
    span: Span,
}

impl MediaPipeline {
    /// Build a pipeline that logs through `span`.
    pub fn new(policy: MediaPolicy, span: Span) -> Self {
        Self {
            policy: Arc::new(policy),
            span,
        }
    }

    pub fn policy(&self) -> &MediaPolicy {
        &self.policy
    }

    /// Run the validator on its own.
    pub fn validate(&self, source: &UploadSource) -> Result<(), MediaValidationError> {
        self.policy.validate(source)
    }

    /// Validate `source`, then derive its title and technical metadata.
    ///
    /// Validation failures abort; extraction failures degrade to absent
    /// fields.
    ///
    /// # Examples
    /// ```
    /// use lightbox::domain::media::{MediaPipeline, MediaPolicy, UploadSource};
    ///
    /// let pipeline = MediaPipeline::new(MediaPolicy::default(), tracing::Span::none());
    /// let upload = UploadSource::fresh(b"not an image".to_vec(), "image/png", None);
    /// assert!(pipeline.process_upload(&upload).is_err());
    /// ```
    pub fn process_upload(
        &self,
        source: &UploadSource,
    ) -> Result<PhotoMetadata, MediaValidationError> {
        self.policy.validate(source)?;

        let (width, height) = image_dimensions(source, &self.span);
        let exif = exif_tags(source, &self.span);
        let metadata = match source {
            UploadSource::Fresh {
                bytes,
                content_type,
                filename,
            } => PhotoMetadata {
                title: title_from_filename(filename.as_deref()),
                byte_size: Some(u64::try_from(bytes.len()).unwrap_or(u64::MAX)),
                content_type: Some(content_type.clone()),
                width,
                height,
                exif,
            },
            UploadSource::Existing(_) => PhotoMetadata {
                title: EXISTING_PHOTO.to_owned(),
                byte_size: None,
                content_type: None,
                width,
                height,
                exif,
            },
        };

        debug!(
            parent: &self.span,
            title = %metadata.title,
            byte_size = metadata.byte_size,
            width = metadata.width,
            height = metadata.height,
            exif_tags = metadata.exif.as_ref().map_or(0, ExifData::len),
            "processed upload"
        );
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::AssetId;
    use crate::test_support::media::{jpeg_with_camera_exif, png_bytes};
    use rstest::{fixture, rstest};

    #[fixture]
    fn pipeline() -> MediaPipeline {
        MediaPipeline::new(MediaPolicy::default(), Span::none())
    }

    #[rstest]
    fn fresh_upload_yields_full_metadata(pipeline: MediaPipeline) {
        let bytes = png_bytes(40, 30);
        let size = bytes.len() as u64;
        let upload = UploadSource::fresh(bytes, "image/png", Some("my_cool-photo.png".into()));
        let metadata = pipeline.process_upload(&upload).expect("processed");
        assert_eq!(metadata.title, "My Cool Photo");
        assert_eq!(metadata.byte_size, Some(size));
        assert_eq!(metadata.content_type.as_deref(), Some("image/png"));
        assert_eq!((metadata.width, metadata.height), (Some(40), Some(30)));
        assert!(metadata.exif.is_none());
    }

    #[rstest]
    fn fresh_upload_without_filename_is_untitled(pipeline: MediaPipeline) {
        let upload = UploadSource::fresh(png_bytes(2, 2), "image/png", None);
        let metadata = pipeline.process_upload(&upload).expect("processed");
        assert_eq!(metadata.title, "Untitled Photo");
    }

    #[rstest]
    fn existing_asset_passes_through(pipeline: MediaPipeline) {
        let upload = UploadSource::Existing(AssetId::new("photos/abc").expect("asset"));
        let metadata = pipeline.process_upload(&upload).expect("processed");
        assert_eq!(metadata.title, "Photo");
        assert_eq!(metadata.byte_size, None);
        assert_eq!((metadata.width, metadata.height), (None, None));
    }

    #[rstest]
    fn exif_is_attached_when_present(pipeline: MediaPipeline) {
        let upload = UploadSource::fresh(
            jpeg_with_camera_exif("NIKON", "Z 6"),
            "image/jpeg",
            Some("DSC_1001.jpg".into()),
        );
        let metadata = pipeline.process_upload(&upload).expect("processed");
        let exif = metadata.exif.expect("exif");
        assert_eq!(exif.get("Image Make"), Some("NIKON"));
        assert_eq!(metadata.title, "Dsc 1001");
    }

    #[rstest]
    fn validation_failure_aborts(pipeline: MediaPipeline) {
        let upload = UploadSource::fresh(png_bytes(2, 2), "image/tiff", None);
        assert!(matches!(
            pipeline.process_upload(&upload),
            Err(MediaValidationError::UnsupportedType { .. })
        ));
    }
}
