//! Photo ingestion: upload validation and metadata extraction.
//!
//! The pipeline runs validation first and aborts on failure. Dimension,
//! EXIF, and title extraction are independent and never fail the upload.

mod metadata;
mod pipeline;
mod title;
mod upload;
mod validator;

pub use metadata::{exif_tags, image_dimensions};
pub use pipeline::{MediaPipeline, PhotoMetadata};
pub use title::{EXISTING_PHOTO, UNTITLED_PHOTO, title_from_filename};
pub use upload::UploadSource;
pub use validator::{
    DEFAULT_ALLOWED_TYPES, DEFAULT_MAX_UPLOAD_BYTES, MEGABYTE, MediaPolicy, MediaValidationError,
};
