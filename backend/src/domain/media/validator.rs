//! Upload validation: size, declared type, and structural integrity.

use std::io::Cursor;

use image::ImageReader;

use super::UploadSource;

/// One megabyte as reported in validation messages.
pub const MEGABYTE: u64 = 1024 * 1024;
/// Default maximum upload size.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * MEGABYTE;
/// Default MIME allow-list.
pub const DEFAULT_ALLOWED_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Reasons an upload is rejected before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaValidationError {
    #[error(
        "File too large. Maximum size is {}. Your file is {}.",
        format_megabytes(*max, false),
        format_megabytes(*actual, true)
    )]
    TooLarge { max: u64, actual: u64 },
    #[error("Unsupported file type: {content_type}. Allowed types: {allowed}")]
    UnsupportedType {
        content_type: String,
        allowed: String,
    },
    #[error("Invalid or corrupted image file: {reason}")]
    Corrupt { reason: String },
}

impl MediaValidationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::TooLarge { .. } => "file_too_large",
            Self::UnsupportedType { .. } => "unsupported_type",
            Self::Corrupt { .. } => "corrupt_image",
        }
    }
}

/// Render a byte count as megabytes with at most one decimal place.
///
/// Actual sizes round up so a file just over the limit never reads as equal
/// to it.
fn format_megabytes(bytes: u64, round_up: bool) -> String {
    let scaled = bytes.saturating_mul(10);
    let tenths = if round_up {
        scaled.div_ceil(MEGABYTE)
    } else {
        scaled / MEGABYTE
    };
    if tenths % 10 == 0 {
        format!("{}MB", tenths / 10)
    } else {
        format!("{}.{}MB", tenths / 10, tenths % 10)
    }
}

/// Size and type limits applied to every fresh upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPolicy {
    max_bytes: u64,
    allowed_types: Vec<String>,
}

impl Default for MediaPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_UPLOAD_BYTES,
            DEFAULT_ALLOWED_TYPES.iter().map(|ty| (*ty).to_owned()),
        )
    }
}

impl MediaPolicy {
    /// Build a policy; content types are normalised to lower case.
    pub fn new(max_bytes: u64, allowed_types: impl IntoIterator<Item = String>) -> Self {
        Self {
            max_bytes,
            allowed_types: allowed_types
                .into_iter()
                .map(|ty| ty.trim().to_ascii_lowercase())
                .filter(|ty| !ty.is_empty())
                .collect(),
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn allowed_types(&self) -> &[String] {
        &self.allowed_types
    }

    /// Allowed types as shown to users, e.g. `JPEG, PNG, GIF, WEBP`.
    pub fn allowed_display(&self) -> String {
        self.allowed_types
            .iter()
            .map(|ty| {
                ty.rsplit_once('/')
                    .map_or(ty.as_str(), |(_, subtype)| subtype)
                    .to_ascii_uppercase()
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn allows(&self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        self.allowed_types.iter().any(|allowed| *allowed == essence)
    }

    /// Check a source against the policy.
    ///
    /// Checks run in order: size, declared type, then a full decode.
    /// Existing assets are not re-validated. The source bytes are only read
    /// through a private cursor, so callers can keep using them afterwards.
    ///
    /// # Examples
    /// ```
    /// use lightbox::domain::media::{MediaPolicy, MediaValidationError, UploadSource};
    ///
    /// let policy = MediaPolicy::default();
    /// let upload = UploadSource::fresh(vec![0_u8; 4], "image/bmp", None);
    /// let err = policy.validate(&upload).unwrap_err();
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Unsupported file type: image/bmp. Allowed types: JPEG, PNG, GIF, WEBP"
    /// );
    /// ```
    pub fn validate(&self, source: &UploadSource) -> Result<(), MediaValidationError> {
        let UploadSource::Fresh {
            bytes,
            content_type,
            ..
        } = source
        else {
            return Ok(());
        };

        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        if actual > self.max_bytes {
            return Err(MediaValidationError::TooLarge {
                max: self.max_bytes,
                actual,
            });
        }

        if !self.allows(content_type) {
            return Err(MediaValidationError::UnsupportedType {
                content_type: content_type.clone(),
                allowed: self.allowed_display(),
            });
        }

        ImageReader::new(Cursor::new(bytes.as_ref()))
            .with_guessed_format()
            .map_err(|err| MediaValidationError::Corrupt {
                reason: err.to_string(),
            })?
            .decode()
            .map(|_| ())
            .map_err(|err| MediaValidationError::Corrupt {
                reason: err.to_string(),
            })
    }
}
