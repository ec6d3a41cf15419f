//! Buffered `multipart/form-data` reader for image uploads.
//!
//! Parts carrying a filename or a non-text content type become
//! [`UploadSource::Fresh`] entries; everything else is read as a short UTF-8
//! text field. Per-file limits are left to the media validator so its
//! messages can report the exact size; this reader only caps the whole
//! request.

use std::collections::HashMap;

use actix_multipart::{Field, Multipart};
use bytes::BytesMut;
use futures_util::TryStreamExt;
use serde_json::json;

use crate::domain::Error;
use crate::domain::media::{DEFAULT_MAX_UPLOAD_BYTES, MEGABYTE, UploadSource};
use crate::domain::ports::DEFAULT_MAX_BULK_FILES;

const TEXT_FIELD_MAX: usize = 64 * 1024;
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Request size limits derived from the media policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    max_file_bytes: u64,
    max_files: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_MAX_BULK_FILES)
    }
}

impl UploadLimits {
    pub fn new(max_file_bytes: u64, max_files: usize) -> Self {
        Self {
            max_file_bytes,
            max_files,
        }
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Largest request body accepted: room for every allowed file plus one
    /// more, so a single oversized file still reaches the validator.
    ///
    /// # Examples
    /// ```
    /// use lightbox::inbound::http::multipart::UploadLimits;
    ///
    /// assert_eq!(UploadLimits::new(10, 2).request_ceiling(), 30);
    /// ```
    pub fn request_ceiling(&self) -> u64 {
        let slots = u64::try_from(self.max_files)
            .unwrap_or(u64::MAX)
            .saturating_add(1);
        self.max_file_bytes.saturating_mul(slots)
    }
}

/// Decoded form: files grouped by field name plus text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    files: Vec<(String, UploadSource)>,
    text: HashMap<String, String>,
}

impl UploadForm {
    /// Remove and return every file sent under `field`, in request order.
    pub fn take_files(&mut self, field: &str) -> Vec<UploadSource> {
        let (taken, kept) = std::mem::take(&mut self.files)
            .into_iter()
            .partition::<Vec<_>, _>(|(name, _)| name == field);
        self.files = kept;
        taken.into_iter().map(|(_, source)| source).collect()
    }

    /// Remove and return the first file sent under `field`.
    pub fn take_file(&mut self, field: &str) -> Option<UploadSource> {
        let index = self.files.iter().position(|(name, _)| name == field)?;
        Some(self.files.remove(index).1)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.text.get(field).map(String::as_str)
    }

    pub fn has_files(&self, field: &str) -> bool {
        self.files.iter().any(|(name, _)| name == field)
    }
}

/// Read the whole multipart body into memory.
///
/// # Errors
///
/// `invalid_request` for malformed bodies, requests over
/// [`UploadLimits::request_ceiling`], or oversized text fields.
pub async fn read_upload_form(
    mut payload: Multipart,
    limits: &UploadLimits,
) -> Result<UploadForm, Error> {
    let mut form = UploadForm::default();
    let mut budget = Budget::new(limits.request_ceiling());

    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().unwrap_or_default().to_owned();
        let filename = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .filter(|filename| !filename.is_empty())
            .map(str::to_owned);
        let content_type = field.content_type().map(|mime| mime.essence_str().to_owned());
        let is_file = filename.is_some()
            || content_type
                .as_deref()
                .is_some_and(|ty| !ty.starts_with("text/"));

        let bytes = read_field(&mut field, &mut budget).await?;
        if is_file {
            let content_type = content_type.unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_owned());
            form.files.push((
                name,
                UploadSource::fresh(bytes.freeze(), content_type, filename),
            ));
        } else {
            if bytes.len() > TEXT_FIELD_MAX {
                return Err(Error::invalid_request(format!("Field {name} is too long"))
                    .with_details(json!({ "field": name, "code": "field_too_long" })));
            }
            form.text
                .insert(name, String::from_utf8_lossy(&bytes).into_owned());
        }
    }

    Ok(form)
}

struct Budget {
    ceiling: u64,
    used: u64,
}

impl Budget {
    fn new(ceiling: u64) -> Self {
        Self { ceiling, used: 0 }
    }

    fn spend(&mut self, len: usize) -> Result<(), Error> {
        self.used = self
            .used
            .saturating_add(u64::try_from(len).unwrap_or(u64::MAX));
        if self.used > self.ceiling {
            let megabytes = self.ceiling / MEGABYTE;
            return Err(Error::invalid_request(format!(
                "Upload too large. Maximum request size is {megabytes}MB."
            ))
            .with_details(json!({ "code": "request_too_large" })));
        }
        Ok(())
    }
}

async fn read_field(field: &mut Field, budget: &mut Budget) -> Result<BytesMut, Error> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = field.try_next().await? {
        budget.spend(chunk.len())?;
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}
