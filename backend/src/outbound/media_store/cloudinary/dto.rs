//! DTOs for decoding Cloudinary JSON responses.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct UploadResponseDto {
    pub(super) public_id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct DestroyResponseDto {
    pub(super) result: String,
}

impl DestroyResponseDto {
    /// Destroying an unknown public id reports `"not found"`, which counts
    /// as success.
    pub(super) fn is_settled(&self) -> bool {
        matches!(self.result.as_str(), "ok" | "not found")
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelopeDto {
    pub(super) error: ErrorMessageDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorMessageDto {
    pub(super) message: String,
}
