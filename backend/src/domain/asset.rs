//! Remote asset references.
//!
//! An [`AssetId`] is the opaque identifier returned by the asset store when
//! binary image data is persisted (a Cloudinary public id, a relative file
//! path, and so on). Records hold it instead of the bytes themselves.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors raised when constructing an [`AssetId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetIdValidationError {
    /// The identifier was empty or whitespace only.
    #[error("asset identifier must not be empty")]
    Empty,
}

/// Opaque, stable identifier of a stored asset.
///
/// # Examples
/// ```
/// use lightbox::domain::AssetId;
///
/// let id = AssetId::new("photos/abc123").expect("valid id");
/// assert_eq!(id.as_str(), "photos/abc123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    /// Validate and construct an identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, AssetIdValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AssetIdValidationError::Empty);
        }
        Ok(Self(value))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<AssetId> for String {
    fn from(value: AssetId) -> Self {
        value.0
    }
}

impl TryFrom<String> for AssetId {
    type Error = AssetIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn rejects_blank_identifiers(#[case] raw: &str) {
        assert_eq!(AssetId::new(raw), Err(AssetIdValidationError::Empty));
    }

    #[rstest]
    fn deserialise_rejects_blank() {
        let result: Result<AssetId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }
}
