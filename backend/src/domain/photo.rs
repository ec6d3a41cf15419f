//! Photo records and the value types attached to them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::media::PhotoMetadata;
use super::{AssetId, ProjectId};

/// Maximum photo title length in characters.
pub const PHOTO_TITLE_MAX: usize = 200;

/// Stable photo identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(Uuid);

impl PhotoId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// EXIF tags keyed as `"<group> <Tag>"`, for example `"Image Make"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExifData(BTreeMap<String, String>);

impl ExifData {
    pub fn new(tags: BTreeMap<String, String>) -> Self {
        Self(tags)
    }

    /// Look up a tag by its full key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

/// Camera settings summarised from EXIF for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lens: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taken_at: Option<String>,
}

impl CameraInfo {
    /// Summarise the well-known camera tags; `None` when none are present.
    pub fn from_exif(exif: &ExifData) -> Option<Self> {
        let pick = |key: &str| exif.get(key).map(str::to_owned);
        let info = Self {
            make: pick("Image Make"),
            model: pick("Image Model"),
            lens: pick("EXIF LensModel"),
            exposure_time: pick("EXIF ExposureTime"),
            f_number: pick("EXIF FNumber"),
            iso: pick("EXIF PhotographicSensitivity"),
            focal_length: pick("EXIF FocalLength"),
            taken_at: pick("EXIF DateTimeOriginal"),
        };
        (info != Self::default()).then_some(info)
    }
}

/// Independent workflow flags on a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoFlag {
    Featured,
    NeedsAttention,
}

/// Actions applicable to a selection of photos within one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Delete,
    Feature,
    Unfeature,
    Flag,
    Unflag,
}

impl BulkAction {
    /// Flag update performed by this action; `None` for deletion.
    pub fn flag_update(self) -> Option<(PhotoFlag, bool)> {
        match self {
            Self::Delete => None,
            Self::Feature => Some((PhotoFlag::Featured, true)),
            Self::Unfeature => Some((PhotoFlag::Featured, false)),
            Self::Flag => Some((PhotoFlag::NeedsAttention, true)),
            Self::Unflag => Some((PhotoFlag::NeedsAttention, false)),
        }
    }

    /// Human summary for `count` affected photos.
    ///
    /// # Examples
    /// ```
    /// use lightbox::domain::BulkAction;
    ///
    /// assert_eq!(BulkAction::Feature.summary(2), "Marked 2 photos as featured.");
    /// assert_eq!(BulkAction::Delete.summary(1), "Deleted 1 photo.");
    /// ```
    pub fn summary(self, count: usize) -> String {
        let noun = if count == 1 { "photo" } else { "photos" };
        match self {
            Self::Delete => format!("Deleted {count} {noun}."),
            Self::Feature => format!("Marked {count} {noun} as featured."),
            Self::Unfeature => format!("Removed featured status from {count} {noun}."),
            Self::Flag => format!("Flagged {count} {noun} for attention."),
            Self::Unflag => format!("Removed attention flag from {count} {noun}."),
        }
    }
}

/// Validation failures for photo edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhotoValidationError {
    #[error("Ensure this value has at most {max} characters.")]
    TitleTooLong { max: usize },
}

/// Editable photo fields; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoEdit {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub featured: Option<bool>,
    pub needs_attention: Option<bool>,
}

impl PhotoEdit {
    /// Validate the edit, trimming the title.
    pub fn validated(mut self) -> Result<Self, PhotoValidationError> {
        if let Some(title) = self.title.take() {
            let trimmed = title.trim();
            if trimmed.chars().count() > PHOTO_TITLE_MAX {
                return Err(PhotoValidationError::TitleTooLong {
                    max: PHOTO_TITLE_MAX,
                });
            }
            self.title = Some(trimmed.to_owned());
        }
        Ok(self)
    }
}

/// Photo stored in a project.
///
/// ## Invariants
/// - `image` changes only through explicit replacement.
/// - Photos of a project sort by `display_order`, then `uploaded_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub id: PhotoId,
    pub project_id: ProjectId,
    pub title: String,
    pub caption: String,
    pub image: AssetId,
    pub byte_size: Option<u64>,
    pub content_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub exif: Option<ExifData>,
    pub featured: bool,
    pub needs_attention: bool,
    pub display_order: i32,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Photo {
    /// Build a photo record from ingested metadata and its stored asset.
    pub fn ingested(
        project_id: ProjectId,
        image: AssetId,
        metadata: PhotoMetadata,
        caption: String,
        now: DateTime<Utc>,
    ) -> Self {
        let PhotoMetadata {
            title,
            byte_size,
            content_type,
            width,
            height,
            exif,
        } = metadata;
        Self {
            id: PhotoId::random(),
            project_id,
            title,
            caption,
            image,
            byte_size,
            content_type,
            width,
            height,
            exif,
            featured: false,
            needs_attention: false,
            display_order: 0,
            uploaded_at: now,
            updated_at: now,
        }
    }

    /// Apply a validated edit. A blank title keeps the existing one.
    pub fn apply(&mut self, edit: PhotoEdit, now: DateTime<Utc>) {
        if let Some(title) = edit.title.filter(|title| !title.is_empty()) {
            self.title = title;
        }
        if let Some(caption) = edit.caption {
            self.caption = caption;
        }
        if let Some(featured) = edit.featured {
            self.featured = featured;
        }
        if let Some(needs_attention) = edit.needs_attention {
            self.needs_attention = needs_attention;
        }
        self.updated_at = now;
    }

    /// Camera summary derived from the stored EXIF tags.
    pub fn camera_info(&self) -> Option<CameraInfo> {
        self.exif.as_ref().and_then(CameraInfo::from_exif)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn exif(pairs: &[(&str, &str)]) -> ExifData {
        ExifData::new(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        )
    }

    #[rstest]
    fn camera_info_picks_known_tags() {
        let data = exif(&[
            ("Image Make", "FUJIFILM"),
            ("Image Model", "X-T5"),
            ("EXIF FNumber", "f/2.8"),
            ("EXIF PhotographicSensitivity", "400"),
            ("GPS GPSLatitude", "51 deg"),
        ]);
        let info = CameraInfo::from_exif(&data).expect("camera info");
        assert_eq!(info.make.as_deref(), Some("FUJIFILM"));
        assert_eq!(info.model.as_deref(), Some("X-T5"));
        assert_eq!(info.f_number.as_deref(), Some("f/2.8"));
        assert_eq!(info.iso.as_deref(), Some("400"));
        assert!(info.lens.is_none());
    }

    #[rstest]
    fn camera_info_absent_without_camera_tags() {
        let data = exif(&[("GPS GPSLatitude", "51 deg")]);
        assert!(CameraInfo::from_exif(&data).is_none());
    }

    #[rstest]
    #[case(BulkAction::Delete, None)]
    #[case(BulkAction::Feature, Some((PhotoFlag::Featured, true)))]
    #[case(BulkAction::Unfeature, Some((PhotoFlag::Featured, false)))]
    #[case(BulkAction::Flag, Some((PhotoFlag::NeedsAttention, true)))]
    #[case(BulkAction::Unflag, Some((PhotoFlag::NeedsAttention, false)))]
    fn bulk_actions_map_to_flag_updates(
        #[case] action: BulkAction,
        #[case] expected: Option<(PhotoFlag, bool)>,
    ) {
        assert_eq!(action.flag_update(), expected);
    }

    #[rstest]
    fn bulk_action_deserialises_snake_case() {
        let action: BulkAction = serde_json::from_str("\"unfeature\"").expect("action");
        assert_eq!(action, BulkAction::Unfeature);
    }

    #[rstest]
    fn edit_rejects_overlong_title() {
        let edit = PhotoEdit {
            title: Some("x".repeat(PHOTO_TITLE_MAX + 1)),
            ..PhotoEdit::default()
        };
        assert_eq!(
            edit.validated(),
            Err(PhotoValidationError::TitleTooLong {
                max: PHOTO_TITLE_MAX
            })
        );
    }

    #[rstest]
    fn apply_keeps_title_when_blank() {
        let now = Utc::now();
        let metadata = PhotoMetadata {
            title: "Golden Hour".to_owned(),
            byte_size: Some(10),
            content_type: Some("image/png".to_owned()),
            width: Some(1),
            height: Some(1),
            exif: None,
        };
        let mut photo = Photo::ingested(
            ProjectId::random(),
            AssetId::new("photos/a").expect("asset"),
            metadata,
            String::new(),
            now,
        );
        let edit = PhotoEdit {
            title: Some("   ".to_owned()),
            caption: Some("west pier".to_owned()),
            featured: Some(true),
            needs_attention: None,
        }
        .validated()
        .expect("valid edit");
        photo.apply(edit, now);
        assert_eq!(photo.title, "Golden Hour");
        assert_eq!(photo.caption, "west pier");
        assert!(photo.featured);
        assert!(!photo.needs_attention);
    }
}
