//! Request and response bodies for the photo endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{
    AssetStore, BulkActionOutcome, BulkUploadReport, FailedUpload, Transformation, UploadedPhoto,
};
use crate::domain::{BulkAction, CameraInfo, Photo, PhotoEdit, PhotoId};
use crate::inbound::http::schemas::{BulkActionSchema, CameraInfoSchema};

/// Photo with rendition URLs and camera details.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoResponse {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub caption: String,
    pub image_url: String,
    /// 300×300 crop.
    pub thumbnail_url: String,
    /// Longest edge limited to 1200px.
    pub gallery_url: String,
    pub byte_size: Option<u64>,
    pub content_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[schema(value_type = Option<CameraInfoSchema>)]
    pub camera: Option<CameraInfo>,
    /// Raw EXIF tags keyed as `"<group> <Tag>"`.
    pub exif: Option<BTreeMap<String, String>>,
    pub featured: bool,
    pub needs_attention: bool,
    pub display_order: i32,
    pub uploaded_at: String,
    pub updated_at: String,
}

impl PhotoResponse {
    pub fn from_photo(photo: &Photo, assets: &dyn AssetStore) -> Self {
        Self {
            id: photo.id.to_string(),
            project_id: photo.project_id.to_string(),
            title: photo.title.clone(),
            caption: photo.caption.clone(),
            image_url: assets.url(&photo.image, &Transformation::ORIGINAL),
            thumbnail_url: assets.url(&photo.image, &Transformation::thumbnail()),
            gallery_url: assets.url(&photo.image, &Transformation::gallery()),
            byte_size: photo.byte_size,
            content_type: photo.content_type.clone(),
            width: photo.width,
            height: photo.height,
            camera: photo.camera_info(),
            exif: photo.exif.as_ref().map(|exif| exif.as_map().clone()),
            featured: photo.featured,
            needs_attention: photo.needs_attention,
            display_order: photo.display_order,
            uploaded_at: photo.uploaded_at.to_rfc3339(),
            updated_at: photo.updated_at.to_rfc3339(),
        }
    }
}

/// Editable photo fields; omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoEditRequest {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub featured: Option<bool>,
    pub needs_attention: Option<bool>,
}

impl From<PhotoEditRequest> for PhotoEdit {
    fn from(value: PhotoEditRequest) -> Self {
        Self {
            title: value.title,
            caption: value.caption,
            featured: value.featured,
            needs_attention: value.needs_attention,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkActionRequest {
    #[schema(value_type = BulkActionSchema)]
    pub action: BulkAction,
    #[serde(default)]
    pub photo_ids: Vec<Uuid>,
}

impl BulkActionRequest {
    pub fn photo_ids(&self) -> Vec<PhotoId> {
        self.photo_ids.iter().copied().map(PhotoId::from_uuid).collect()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkActionResponse {
    #[schema(value_type = BulkActionSchema)]
    pub action: BulkAction,
    pub affected: usize,
    #[schema(example = "Marked 2 photos as featured.")]
    pub message: String,
}

impl From<BulkActionOutcome> for BulkActionResponse {
    fn from(value: BulkActionOutcome) -> Self {
        Self {
            action: value.action,
            affected: value.affected,
            message: value.message,
        }
    }
}

/// Full display order for a project's photos.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub photo_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReorderResponse {
    pub updated: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedPhotoResponse {
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub filename: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailedUploadResponse {
    pub filename: Option<String>,
    pub error: String,
}

/// Per-file outcome of a bulk upload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkUploadResponse {
    pub successful_uploads: Vec<UploadedPhotoResponse>,
    pub failed_uploads: Vec<FailedUploadResponse>,
    pub total_success: usize,
    pub total_failed: usize,
}

impl BulkUploadResponse {
    pub fn from_report(report: BulkUploadReport, assets: &dyn AssetStore) -> Self {
        let total_success = report.total_success();
        let total_failed = report.total_failed();
        let successful_uploads = report
            .successful
            .into_iter()
            .map(|UploadedPhoto { photo, filename }| UploadedPhotoResponse {
                id: photo.id.to_string(),
                title: photo.title,
                thumbnail_url: assets.url(&photo.image, &Transformation::thumbnail()),
                filename,
            })
            .collect();
        let failed_uploads = report
            .failed
            .into_iter()
            .map(|FailedUpload { filename, error }| FailedUploadResponse { filename, error })
            .collect();
        Self {
            successful_uploads,
            failed_uploads,
            total_success,
            total_failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::AssetId;
    use crate::domain::ports::{AssetFolder, AssetStore};
    use crate::outbound::memory::InMemoryAssetStore;
    use crate::test_support::clock::fixture_now;

    fn photo() -> Photo {
        Photo {
            id: PhotoId::random(),
            project_id: crate::domain::ProjectId::random(),
            title: "Low Tide".to_owned(),
            caption: String::new(),
            image: AssetId::new("photos/low-tide").expect("asset id"),
            byte_size: Some(2048),
            content_type: Some("image/jpeg".to_owned()),
            width: Some(640),
            height: Some(480),
            exif: None,
            featured: false,
            needs_attention: true,
            display_order: 2,
            uploaded_at: fixture_now(),
            updated_at: fixture_now(),
        }
    }

    #[rstest]
    fn photo_response_renders_each_rendition() {
        let store = InMemoryAssetStore::new();
        let photo = photo();

        let value = serde_json::to_value(PhotoResponse::from_photo(&photo, &store))
            .expect("serialise photo");

        assert_eq!(
            value["imageUrl"],
            store.url(&photo.image, &Transformation::ORIGINAL)
        );
        assert_ne!(value["thumbnailUrl"], value["galleryUrl"]);
        assert_eq!(value["needsAttention"], true);
        assert_eq!(value["camera"], Value::Null);
    }

    #[rstest]
    fn bulk_action_request_reads_snake_case_actions() {
        let id = Uuid::new_v4();
        let request: BulkActionRequest =
            serde_json::from_value(json!({ "action": "unflag", "photoIds": [id] }))
                .expect("parse request");
        assert_eq!(request.action, BulkAction::Unflag);
        assert_eq!(request.photo_ids(), vec![PhotoId::from_uuid(id)]);
    }

    #[rstest]
    #[tokio::test]
    async fn bulk_upload_response_counts_both_lists() {
        let store = InMemoryAssetStore::new();
        let image = store
            .store(vec![1, 2].into(), "image/png", AssetFolder::Photos)
            .await
            .expect("store asset");
        let mut uploaded = photo();
        uploaded.image = image;
        let report = BulkUploadReport {
            successful: vec![UploadedPhoto {
                photo: uploaded,
                filename: Some("tide.png".to_owned()),
            }],
            failed: vec![FailedUpload {
                filename: Some("broken.jpg".to_owned()),
                error: "Invalid image file. Please upload a valid image.".to_owned(),
            }],
        };

        let value = serde_json::to_value(BulkUploadResponse::from_report(report, &store))
            .expect("serialise report");

        assert_eq!(value["totalSuccess"], 1);
        assert_eq!(value["totalFailed"], 1);
        assert_eq!(value["successfulUploads"][0]["filename"], "tide.png");
        assert_eq!(value["failedUploads"][0]["filename"], "broken.jpg");
    }
}
