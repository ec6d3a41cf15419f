//! Reqwest-backed Cloudinary adapter.
//!
//! This adapter owns transport details only: signing, multipart encoding,
//! HTTP error mapping, and delivery URL rendering.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use mockable::Clock;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{DestroyResponseDto, ErrorEnvelopeDto, UploadResponseDto};
use super::signing::sign;
use crate::domain::AssetId;
use crate::domain::ports::{AssetFolder, AssetStore, AssetStoreError, Transformation};
use crate::outbound::media_store::{extension_for, transformation_segment};

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1/";
const DEFAULT_DELIVERY_BASE: &str = "https://res.cloudinary.com/";

/// Account credentials for the Cloudinary API.
#[derive(Clone)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: Zeroizing<String>,
}

impl std::fmt::Debug for CloudinaryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Asset store backed by a Cloudinary account.
pub struct CloudinaryAssetStore {
    client: Client,
    api_base: String,
    delivery_base: String,
    credentials: CloudinaryCredentials,
    clock: Arc<dyn Clock>,
}

impl CloudinaryAssetStore {
    /// Build an adapter against the public Cloudinary endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        credentials: CloudinaryCredentials,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: DEFAULT_API_BASE.to_owned(),
            delivery_base: DEFAULT_DELIVERY_BASE.to_owned(),
            credentials,
            clock,
        })
    }

    /// Point the adapter at alternative API and delivery hosts.
    pub fn with_endpoints(
        mut self,
        api_base: impl Into<String>,
        delivery_base: impl Into<String>,
    ) -> Self {
        self.api_base = api_base.into();
        self.delivery_base = delivery_base.into();
        self
    }

    fn endpoint(&self, action: &str) -> Result<Url, AssetStoreError> {
        let base = self.api_base.trim_end_matches('/');
        Url::parse(&format!(
            "{base}/{}/image/{action}",
            self.credentials.cloud_name
        ))
        .map_err(|err| AssetStoreError::rejected(format!("invalid endpoint: {err}")))
    }

    fn timestamp(&self) -> String {
        self.clock.utc().timestamp().to_string()
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, AssetStoreError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        serde_json::from_slice(body.as_ref()).map_err(|err| {
            AssetStoreError::rejected(format!("invalid Cloudinary response: {err}"))
        })
    }
}

#[async_trait]
impl AssetStore for CloudinaryAssetStore {
    async fn store(
        &self,
        bytes: Bytes,
        content_type: &str,
        folder: AssetFolder,
    ) -> Result<AssetId, AssetStoreError> {
        let timestamp = self.timestamp();
        let params = [
            ("folder", folder.as_str().to_owned()),
            ("timestamp", timestamp.clone()),
        ];
        let signature = sign(&params, &self.credentials.api_secret);

        let file = Part::stream(reqwest::Body::from(bytes))
            .file_name(format!("upload.{}", extension_for(content_type)))
            .mime_str(content_type)
            .map_err(|err| AssetStoreError::rejected(format!("invalid content type: {err}")))?;
        let form = Form::new()
            .part("file", file)
            .text("api_key", self.credentials.api_key.clone())
            .text("folder", folder.as_str())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let request = self.client.post(self.endpoint("upload")?).multipart(form);
        let uploaded: UploadResponseDto = self.send(request).await?;
        debug!(public_id = %uploaded.public_id, "uploaded asset to Cloudinary");
        AssetId::new(uploaded.public_id)
            .map_err(|err| AssetStoreError::rejected(format!("empty public id: {err}")))
    }

    async fn delete(&self, id: &AssetId) -> Result<(), AssetStoreError> {
        let timestamp = self.timestamp();
        let params = [
            ("public_id", id.as_str().to_owned()),
            ("timestamp", timestamp.clone()),
        ];
        let signature = sign(&params, &self.credentials.api_secret);
        let form = [
            ("public_id", id.as_str().to_owned()),
            ("timestamp", timestamp),
            ("api_key", self.credentials.api_key.clone()),
            ("signature_algorithm", "sha256".to_owned()),
            ("signature", signature),
        ];

        let request = self.client.post(self.endpoint("destroy")?).form(&form);
        let outcome: DestroyResponseDto = self.send(request).await?;
        if outcome.is_settled() {
            Ok(())
        } else {
            Err(AssetStoreError::rejected(format!(
                "destroy returned {}",
                outcome.result
            )))
        }
    }

    fn url(&self, id: &AssetId, transformation: &Transformation) -> String {
        let base = self.delivery_base.trim_end_matches('/');
        let cloud = &self.credentials.cloud_name;
        match transformation_segment(transformation) {
            Some(segment) => format!("{base}/{cloud}/image/upload/{segment}/{id}"),
            None => format!("{base}/{cloud}/image/upload/{id}"),
        }
    }
}

fn map_transport_error(error: reqwest::Error) -> AssetStoreError {
    AssetStoreError::unavailable(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> AssetStoreError {
    let detail = serde_json::from_slice::<ErrorEnvelopeDto>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).chars().take(160).collect());
    let message = if detail.trim().is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), detail.trim())
    };

    if status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
    {
        AssetStoreError::unavailable(message)
    } else {
        AssetStoreError::rejected(message)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the non-network parts of the adapter.
    use rstest::{fixture, rstest};

    use super::*;
    use crate::test_support::clock::FixtureClock;

    #[fixture]
    fn store() -> CloudinaryAssetStore {
        let credentials = CloudinaryCredentials {
            cloud_name: "demo".to_owned(),
            api_key: "1234".to_owned(),
            api_secret: Zeroizing::new("secret".to_owned()),
        };
        CloudinaryAssetStore::new(
            credentials,
            Duration::from_secs(5),
            Arc::new(FixtureClock::default()),
        )
        .expect("client builds")
    }

    fn asset(raw: &str) -> AssetId {
        AssetId::new(raw).expect("asset id")
    }

    #[rstest]
    fn delivery_urls_embed_the_transformation(store: CloudinaryAssetStore) {
        assert_eq!(
            store.url(&asset("photos/abc"), &Transformation::thumbnail()),
            "https://res.cloudinary.com/demo/image/upload/c_fill,w_300,h_300,q_auto,f_auto/photos/abc"
        );
        assert_eq!(
            store.url(&asset("photos/abc"), &Transformation::ORIGINAL),
            "https://res.cloudinary.com/demo/image/upload/photos/abc"
        );
    }

    #[rstest]
    fn endpoints_are_scoped_to_the_cloud(store: CloudinaryAssetStore) {
        let url = store.endpoint("destroy").expect("endpoint");
        assert_eq!(
            url.as_str(),
            "https://api.cloudinary.com/v1_1/demo/image/destroy"
        );
    }

    #[rstest]
    fn custom_endpoints_replace_both_hosts(store: CloudinaryAssetStore) {
        let store =
            store.with_endpoints("http://127.0.0.1:9000/api", "http://127.0.0.1:9000/cdn/");
        assert_eq!(
            store.endpoint("upload").expect("endpoint").as_str(),
            "http://127.0.0.1:9000/api/demo/image/upload"
        );
        assert_eq!(
            store.url(&asset("avatars/a"), &Transformation::ORIGINAL),
            "http://127.0.0.1:9000/cdn/demo/image/upload/avatars/a"
        );
    }

    #[rstest]
    #[case(StatusCode::SERVICE_UNAVAILABLE, true)]
    #[case(StatusCode::TOO_MANY_REQUESTS, true)]
    #[case(StatusCode::BAD_REQUEST, false)]
    #[case(StatusCode::UNAUTHORIZED, false)]
    fn statuses_split_into_outage_and_refusal(#[case] status: StatusCode, #[case] outage: bool) {
        let error = map_status_error(status, br#"{"error":{"message":"Invalid Signature"}}"#);
        assert_eq!(
            matches!(error, AssetStoreError::Unavailable { .. }),
            outage
        );
        assert!(error.to_string().contains("Invalid Signature"));
    }

    #[rstest]
    fn debug_output_hides_the_secret() {
        let credentials = CloudinaryCredentials {
            cloud_name: "demo".to_owned(),
            api_key: "1234".to_owned(),
            api_secret: Zeroizing::new("hunter2".to_owned()),
        };
        assert!(!format!("{credentials:?}").contains("hunter2"));
    }

    #[rstest]
    #[case("ok", true)]
    #[case("not found", true)]
    #[case("error", false)]
    fn destroy_outcomes(#[case] result: &str, #[case] settled: bool) {
        let dto = DestroyResponseDto {
            result: result.to_owned(),
        };
        assert_eq!(dto.is_settled(), settled);
    }
}
