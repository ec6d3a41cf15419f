//! Application settings loaded via OrthoConfig.
//!
//! Values layer CLI flags over `LIGHTBOX_*` environment variables over an
//! optional config file. Every field is optional; accessors supply the
//! defaults so a bare `lightbox` invocation runs entirely in memory.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::media::{DEFAULT_ALLOWED_TYPES, DEFAULT_MAX_UPLOAD_BYTES};
use crate::domain::ports::DEFAULT_MAX_BULK_FILES;
use crate::inbound::http::session_config::SessionToggles;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_MEDIA_BASE_URL: &str = "/media";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Where uploaded images are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaBackend {
    /// Process memory; lost on restart.
    #[default]
    Memory,
    /// A local directory served by a static file server.
    Filesystem,
    Cloudinary,
}

impl FromStr for MediaBackend {
    type Err = SettingsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "filesystem" => Ok(Self::Filesystem),
            "cloudinary" => Ok(Self::Cloudinary),
            other => Err(SettingsError::Invalid {
                name: "media_backend",
                value: other.to_owned(),
                expected: "memory, filesystem, or cloudinary",
            }),
        }
    }
}

/// Errors raised when settings values cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("invalid {name} '{value}': expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("{name} is required when the media backend is cloudinary")]
    MissingCloudinary { name: &'static str },
}

/// Cloudinary account values, all present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinarySettings {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Top-level configuration for the `lightbox` binary.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LIGHTBOX")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; absent selects the in-memory repositories.
    pub database_url: Option<String>,
    /// File holding the session signing key.
    pub session_key_file: Option<PathBuf>,
    pub session_cookie_secure: Option<bool>,
    /// `lax`, `strict`, or `none`.
    pub session_same_site: Option<String>,
    /// Permit a generated session key in release builds.
    pub session_allow_ephemeral: Option<bool>,
    /// Per-file upload ceiling in bytes.
    pub max_upload_bytes: Option<u64>,
    /// Comma-separated MIME allow-list.
    pub allowed_types: Option<String>,
    pub max_bulk_files: Option<usize>,
    /// `memory`, `filesystem`, or `cloudinary`.
    pub media_backend: Option<String>,
    pub media_root: Option<PathBuf>,
    pub media_base_url: Option<String>,
    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_api_key: Option<String>,
    pub cloudinary_api_secret: Option<String>,
    /// Timeout for asset store requests.
    pub request_timeout_secs: Option<u64>,
}

impl AppSettings {
    /// Listener address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::Invalid {
            name: "bind_addr",
            value: raw.to_owned(),
            expected: "a socket address such as 0.0.0.0:8080",
        })
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn session_toggles(&self) -> SessionToggles {
        SessionToggles {
            key_file: self.session_key_file.clone(),
            cookie_secure: self.session_cookie_secure,
            same_site: self.session_same_site.clone(),
            allow_ephemeral: self.session_allow_ephemeral,
        }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    /// The MIME allow-list, lower-cased with blanks dropped.
    ///
    /// # Examples
    /// ```
    /// use lightbox::settings::AppSettings;
    ///
    /// let settings = AppSettings {
    ///     allowed_types: Some("image/PNG, ,image/webp".into()),
    ///     ..AppSettings::default()
    /// };
    /// assert_eq!(settings.allowed_types(), vec!["image/png", "image/webp"]);
    /// ```
    pub fn allowed_types(&self) -> Vec<String> {
        match self.allowed_types.as_deref() {
            Some(raw) => raw
                .split(',')
                .map(|ty| ty.trim().to_ascii_lowercase())
                .filter(|ty| !ty.is_empty())
                .collect(),
            None => DEFAULT_ALLOWED_TYPES
                .iter()
                .map(|ty| (*ty).to_owned())
                .collect(),
        }
    }

    pub fn max_bulk_files(&self) -> usize {
        self.max_bulk_files.unwrap_or(DEFAULT_MAX_BULK_FILES)
    }

    pub fn media_backend(&self) -> Result<MediaBackend, SettingsError> {
        self.media_backend
            .as_deref()
            .map_or(Ok(MediaBackend::default()), str::parse)
    }

    pub fn media_root(&self) -> PathBuf {
        self.media_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT))
    }

    pub fn media_base_url(&self) -> &str {
        self.media_base_url
            .as_deref()
            .unwrap_or(DEFAULT_MEDIA_BASE_URL)
    }

    /// Cloudinary account values; every one must be set.
    pub fn cloudinary(&self) -> Result<CloudinarySettings, SettingsError> {
        let required = |value: &Option<String>, name: &'static str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
                .ok_or(SettingsError::MissingCloudinary { name })
        };
        Ok(CloudinarySettings {
            cloud_name: required(&self.cloudinary_cloud_name, "cloudinary_cloud_name")?,
            api_key: required(&self.cloudinary_api_key, "cloudinary_api_key")?,
            api_secret: required(&self.cloudinary_api_secret, "cloudinary_api_secret")?,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}
