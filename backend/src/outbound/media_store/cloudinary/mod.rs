//! Cloudinary asset store adapter.
//!
//! Uploads and deletions use Cloudinary's signed REST API; delivery URLs are
//! built locally from the public id and a transformation segment.

mod dto;
mod http_store;
mod signing;

pub use http_store::{CloudinaryAssetStore, CloudinaryCredentials};
