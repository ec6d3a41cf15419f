//! Asset store adapters.
//!
//! Cloudinary is the production backend; the filesystem store serves
//! single-host deployments from a local directory behind a static file
//! server. Both render rendition URLs from the same transformation syntax.

mod cloudinary;
mod filesystem;
mod transformation;

pub use cloudinary::{CloudinaryAssetStore, CloudinaryCredentials};
pub use filesystem::FilesystemAssetStore;
pub use transformation::transformation_segment;

/// File extension used when persisting an asset of `content_type`.
pub(crate) fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}
