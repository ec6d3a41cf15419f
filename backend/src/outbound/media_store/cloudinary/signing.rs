//! Request signatures for Cloudinary's authenticated endpoints.

use sha2::{Digest, Sha256};

/// Sign `params` with `api_secret`.
///
/// Parameters are sorted by name and joined as `name=value` pairs separated
/// by `&`; the secret is appended and the SHA-256 digest is hex encoded.
pub(super) fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let payload = sorted
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}
