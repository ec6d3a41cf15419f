//! Lightbox backend library: photography projects, photo uploads, and
//! photographer accounts behind a JSON API.
//!
//! The crate follows a hexagonal layout. [`domain`] holds aggregates,
//! ports, and services; [`inbound::http`] adapts actix-web requests onto
//! the driving ports; [`outbound`] implements the driven ports against
//! PostgreSQL, Cloudinary, the filesystem, or memory.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
