//! Test utilities for the lightbox crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and with the `test-support` feature.

pub mod app;
pub mod clock;
pub mod media;
pub mod multipart;
