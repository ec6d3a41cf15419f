//! In-process adapters used when no database or asset backend is configured.
//!
//! [`InMemoryRepository`] implements every repository port over one shared
//! table set so cascades behave as they do in PostgreSQL.
//! [`InMemoryAssetStore`] keeps uploaded bytes in memory and can be switched
//! into a failing mode.

mod asset_store;
mod repository;

pub use asset_store::InMemoryAssetStore;
pub use repository::InMemoryRepository;
