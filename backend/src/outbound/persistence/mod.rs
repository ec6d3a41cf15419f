//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between Diesel rows (`models.rs`) and domain
//! aggregates; no business rules live here. Connections come from a shared
//! `bb8` pool driven by `diesel-async`.
//!
//! Cascading deletes (a user's projects, a project's photos) are enforced
//! by foreign keys. The repositories read the asset references of every row
//! a cascade will remove, inside the deleting transaction, and hand them back
//! so the caller can release the remote assets.
//!
//! # Example
//!
//! ```ignore
//! use lightbox::outbound::persistence::{DbPool, DieselProjectRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/lightbox")).await?;
//! let projects = DieselProjectRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_photo_repository;
mod diesel_project_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_photo_repository::DieselPhotoRepository;
pub use diesel_project_repository::DieselProjectRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
