//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **media_store**: Cloudinary and local-directory asset stores
//! - **memory**: in-process repositories and asset store for development
//!   and tests
//! - **security**: Argon2 password hashing
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod media_store;
pub mod memory;
pub mod persistence;
pub mod security;
