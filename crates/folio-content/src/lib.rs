//! Folio Content Library
//!
//! Query and derivation layer over the portfolio content collections.
//!
//! # Modules
//!
//! - [`store`] - The content store seam and query descriptions
//! - [`memory`] - In-memory store
//! - [`loader`] - Loading a content directory into a store
//! - [`key`] - Deterministic cache keys
//! - [`cache`] - Coalescing query cache
//! - [`derive`] - Featured, recent, preview and cross-reference views
//! - [`service`] - Named accessors used by page sections
//! - [`async_data`] - Pending/value/error container for presentation

pub mod async_data;
pub mod cache;
pub mod derive;
pub mod error;
pub mod key;
pub mod loader;
pub mod memory;
pub mod service;
pub mod store;

pub use async_data::AsyncData;
pub use cache::{CacheStats, QueryCache};
pub use error::{ContentError, Result};
pub use key::CacheKey;
pub use loader::load_dir;
pub use memory::MemoryStore;
pub use service::{BlogPage, ContentService};
pub use store::{ContentStore, ContentStoreExt, Direction, Operator, Query, QueryBuilder};
