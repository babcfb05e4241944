//! Package metadata layer
//!
//! Fetches registry metadata for dependencies and keeps it in a persistent,
//! expiring file cache.
//!
//! # Modules
//!
//! - [`cache`]: JSON-file cache with per-entry expiration
//! - [`fetcher`]: bounded concurrent fetching with cache write-back
//! - [`source`]: Source trait for fetching metadata from a registry
//! - [`sources`]: Concrete sources (npm, crates.io, PyPI, Hex, RubyGems, deps.dev)
//! - [`error`]: Error types for cache and source operations
//! - [`types`]: `Package`, `PackageVersion`, `Download`, `PackagesInfo`

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod source;
pub mod sources;
pub mod types;

pub use cache::FileCache;
pub use error::{CacheError, SourceError};
pub use fetcher::Fetcher;
pub use source::Source;
pub use types::{Download, Package, PackageVersion, PackagesInfo};
