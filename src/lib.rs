//! depshub: a linter for third-party dependencies
//!
//! - [`parser`]: manifest parsers per ecosystem
//! - [`scanner`]: manifest discovery under a root directory
//! - [`metadata`]: registry metadata fetching and caching
//! - [`lint`]: rule catalogue, policy configuration, and the linter
//! - [`version`]: lenient version parsing

pub mod config;
pub mod lint;
pub mod metadata;
pub mod parser;
pub mod scanner;
pub mod version;
