//! Shared integration test utilities

#![allow(dead_code)]

pub mod source;
pub mod workspace;

pub use source::{StaticSource, create_test_cache, create_test_fetcher};
pub use workspace::Workspace;
