//! Manifest parser trait definition

use std::path::Path;

use crate::parser::types::{Dependency, ManagerType};

/// Trait for parsing dependency manifests of one ecosystem
pub trait ManifestParser: Send + Sync {
    /// Ecosystem handled by this parser
    fn manager_type(&self) -> ManagerType;

    /// Check if this parser can handle the file at the given path
    fn can_parse(&self, path: &Path) -> bool;

    /// Lockfile names looked up next to the manifest, in priority order.
    /// An empty list means the ecosystem has no lockfile.
    fn lockfile_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Parse the content and extract dependencies in declaration order.
    /// `path` is stamped on every returned definition.
    fn parse(&self, path: &str, content: &str) -> Result<Vec<Dependency>, ParseError>;
}

/// Returns the trimmed text of a 0-indexed line
pub(crate) fn raw_line(content: &str, row: usize) -> String {
    content
        .lines()
        .nth(row)
        .map(|line| line.trim().to_string())
        .unwrap_or_default()
}

/// Error type for parsing operations
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to parse the file structure
    #[error("Failed to parse file: {0}")]
    ParseFailed(String),

    /// Invalid syntax in the file
    #[error("Invalid syntax: {0}")]
    InvalidSyntax(String),

    /// Tree-sitter related error
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),
}
