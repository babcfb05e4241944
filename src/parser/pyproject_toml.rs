//! pyproject.toml parser for Python dependencies (PEP 508/PEP 440)
//!
//! Supports the following sections:
//! - `[project].dependencies` - Main project dependencies
//! - `[project.optional-dependencies]` - Optional dependencies (dev)
//!
//! URL dependencies (e.g., `pkg @ git+https://...`) are skipped
//! as they don't exist on PyPI.

use std::path::Path;
use std::str::FromStr;

use pep508_rs::{Requirement, VerbatimUrl, VersionOrUrl};
use tracing::warn;

use crate::parser::traits::{ManifestParser, ParseError, raw_line};
use crate::parser::types::{Definition, Dependency, ManagerType, clean_version};

/// Parser for pyproject.toml files
pub struct PyprojectTomlParser;

impl PyprojectTomlParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PyprojectTomlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a PEP 508 requirement into (name, cleaned version).
///
/// For a range such as `>=3.2, <4.0` the lower bound is kept. Returns None
/// for unparsable lines and URL requirements.
pub(crate) fn parse_requirement(dep_str: &str) -> Option<(String, String)> {
    let req = Requirement::<VerbatimUrl>::from_str(dep_str)
        .inspect_err(|e| warn!("Failed to parse dependency '{}': {}", dep_str, e))
        .ok()?;

    let version = match &req.version_or_url {
        Some(VersionOrUrl::Url(_)) => return None,
        Some(VersionOrUrl::VersionSpecifier(specs)) => specs
            .iter()
            .map(|spec| spec.to_string())
            .find(|spec| !spec.starts_with('<') && !spec.starts_with("!="))
            .map(|spec| clean_version(spec.trim_start_matches("~=")))
            .unwrap_or_default(),
        None => String::new(),
    };

    Some((req.name.to_string(), version))
}

impl ManifestParser for PyprojectTomlParser {
    fn manager_type(&self) -> ManagerType {
        ManagerType::Pyproject
    }

    fn can_parse(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| name == "pyproject.toml")
    }

    fn parse(&self, path: &str, content: &str) -> Result<Vec<Dependency>, ParseError> {
        let mut parser = tree_sitter::Parser::new();
        let language = tree_sitter_toml_ng::LANGUAGE;
        parser.set_language(&language.into()).map_err(|e| {
            warn!("Failed to set TOML language for tree-sitter: {}", e);
            ParseError::TreeSitter(e.to_string())
        })?;

        let tree = parser.parse(content, None).ok_or_else(|| {
            warn!("Failed to parse TOML content");
            ParseError::ParseFailed("Failed to parse TOML".to_string())
        })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(ParseError::InvalidSyntax(format!("{path} is not valid TOML")));
        }

        let mut results = Vec::new();
        let mut cursor = root.walk();

        for child in root.children(&mut cursor) {
            if child.kind() == "table" {
                self.process_table(child, path, content, &mut results);
            }
        }

        Ok(results)
    }
}

impl PyprojectTomlParser {
    /// Process a TOML table node
    fn process_table(
        &self,
        table_node: tree_sitter::Node,
        path: &str,
        content: &str,
        results: &mut Vec<Dependency>,
    ) {
        let Some(header) = table_node.child(0) else {
            return;
        };

        if header.kind() != "[" {
            return;
        }

        let mut cursor = table_node.walk();
        let table_name = table_node
            .children(&mut cursor)
            .find(|child| child.kind() == "bare_key" || child.kind() == "dotted_key")
            .map(|child| content[child.byte_range()].to_string());

        let mut cursor = table_node.walk();
        match table_name.as_deref() {
            Some("project") => {
                for pair in table_node.children(&mut cursor) {
                    if pair.kind() == "pair" {
                        self.extract_key_array(pair, "dependencies", path, content, false, results);
                    }
                }
            }
            Some("project.optional-dependencies") => {
                for pair in table_node.children(&mut cursor) {
                    if pair.kind() == "pair" {
                        self.extract_key_array(pair, "", path, content, true, results);
                    }
                }
            }
            _ => {}
        }
    }

    /// Extract the array value of a pair; an empty `key_name` accepts any key
    fn extract_key_array(
        &self,
        pair_node: tree_sitter::Node,
        key_name: &str,
        path: &str,
        content: &str,
        dev: bool,
        results: &mut Vec<Dependency>,
    ) {
        let mut cursor = pair_node.walk();
        let mut is_target_key = key_name.is_empty();

        for child in pair_node.children(&mut cursor) {
            match child.kind() {
                "bare_key" if !key_name.is_empty() => {
                    is_target_key = &content[child.byte_range()] == key_name;
                }
                "array" if is_target_key => {
                    self.extract_from_array(child, path, content, dev, results);
                }
                _ => {}
            }
        }
    }

    /// Extract dependencies from an array of dependency strings
    fn extract_from_array(
        &self,
        array_node: tree_sitter::Node,
        path: &str,
        content: &str,
        dev: bool,
        results: &mut Vec<Dependency>,
    ) {
        let mut cursor = array_node.walk();

        for child in array_node.children(&mut cursor) {
            if child.kind() != "string" {
                continue;
            }

            // TOML strings are either "..." or '...' (literal string)
            let text = content[child.byte_range()].trim();
            let dep_str = if (text.starts_with('"') && text.ends_with('"'))
                || (text.starts_with('\'') && text.ends_with('\''))
            {
                &text[1..text.len() - 1]
            } else {
                text
            };

            let Some((name, version)) = parse_requirement(dep_str) else {
                continue;
            };

            let row = child.start_position().row;
            results.push(Dependency {
                manager: ManagerType::Pyproject,
                name,
                version,
                dev,
                definition: Definition {
                    path: path.to_string(),
                    raw_line: raw_line(content, row),
                    line: row + 1,
                },
            });
        }
    }
}
