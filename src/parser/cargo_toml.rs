//! Cargo.toml parser

use std::path::Path;

use crate::parser::traits::{ManifestParser, ParseError, raw_line};
use crate::parser::types::{Definition, Dependency, ManagerType, clean_version};
use tracing::warn;

/// Parser for Cargo.toml files
pub struct CargoTomlParser;

impl CargoTomlParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CargoTomlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestParser for CargoTomlParser {
    fn manager_type(&self) -> ManagerType {
        ManagerType::Cargo
    }

    fn can_parse(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| name == "Cargo.toml")
    }

    fn lockfile_names(&self) -> &'static [&'static str] {
        &["Cargo.lock"]
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

impl CargoTomlParser {
    /// Keys that mark a dependency as not coming from crates.io
    const SKIP_KEYS: [&'static str; 4] = ["path", "workspace", "registry", "git"];

    /// Process a TOML table node
    fn process_table(
        &self,
        table_node: tree_sitter::Node,
        path: &str,
        content: &str,
        results: &mut Vec<Dependency>,
    ) {
        // Only plain [table] headers, not [[array.tables]]
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
            .map(|child| split_key(&content[child.byte_range()]));

        let Some(keys) = table_name else {
            return;
        };

        let Some((dev, package)) = dependency_table(&keys) else {
            return;
        };

        let mut push = |name: String, version: String, row: usize| {
            results.push(Dependency {
                manager: ManagerType::Cargo,
                name,
                version: clean_version(&version),
                dev,
                definition: Definition {
                    path: path.to_string(),
                    raw_line: raw_line(content, row),
                    line: row + 1,
                },
            });
        };

        // [dependencies.serde] holds a single dependency in its body
        if let Some(package) = package {
            if let Some(version) = self.extract_version_from_table(table_node, content) {
                push(package.to_string(), version, table_node.start_position().row);
            }
            return;
        }

        let mut cursor = table_node.walk();
        for child in table_node.children(&mut cursor) {
            if child.kind() != "pair" {
                continue;
            }

            if let Some((name, version)) = self.extract_package_from_pair(child, content) {
                push(name, version, child.start_position().row);
            }
        }
    }

    /// Extract (name, version) from a key-value pair
    fn extract_package_from_pair(
        &self,
        pair_node: tree_sitter::Node,
        content: &str,
    ) -> Option<(String, String)> {
        let mut cursor = pair_node.walk();
        let mut package_name: Option<String> = None;
        let mut dotted_key_suffix: Option<String> = None;
        let mut version: Option<String> = None;

        for child in pair_node.children(&mut cursor) {
            match child.kind() {
                "bare_key" => {
                    package_name = Some(content[child.byte_range()].to_string());
                }
                "dotted_key" => {
                    // serde.version = "1.0" or shared.workspace = true
                    let key_text = &content[child.byte_range()];
                    let (pkg, suffix) = key_text.split_once('.')?;
                    package_name = Some(pkg.trim().to_string());
                    dotted_key_suffix = Some(suffix.trim().to_string());
                }
                "string" => {
                    if dotted_key_suffix.as_deref().is_none_or(|suffix| suffix == "version") {
                        version = Some(string_value(child, content));
                    }
                }
                "inline_table" => {
                    version = self.extract_version_from_table(child, content);
                }
                _ => {}
            }
        }

        Some((package_name?, version?))
    }

    /// Extract version from the pairs of a table body or an inline table:
    /// { version = "1.0", ... }
    /// Returns None if the dependency should be skipped (path, workspace, git or registry)
    fn extract_version_from_table(
        &self,
        table_node: tree_sitter::Node,
        content: &str,
    ) -> Option<String> {
        let mut version = None;
        let mut cursor = table_node.walk();

        for child in table_node.children(&mut cursor) {
            if child.kind() != "pair" {
                continue;
            }

            let mut pair_cursor = child.walk();
            let mut is_version_key = false;

            for pair_child in child.children(&mut pair_cursor) {
                match pair_child.kind() {
                    "bare_key" => {
                        let key = &content[pair_child.byte_range()];
                        if Self::SKIP_KEYS.contains(&key) {
                            return None;
                        }
                        is_version_key = key == "version";
                    }
                    "string" if is_version_key => {
                        version = Some(string_value(pair_child, content));
                    }
                    _ => {}
                }
            }
        }

        version
    }
}

/// Splits a table header into its keys, unquoting quoted ones
fn split_key(key: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut current = String::new();
    let mut quote = None;

    for c in key.chars() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if c == q => quote = None,
            (None, '.') => keys.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    keys.push(current.trim().to_string());

    keys
}

/// Classifies a table header as a dependency table.
///
/// Returns the dev flag and, for `[dependencies.<name>]` style headers, the
/// package the table declares. `[workspace.dependencies]` and
/// `[target.<cfg>.*dependencies]` headers are understood too.
fn dependency_table(keys: &[String]) -> Option<(bool, Option<&str>)> {
    let rest = match keys {
        [first, _, rest @ ..] if first == "target" => rest,
        [first, rest @ ..] if first == "workspace" => {
            if rest.first().is_none_or(|kind| kind != "dependencies") {
                return None;
            }
            rest
        }
        _ => keys,
    };

    let (kind, package) = match rest {
        [kind] => (kind, None),
        [kind, package] => (kind, Some(package.as_str())),
        _ => return None,
    };

    let dev = match kind.as_str() {
        "dependencies" | "build-dependencies" => false,
        "dev-dependencies" => true,
        _ => return None,
    };

    Some((dev, package))
}

fn string_value(node: tree_sitter::Node, content: &str) -> String {
    content[node.byte_range()]
        .trim()
        .trim_start_matches('"')
        .trim_end_matches('"')
        .to_string()
}
