//! mix.exs parser
//!
//! Reads `{:name, "~> 1.0"}` tuples from the `defp deps do ... end` block.
//! Git and path dependencies are skipped.

use std::path::Path;

use regex::Regex;

use crate::parser::traits::{ManifestParser, ParseError};
use crate::parser::types::{Definition, Dependency, ManagerType, clean_version};

const DEP_TUPLE: &str = r#"^\{\s*:(\w+)\s*,\s*"([^"]+)""#;

/// Parser for mix.exs files
pub struct MixExsParser;

impl MixExsParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MixExsParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestParser for MixExsParser {
    fn manager_type(&self) -> ManagerType {
        ManagerType::Hex
    }

    fn can_parse(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| name == "mix.exs")
    }

    fn lockfile_names(&self) -> &'static [&'static str] {
        &["mix.lock"]
    }

    fn parse(&self, path: &str, content: &str) -> Result<Vec<Dependency>, ParseError> {
        let dep_re = Regex::new(DEP_TUPLE).map_err(|e| ParseError::ParseFailed(e.to_string()))?;

        let mut results = Vec::new();
        let mut in_deps = false;

        for (row, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed.starts_with("defp deps do") {
                in_deps = true;
                continue;
            }
            if !in_deps {
                continue;
            }
            if trimmed == "end" {
                break;
            }
            if trimmed.contains("git:") || trimmed.contains("path:") {
                continue;
            }

            let Some(caps) = dep_re.captures(trimmed) else {
                continue;
            };
            let (Some(name), Some(version)) = (caps.get(1), caps.get(2)) else {
                continue;
            };

            results.push(Dependency {
                manager: ManagerType::Hex,
                name: name.as_str().to_string(),
                version: clean_version(version.as_str()),
                // only: :test / only: [:dev, :test] mark development deps
                dev: trimmed.contains("only:") && !trimmed.contains(":prod"),
                definition: Definition {
                    path: path.to_string(),
                    raw_line: trimmed.to_string(),
                    line: row + 1,
                },
            });
        }

        Ok(results)
    }
}
