//! go.mod parser
//!
//! Parses go.mod files to extract module dependencies.
//! Supports both single-line require directives and require blocks.
//!
//! Format examples:
//! - Single: `require golang.org/x/text v0.14.0`
//! - Block:
//!   ```text
//!   require (
//!       golang.org/x/text v0.14.0
//!       golang.org/x/net v0.20.0 // indirect
//!   )
//!   ```
//!
//! Versions keep their leading `v`: the module proxy lists them that way.

use std::path::Path;

use regex::Regex;

use crate::parser::traits::{ManifestParser, ParseError};
use crate::parser::types::{Definition, Dependency, ManagerType};

/// Match: require module/path v1.2.3 [// comment]
const SINGLE_REQUIRE: &str = r"^require\s+(\S+)\s+(v[^\s]+)(?:\s*//.*)?$";
/// Match: require (
const BLOCK_START: &str = r"^require\s*\(\s*$";
/// Match: module/path v1.2.3 [// comment]
const REQUIRE_SPEC: &str = r"^(\S+)\s+(v[^\s]+)(?:\s*//.*)?$";

/// Parser for go.mod files
pub struct GoModParser;

impl GoModParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GoModParser {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(pattern: &str) -> Result<Regex, ParseError> {
    Regex::new(pattern).map_err(|e| ParseError::ParseFailed(e.to_string()))
}

impl ManifestParser for GoModParser {
    fn manager_type(&self) -> ManagerType {
        ManagerType::Go
    }

    fn can_parse(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| name == "go.mod")
    }

    fn parse(&self, path: &str, content: &str) -> Result<Vec<Dependency>, ParseError> {
        let single_require_re = compile(SINGLE_REQUIRE)?;
        let block_start_re = compile(BLOCK_START)?;
        let require_spec_re = compile(REQUIRE_SPEC)?;

        let mut results = Vec::new();
        let mut in_require_block = false;

        for (row, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with("//") {
                continue;
            }

            if in_require_block && trimmed == ")" {
                in_require_block = false;
                continue;
            }

            if block_start_re.is_match(trimmed) {
                in_require_block = true;
                continue;
            }

            let re = if in_require_block {
                &require_spec_re
            } else {
                &single_require_re
            };

            let Some(caps) = re.captures(trimmed) else {
                continue;
            };
            let (Some(module_path), Some(version)) = (caps.get(1), caps.get(2)) else {
                continue;
            };

            results.push(Dependency {
                manager: ManagerType::Go,
                name: module_path.as_str().to_string(),
                version: version.as_str().to_string(),
                dev: false,
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
