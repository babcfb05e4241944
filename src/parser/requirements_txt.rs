//! requirements.txt parser
//!
//! One PEP 508 requirement per line. Comments, blank lines and pip option
//! lines (`-r other.txt`, `--index-url ...`) are skipped.

use std::path::Path;

use crate::parser::pyproject_toml::parse_requirement;
use crate::parser::traits::{ManifestParser, ParseError};
use crate::parser::types::{Definition, Dependency, ManagerType};

/// Parser for requirements.txt files
pub struct RequirementsTxtParser;

impl RequirementsTxtParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RequirementsTxtParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestParser for RequirementsTxtParser {
    fn manager_type(&self) -> ManagerType {
        ManagerType::Pip
    }

    fn can_parse(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| name == "requirements.txt")
    }

    fn lockfile_names(&self) -> &'static [&'static str] {
        &["requirements.lock", "pip.lock"]
    }

    fn parse(&self, path: &str, content: &str) -> Result<Vec<Dependency>, ParseError> {
        let mut results = Vec::new();

        for (row, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('-') {
                continue;
            }

            // Trailing comments are not part of PEP 508
            let requirement = trimmed
                .split_once(" #")
                .map_or(trimmed, |(requirement, _)| requirement)
                .trim();

            let Some((name, version)) = parse_requirement(requirement) else {
                continue;
            };

            results.push(Dependency {
                manager: ManagerType::Pip,
                name,
                version,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_extracts_requirements() {
        let parser = RequirementsTxtParser::new();
        let content = "# web\nflask==2.0.1\n\nrequests>=2.28.0  # http\n";
        let result = parser.parse("requirements.txt", content).unwrap();
        assert_eq!(
            result,
            vec![
                Dependency {
                    manager: ManagerType::Pip,
                    name: "flask".to_string(),
                    version: "2.0.1".to_string(),
                    dev: false,
                    definition: Definition {
                        path: "requirements.txt".to_string(),
                        raw_line: "flask==2.0.1".to_string(),
                        line: 2,
                    },
                },
                Dependency {
                    manager: ManagerType::Pip,
                    name: "requests".to_string(),
                    version: "2.28.0".to_string(),
                    dev: false,
                    definition: Definition {
                        path: "requirements.txt".to_string(),
                        raw_line: "requests>=2.28.0  # http".to_string(),
                        line: 4,
                    },
                },
            ]
        );
    }

    #[test]
    fn parse_skips_option_lines() {
        let parser = RequirementsTxtParser::new();
        let content = "-r base.txt\n--index-url https://example.com/simple\nnumpy\n";
        let result = parser.parse("requirements.txt", content).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "numpy");
        assert_eq!(result[0].version, "");
    }
}
