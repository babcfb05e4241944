//! Gemfile parser
//!
//! Recognizes `gem 'name'` and `gem 'name', '~> 1.2'` lines. Gems inside a
//! `group :development` or `group :test` block are dev dependencies.

use std::path::Path;

use regex::Regex;

use crate::parser::traits::{ManifestParser, ParseError};
use crate::parser::types::{Definition, Dependency, ManagerType, clean_version};

const GEM: &str = r#"^gem\s+['"]([^'"]+)['"](?:\s*,\s*['"]([^'"]+)['"])?"#;
const GROUP: &str = r"^group\s+(:\w+(?:\s*,\s*:\w+)*)\s+do\b";

/// Parser for Gemfile files
pub struct GemfileParser;

impl GemfileParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GemfileParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestParser for GemfileParser {
    fn manager_type(&self) -> ManagerType {
        ManagerType::Gem
    }

    fn can_parse(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| name == "Gemfile")
    }

    fn lockfile_names(&self) -> &'static [&'static str] {
        &["Gemfile.lock"]
    }

    fn parse(&self, path: &str, content: &str) -> Result<Vec<Dependency>, ParseError> {
        let gem_re = Regex::new(GEM).map_err(|e| ParseError::ParseFailed(e.to_string()))?;
        let group_re = Regex::new(GROUP).map_err(|e| ParseError::ParseFailed(e.to_string()))?;

        let mut results = Vec::new();
        let mut in_dev_group = false;

        for (row, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if let Some(caps) = group_re.captures(trimmed) {
                in_dev_group = caps.get(1).is_some_and(|groups| {
                    groups
                        .as_str()
                        .split(',')
                        .map(|group| group.trim().trim_start_matches(':'))
                        .any(|group| group == "development" || group == "test")
                });
                continue;
            }

            if trimmed == "end" {
                in_dev_group = false;
                continue;
            }

            let Some(caps) = gem_re.captures(trimmed) else {
                continue;
            };
            let Some(name) = caps.get(1) else {
                continue;
            };

            results.push(Dependency {
                manager: ManagerType::Gem,
                name: name.as_str().to_string(),
                version: caps
                    .get(2)
                    .map(|version| clean_version(version.as_str()))
                    .unwrap_or_default(),
                dev: in_dev_group,
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
    fn parse_extracts_gems_with_groups() {
        let content = r#"source 'https://rubygems.org'

gem 'rails', '~> 7.1.0'
gem "puma"

group :development, :test do
  gem 'rspec-rails', '6.0.0'
end

gem 'pg', '>= 1.1'
"#;
        let result = GemfileParser::new().parse("Gemfile", content).unwrap();
        let summary: Vec<_> = result
            .iter()
            .map(|d| (d.name.as_str(), d.version.as_str(), d.dev, d.definition.line))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("rails", "7.1.0", false, 3),
                ("puma", "", false, 4),
                ("rspec-rails", "6.0.0", true, 7),
                ("pg", "1.1", false, 10),
            ]
        );
    }
}
