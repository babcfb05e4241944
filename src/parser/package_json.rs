//! package.json parser

use std::path::Path;

use crate::parser::traits::{ManifestParser, ParseError, raw_line};
use crate::parser::types::{Definition, Dependency, ManagerType, clean_version};
use tracing::warn;

/// Parser for package.json files
pub struct PackageJsonParser;

impl PackageJsonParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PackageJsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestParser for PackageJsonParser {
    fn manager_type(&self) -> ManagerType {
        ManagerType::Npm
    }

    fn can_parse(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| name == "package.json")
    }

    fn lockfile_names(&self) -> &'static [&'static str] {
        &["package-lock.json", "yarn.lock"]
    }

    fn parse(&self, path: &str, content: &str) -> Result<Vec<Dependency>, ParseError> {
        let mut parser = tree_sitter::Parser::new();
        let language = tree_sitter_json::LANGUAGE;
        parser.set_language(&language.into()).map_err(|e| {
            warn!("Failed to set JSON language for tree-sitter: {}", e);
            ParseError::TreeSitter(e.to_string())
        })?;

        let tree = parser.parse(content, None).ok_or_else(|| {
            warn!("Failed to parse JSON content");
            ParseError::ParseFailed("Failed to parse JSON".to_string())
        })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(ParseError::InvalidSyntax(format!("{path} is not valid JSON")));
        }

        let mut results = Vec::new();

        // Find the root object
        if let Some(document) = root.child(0)
            && document.kind() == "object"
        {
            self.extract_dependencies(document, path, content, &mut results);
        }

        Ok(results)
    }
}

impl PackageJsonParser {
    /// Dependency field names to extract, with their dev flag
    const DEPENDENCY_FIELDS: [(&'static str, bool); 2] =
        [("dependencies", false), ("devDependencies", true)];

    /// Parse npm alias format: npm:package@version or npm:@scope/package@version
    /// Returns (actual_package_name, version)
    fn parse_npm_alias(value: &str) -> Option<(String, String)> {
        let rest = value.strip_prefix("npm:")?;

        // Scoped packages carry a leading @, so the version separator is the @ after the slash
        let search_from = if rest.starts_with('@') {
            rest.find('/')? + 1
        } else {
            0
        };

        match rest[search_from..].find('@') {
            Some(at_pos) => {
                let split = search_from + at_pos;
                Some((rest[..split].to_string(), rest[split + 1..].to_string()))
            }
            None => Some((rest.to_string(), "latest".to_string())),
        }
    }

    /// Extract dependencies from the root object
    fn extract_dependencies(
        &self,
        object_node: tree_sitter::Node,
        path: &str,
        content: &str,
        results: &mut Vec<Dependency>,
    ) {
        let mut cursor = object_node.walk();

        for child in object_node.children(&mut cursor) {
            if child.kind() != "pair" {
                continue;
            }

            let Some(key_node) = child.child_by_field_name("key") else {
                continue;
            };

            let key_text = self.get_string_value(key_node, content);

            let Some(&(_, dev)) = Self::DEPENDENCY_FIELDS
                .iter()
                .find(|(field, _)| *field == key_text)
            else {
                continue;
            };

            let Some(value_node) = child.child_by_field_name("value") else {
                continue;
            };

            if value_node.kind() == "object" {
                self.extract_packages_from_object(value_node, path, content, dev, results);
            }
        }
    }

    /// Extract packages from a dependency object (e.g., "dependencies": { ... })
    fn extract_packages_from_object(
        &self,
        object_node: tree_sitter::Node,
        path: &str,
        content: &str,
        dev: bool,
        results: &mut Vec<Dependency>,
    ) {
        let mut cursor = object_node.walk();

        for child in object_node.children(&mut cursor) {
            if child.kind() != "pair" {
                continue;
            }

            let Some(key_node) = child.child_by_field_name("key") else {
                continue;
            };

            let Some(value_node) = child.child_by_field_name("value") else {
                continue;
            };

            if value_node.kind() != "string" {
                continue;
            }

            let key_name = self.get_string_value(key_node, content);
            let raw_version = self.get_string_value(value_node, content);

            let (package_name, version) = Self::parse_npm_alias(&raw_version)
                .unwrap_or((key_name, raw_version));

            let row = key_node.start_position().row;

            results.push(Dependency {
                manager: ManagerType::Npm,
                name: package_name,
                version: clean_version(&version),
                dev,
                definition: Definition {
                    path: path.to_string(),
                    raw_line: raw_line(content, row),
                    line: row + 1,
                },
            });
        }
    }

    /// Get the string value from a string node (removes quotes)
    fn get_string_value(&self, node: tree_sitter::Node, content: &str) -> String {
        let text = &content[node.byte_range()];
        text.trim()
            .trim_start_matches('"')
            .trim_end_matches('"')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_extracts_dependencies() {
        let parser = PackageJsonParser::new();
        let content = r#"{
  "name": "my-app",
  "dependencies": {
    "lodash": "^4.17.21"
  }
}"#;
        let result = parser.parse("package.json", content).unwrap();
        assert_eq!(
            result,
            vec![Dependency {
                manager: ManagerType::Npm,
                name: "lodash".to_string(),
                version: "4.17.21".to_string(),
                dev: false,
                definition: Definition {
                    path: "package.json".to_string(),
                    raw_line: r#""lodash": "^4.17.21""#.to_string(),
                    line: 4,
                },
            }]
        );
    }

    #[test]
    fn parse_marks_dev_dependencies() {
        let parser = PackageJsonParser::new();
        let content = r#"{
  "dependencies": {
    "react": "18.2.0"
  },
  "devDependencies": {
    "typescript": "5.0.0"
  }
}"#;
        let result = parser.parse("package.json", content).unwrap();
        let flags: Vec<_> = result.iter().map(|d| (d.name.as_str(), d.dev)).collect();
        assert_eq!(flags, vec![("react", false), ("typescript", true)]);
    }

    #[test]
    fn parse_keeps_declaration_order() {
        let parser = PackageJsonParser::new();
        let content = r#"{
  "dependencies": {
    "zod": "3.0.0",
    "axios": "1.0.0",
    "lodash": "4.0.0"
  }
}"#;
        let result = parser.parse("package.json", content).unwrap();
        let names: Vec<_> = result.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["zod", "axios", "lodash"]);
        assert_eq!(result[2].definition.line, 5);
    }

    #[test]
    fn parse_ignores_peer_dependencies() {
        let parser = PackageJsonParser::new();
        let content = r#"{
  "peerDependencies": {
    "react": ">=16.8.0"
  }
}"#;
        let result = parser.parse("package.json", content).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn parse_keeps_any_tags_recognizable() {
        let parser = PackageJsonParser::new();
        let content = r#"{
  "dependencies": {
    "a": "*",
    "b": "latest",
    "c": ""
  }
}"#;
        let result = parser.parse("package.json", content).unwrap();
        let versions: Vec<_> = result.iter().map(|d| d.version.as_str()).collect();
        assert_eq!(versions, vec!["", "latest", ""]);
    }

    #[test]
    fn parse_extracts_npm_alias() {
        let parser = PackageJsonParser::new();
        let content = r#"{
  "dependencies": {
    "vite": "npm:rolldown-vite@7.2.2"
  }
}"#;
        let result = parser.parse("package.json", content).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "rolldown-vite");
        assert_eq!(result[0].version, "7.2.2");
    }

    #[test]
    fn parse_extracts_npm_alias_with_scope() {
        let parser = PackageJsonParser::new();
        let content = r#"{
  "dependencies": {
    "pkg": "npm:@org/pkg@^1.0.0"
  }
}"#;
        let result = parser.parse("package.json", content).unwrap();
        assert_eq!(result[0].name, "@org/pkg");
        assert_eq!(result[0].version, "1.0.0");
    }

    #[test]
    fn parse_extracts_npm_alias_without_version() {
        let parser = PackageJsonParser::new();
        let content = r#"{
  "dependencies": {
    "npa": "npm:npm-package-arg"
  }
}"#;
        let result = parser.parse("package.json", content).unwrap();
        assert_eq!(result[0].name, "npm-package-arg");
        assert_eq!(result[0].version, "latest");
    }

    #[test]
    fn parse_returns_error_for_invalid_json() {
        let parser = PackageJsonParser::new();
        let result = parser.parse("package.json", r#"{ "dependencies": { "a": }"#);
        assert!(matches!(result, Err(ParseError::InvalidSyntax(_))));
    }

    #[test]
    fn can_parse_matches_file_name_only() {
        let parser = PackageJsonParser::new();
        assert!(parser.can_parse(Path::new("web/package.json")));
        assert!(!parser.can_parse(Path::new("web/package-lock.json")));
    }
}
