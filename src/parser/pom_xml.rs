//! pom.xml parser
//!
//! Reads `<project><dependencies>` and `<project><dependencyManagement>`.
//! Names are `groupId:artifactId`, and `test` scope marks a development
//! dependency. A direct dependency without a version takes the managed one,
//! and `${property}` versions resolve against `<project><properties>`.
//! Managed entries that are never declared directly follow the direct ones.
//!
//! Build plugin dependencies and exclusions are not project dependencies
//! and are skipped.

use std::collections::HashMap;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::parser::traits::{ManifestParser, ParseError, raw_line};
use crate::parser::types::{Definition, Dependency, ManagerType, clean_version};

const DIRECT: &[&str] = &["project", "dependencies", "dependency"];
const MANAGED: &[&str] = &[
    "project",
    "dependencyManagement",
    "dependencies",
    "dependency",
];
const PROPERTIES: &[&str] = &["project", "properties"];

/// One `<dependency>` element as written
#[derive(Debug, Default)]
struct PomDependency {
    group_id: String,
    artifact_id: String,
    version: String,
    scope: String,
    /// 0-indexed row of the `<artifactId>` element
    row: usize,
}

impl PomDependency {
    fn name(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    fn is_complete(&self) -> bool {
        !self.group_id.is_empty() && !self.artifact_id.is_empty()
    }
}

/// Parser for Maven pom.xml files
pub struct PomXmlParser;

impl PomXmlParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PomXmlParser {
    fn default() -> Self {
        Self::new()
    }
}

fn is_at(stack: &[String], path: &[&str]) -> bool {
    stack.len() == path.len() && stack.iter().zip(path).all(|(a, b)| a == b)
}

/// Name of the innermost element when it is a direct child of `parent`
fn child_of<'a>(stack: &'a [String], parent: &[&str]) -> Option<&'a str> {
    let (last, rest) = stack.split_last()?;
    is_at(rest, parent).then_some(last.as_str())
}

fn row_at(content: &str, position: u64) -> usize {
    let end = usize::try_from(position).map_or(content.len(), |p| p.min(content.len()));
    content.as_bytes()[..end]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
}

/// Replaces a whole-value `${name}` reference, leaving unknown ones as is
fn resolve(version: &str, properties: &HashMap<String, String>) -> String {
    version
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .and_then(|name| properties.get(name))
        .cloned()
        .unwrap_or_else(|| version.to_string())
}

/// Collects direct and managed dependencies plus project properties
fn read_pom(
    content: &str,
) -> Result<(Vec<PomDependency>, Vec<PomDependency>, HashMap<String, String>), ParseError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut current: Option<PomDependency> = None;
    let mut direct = Vec::new();
    let mut managed = Vec::new();
    let mut properties = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                stack.push(String::from_utf8_lossy(element.local_name().as_ref()).into_owned());

                if is_at(&stack, DIRECT) || is_at(&stack, MANAGED) {
                    current = Some(PomDependency::default());
                    continue;
                }

                let is_artifact = child_of(&stack, DIRECT) == Some("artifactId")
                    || child_of(&stack, MANAGED) == Some("artifactId");
                if let (true, Some(dependency)) = (is_artifact, current.as_mut()) {
                    dependency.row = row_at(content, reader.buffer_position());
                }
            }
            Ok(Event::Text(text)) => {
                let text = String::from_utf8_lossy(&text);
                let text = text.trim();

                if let Some(name) = child_of(&stack, PROPERTIES) {
                    properties
                        .entry(name.to_string())
                        .or_insert_with(String::new)
                        .push_str(text);
                    continue;
                }

                let Some(dependency) = current.as_mut() else {
                    continue;
                };
                let field = match child_of(&stack, DIRECT).or_else(|| child_of(&stack, MANAGED)) {
                    Some("groupId") => &mut dependency.group_id,
                    Some("artifactId") => &mut dependency.artifact_id,
                    Some("version") => &mut dependency.version,
                    Some("scope") => &mut dependency.scope,
                    _ => continue,
                };
                field.push_str(text);
            }
            Ok(Event::End(_)) => {
                if is_at(&stack, DIRECT) {
                    direct.extend(current.take());
                } else if is_at(&stack, MANAGED) {
                    managed.extend(current.take());
                }
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ParseError::InvalidSyntax(format!(
                    "{} at position {}",
                    e,
                    reader.error_position()
                )));
            }
        }
    }

    Ok((direct, managed, properties))
}

impl ManifestParser for PomXmlParser {
    fn manager_type(&self) -> ManagerType {
        ManagerType::Maven
    }

    fn can_parse(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| name == "pom.xml")
    }

    fn parse(&self, path: &str, content: &str) -> Result<Vec<Dependency>, ParseError> {
        let (direct, managed, properties) = read_pom(content)?;

        let managed_versions: HashMap<String, &str> = managed
            .iter()
            .filter(|dependency| dependency.is_complete())
            .map(|dependency| (dependency.name(), dependency.version.as_str()))
            .collect();

        let to_dependency = |dependency: &PomDependency, version: &str| Dependency {
            manager: ManagerType::Maven,
            name: dependency.name(),
            version: clean_version(&resolve(version, &properties)),
            dev: dependency.scope == "test",
            definition: Definition {
                path: path.to_string(),
                raw_line: raw_line(content, dependency.row),
                line: dependency.row + 1,
            },
        };

        let mut results: Vec<Dependency> = direct
            .iter()
            .filter(|dependency| dependency.is_complete())
            .map(|dependency| {
                let version = if dependency.version.is_empty() {
                    managed_versions
                        .get(&dependency.name())
                        .copied()
                        .unwrap_or_default()
                } else {
                    dependency.version.as_str()
                };
                to_dependency(dependency, version)
            })
            .collect();

        let declared: Vec<String> = results.iter().map(|d| d.name.clone()).collect();
        results.extend(
            managed
                .iter()
                .filter(|dependency| {
                    dependency.is_complete() && !declared.contains(&dependency.name())
                })
                .map(|dependency| to_dependency(dependency, &dependency.version)),
        );

        Ok(results)
    }
}
