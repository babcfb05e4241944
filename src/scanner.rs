//! Manifest discovery
//!
//! Walks a directory tree, hands every file a parser recognises to that
//! parser, and attaches the lockfile found next to it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::lint::config::Config;
use crate::parser::traits::ManifestParser;
use crate::parser::types::{Dependency, Lockfile, Manifest};
use crate::parser::default_parsers;

/// Directories never descended into
const SKIP_DIRS: [&str; 6] = [".git", "node_modules", "deps", "_build", "tmp", "target"];

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Scan root does not exist or is not a directory: {0}")]
    RootNotFound(PathBuf),
}

pub struct Scanner {
    parsers: Vec<Box<dyn ManifestParser>>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(default_parsers())
    }
}

impl Scanner {
    pub fn new(parsers: Vec<Box<dyn ManifestParser>>) -> Self {
        Self { parsers }
    }

    /// Finds and parses every manifest under `root`.
    ///
    /// Manifests come back in file-name order. Files without dependencies
    /// are dropped, and so are files that cannot be read or parsed.
    pub fn scan(&self, root: &Path, config: &Config) -> Result<Vec<Manifest>, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::RootNotFound(root.to_path_buf()));
        }

        let gitignore = load_gitignore(root);
        let mut manifests = Vec::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_skipped_dir(entry, root, &gitignore, config));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Some(parser) = self.parsers.iter().find(|p| p.can_parse(entry.path())) else {
                continue;
            };

            let relative = relative_path(root, entry.path());
            if gitignore.is_match(&relative) || config.ignored(&relative) {
                debug!("Ignoring manifest {}", relative);
                continue;
            }

            let content = match std::fs::read_to_string(entry.path()) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping unreadable manifest {}: {}", relative, e);
                    continue;
                }
            };

            let dependencies = match parser.parse(&relative, &content) {
                Ok(dependencies) => dependencies,
                Err(e) => {
                    warn!("Skipping manifest {}: {}", relative, e);
                    continue;
                }
            };

            if dependencies.is_empty() {
                debug!("No dependencies in {}", relative);
                continue;
            }

            let lockfile = find_lockfile(root, entry.path(), parser.lockfile_names());
            debug!(
                "Found {} manifest {} with {} dependencies",
                parser.manager_type(),
                relative,
                dependencies.len()
            );

            manifests.push(Manifest {
                manager: parser.manager_type(),
                path: relative,
                dependencies,
                lockfile,
            });
        }

        Ok(manifests)
    }
}

/// One dependency per name, first occurrence wins, in scan order
pub fn unique_dependencies(manifests: &[Manifest]) -> Vec<Dependency> {
    let mut seen = HashSet::new();
    manifests
        .iter()
        .flat_map(|manifest| manifest.dependencies.iter())
        .filter(|dependency| seen.insert(dependency.name.as_str()))
        .cloned()
        .collect()
}

/// `path` relative to `root`, joined with `/`
fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_skipped_dir(entry: &DirEntry, root: &Path, gitignore: &GlobSet, config: &Config) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    if SKIP_DIRS.contains(&name.as_ref()) {
        return true;
    }

    let relative = relative_path(root, entry.path());
    gitignore.is_match(&relative) || config.ignored(&relative)
}

fn find_lockfile(root: &Path, manifest: &Path, names: &[&str]) -> Option<Lockfile> {
    let dir = manifest.parent()?;
    names
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
        .map(|candidate| Lockfile {
            path: relative_path(root, &candidate),
        })
}

/// Compiles the root `.gitignore` into glob patterns.
///
/// Negations are not supported and are skipped. A pattern without an inner
/// `/` matches at any depth; otherwise it is anchored to the root.
fn load_gitignore(root: &Path) -> GlobSet {
    let Ok(content) = std::fs::read_to_string(root.join(".gitignore")) else {
        return GlobSet::empty();
    };

    let mut builder = GlobSetBuilder::new();
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let pattern = line.trim_end_matches('/');
        let patterns = if pattern.contains('/') {
            let anchored = pattern.trim_start_matches('/');
            [anchored.to_string(), format!("{anchored}/**")]
        } else {
            [format!("**/{pattern}"), format!("**/{pattern}/**")]
        };

        for pattern in patterns {
            match GlobBuilder::new(&pattern).literal_separator(true).build() {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => warn!("Skipping .gitignore pattern {:?}: {}", line, e),
            }
        }
    }

    builder.build().unwrap_or_else(|e| {
        warn!("Failed to compile .gitignore patterns: {}", e);
        GlobSet::empty()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::types::ManagerType;
    use std::fs;
    use tempfile::TempDir;

    const PACKAGE_JSON: &str = r#"{
  "dependencies": {
    "react": "^18.2.0"
  }
}"#;

    fn write(root: &Path, path: &str, content: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn scan(root: &Path, config: &Config) -> Vec<Manifest> {
        Scanner::default().scan(root, config).unwrap()
    }

    #[test]
    fn finds_manifests_with_relative_paths_and_lockfiles() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "package.json", PACKAGE_JSON);
        write(root, "yarn.lock", "");
        write(root, "web/package.json", PACKAGE_JSON);
        write(root, "api/go.mod", "module example.com/api\n\nrequire github.com/pkg/errors v0.9.1\n");

        let manifests = scan(root, &Config::default());

        let paths: Vec<_> = manifests.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["api/go.mod", "package.json", "web/package.json"]);

        assert_eq!(manifests[0].manager, ManagerType::Go);
        assert_eq!(
            manifests[1].lockfile,
            Some(Lockfile {
                path: "yarn.lock".to_string()
            })
        );
        assert_eq!(manifests[2].lockfile, None);
        assert_eq!(manifests[2].dependencies[0].definition.path, "web/package.json");
    }

    #[test]
    fn skips_vendor_directories_and_gitignored_paths() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "node_modules/react/package.json", PACKAGE_JSON);
        write(root, "target/package.json", PACKAGE_JSON);
        write(root, "build/package.json", PACKAGE_JSON);
        write(root, "packages/generated/package.json", PACKAGE_JSON);
        write(root, "packages/app/package.json", PACKAGE_JSON);
        write(root, ".gitignore", "# output\nbuild/\n/packages/generated\n");

        let manifests = scan(root, &Config::default());

        assert_eq!(manifests.len(), 1);
        assert_eq!(manifests[0].path, "packages/app/package.json");
    }

    #[test]
    fn applies_configuration_ignore_globs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "package.json", PACKAGE_JSON);
        write(root, "legacy/package.json", PACKAGE_JSON);

        let config = Config::from_yaml("ignore:\n  - \"legacy/**\"\n").unwrap();
        let manifests = scan(root, &config);

        assert_eq!(manifests.len(), 1);
        assert_eq!(manifests[0].path, "package.json");
    }

    #[test]
    fn manifests_without_dependencies_are_dropped() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "package.json", r#"{"name": "empty"}"#);

        assert!(scan(temp_dir.path(), &Config::default()).is_empty());
    }

    #[test]
    fn malformed_manifest_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "broken/Cargo.toml", "[dependencies\nserde = \n");
        write(root, "package.json", PACKAGE_JSON);

        let manifests = scan(root, &Config::default());

        let paths: Vec<_> = manifests.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["package.json"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = Scanner::default().scan(&temp_dir.path().join("missing"), &Config::default());
        assert!(matches!(result, Err(ScanError::RootNotFound(_))));
    }

    #[test]
    fn unique_dependencies_keeps_first_occurrence() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "a/package.json", r#"{"dependencies": {"react": "18.0.0", "lodash": "4.17.21"}}"#);
        write(root, "b/package.json", r#"{"dependencies": {"react": "17.0.0", "zod": "3.22.0"}}"#);

        let manifests = scan(root, &Config::default());
        let unique = unique_dependencies(&manifests);

        let names: Vec<_> = unique.iter().map(|d| (d.name.as_str(), d.version.as_str())).collect();
        assert_eq!(
            names,
            vec![("react", "18.0.0"), ("lodash", "4.17.21"), ("zod", "3.22.0")]
        );
    }
}
