//! Policy file: ignore globs and per-manifest rule overrides

use std::path::{Path, PathBuf};

use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::CONFIG_FILE_NAMES;
use crate::lint::rule::{Level, Mistake, Rule, RuleError, RuleValue};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid glob pattern {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        source: globset::Error,
    },
}

/// Top-level shape of `depshub.yaml`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    version: u32,
    ignore: Vec<String>,
    manifest_files: Vec<ManifestFileConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ManifestFileConfig {
    filter: String,
    packages: Vec<String>,
    rules: Vec<RuleOverride>,
}

/// Override for one rule inside a manifest policy
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuleOverride {
    pub name: String,
    pub disabled: bool,
    pub level: Option<Level>,
    pub value: Option<RuleValue>,
}

/// A manifest policy with its filter compiled
#[derive(Debug)]
struct Policy {
    filter: GlobMatcher,
    packages: Vec<String>,
    rules: Vec<RuleOverride>,
}

impl Policy {
    fn matches(&self, manifest_path: &str, package: &str) -> bool {
        self.filter.is_match(manifest_path)
            && (self.packages.is_empty() || self.packages.iter().any(|p| p == package))
    }
}

/// Loaded policy configuration.
///
/// Read-only during a lint run except through [`Config::apply`], which
/// mutates the rule it is given.
#[derive(Debug)]
pub struct Config {
    version: u32,
    ignore: GlobSet,
    policies: Vec<Policy>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 0,
            ignore: GlobSet::empty(),
            policies: Vec::new(),
        }
    }
}

/// `*` stays within one path component, `**` crosses components
fn compile_glob(pattern: &str) -> Result<Glob, ConfigError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| ConfigError::InvalidGlob {
            pattern: pattern.to_string(),
            source,
        })
}

fn compile_globset(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(compile_glob(pattern)?);
    }
    builder.build().map_err(|source| ConfigError::InvalidGlob {
        pattern: patterns.join(", "),
        source,
    })
}

impl Config {
    /// Loads the policy file.
    ///
    /// With an explicit path the file must exist. Otherwise `depshub.yaml`
    /// or `depshub.yml` is looked up in `root`, and a missing file yields
    /// the default configuration. A malformed file is always an error.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => path.to_path_buf(),
            None => match CONFIG_FILE_NAMES
                .iter()
                .map(|name| root.join(name))
                .find(|path| path.is_file())
            {
                Some(path) => path,
                None => {
                    debug!("No configuration file in {:?}, using defaults", root);
                    return Ok(Self::default());
                }
            },
        };

        info!("Loading configuration from {:?}", path);
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        Self::from_yaml(&content)
    }

    /// Parses and compiles a policy document
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty document is an empty configuration
        let file: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(content)?
        };

        let policies = file
            .manifest_files
            .into_iter()
            .map(|manifest_file| {
                // A policy without a filter applies to every manifest
                let filter = if manifest_file.filter.is_empty() {
                    "**"
                } else {
                    manifest_file.filter.as_str()
                };

                Ok(Policy {
                    filter: compile_glob(filter)?.compile_matcher(),
                    packages: manifest_file.packages,
                    rules: manifest_file.rules,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            version: file.version,
            ignore: compile_globset(&file.ignore)?,
            policies,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Whether `path` (relative to the scanned root) matches an ignore glob
    pub fn ignored(&self, path: &str) -> bool {
        self.ignore.is_match(path)
    }

    /// Resets `rule` and layers every matching policy on top of it.
    ///
    /// Policies are evaluated in file order and later ones win. Within a
    /// policy only the first override naming the rule counts: `disabled`
    /// forces Level::Disabled and skips the rest of that override,
    /// otherwise level and value are applied when present.
    pub fn apply<R: Rule + ?Sized>(
        &self,
        manifest_path: &str,
        package: &str,
        rule: &mut R,
    ) -> Result<(), RuleError> {
        rule.reset();

        for policy in &self.policies {
            if !policy.matches(manifest_path, package) {
                continue;
            }

            let Some(rule_override) = policy.rules.iter().find(|r| r.name == rule.name()) else {
                continue;
            };

            if rule_override.disabled {
                rule.set_level(Level::Disabled);
                continue;
            }

            if let Some(level) = rule_override.level {
                rule.set_level(level);
            }

            if let Some(value) = &rule_override.value {
                rule.set_value(value)?;
            }
        }

        Ok(())
    }

    /// Drops ignored definitions and disabled mistakes.
    ///
    /// A mistake left with no definitions is dropped too, so every returned
    /// mistake has at least one location.
    pub fn filter_mistakes(&self, mistakes: Vec<Mistake>) -> Vec<Mistake> {
        mistakes
            .into_iter()
            .filter(|mistake| mistake.level != Level::Disabled)
            .filter_map(|mut mistake| {
                mistake
                    .definitions
                    .retain(|definition| !self.ignored(&definition.path));
                (!mistake.definitions.is_empty()).then_some(mistake)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::rule::Setting;
    use crate::metadata::types::PackagesInfo;
    use crate::parser::types::{Definition, ManagerType, Manifest};
    use tempfile::TempDir;

    /// Minimal rule with an integer value
    struct StubRule {
        level: Setting<Level>,
        value: Setting<u64>,
    }

    impl StubRule {
        fn new() -> Self {
            Self {
                level: Setting::new(Level::Error),
                value: Setting::new(10),
            }
        }
    }

    impl Rule for StubRule {
        fn name(&self) -> &'static str {
            "stub"
        }
        fn message(&self) -> String {
            format!("stub {}", self.value.value())
        }
        fn level(&self) -> Level {
            self.level.value()
        }
        fn set_level(&mut self, level: Level) {
            self.level.set(level);
        }
        fn set_value(&mut self, value: &RuleValue) -> Result<(), RuleError> {
            self.value
                .set(crate::lint::rule::value_as_u64(self.name(), value)?);
            Ok(())
        }
        fn reset(&mut self) {
            self.level.reset();
            self.value.reset();
        }
        fn supported(&self) -> &'static [ManagerType] {
            &ManagerType::ALL
        }
        fn check(
            &mut self,
            _manifests: &[Manifest],
            _info: &PackagesInfo,
            _config: &Config,
        ) -> Result<Vec<Mistake>, RuleError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn from_yaml_parses_full_document() {
        let config = Config::from_yaml(
            r#"
version: 1
ignore:
  - "vendor/**"
manifest_files:
  - filter: "*.lock"
    packages: ["test-package"]
    rules:
      - name: "stub"
        level: "warning"
        value: 42
"#,
        )
        .unwrap();

        assert_eq!(config.version(), 1);
        assert!(config.ignored("vendor/a/package.json"));
        assert!(!config.ignored("package.json"));

        let mut rule = StubRule::new();
        config.apply("yarn.lock", "test-package", &mut rule).unwrap();
        assert_eq!(rule.level(), Level::Warning);
        assert_eq!(rule.value.value(), 42);
    }

    #[test]
    fn from_yaml_rejects_malformed_document() {
        assert!(matches!(
            Config::from_yaml("invalid: yaml: content"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn from_yaml_rejects_unknown_level() {
        let result = Config::from_yaml(
            "manifest_files:\n  - filter: \"**\"\n    rules:\n      - name: stub\n        level: fatal\n",
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn from_yaml_rejects_invalid_glob() {
        let result = Config::from_yaml("ignore:\n  - \"a[\"\n");
        assert!(matches!(result, Err(ConfigError::InvalidGlob { .. })));
    }

    #[test]
    fn apply_skips_non_matching_filter_and_package() {
        let config = Config::from_yaml(
            r#"
manifest_files:
  - filter: "*.lock"
    rules:
      - name: stub
        disabled: true
  - filter: "**"
    packages: [other]
    rules:
      - name: stub
        level: warning
"#,
        )
        .unwrap();

        let mut rule = StubRule::new();
        config.apply("package.json", "lodash", &mut rule).unwrap();
        assert_eq!(rule.level(), Level::Error);

        config.apply("yarn.lock", "lodash", &mut rule).unwrap();
        assert_eq!(rule.level(), Level::Disabled);
    }

    #[test]
    fn apply_later_policies_override_earlier_ones() {
        let config = Config::from_yaml(
            r#"
manifest_files:
  - filter: "**"
    rules:
      - name: stub
        disabled: true
  - filter: "apps/**"
    rules:
      - name: stub
        level: warning
        value: 5
"#,
        )
        .unwrap();

        let mut rule = StubRule::new();
        config.apply("apps/web/package.json", "react", &mut rule).unwrap();
        assert_eq!(rule.level(), Level::Warning);
        assert_eq!(rule.value.value(), 5);

        config.apply("package.json", "react", &mut rule).unwrap();
        assert_eq!(rule.level(), Level::Disabled);
        assert_eq!(rule.value.value(), 10);
    }

    #[test]
    fn apply_is_idempotent() {
        let config = Config::from_yaml(
            "manifest_files:\n  - filter: \"**\"\n    rules:\n      - name: stub\n        value: 3\n",
        )
        .unwrap();

        let mut rule = StubRule::new();
        config.apply("package.json", "a", &mut rule).unwrap();
        config.apply("package.json", "a", &mut rule).unwrap();
        assert_eq!(rule.value.value(), 3);
        assert_eq!(rule.level(), Level::Error);
    }

    #[test]
    fn apply_surfaces_value_shape_errors() {
        let config = Config::from_yaml(
            "manifest_files:\n  - filter: \"**\"\n    rules:\n      - name: stub\n        value: lots\n",
        )
        .unwrap();

        let mut rule = StubRule::new();
        let result = config.apply("package.json", "a", &mut rule);
        assert!(matches!(result, Err(RuleError::InvalidValue { .. })));
    }

    #[test]
    fn glob_star_does_not_cross_directories() {
        let config = Config::from_yaml("ignore:\n  - \"*.json\"\n").unwrap();
        assert!(config.ignored("package.json"));
        assert!(!config.ignored("web/package.json"));
    }

    #[test]
    fn filter_mistakes_drops_ignored_definitions_and_disabled_mistakes() {
        let config = Config::from_yaml("ignore:\n  - \"legacy/**\"\n").unwrap();
        let rule = StubRule::new();

        let mut disabled = Mistake::new(&rule, vec![Definition::file("package.json")]);
        disabled.level = Level::Disabled;

        let mistakes = vec![
            Mistake::new(
                &rule,
                vec![
                    Definition::file("legacy/package.json"),
                    Definition::file("package.json"),
                ],
            ),
            Mistake::new(&rule, vec![Definition::file("legacy/Cargo.toml")]),
            disabled,
        ];

        let filtered = config.filter_mistakes(mistakes);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].definitions, vec![Definition::file("package.json")]);
    }

    #[test]
    fn load_returns_default_when_no_file_in_root() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(temp_dir.path(), None).unwrap();
        assert_eq!(config.version(), 0);
        assert!(!config.ignored("package.json"));
    }

    #[test]
    fn load_reads_yml_from_root() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("depshub.yml"), "version: 2\n").unwrap();

        let config = Config::load(temp_dir.path(), None).unwrap();
        assert_eq!(config.version(), 2);
    }

    #[test]
    fn load_fails_for_missing_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load(temp_dir.path(), Some(&temp_dir.path().join("custom.yaml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
