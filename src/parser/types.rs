//! Common types for manifests and their dependencies

use std::fmt;

use serde::{Deserialize, Serialize};

/// Package ecosystem a manifest belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagerType {
    /// npm (package.json)
    Npm,
    /// Go modules (go.mod)
    Go,
    /// Cargo (Cargo.toml)
    Cargo,
    /// pip (requirements.txt)
    Pip,
    /// Hex (mix.exs)
    Hex,
    /// PEP 621 (pyproject.toml)
    Pyproject,
    /// Maven (pom.xml)
    Maven,
    /// RubyGems (Gemfile)
    Gem,
}

impl ManagerType {
    pub const ALL: [ManagerType; 8] = [
        ManagerType::Npm,
        ManagerType::Go,
        ManagerType::Cargo,
        ManagerType::Pip,
        ManagerType::Hex,
        ManagerType::Pyproject,
        ManagerType::Maven,
        ManagerType::Gem,
    ];

    /// Returns the string representation of the manager type
    pub fn as_str(&self) -> &'static str {
        match self {
            ManagerType::Npm => "npm",
            ManagerType::Go => "go",
            ManagerType::Cargo => "cargo",
            ManagerType::Pip => "pip",
            ManagerType::Hex => "hex",
            ManagerType::Pyproject => "pyproject",
            ManagerType::Maven => "maven",
            ManagerType::Gem => "gem",
        }
    }
}

impl fmt::Display for ManagerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ManagerType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ManagerType::ALL
            .into_iter()
            .find(|manager| manager.as_str() == s)
            .ok_or(())
    }
}

/// Where a dependency (or a whole manifest) is declared
///
/// Only used to point the reader at the offending line; never compared
/// against registry data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Definition {
    /// Manifest path, relative to the scanned root
    pub path: String,
    /// Raw text of the declaring line (trimmed)
    pub raw_line: String,
    /// Line number (1-indexed, 0 when the definition spans the whole file)
    pub line: usize,
}

impl Definition {
    /// A definition pointing at a whole file rather than a single line
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

/// A declared package requirement inside a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub manager: ManagerType,
    pub name: String,
    /// Requested version (may be empty, a range, or a tag like "latest")
    pub version: String,
    /// Declared as a development-only dependency
    pub dev: bool,
    pub definition: Definition,
}

/// Lockfile found next to a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lockfile {
    pub path: String,
}

/// A dependency declaration file and its parsed dependencies
///
/// Dependencies are kept in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub manager: ManagerType,
    pub path: String,
    pub dependencies: Vec<Dependency>,
    pub lockfile: Option<Lockfile>,
}

/// Strips range operators and a leading `v` from a requested version
pub fn clean_version(version: &str) -> String {
    let trimmed =
        version.trim_matches(|c: char| matches!(c, '^' | '~' | '*' | '>' | '<' | '=' | ' '));
    trimmed.strip_prefix('v').unwrap_or(trimmed).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("npm", Some(ManagerType::Npm))]
    #[case("go", Some(ManagerType::Go))]
    #[case("cargo", Some(ManagerType::Cargo))]
    #[case("pyproject", Some(ManagerType::Pyproject))]
    #[case("gem", Some(ManagerType::Gem))]
    #[case("composer", None)]
    fn manager_type_from_str_returns_expected(
        #[case] input: &str,
        #[case] expected: Option<ManagerType>,
    ) {
        assert_eq!(input.parse::<ManagerType>().ok(), expected);
    }

    #[rstest]
    #[case("^1.2.3", "1.2.3")]
    #[case("~1.2.3", "1.2.3")]
    #[case(">= 2.0.0", "2.0.0")]
    #[case("v0.14.0", "0.14.0")]
    #[case("*", "")]
    #[case("latest", "latest")]
    #[case("1.0.0-dev", "1.0.0-dev")]
    fn clean_version_strips_range_operators(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(clean_version(input), expected);
    }
}
