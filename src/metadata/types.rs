//! Ecosystem-agnostic registry metadata

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Metadata of one upstream package, merged from a source adapter response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    pub name: String,
    /// Known versions keyed by version string
    pub versions: HashMap<String, PackageVersion>,
    /// Publish time keyed by version string
    pub time: HashMap<String, DateTime<Utc>>,
    pub license: String,
    pub downloads: Vec<Download>,
}

impl Package {
    /// Sum of all download samples
    pub fn total_downloads(&self) -> u64 {
        self.downloads.iter().map(|d| d.downloads).sum()
    }
}

/// One published version of a package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageVersion {
    pub name: String,
    pub version: String,
    /// Deprecation reason; empty means not deprecated
    #[serde(deserialize_with = "deserialize_deprecated")]
    pub deprecated: String,
}

impl PackageVersion {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            deprecated: String::new(),
        }
    }

    pub fn is_deprecated(&self) -> bool {
        !self.deprecated.is_empty()
    }
}

/// A (day, downloads) sample
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Download {
    pub day: String,
    pub downloads: u64,
}

/// Package metadata keyed by package name
pub type PackagesInfo = HashMap<String, Package>;

/// Registries report deprecation as a bool, a reason string, or not at all.
/// All three collapse into a reason string.
fn deserialize_deprecated<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Deprecated {
        Flag(bool),
        Reason(String),
    }

    Ok(match Option::<Deprecated>::deserialize(deserializer)? {
        Some(Deprecated::Flag(true)) => "deprecated".to_string(),
        Some(Deprecated::Reason(reason)) => reason,
        Some(Deprecated::Flag(false)) | None => String::new(),
    })
}
