//! RubyGems API implementation

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::metadata::error::SourceError;
use crate::metadata::source::Source;
use crate::metadata::sources::{get_json, http_client};
use crate::metadata::types::{Download, Package, PackageVersion};
use crate::parser::types::ManagerType;

/// Default base URL for rubygems.org
const DEFAULT_BASE_URL: &str = "https://rubygems.org";

#[derive(Debug, Deserialize)]
struct GemVersion {
    number: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    downloads_count: u64,
    #[serde(default)]
    licenses: Option<Vec<String>>,
}

/// Source implementation for rubygems.org
///
/// License and download count come from the requested version only.
pub struct RubyGemsSource {
    client: reqwest::Client,
    base_url: String,
}

impl RubyGemsSource {
    /// Creates a new RubyGemsSource with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.to_string(),
        }
    }
}

impl Default for RubyGemsSource {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl Source for RubyGemsSource {
    fn manager_types(&self) -> &'static [ManagerType] {
        &[ManagerType::Gem]
    }

    async fn fetch_package_data(&self, name: &str, version: &str) -> Result<Package, SourceError> {
        let url = format!("{}/api/v1/versions/{}.json", self.base_url, name);
        let gem_versions: Vec<GemVersion> = get_json(&self.client, &url, name).await?;

        let mut package = Package {
            name: name.to_string(),
            ..Default::default()
        };

        for gem_version in gem_versions {
            if gem_version.number == version {
                package.license = gem_version
                    .licenses
                    .as_ref()
                    .and_then(|licenses| licenses.first().cloned())
                    .unwrap_or_default();
                package.downloads = vec![Download {
                    day: Utc::now().format("%Y-%m-%d").to_string(),
                    downloads: gem_version.downloads_count,
                }];
            }

            if let Some(created_at) = gem_version.created_at {
                package.time.insert(gem_version.number.clone(), created_at);
            }
            package.versions.insert(
                gem_version.number.clone(),
                PackageVersion::new(name, &gem_version.number),
            );
        }

        Ok(package)
    }
}
