//! npm registry API implementation

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::metadata::error::SourceError;
use crate::metadata::source::Source;
use crate::metadata::sources::{get_json, http_client};
use crate::metadata::types::{Download, Package, PackageVersion};
use crate::parser::types::ManagerType;

/// Default base URL for npm registry
const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Default base URL for the npm downloads API
const DEFAULT_DOWNLOADS_URL: &str = "https://api.npmjs.org";

/// Response from npm registry API
#[derive(Debug, Deserialize)]
struct NpmPackageResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    versions: HashMap<String, PackageVersion>,
    /// Publish times, plus the `created` and `modified` bookkeeping keys
    #[serde(default)]
    time: HashMap<String, serde_json::Value>,
    #[serde(default)]
    license: Option<NpmLicense>,
}

/// License is either an SPDX string or a legacy `{ "type": ... }` object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NpmLicense {
    Spdx(String),
    Object {
        #[serde(rename = "type", default)]
        kind: String,
    },
}

#[derive(Debug, Deserialize)]
struct NpmDownloadsResponse {
    #[serde(default)]
    downloads: Vec<Download>,
}

/// Source implementation for the npm registry
pub struct NpmSource {
    client: reqwest::Client,
    registry_url: String,
    downloads_url: String,
}

impl NpmSource {
    /// Creates a new NpmSource with custom base URLs
    pub fn new(registry_url: &str, downloads_url: &str) -> Self {
        Self {
            client: http_client(),
            registry_url: registry_url.to_string(),
            downloads_url: downloads_url.to_string(),
        }
    }

    /// Encode package name for URL (handles scoped packages)
    fn encode_package_name(package_name: &str) -> String {
        if package_name.starts_with('@') {
            // Scoped package: @scope/name -> @scope%2Fname
            package_name.replace('/', "%2F")
        } else {
            package_name.to_string()
        }
    }

    /// Daily download samples for the last week. Failures leave the list empty.
    async fn fetch_downloads(&self, name: &str) -> Vec<Download> {
        let url = format!("{}/downloads/range/last-week/{}", self.downloads_url, name);

        match get_json::<NpmDownloadsResponse>(&self.client, &url, name).await {
            Ok(response) => response.downloads,
            Err(e) => {
                warn!("Failed to fetch npm downloads for {}: {}", name, e);
                Vec::new()
            }
        }
    }
}

impl Default for NpmSource {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_URL, DEFAULT_DOWNLOADS_URL)
    }
}

#[async_trait::async_trait]
impl Source for NpmSource {
    fn manager_types(&self) -> &'static [ManagerType] {
        &[ManagerType::Npm]
    }

    async fn fetch_package_data(&self, name: &str, _version: &str) -> Result<Package, SourceError> {
        let url = format!("{}/{}", self.registry_url, Self::encode_package_name(name));
        let response: NpmPackageResponse = get_json(&self.client, &url, name).await?;

        let time = response
            .time
            .into_iter()
            .filter_map(|(version, value)| {
                let published = value.as_str()?.parse::<DateTime<Utc>>().ok()?;
                Some((version, published))
            })
            .collect();

        let license = match response.license {
            Some(NpmLicense::Spdx(license)) => license,
            Some(NpmLicense::Object { kind }) => kind,
            None => String::new(),
        };

        Ok(Package {
            name: if response.name.is_empty() {
                name.to_string()
            } else {
                response.name
            },
            versions: response.versions,
            time,
            license,
            downloads: self.fetch_downloads(name).await,
        })
    }
}
