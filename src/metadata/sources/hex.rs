//! Hex package registry API implementation

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::metadata::error::SourceError;
use crate::metadata::source::Source;
use crate::metadata::sources::{get_json, http_client};
use crate::metadata::types::{Download, Package, PackageVersion};
use crate::parser::types::ManagerType;

/// Default base URL for hex.pm
const DEFAULT_BASE_URL: &str = "https://hex.pm";

#[derive(Debug, Deserialize)]
struct HexResponse {
    name: String,
    #[serde(default)]
    meta: HexMeta,
    #[serde(default)]
    downloads: HexDownloads,
    #[serde(default)]
    releases: Vec<HexRelease>,
}

#[derive(Debug, Default, Deserialize)]
struct HexMeta {
    #[serde(default)]
    licenses: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct HexDownloads {
    #[serde(default)]
    week: u64,
}

#[derive(Debug, Deserialize)]
struct HexRelease {
    version: String,
    inserted_at: DateTime<Utc>,
}

/// Source implementation for hex.pm
pub struct HexSource {
    client: reqwest::Client,
    base_url: String,
}

impl HexSource {
    /// Creates a new HexSource with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.to_string(),
        }
    }
}

impl Default for HexSource {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl Source for HexSource {
    fn manager_types(&self) -> &'static [ManagerType] {
        &[ManagerType::Hex]
    }

    async fn fetch_package_data(&self, name: &str, _version: &str) -> Result<Package, SourceError> {
        let url = format!("{}/api/packages/{}", self.base_url, name);
        let response: HexResponse = get_json(&self.client, &url, name).await?;

        let versions: HashMap<_, _> = response
            .releases
            .iter()
            .map(|release| {
                (
                    release.version.clone(),
                    PackageVersion::new(&response.name, &release.version),
                )
            })
            .collect();
        let time = response
            .releases
            .iter()
            .map(|release| (release.version.clone(), release.inserted_at))
            .collect();

        Ok(Package {
            license: response.meta.licenses.first().cloned().unwrap_or_default(),
            downloads: vec![Download {
                day: Utc::now().format("%Y-%m-%d").to_string(),
                downloads: response.downloads.week,
            }],
            name: response.name,
            versions,
            time,
        })
    }
}
