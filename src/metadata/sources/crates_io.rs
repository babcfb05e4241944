//! crates.io API implementation

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::metadata::error::SourceError;
use crate::metadata::source::Source;
use crate::metadata::sources::{get_json, http_client};
use crate::metadata::types::{Download, Package, PackageVersion};
use crate::parser::types::ManagerType;

/// Default base URL for crates.io
const DEFAULT_BASE_URL: &str = "https://crates.io";

#[derive(Debug, Deserialize)]
struct CratesResponse {
    #[serde(rename = "crate")]
    krate: CrateInfo,
    #[serde(default)]
    versions: Vec<CrateVersion>,
}

#[derive(Debug, Deserialize)]
struct CrateInfo {
    name: String,
    #[serde(default)]
    recent_downloads: Option<u64>,
    /// Version ids, newest first
    #[serde(default)]
    versions: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct CrateVersion {
    id: u64,
    num: String,
    #[serde(default)]
    license: Option<String>,
    #[serde(default)]
    yanked: bool,
    #[serde(default)]
    yank_message: Option<String>,
    created_at: DateTime<Utc>,
}

impl CrateVersion {
    fn deprecation(&self) -> String {
        match self.yank_message.as_deref() {
            Some(message) if !message.is_empty() => format!("yanked: {message}"),
            _ if self.yanked => "yanked".to_string(),
            _ => String::new(),
        }
    }
}

/// Source implementation for crates.io
pub struct CratesIoSource {
    client: reqwest::Client,
    base_url: String,
}

impl CratesIoSource {
    /// Creates a new CratesIoSource with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.to_string(),
        }
    }
}

impl Default for CratesIoSource {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl Source for CratesIoSource {
    fn manager_types(&self) -> &'static [ManagerType] {
        &[ManagerType::Cargo]
    }

    async fn fetch_package_data(&self, name: &str, _version: &str) -> Result<Package, SourceError> {
        let url = format!("{}/api/v1/crates/{}", self.base_url, name);
        let response: CratesResponse = get_json(&self.client, &url, name).await?;

        let crate_name = response.krate.name;

        // License of the newest version
        let license = response
            .krate
            .versions
            .first()
            .and_then(|newest| response.versions.iter().find(|v| v.id == *newest))
            .and_then(|v| v.license.clone())
            .unwrap_or_default();

        let mut versions = HashMap::new();
        let mut time = HashMap::new();
        for version in &response.versions {
            versions.insert(
                version.num.clone(),
                PackageVersion {
                    name: crate_name.clone(),
                    version: version.num.clone(),
                    deprecated: version.deprecation(),
                },
            );
            time.insert(version.num.clone(), version.created_at);
        }

        Ok(Package {
            name: crate_name,
            versions,
            time,
            license,
            downloads: vec![Download {
                day: Utc::now().format("%Y-%m-%d").to_string(),
                downloads: response.krate.recent_downloads.unwrap_or(0),
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn fetch_package_data_maps_versions_and_yanks() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/api/v1/crates/serde")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "crate": {"name": "serde", "recent_downloads": 5000, "versions": [3, 2, 1]},
                    "versions": [
                        {"id": 3, "num": "1.0.2", "license": "MIT OR Apache-2.0", "yanked": false, "yank_message": null, "created_at": "2024-03-01T00:00:00Z"},
                        {"id": 2, "num": "1.0.1", "license": "MIT", "yanked": true, "yank_message": "broken build", "created_at": "2024-02-01T00:00:00Z"},
                        {"id": 1, "num": "1.0.0", "license": "MIT", "yanked": true, "created_at": "2024-01-01T00:00:00Z"}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let source = CratesIoSource::new(&server.url());
        let package = source.fetch_package_data("serde", "1.0.0").await.unwrap();

        mock.assert_async().await;
        assert_eq!(package.name, "serde");
        assert_eq!(package.license, "MIT OR Apache-2.0");
        assert_eq!(package.versions["1.0.2"].deprecated, "");
        assert_eq!(package.versions["1.0.1"].deprecated, "yanked: broken build");
        assert_eq!(package.versions["1.0.0"].deprecated, "yanked");
        assert_eq!(
            package.time["1.0.0"],
            "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(package.total_downloads(), 5000);
    }

    #[tokio::test]
    async fn fetch_package_data_returns_not_found_for_nonexistent_crate() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/api/v1/crates/nonexistent")
            .with_status(404)
            .with_body(r#"{"errors": [{"detail": "Not Found"}]}"#)
            .create_async()
            .await;

        let source = CratesIoSource::new(&server.url());
        let result = source.fetch_package_data("nonexistent", "1.0.0").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(SourceError::NotFound(_))));
    }
}
