//! PyPI JSON API implementation

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::metadata::error::SourceError;
use crate::metadata::source::Source;
use crate::metadata::sources::{get_json, http_client};
use crate::metadata::types::{Package, PackageVersion};
use crate::parser::types::ManagerType;

/// Default base URL for PyPI
const DEFAULT_BASE_URL: &str = "https://pypi.org";

#[derive(Debug, Deserialize)]
struct PypiResponse {
    info: PypiInfo,
    #[serde(default)]
    releases: HashMap<String, Vec<PypiRelease>>,
}

#[derive(Debug, Deserialize)]
struct PypiInfo {
    name: String,
    #[serde(default)]
    license: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PypiRelease {
    #[serde(default)]
    upload_time_iso_8601: Option<DateTime<Utc>>,
    #[serde(default)]
    yanked: bool,
    #[serde(default)]
    yanked_reason: Option<String>,
}

/// Source implementation for PyPI, shared by pip and pyproject manifests
pub struct PypiSource {
    client: reqwest::Client,
    base_url: String,
}

impl PypiSource {
    /// Creates a new PypiSource with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.to_string(),
        }
    }
}

impl Default for PypiSource {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl Source for PypiSource {
    fn manager_types(&self) -> &'static [ManagerType] {
        &[ManagerType::Pip, ManagerType::Pyproject]
    }

    async fn fetch_package_data(&self, name: &str, _version: &str) -> Result<Package, SourceError> {
        let url = format!("{}/pypi/{}/json", self.base_url, name);
        let response: PypiResponse = get_json(&self.client, &url, name).await?;

        let package_name = response.info.name;
        let mut versions = HashMap::new();
        let mut time = HashMap::new();

        // A release without files has nothing to date it by
        for (version, files) in response.releases {
            let Some(first) = files.first() else {
                continue;
            };

            let deprecated = match first.yanked_reason.as_deref() {
                _ if !first.yanked => String::new(),
                Some(reason) if !reason.is_empty() => format!("yanked: {reason}"),
                _ => "yanked".to_string(),
            };

            if let Some(uploaded) = first.upload_time_iso_8601 {
                time.insert(version.clone(), uploaded);
            }
            versions.insert(
                version.clone(),
                PackageVersion {
                    name: package_name.clone(),
                    version,
                    deprecated,
                },
            );
        }

        Ok(Package {
            name: package_name,
            versions,
            time,
            license: response.info.license.unwrap_or_default(),
            downloads: Vec::new(),
        })
    }
}
