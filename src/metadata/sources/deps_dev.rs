//! deps.dev API implementation, used for Go modules and Maven artifacts

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;
use tracing::warn;

use crate::metadata::error::SourceError;
use crate::metadata::source::Source;
use crate::metadata::sources::{get_json, http_client};
use crate::metadata::types::{Package, PackageVersion};
use crate::parser::types::ManagerType;

/// Default base URL for deps.dev
const DEFAULT_BASE_URL: &str = "https://api.deps.dev";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageResponse {
    #[serde(default)]
    versions: Vec<VersionSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionSummary {
    version_key: VersionKey,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct VersionKey {
    version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionResponse {
    #[serde(default)]
    licenses: Vec<String>,
}

/// Source implementation for deps.dev, bound to one package system
pub struct DepsDevSource {
    client: reqwest::Client,
    base_url: String,
    manager: ManagerType,
}

impl DepsDevSource {
    /// Creates a new DepsDevSource for `manager` with a custom base URL
    pub fn new(base_url: &str, manager: ManagerType) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.to_string(),
            manager,
        }
    }

    /// Creates a DepsDevSource for `manager` against the public API
    pub fn for_manager(manager: ManagerType) -> Self {
        Self::new(DEFAULT_BASE_URL, manager)
    }

    fn system(&self) -> &'static str {
        match self.manager {
            ManagerType::Maven => "maven",
            _ => "go",
        }
    }

    /// Builds `{base}/v3/systems/{system}/packages/{name}[/versions/{version}]`
    /// with every segment percent-encoded (Go module paths contain `/`).
    fn url(&self, system: &str, name: &str, version: Option<&str>) -> Result<String, SourceError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SourceError::InvalidResponse(format!("invalid base url: {e}")))?;

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                SourceError::InvalidResponse(format!("base url cannot be a base: {}", self.base_url))
            })?;
            segments
                .pop_if_empty()
                .extend(["v3", "systems", system, "packages", name]);
            if let Some(version) = version {
                segments.extend(["versions", version]);
            }
        }

        Ok(url.to_string())
    }
}

#[async_trait::async_trait]
impl Source for DepsDevSource {
    fn manager_types(&self) -> &'static [ManagerType] {
        match self.manager {
            ManagerType::Maven => &[ManagerType::Maven],
            _ => &[ManagerType::Go],
        }
    }

    async fn fetch_package_data(&self, name: &str, version: &str) -> Result<Package, SourceError> {
        let system = self.system();
        let url = self.url(system, name, None)?;
        let response: PackageResponse = get_json(&self.client, &url, name).await?;

        let mut versions = HashMap::new();
        let mut time = HashMap::new();
        for summary in response.versions {
            let version = summary.version_key.version;
            if let Some(published_at) = summary.published_at {
                time.insert(version.clone(), published_at);
            }
            versions.insert(version.clone(), PackageVersion::new(name, &version));
        }

        let license = if version.is_empty() {
            String::new()
        } else {
            let url = self.url(system, name, Some(version))?;
            match get_json::<VersionResponse>(&self.client, &url, name).await {
                Ok(details) => details.licenses.into_iter().next().unwrap_or_default(),
                Err(e) => {
                    warn!("Failed to fetch license for {}@{}: {}", name, version, e);
                    String::new()
                }
            }
        };

        Ok(Package {
            name: name.to_string(),
            versions,
            time,
            license,
            downloads: Vec::new(),
        })
    }
}
