//! Source implementations for fetching package metadata

pub mod crates_io;
pub mod deps_dev;
pub mod hex;
pub mod npm;
pub mod pypi;
pub mod rubygems;

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::warn;

pub use crates_io::CratesIoSource;
pub use deps_dev::DepsDevSource;
pub use hex::HexSource;
pub use npm::NpmSource;
pub use pypi::PypiSource;
pub use rubygems::RubyGemsSource;

use crate::metadata::error::SourceError;
use crate::metadata::source::Source;
use crate::parser::types::ManagerType;

const USER_AGENT: &str = concat!("depshub/", env!("CARGO_PKG_VERSION"));

/// Creates the HTTP client shared by the built-in sources
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            warn!("Failed to build HTTP client, using defaults: {}", e);
            reqwest::Client::new()
        })
}

/// GETs `url` and decodes the JSON body.
///
/// 404 maps to `SourceError::NotFound(name)`; other non-success statuses
/// are `InvalidResponse`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    name: &str,
) -> Result<T, SourceError> {
    let response = client.get(url).send().await?;

    let status = response.status();

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(SourceError::NotFound(name.to_string()));
    }

    if !status.is_success() {
        warn!("Registry returned status {}: {}", status, url);
        return Err(SourceError::InvalidResponse(format!(
            "Unexpected status: {}",
            status
        )));
    }

    response.json().await.map_err(|e| {
        warn!("Failed to parse registry response from {}: {}", url, e);
        SourceError::InvalidResponse(e.to_string())
    })
}

/// Creates the default source for every ecosystem that has one
pub fn default_sources() -> HashMap<ManagerType, Arc<dyn Source>> {
    let sources: Vec<Arc<dyn Source>> = vec![
        Arc::new(NpmSource::default()),
        Arc::new(CratesIoSource::default()),
        Arc::new(PypiSource::default()),
        Arc::new(HexSource::default()),
        Arc::new(RubyGemsSource::default()),
        Arc::new(DepsDevSource::for_manager(ManagerType::Go)),
        Arc::new(DepsDevSource::for_manager(ManagerType::Maven)),
    ];

    sources
        .into_iter()
        .flat_map(|source| {
            source
                .manager_types()
                .iter()
                .map(move |manager| (*manager, Arc::clone(&source)))
                .collect::<Vec<_>>()
        })
        .collect()
}
