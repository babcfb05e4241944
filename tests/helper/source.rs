//! Source test utilities

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tempfile::TempDir;

use depshub::metadata::error::SourceError;
use depshub::metadata::source::Source;
use depshub::metadata::types::{Download, Package, PackageVersion};
use depshub::metadata::{Fetcher, FileCache};
use depshub::parser::types::ManagerType;

/// In-memory source serving fixed package documents
pub struct StaticSource {
    manager: ManagerType,
    packages: HashMap<String, Package>,
}

impl StaticSource {
    pub fn new(manager: ManagerType) -> Self {
        Self {
            manager,
            packages: HashMap::new(),
        }
    }

    /// Adds a package whose versions were each published `age_days` ago
    pub fn with_package(
        mut self,
        name: &str,
        versions: &[(&str, i64)],
        license: &str,
        weekly_downloads: u64,
    ) -> Self {
        let now = Utc::now();
        let package = Package {
            name: name.to_string(),
            versions: versions
                .iter()
                .map(|(v, _)| (v.to_string(), PackageVersion::new(name, v)))
                .collect(),
            time: versions
                .iter()
                .map(|(v, age_days)| (v.to_string(), now - TimeDelta::days(*age_days)))
                .collect(),
            license: license.to_string(),
            downloads: vec![Download {
                day: "2024-01-01".to_string(),
                downloads: weekly_downloads,
            }],
        };
        self.packages.insert(name.to_string(), package);
        self
    }

    /// Marks one version of an added package as deprecated
    pub fn deprecate(mut self, name: &str, version: &str, reason: &str) -> Self {
        if let Some(v) = self
            .packages
            .get_mut(name)
            .and_then(|package| package.versions.get_mut(version))
        {
            v.deprecated = reason.to_string();
        }
        self
    }
}

#[async_trait]
impl Source for StaticSource {
    fn manager_types(&self) -> &'static [ManagerType] {
        match self.manager {
            ManagerType::Npm => &[ManagerType::Npm],
            ManagerType::Cargo => &[ManagerType::Cargo],
            _ => &[],
        }
    }

    async fn fetch_package_data(&self, name: &str, _version: &str) -> Result<Package, SourceError> {
        self.packages
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(name.to_string()))
    }
}

/// Creates an empty cache in a temporary directory
pub fn create_test_cache() -> (TempDir, Arc<FileCache>) {
    let temp_dir = TempDir::new().unwrap();
    let cache = FileCache::open(&temp_dir.path().join("packages.json")).unwrap();
    (temp_dir, Arc::new(cache))
}

/// Creates a fetcher that serves every source from memory
pub fn create_test_fetcher(cache: Arc<FileCache>, sources: Vec<StaticSource>) -> Fetcher {
    let sources = sources
        .into_iter()
        .map(|source| (source.manager, Arc::new(source) as Arc<dyn Source>))
        .collect::<HashMap<_, _>>();
    Fetcher::new(cache, sources)
}
