//! Concurrent package metadata fetching backed by the file cache

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use futures::future::join_all;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, error, info, warn};

use crate::config::{CACHE_TTL_HOURS, FETCH_TIMEOUT, MAX_CONCURRENT_FETCHES};
use crate::metadata::cache::FileCache;
use crate::metadata::error::SourceError;
use crate::metadata::source::Source;
use crate::metadata::types::{Package, PackagesInfo};
use crate::parser::types::{Dependency, ManagerType};

/// Resolves package metadata for a set of dependencies.
///
/// Each dependency is looked up in the cache first and fetched from the
/// source for its ecosystem on a miss. At most `max_concurrent` fetches
/// run at once.
pub struct Fetcher {
    cache: Arc<FileCache>,
    sources: HashMap<ManagerType, Arc<dyn Source>>,
    max_concurrent: usize,
    ttl: TimeDelta,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(cache: Arc<FileCache>, sources: HashMap<ManagerType, Arc<dyn Source>>) -> Self {
        Self {
            cache,
            sources,
            max_concurrent: MAX_CONCURRENT_FETCHES,
            ttl: TimeDelta::hours(CACHE_TTL_HOURS),
            timeout: FETCH_TIMEOUT,
        }
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Cache key: ecosystem tag and package name
    fn cache_key(dependency: &Dependency) -> String {
        format!("{}-{}", dependency.manager, dependency.name)
    }

    /// Fetches metadata for every dependency.
    ///
    /// Never fails as a whole: a dependency whose fetch errors, times out,
    /// or whose ecosystem has no source is logged and left out of the
    /// result. Entries are keyed by the dependency name.
    pub async fn fetch(&self, dependencies: &[Dependency]) -> PackagesInfo {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let (tx, mut rx) = mpsc::unbounded_channel::<(String, Package)>();

        let handles: Vec<_> = dependencies
            .iter()
            .filter_map(|dependency| {
                let Some(source) = self.sources.get(&dependency.manager) else {
                    debug!(
                        "No source for {}/{}, skipping",
                        dependency.manager, dependency.name
                    );
                    return None;
                };

                let source = Arc::clone(source);
                let cache = Arc::clone(&self.cache);
                let semaphore = Arc::clone(&semaphore);
                let tx = tx.clone();
                let dependency = dependency.clone();
                let ttl = self.ttl;
                let timeout = self.timeout;

                Some(tokio::spawn(async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return;
                    };

                    if let Some(package) =
                        fetch_one(&cache, source.as_ref(), &dependency, ttl, timeout).await
                    {
                        // Receiver outlives every task
                        let _ = tx.send((dependency.name, package));
                    }
                }))
            })
            .collect();

        // Only the task clones keep the channel open now
        drop(tx);

        for result in join_all(handles).await {
            if let Err(e) = result {
                error!("Fetch task failed: {}", e);
            }
        }

        let mut packages = PackagesInfo::new();
        while let Some((name, package)) = rx.recv().await {
            packages.insert(name, package);
        }

        info!(
            "Resolved metadata for {}/{} dependencies",
            packages.len(),
            dependencies.len()
        );

        packages
    }
}

/// Cache lookup, then a bounded source call, then write-back
async fn fetch_one(
    cache: &FileCache,
    source: &dyn Source,
    dependency: &Dependency,
    ttl: TimeDelta,
    timeout: Duration,
) -> Option<Package> {
    let key = Fetcher::cache_key(dependency);

    match cache.get::<Package>(&key) {
        Ok(Some(package)) => return Some(package),
        Ok(None) => {}
        Err(e) => warn!("Failed to read cache entry {}: {}", key, e),
    }

    let result = tokio::time::timeout(
        timeout,
        source.fetch_package_data(&dependency.name, &dependency.version),
    )
    .await
    .unwrap_or(Err(SourceError::Timeout(timeout)));

    match result {
        Ok(package) => {
            if let Err(e) = cache.set(&key, &package, ttl) {
                warn!("Failed to cache {}: {}", key, e);
            }
            Some(package)
        }
        Err(SourceError::NotFound(_)) => {
            warn!(
                "Package not found: {}/{}",
                dependency.manager, dependency.name
            );
            None
        }
        Err(e) => {
            error!(
                "Failed to fetch package data for {}/{}: {}",
                dependency.manager, dependency.name, e
            );
            None
        }
    }
}
