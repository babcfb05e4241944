//! Source trait for fetching package metadata from registries

#[cfg(test)]
use mockall::automock;

use crate::metadata::error::SourceError;
use crate::metadata::types::Package;
use crate::parser::types::ManagerType;

/// Trait for fetching package metadata from one registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Source: Send + Sync {
    /// Ecosystems this source answers for
    fn manager_types(&self) -> &'static [ManagerType];

    /// Fetches metadata for a package
    ///
    /// # Arguments
    /// * `name` - Package name as declared in the manifest
    /// * `version` - Requested version; some registries only expose
    ///   license and download data per version
    ///
    /// # Returns
    /// * `Ok(Package)` - Fields the registry does not provide are left empty
    /// * `Err(SourceError::NotFound)` - The registry does not know the package
    async fn fetch_package_data(&self, name: &str, version: &str) -> Result<Package, SourceError>;
}
