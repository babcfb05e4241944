//! Rule catalogue

mod allowed_licenses;
mod lockfile;
mod max_libyear;
mod max_package_age;
mod max_updates;
mod min_weekly_downloads;
mod no_any_tag;
mod no_deprecated;
mod no_duplicates;
mod no_multiple_versions;
mod no_pre_release;
mod no_unstable;
mod sorted;

pub use allowed_licenses::AllowedLicenses;
pub use lockfile::LockfilePresent;
pub use max_libyear::MaxLibyear;
pub use max_package_age::MaxPackageAge;
pub use max_updates::{MaxUpdates, UpdateKind};
pub use min_weekly_downloads::MinWeeklyDownloads;
pub use no_any_tag::NoAnyTag;
pub use no_deprecated::NoDeprecated;
pub use no_duplicates::NoDuplicates;
pub use no_multiple_versions::NoMultipleVersions;
pub use no_pre_release::NoPreRelease;
pub use no_unstable::NoUnstable;
pub use sorted::Sorted;

use crate::lint::rule::Rule;
use crate::parser::types::ManagerType;

/// Ecosystems whose registries publish release dates and licenses
pub(crate) const REGISTRY_MANAGERS: &[ManagerType] = &[
    ManagerType::Npm,
    ManagerType::Go,
    ManagerType::Cargo,
    ManagerType::Pip,
    ManagerType::Pyproject,
    ManagerType::Hex,
    ManagerType::Maven,
    ManagerType::Gem,
];

/// Returns every rule in evaluation order
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(Sorted::new()),
        Box::new(NoAnyTag::new()),
        Box::new(NoDuplicates::new()),
        Box::new(NoUnstable::new()),
        Box::new(NoPreRelease::new()),
        Box::new(LockfilePresent::new()),
        Box::new(NoMultipleVersions::new()),
        Box::new(MaxPackageAge::new()),
        Box::new(NoDeprecated::new()),
        Box::new(AllowedLicenses::new()),
        Box::new(MinWeeklyDownloads::new()),
        Box::new(MaxLibyear::new()),
        Box::new(MaxUpdates::new(UpdateKind::Major)),
        Box::new(MaxUpdates::new(UpdateKind::Minor)),
        Box::new(MaxUpdates::new(UpdateKind::Patch)),
    ]
}
