use crate::lint::config::Config;
use crate::lint::rule::{Level, Mistake, Rule, RuleError, RuleValue, Setting, configure, value_as_u64};
use crate::metadata::types::PackagesInfo;
use crate::parser::types::{ManagerType, Manifest};

const DEFAULT_MIN_DOWNLOADS: u64 = 1000;

/// Registries that publish download counts
const DOWNLOAD_MANAGERS: &[ManagerType] = &[
    ManagerType::Npm,
    ManagerType::Cargo,
    ManagerType::Hex,
    ManagerType::Gem,
];

/// Flags packages with too few recent downloads
pub struct MinWeeklyDownloads {
    level: Setting<Level>,
    minimum: Setting<u64>,
}

impl MinWeeklyDownloads {
    pub fn new() -> Self {
        Self {
            level: Setting::new(Level::Error),
            minimum: Setting::new(DEFAULT_MIN_DOWNLOADS),
        }
    }
}

impl Default for MinWeeklyDownloads {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for MinWeeklyDownloads {
    fn name(&self) -> &'static str {
        "min-weekly-downloads"
    }

    fn message(&self) -> String {
        format!(
            "Minimum weekly downloads not met (required: {})",
            self.minimum.value()
        )
    }

    fn level(&self) -> Level {
        self.level.value()
    }

    fn set_level(&mut self, level: Level) {
        self.level.set(level);
    }

    fn set_value(&mut self, value: &RuleValue) -> Result<(), RuleError> {
        self.minimum.set(value_as_u64(self.name(), value)?);
        Ok(())
    }

    fn reset(&mut self) {
        self.level.reset();
        self.minimum.reset();
    }

    fn supported(&self) -> &'static [ManagerType] {
        DOWNLOAD_MANAGERS
    }

    fn check(
        &mut self,
        manifests: &[Manifest],
        info: &PackagesInfo,
        config: &Config,
    ) -> Result<Vec<Mistake>, RuleError> {
        let mut mistakes = Vec::new();

        for manifest in manifests {
            if !self.is_supported(manifest.manager) {
                continue;
            }

            for dependency in &manifest.dependencies {
                if !configure(self, config, manifest, dependency)? {
                    continue;
                }

                let Some(package) = info.get(&dependency.name) else {
                    continue;
                };

                if package.total_downloads() < self.minimum.value() {
                    mistakes.push(Mistake::new(self, vec![dependency.definition.clone()]));
                }
            }
        }

        self.reset();
        Ok(mistakes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::rules::test_support::{dep, manifest, manifest_for, package};
    use crate::metadata::types::Download;

    fn info_with_downloads(name: &str, samples: &[u64]) -> PackagesInfo {
        let mut pkg = package(name, &["1.0.0"]);
        pkg.downloads = samples
            .iter()
            .enumerate()
            .map(|(i, downloads)| Download {
                day: format!("2024-01-0{}", i + 1),
                downloads: *downloads,
            })
            .collect();
        PackagesInfo::from([(name.to_string(), pkg)])
    }

    #[test]
    fn sums_download_samples() {
        let manifests = [manifest("package.json", vec![dep("pkg", "1.0.0")])];

        let below = MinWeeklyDownloads::new()
            .check(&manifests, &info_with_downloads("pkg", &[300, 300, 300]), &Config::default())
            .unwrap();
        assert_eq!(below.len(), 1);

        let above = MinWeeklyDownloads::new()
            .check(&manifests, &info_with_downloads("pkg", &[500, 500]), &Config::default())
            .unwrap();
        assert!(above.is_empty());
    }

    #[test]
    fn registries_without_download_data_are_skipped() {
        let manifests = [manifest_for(
            ManagerType::Pip,
            "requirements.txt",
            vec![dep("pkg", "1.0.0")],
        )];

        let mistakes = MinWeeklyDownloads::new()
            .check(&manifests, &info_with_downloads("pkg", &[]), &Config::default())
            .unwrap();

        assert!(mistakes.is_empty());
    }
}
