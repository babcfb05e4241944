use chrono::{Months, Utc};

use crate::lint::config::Config;
use crate::lint::rule::{Level, Mistake, Rule, RuleError, RuleValue, Setting, configure, value_as_u64};
use crate::lint::rules::REGISTRY_MANAGERS;
use crate::metadata::types::PackagesInfo;
use crate::parser::types::{ManagerType, Manifest};

/// Default maximum age in months
const DEFAULT_MAX_AGE_MONTHS: u64 = 36;

/// Flags requested versions published more than N months ago
pub struct MaxPackageAge {
    level: Setting<Level>,
    months: Setting<u64>,
}

impl MaxPackageAge {
    pub fn new() -> Self {
        Self {
            level: Setting::new(Level::Error),
            months: Setting::new(DEFAULT_MAX_AGE_MONTHS),
        }
    }
}

impl Default for MaxPackageAge {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for MaxPackageAge {
    fn name(&self) -> &'static str {
        "max-package-age"
    }

    fn message(&self) -> String {
        format!(
            "Disallow the use of any package that is older than {} months",
            self.months.value()
        )
    }

    fn level(&self) -> Level {
        self.level.value()
    }

    fn set_level(&mut self, level: Level) {
        self.level.set(level);
    }

    fn set_value(&mut self, value: &RuleValue) -> Result<(), RuleError> {
        self.months.set(value_as_u64(self.name(), value)?);
        Ok(())
    }

    fn reset(&mut self) {
        self.level.reset();
        self.months.reset();
    }

    fn supported(&self) -> &'static [ManagerType] {
        REGISTRY_MANAGERS
    }

    fn check(
        &mut self,
        manifests: &[Manifest],
        info: &PackagesInfo,
        config: &Config,
    ) -> Result<Vec<Mistake>, RuleError> {
        let now = Utc::now();
        let mut mistakes = Vec::new();

        for manifest in manifests {
            if !self.is_supported(manifest.manager) {
                continue;
            }

            for dependency in &manifest.dependencies {
                if !configure(self, config, manifest, dependency)? {
                    continue;
                }

                let Some(published) = info
                    .get(&dependency.name)
                    .and_then(|package| package.time.get(&dependency.version))
                else {
                    continue;
                };

                let months = u32::try_from(self.months.value()).unwrap_or(u32::MAX);
                let Some(cutoff) = now.checked_sub_months(Months::new(months)) else {
                    continue;
                };

                if *published < cutoff {
                    mistakes.push(Mistake::new(self, vec![dependency.definition.clone()]));
                }
            }
        }

        self.reset();
        Ok(mistakes)
    }
}
