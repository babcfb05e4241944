use crate::lint::config::Config;
use crate::lint::rule::{
    Level, Mistake, Rule, RuleError, RuleValue, Setting, configure, value_as_string_list,
};
use crate::lint::rules::REGISTRY_MANAGERS;
use crate::metadata::types::PackagesInfo;
use crate::parser::types::{ManagerType, Manifest};

/// Allowed by default; the empty string covers packages without license data
const DEFAULT_LICENSES: [&str; 3] = ["", "MIT", "Apache-2.0"];

/// Registry-reported license must be in an allow-list
pub struct AllowedLicenses {
    level: Setting<Level>,
    licenses: Setting<Vec<String>>,
}

impl AllowedLicenses {
    pub fn new() -> Self {
        Self {
            level: Setting::new(Level::Error),
            licenses: Setting::new(DEFAULT_LICENSES.iter().map(|l| l.to_string()).collect()),
        }
    }
}

impl Default for AllowedLicenses {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for AllowedLicenses {
    fn name(&self) -> &'static str {
        "allowed-licenses"
    }

    fn message(&self) -> String {
        "The license of the package is not allowed".to_string()
    }

    fn level(&self) -> Level {
        self.level.value()
    }

    fn set_level(&mut self, level: Level) {
        self.level.set(level);
    }

    fn set_value(&mut self, value: &RuleValue) -> Result<(), RuleError> {
        self.licenses.set(value_as_string_list(self.name(), value)?);
        Ok(())
    }

    fn reset(&mut self) {
        self.level.reset();
        self.licenses.reset();
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

                if !self.licenses.get().contains(&package.license) {
                    let mut mistake = Mistake::new(self, vec![dependency.definition.clone()]);
                    mistake.message = format!("{}: {}", mistake.message, package.license);
                    mistakes.push(mistake);
                }
            }
        }

        self.reset();
        Ok(mistakes)
    }
}
