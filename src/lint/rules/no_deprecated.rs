use crate::lint::config::Config;
use crate::lint::rule::{Level, Mistake, Rule, RuleError, RuleValue, Setting, configure};
use crate::metadata::types::PackagesInfo;
use crate::parser::types::{ManagerType, Manifest};

pub struct NoDeprecated {
    level: Setting<Level>,
}

impl NoDeprecated {
    pub fn new() -> Self {
        Self {
            level: Setting::new(Level::Error),
        }
    }
}

impl Default for NoDeprecated {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for NoDeprecated {
    fn name(&self) -> &'static str {
        "no-deprecated"
    }

    fn message(&self) -> String {
        "Disallow the use of deprecated package versions".to_string()
    }

    fn level(&self) -> Level {
        self.level.value()
    }

    fn set_level(&mut self, level: Level) {
        self.level.set(level);
    }

    fn set_value(&mut self, _value: &RuleValue) -> Result<(), RuleError> {
        Ok(())
    }

    fn reset(&mut self) {
        self.level.reset();
    }

    fn supported(&self) -> &'static [ManagerType] {
        &ManagerType::ALL
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

                let Some(version) = info
                    .get(&dependency.name)
                    .and_then(|package| package.versions.get(&dependency.version))
                else {
                    continue;
                };

                if version.is_deprecated() {
                    let mut mistake = Mistake::new(self, vec![dependency.definition.clone()]);
                    mistake.message = format!("{}: {}", mistake.message, version.deprecated);
                    mistakes.push(mistake);
                }
            }
        }

        self.reset();
        Ok(mistakes)
    }
}
