use crate::lint::config::Config;
use crate::lint::rule::{Level, Mistake, Rule, RuleError, RuleValue, Setting, configure};
use crate::metadata::types::PackagesInfo;
use crate::parser::types::{ManagerType, Manifest};

/// Dependencies of one kind must be declared in ascending name order
pub struct Sorted {
    level: Setting<Level>,
}

impl Sorted {
    pub fn new() -> Self {
        Self {
            level: Setting::new(Level::Error),
        }
    }
}

impl Default for Sorted {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for Sorted {
    fn name(&self) -> &'static str {
        "sorted"
    }

    fn message(&self) -> String {
        "All the dependencies should be ordered alphabetically".to_string()
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
        _info: &PackagesInfo,
        config: &Config,
    ) -> Result<Vec<Mistake>, RuleError> {
        let mut mistakes = Vec::new();

        for manifest in manifests {
            if !self.is_supported(manifest.manager) {
                continue;
            }

            for pair in manifest.dependencies.windows(2) {
                let (current, next) = (&pair[0], &pair[1]);

                // dependencies and dev-dependencies are ordered independently
                if current.dev != next.dev || current.name <= next.name {
                    continue;
                }

                if configure(self, config, manifest, current)? {
                    mistakes.push(Mistake::new(self, vec![current.definition.clone()]));
                }
            }
        }

        self.reset();
        Ok(mistakes)
    }
}
