use crate::lint::config::Config;
use crate::lint::rule::{Level, Mistake, Rule, RuleError, RuleValue, Setting, configure};
use crate::metadata::types::PackagesInfo;
use crate::parser::types::{ManagerType, Manifest};

/// Requested versions that accept any release
const ANY_TAGS: [&str; 3] = ["", "*", "latest"];

pub struct NoAnyTag {
    level: Setting<Level>,
}

impl NoAnyTag {
    pub fn new() -> Self {
        Self {
            level: Setting::new(Level::Warning),
        }
    }
}

impl Default for NoAnyTag {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for NoAnyTag {
    fn name(&self) -> &'static str {
        "no-any-tag"
    }

    fn message(&self) -> String {
        r#"Disallow the use of the "any" version tag"#.to_string()
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

            for dependency in &manifest.dependencies {
                if !configure(self, config, manifest, dependency)? {
                    continue;
                }

                if ANY_TAGS.contains(&dependency.version.as_str()) {
                    mistakes.push(Mistake::new(self, vec![dependency.definition.clone()]));
                }
            }
        }

        self.reset();
        Ok(mistakes)
    }
}
