use crate::lint::config::Config;
use crate::lint::rule::{Level, Mistake, Rule, RuleError, RuleValue, Setting, configure};
use crate::lint::rules::REGISTRY_MANAGERS;
use crate::metadata::types::PackagesInfo;
use crate::parser::types::{ManagerType, Manifest};

const PRE_RELEASE_TAGS: [&str; 3] = ["alpha", "beta", "rc"];

pub struct NoPreRelease {
    level: Setting<Level>,
}

impl NoPreRelease {
    pub fn new() -> Self {
        Self {
            level: Setting::new(Level::Error),
        }
    }
}

impl Default for NoPreRelease {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for NoPreRelease {
    fn name(&self) -> &'static str {
        "no-pre-release"
    }

    fn message(&self) -> String {
        r#"Disallow the use of "alpha", "beta", "rc", etc. version tags"#.to_string()
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
        REGISTRY_MANAGERS
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

                if PRE_RELEASE_TAGS
                    .iter()
                    .any(|tag| dependency.version.contains(tag))
                {
                    mistakes.push(Mistake::new(self, vec![dependency.definition.clone()]));
                }
            }
        }

        self.reset();
        Ok(mistakes)
    }
}
