use crate::lint::config::Config;
use crate::lint::rule::{Level, Mistake, Rule, RuleError, RuleValue, Setting, configure};
use crate::metadata::types::PackagesInfo;
use crate::parser::types::{ManagerType, Manifest};
use crate::version::{is_numeric, parse_version};

/// Flags requested versions below 1.0.0.
///
/// Tags and empty requirements have no major component and are left to
/// `no-any-tag`.
pub struct NoUnstable {
    level: Setting<Level>,
}

impl NoUnstable {
    pub fn new() -> Self {
        Self {
            level: Setting::new(Level::Error),
        }
    }
}

impl Default for NoUnstable {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for NoUnstable {
    fn name(&self) -> &'static str {
        "no-unstable"
    }

    fn message(&self) -> String {
        "Disallow the use of unstable versions (< 1.0.0)".to_string()
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

                if !is_numeric(&dependency.version) {
                    continue;
                }

                let (major, _, _) = parse_version(&dependency.version);
                if major == 0 {
                    mistakes.push(Mistake::new(self, vec![dependency.definition.clone()]));
                }
            }
        }

        self.reset();
        Ok(mistakes)
    }
}
