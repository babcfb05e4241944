use crate::lint::config::Config;
use crate::lint::rule::{Level, Mistake, Rule, RuleError, RuleValue, Setting};
use crate::metadata::types::PackagesInfo;
use crate::parser::types::{Definition, ManagerType, Manifest};

/// Ecosystems that produce a lockfile next to the manifest
const LOCKFILE_MANAGERS: &[ManagerType] = &[
    ManagerType::Npm,
    ManagerType::Cargo,
    ManagerType::Pip,
    ManagerType::Hex,
    ManagerType::Gem,
];

/// Manifests must be accompanied by a lockfile
pub struct LockfilePresent {
    level: Setting<Level>,
}

impl LockfilePresent {
    pub fn new() -> Self {
        Self {
            level: Setting::new(Level::Error),
        }
    }
}

impl Default for LockfilePresent {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for LockfilePresent {
    fn name(&self) -> &'static str {
        "lockfile"
    }

    fn message(&self) -> String {
        "The lockfile should be always present".to_string()
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
        LOCKFILE_MANAGERS
    }

    fn check(
        &mut self,
        manifests: &[Manifest],
        _info: &PackagesInfo,
        config: &Config,
    ) -> Result<Vec<Mistake>, RuleError> {
        let mut mistakes = Vec::new();

        for manifest in manifests {
            if !self.is_supported(manifest.manager) || manifest.lockfile.is_some() {
                continue;
            }

            // Manifest-wide check: only policies without a package list match
            config.apply(&manifest.path, "", self)?;
            if self.level() != Level::Disabled {
                mistakes.push(Mistake::new(self, vec![Definition::file(&manifest.path)]));
            }
        }

        self.reset();
        Ok(mistakes)
    }
}
