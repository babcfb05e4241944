use std::collections::HashMap;

use crate::lint::config::Config;
use crate::lint::rule::{Level, Mistake, Rule, RuleError, RuleValue, Setting, configure};
use crate::metadata::types::PackagesInfo;
use crate::parser::types::{ManagerType, Manifest};

/// A package may be listed only once per manifest
pub struct NoDuplicates {
    level: Setting<Level>,
}

impl NoDuplicates {
    pub fn new() -> Self {
        Self {
            level: Setting::new(Level::Error),
        }
    }
}

impl Default for NoDuplicates {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for NoDuplicates {
    fn name(&self) -> &'static str {
        "no-duplicates"
    }

    fn message(&self) -> String {
        "Disallow the same package to be listed multiple times".to_string()
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

            let mut counts: HashMap<&str, usize> = HashMap::new();
            for dependency in &manifest.dependencies {
                *counts.entry(dependency.name.as_str()).or_default() += 1;
            }

            // One mistake per duplicated name, at its first occurrence
            let mut reported = Vec::new();
            for dependency in &manifest.dependencies {
                let name = dependency.name.as_str();
                if counts[name] < 2 || reported.contains(&name) {
                    continue;
                }
                reported.push(name);

                if configure(self, config, manifest, dependency)? {
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
    use crate::lint::rules::test_support::{dep, dev_dep, manifest};

    #[test]
    fn reports_first_occurrence_once() {
        let manifests = [manifest(
            "package.json",
            vec![
                dep("pkg1", "1.0.0"),
                dep("pkg2", "1.0.0"),
                dev_dep("pkg1", "1.1.0"),
                dep("pkg1", "1.2.0"),
            ],
        )];

        let mistakes = NoDuplicates::new()
            .check(&manifests, &PackagesInfo::new(), &Config::default())
            .unwrap();

        assert_eq!(mistakes.len(), 1);
        assert_eq!(mistakes[0].definitions[0].line, 1);
    }

    #[test]
    fn same_name_in_different_manifests_is_allowed() {
        let manifests = [
            manifest("package.json", vec![dep("pkg1", "1.0.0")]),
            manifest("web/package.json", vec![dep("pkg1", "1.0.0")]),
        ];

        let mistakes = NoDuplicates::new()
            .check(&manifests, &PackagesInfo::new(), &Config::default())
            .unwrap();

        assert!(mistakes.is_empty());
    }
}
