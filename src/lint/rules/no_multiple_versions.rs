use std::collections::HashMap;

use crate::lint::config::Config;
use crate::lint::rule::{Level, Mistake, Rule, RuleError, RuleValue, Setting, configure};
use crate::metadata::types::PackagesInfo;
use crate::parser::types::{Definition, ManagerType, Manifest};

/// Occurrences of one package name across manifests
#[derive(Default)]
struct Occurrences<'a> {
    level: Option<Level>,
    /// First definition of every distinct (path, version) pair
    seen: Vec<(&'a str, &'a str, &'a Definition)>,
}

impl Occurrences<'_> {
    fn distinct_versions(&self) -> usize {
        let mut versions: Vec<&str> = self.seen.iter().map(|(_, version, _)| *version).collect();
        versions.sort_unstable();
        versions.dedup();
        versions.len()
    }
}

/// The same package must be requested at one version everywhere
pub struct NoMultipleVersions {
    level: Setting<Level>,
}

impl NoMultipleVersions {
    pub fn new() -> Self {
        Self {
            level: Setting::new(Level::Error),
        }
    }
}

impl Default for NoMultipleVersions {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for NoMultipleVersions {
    fn name(&self) -> &'static str {
        "no-multiple-versions"
    }

    fn message(&self) -> String {
        "Disallow the use of multiple versions of the same package".to_string()
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
        let mut order: Vec<&str> = Vec::new();
        let mut packages: HashMap<&str, Occurrences> = HashMap::new();

        for manifest in manifests {
            if !self.is_supported(manifest.manager) {
                continue;
            }

            for dependency in &manifest.dependencies {
                if !configure(self, config, manifest, dependency)? {
                    continue;
                }

                let name = dependency.name.as_str();
                let entry = packages.entry(name).or_insert_with(|| {
                    order.push(name);
                    Occurrences::default()
                });

                entry.level = entry.level.max(Some(self.level()));

                let key = (manifest.path.as_str(), dependency.version.as_str());
                if !entry.seen.iter().any(|(p, v, _)| (*p, *v) == key) {
                    entry.seen.push((key.0, key.1, &dependency.definition));
                }
            }
        }

        let mut mistakes = Vec::new();
        for name in order {
            let occurrences = &packages[name];
            if occurrences.distinct_versions() < 2 {
                continue;
            }

            let mut mistake = Mistake::new(
                self,
                occurrences
                    .seen
                    .iter()
                    .map(|(_, _, definition)| (*definition).clone())
                    .collect(),
            );
            mistake.level = occurrences.level.unwrap_or(mistake.level);
            mistake.message = format!("{} ({})", mistake.message, name);
            mistakes.push(mistake);
        }

        self.reset();
        Ok(mistakes)
    }
}
