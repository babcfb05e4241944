use chrono::Utc;

use crate::lint::config::Config;
use crate::lint::rule::{Level, Mistake, Rule, RuleError, RuleValue, Setting, configure, value_as_f64};
use crate::lint::rules::REGISTRY_MANAGERS;
use crate::metadata::types::PackagesInfo;
use crate::parser::types::{Definition, ManagerType, Manifest};

const DEFAULT_MAX_LIBYEAR: f64 = 25.0;

/// Number of packages named in the violation message
const TOP_CONTRIBUTORS: usize = 5;

const DAYS_PER_YEAR: f64 = 365.0;

/// Total age of requested versions, in years, must stay under a threshold
pub struct MaxLibyear {
    level: Setting<Level>,
    max: Setting<f64>,
}

impl MaxLibyear {
    pub fn new() -> Self {
        Self {
            level: Setting::new(Level::Error),
            max: Setting::new(DEFAULT_MAX_LIBYEAR),
        }
    }
}

impl Default for MaxLibyear {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for MaxLibyear {
    fn name(&self) -> &'static str {
        "max-libyear"
    }

    fn message(&self) -> String {
        "The total libyear of all dependencies is too high".to_string()
    }

    fn level(&self) -> Level {
        self.level.value()
    }

    fn set_level(&mut self, level: Level) {
        self.level.set(level);
    }

    fn set_value(&mut self, value: &RuleValue) -> Result<(), RuleError> {
        self.max.set(value_as_f64(self.name(), value)?);
        Ok(())
    }

    fn reset(&mut self) {
        self.level.reset();
        self.max.reset();
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
        let mut level: Option<Level> = None;
        let mut threshold: Option<f64> = None;
        let mut contributors: Vec<(f64, &str, &Definition)> = Vec::new();

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

                level = level.max(Some(self.level()));
                let max = self.max.value();
                threshold = Some(threshold.map_or(max, |t| t.min(max)));

                let days = (now - *published).num_days().abs() as f64;
                contributors.push((
                    days / DAYS_PER_YEAR,
                    dependency.name.as_str(),
                    &dependency.definition,
                ));
            }
        }

        self.reset();

        let (Some(level), Some(threshold)) = (level, threshold) else {
            return Ok(Vec::new());
        };

        let total: f64 = contributors.iter().map(|(libyear, _, _)| libyear).sum();
        if total <= threshold {
            return Ok(Vec::new());
        }

        contributors.sort_by(|a, b| b.0.total_cmp(&a.0));
        contributors.truncate(TOP_CONTRIBUTORS);

        let top = contributors
            .iter()
            .map(|(libyear, name, _)| format!("{name} ({libyear:.2})"))
            .collect::<Vec<_>>()
            .join(", ");

        let mut mistake = Mistake::new(
            self,
            contributors
                .iter()
                .map(|(_, _, definition)| (*definition).clone())
                .collect(),
        );
        mistake.level = level;
        mistake.message = format!(
            "{}. Allowed libyear: {:.2}. Total libyear: {:.2}. Top contributors: {}",
            mistake.message, threshold, total, top
        );

        Ok(vec![mistake])
    }
}
