use crate::lint::config::Config;
use crate::lint::rule::{Level, Mistake, Rule, RuleError, RuleValue, Setting, configure, value_as_f64};
use crate::metadata::types::{Package, PackagesInfo};
use crate::parser::types::{Definition, ManagerType, Manifest};
use crate::version::parse_version;

/// Version component an available update is counted against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Major,
    Minor,
    Patch,
}

impl UpdateKind {
    fn name(self) -> &'static str {
        match self {
            UpdateKind::Major => "max-major-updates",
            UpdateKind::Minor => "max-minor-updates",
            UpdateKind::Patch => "max-patch-updates",
        }
    }

    fn label(self) -> &'static str {
        match self {
            UpdateKind::Major => "major",
            UpdateKind::Minor => "minor",
            UpdateKind::Patch => "patch",
        }
    }

    /// Default maximum share of updatable dependencies, in percent
    fn default_percent(self) -> f64 {
        match self {
            UpdateKind::Major => 20.0,
            UpdateKind::Minor => 40.0,
            UpdateKind::Patch => 60.0,
        }
    }

    /// Whether `candidate` is newer than `current` in this component only
    fn is_update(self, current: (u64, u64, u64), candidate: (u64, u64, u64)) -> bool {
        let (major, minor, patch) = current;
        let (ma, mi, p) = candidate;
        match self {
            UpdateKind::Major => ma > major && mi == minor && p == patch,
            UpdateKind::Minor => mi > minor && ma == major && p == patch,
            UpdateKind::Patch => p > patch && ma == major && mi == minor,
        }
    }

    fn has_update(self, package: &Package, requested: &str) -> bool {
        let current = parse_version(requested);
        package
            .versions
            .keys()
            .any(|version| self.is_update(current, parse_version(version)))
    }
}

/// Caps the percentage of dependencies that lag behind an available
/// major, minor or patch release
pub struct MaxUpdates {
    kind: UpdateKind,
    level: Setting<Level>,
    percent: Setting<f64>,
}

impl MaxUpdates {
    pub fn new(kind: UpdateKind) -> Self {
        Self {
            kind,
            level: Setting::new(Level::Error),
            percent: Setting::new(kind.default_percent()),
        }
    }
}

impl Rule for MaxUpdates {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn message(&self) -> String {
        format!("The total number of {} updates is too high", self.kind.label())
    }

    fn level(&self) -> Level {
        self.level.value()
    }

    fn set_level(&mut self, level: Level) {
        self.level.set(level);
    }

    fn set_value(&mut self, value: &RuleValue) -> Result<(), RuleError> {
        self.percent.set(value_as_f64(self.name(), value)?);
        Ok(())
    }

    fn reset(&mut self) {
        self.level.reset();
        self.percent.reset();
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
        let mut level: Option<Level> = None;
        let mut threshold: Option<f64> = None;
        let mut evaluable = 0usize;
        let mut updatable: Vec<&Definition> = Vec::new();

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

                evaluable += 1;
                level = level.max(Some(self.level()));
                let percent = self.percent.value();
                threshold = Some(threshold.map_or(percent, |t| t.min(percent)));

                if self.kind.has_update(package, &dependency.version) {
                    updatable.push(&dependency.definition);
                }
            }
        }

        self.reset();

        let (Some(level), Some(threshold)) = (level, threshold) else {
            return Ok(Vec::new());
        };

        let share = updatable.len() as f64 / evaluable as f64 * 100.0;
        if share <= threshold {
            return Ok(Vec::new());
        }

        let mut mistake = Mistake::new(self, updatable.into_iter().cloned().collect());
        mistake.level = level;
        mistake.message = format!(
            "{} ({:.0}% of dependencies, allowed {:.0}%)",
            mistake.message, share, threshold
        );

        Ok(vec![mistake])
    }
}
