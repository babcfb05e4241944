//! Lint layer
//!
//! Applies the rule catalogue to scanned manifests and their registry
//! metadata.
//!
//! # Modules
//!
//! - [`config`]: policy file loading and per-dependency rule configuration
//! - [`rule`]: `Rule` trait, `Level`, `Mistake`
//! - [`rules`]: the rule catalogue

pub mod config;
pub mod rule;
pub mod rules;

use std::path::Path;

use tracing::{debug, info};

use crate::metadata::fetcher::Fetcher;
use crate::metadata::types::PackagesInfo;
use crate::parser::types::Manifest;
use crate::scanner::{ScanError, Scanner, unique_dependencies};

pub use config::{Config, ConfigError};
pub use rule::{Level, Mistake, Rule, RuleError};
pub use rules::default_rules;

#[derive(Debug, thiserror::Error)]
pub enum LintError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// Outcome of a full lint run
#[derive(Debug, Default)]
pub struct LintReport {
    pub manifests: usize,
    pub dependencies: usize,
    pub mistakes: Vec<Mistake>,
}

impl LintReport {
    pub fn count(&self, level: Level) -> usize {
        self.mistakes.iter().filter(|m| m.level == level).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Level::Error) > 0
    }
}

/// Runs rules in a fixed order
pub struct Linter {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for Linter {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Linter {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Evaluates every rule against already resolved data.
    ///
    /// Mistakes keep rule order. Ignored definitions and disabled mistakes
    /// are filtered out. A rule value of the wrong shape aborts the check.
    pub fn check(
        &mut self,
        manifests: &[Manifest],
        info: &PackagesInfo,
        config: &Config,
    ) -> Result<Vec<Mistake>, RuleError> {
        let mut mistakes = Vec::new();

        for rule in &mut self.rules {
            let found = rule.check(manifests, info, config)?;
            debug!("Rule {} reported {} mistakes", rule.name(), found.len());
            mistakes.extend(found);
        }

        Ok(config.filter_mistakes(mistakes))
    }

    /// Loads configuration, scans `root`, fetches metadata, and checks.
    pub async fn run(
        &mut self,
        root: &Path,
        config_path: Option<&Path>,
        fetcher: &Fetcher,
    ) -> Result<LintReport, LintError> {
        let config = Config::load(root, config_path)?;
        let manifests = Scanner::default().scan(root, &config)?;
        let dependencies = unique_dependencies(&manifests);

        info!(
            "Linting {} manifests with {} unique dependencies",
            manifests.len(),
            dependencies.len()
        );

        let packages = fetcher.fetch(&dependencies).await;
        let mistakes = self.check(&manifests, &packages, &config)?;

        Ok(LintReport {
            manifests: manifests.len(),
            dependencies: dependencies.len(),
            mistakes,
        })
    }
}
