use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use depshub::config::{LOG_ENV, PACKAGES_CACHE_NAME};
use depshub::lint::{LintReport, Linter, Level};
use depshub::metadata::sources::default_sources;
use depshub::metadata::{Fetcher, FileCache};

#[derive(Parser)]
#[command(name = "depshub")]
#[command(version, about = "Linter for third-party dependencies")]
struct Cli {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lint every manifest under a directory
    Lint {
        /// Directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Policy file (defaults to depshub.yaml in the scanned directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Manage the package metadata cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove every cached entry
    Clear,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_file.as_deref(), cli.log_json)?;

    match cli.command {
        Command::Lint { path, config } => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(run_lint(&path, config.as_deref())),
        Command::Cache {
            action: CacheAction::Clear,
        } => {
            let cache = FileCache::new(PACKAGES_CACHE_NAME)?;
            cache.clear()?;
            println!("Cleared {}", cache.path().display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Installs the global subscriber. The returned guard flushes file logs on drop.
fn init_logging(log_file: Option<&Path>, json: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let (writer, guard) = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("invalid log file path: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let registry = tracing_subscriber::registry().with(filter);
    let ansi = log_file.is_none();

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init()?;
    }

    Ok(guard)
}

async fn run_lint(path: &Path, config: Option<&Path>) -> anyhow::Result<ExitCode> {
    let cache = FileCache::new(PACKAGES_CACHE_NAME)?;
    let fetcher = Fetcher::new(Arc::new(cache), default_sources());

    let report = Linter::default()
        .run(path, config, &fetcher)
        .await
        .with_context(|| format!("failed to lint {}", path.display()))?;

    print_report(&report);

    Ok(if report.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_report(report: &LintReport) {
    println!(
        "Found {} errors and {} warnings ({} manifests, {} dependencies)",
        report.count(Level::Error),
        report.count(Level::Warning),
        report.manifests,
        report.dependencies
    );

    for mistake in &report.mistakes {
        println!("\n{} [{}] {}", mistake.level, mistake.rule, mistake.message);
        for definition in &mistake.definitions {
            if definition.line > 0 {
                println!(
                    "  {}:{}  {}",
                    definition.path, definition.line, definition.raw_line
                );
            } else {
                println!("  {}", definition.path);
            }
        }
    }
}
