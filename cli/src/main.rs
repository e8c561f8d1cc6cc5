//! CLI for GitHub to Notion issue import.
//!
//! Imports every issue of one repository, with labels, assignees and
//! comments, into a Notion database. Settings come from the environment
//! (optionally loaded from a `.env` file); see the library docs for the list.

use clap::Parser;
use github_notion_sync::{ConfigError, RunSummary, Runner, RunnerError};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// GitHub Notion Sync - Import a repository's issues into a Notion database.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Owner of the GitHub repository.
    owner: String,

    /// Name of the GitHub repository.
    repo: String,

    /// Check what would be imported without writing to Notion.
    #[arg(long)]
    dry_run: bool,

    /// Load environment variables from this file instead of `.env`.
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse arguments; usage errors exit with code 2
    let args = Args::parse();

    // Environment file first, so RUST_LOG can be set there too
    let env_loaded = load_env(args.env_file.as_ref());

    // Initialize tracing
    init_tracing();

    if !install_crypto_provider() {
        error!("Failed to install the TLS crypto provider");
        return ExitCode::from(2);
    }

    if let Err(e) = env_loaded {
        error!(error = %e, "Failed to load environment file");
        return ExitCode::from(2);
    }

    match run(&args).await {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) if e.is_config() => {
            error!(error = %e, "Invalid configuration");
            ExitCode::from(2)
        }
        Err(e) => {
            if let RunnerError::Upsert { source, .. } = &e {
                if let Some(record_id) = source.partial_record() {
                    error!(
                        %record_id,
                        "Record left incomplete; delete it before re-running to import it again"
                    );
                }
            }
            error!(error = %e, "Import failed");
            ExitCode::from(1)
        }
    }
}

/// Installs aws-lc-rs as the process-wide rustls provider. Returns false if
/// another provider was installed first.
fn install_crypto_provider() -> bool {
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_ok()
}

/// Loads variables from `path`, or from `.env` in the working directory when
/// it exists. Variables already set in the environment win.
fn load_env(path: Option<&PathBuf>) -> Result<(), ConfigError> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map_err(|e| (path.display().to_string(), e)),
        None => ignore_missing(dotenvy::dotenv()).map_err(|e| (".env".to_string(), e)),
    };
    loaded.map_err(|(file, e)| ConfigError::InvalidValue {
        name: "--env-file",
        message: format!("{file}: {e}"),
    })
}

/// Treats a missing `.env` as loaded; parse errors in one that exists are
/// kept.
fn ignore_missing(loaded: Result<PathBuf, dotenvy::Error>) -> Result<(), dotenvy::Error> {
    match loaded {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: &Args) -> Result<RunSummary, RunnerError> {
    let runner = Runner::from_env()?;
    info!(owner = %args.owner, repo = %args.repo, dry_run = args.dry_run, "Starting import");
    runner.run(&args.owner, &args.repo, args.dry_run).await
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\n{summary}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use github_notion_sync::SyncConfig;

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_positionals_and_flags() {
        let args =
            Args::try_parse_from(["github-notion-sync", "acme", "widgets", "--dry-run"]).unwrap();
        assert_eq!(args.owner, "acme");
        assert_eq!(args.repo, "widgets");
        assert!(args.dry_run);
        assert!(args.env_file.is_none());
    }

    #[test]
    fn missing_repository_is_a_usage_error() {
        let error = Args::try_parse_from(["github-notion-sync", "acme"]).unwrap_err();
        assert_eq!(error.exit_code(), 2);
    }

    #[tokio::test]
    async fn runner_builds_with_installed_provider() {
        // Another test may have installed it already
        let _ = install_crypto_provider();
        let config = SyncConfig::new(
            "gh-token".to_string(),
            "notion-key".to_string(),
            "db".to_string(),
        );

        assert!(Runner::new(config).is_ok());
    }

    #[test]
    fn malformed_env_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "NOT A VALID LINE\n").unwrap();

        assert!(matches!(
            load_env(Some(&path)),
            Err(ConfigError::InvalidValue { name: "--env-file", .. })
        ));
    }

    #[test]
    fn only_a_missing_default_env_is_ignored() {
        let missing = io::Error::new(io::ErrorKind::NotFound, "no .env");
        assert!(ignore_missing(Err(dotenvy::Error::Io(missing))).is_ok());

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert!(ignore_missing(Err(dotenvy::Error::Io(denied))).is_err());

        let malformed = dotenvy::Error::LineParse("NOT A VALID LINE".to_string(), 4);
        assert!(matches!(
            ignore_missing(Err(malformed)),
            Err(dotenvy::Error::LineParse(..))
        ));
    }

    #[test]
    fn missing_env_file_is_reported() {
        let path = PathBuf::from("/nonexistent/dir/.env");
        assert!(matches!(
            load_env(Some(&path)),
            Err(ConfigError::InvalidValue { name: "--env-file", .. })
        ));
    }
}
