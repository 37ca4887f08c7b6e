//! Chartdeck CLI - browse Helm chart repositories and manage kubeconfig sync entries

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod error;
mod exit_codes;

use chartdeck_repo::CacheSettings;
use error::{CliError, Result};

#[derive(Parser)]
#[command(name = "chartdeck")]
#[command(version)]
#[command(about = "Browse Helm chart repositories from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Path to repositories.yaml
    #[arg(long, global = true, env = "HELM_REPOSITORY_CONFIG")]
    repository_config: Option<PathBuf>,

    /// Directory holding cached repository indexes and chart archives
    #[arg(long, global = true, env = "HELM_REPOSITORY_CACHE")]
    repository_cache: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage chart repositories
    Repo {
        #[command(subcommand)]
        command: RepoCommands,
    },

    /// Search charts across repositories
    Search {
        /// Match chart names, descriptions and keywords
        query: Option<String>,

        /// Only search this repository
        #[arg(long)]
        repo: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show chart information
    Show {
        #[command(subcommand)]
        command: ShowCommands,
    },

    /// Manage kubeconfig sync entries
    Sync {
        #[command(subcommand)]
        command: SyncCommands,
    },
}

#[derive(Subcommand)]
enum RepoCommands {
    /// List configured repositories
    List,

    /// Re-fetch every repository index
    Update,

    /// Add a repository
    Add {
        /// Repository name
        name: String,

        /// Repository URL (http(s)://, oci://, file:// or an absolute path)
        url: String,
    },

    /// Remove a repository
    Remove {
        /// Repository name
        name: String,
    },
}

#[derive(Subcommand)]
enum ShowCommands {
    /// All versions of a chart and the readme of the selected one
    Chart {
        /// Chart reference as <repo>/<chart>
        chart: String,

        /// Chart version (default: newest)
        #[arg(long)]
        version: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// The chart's readme
    Readme {
        /// Chart reference as <repo>/<chart>
        chart: String,

        /// Chart version (default: newest)
        #[arg(long)]
        version: Option<String>,
    },

    /// The chart's default values
    Values {
        /// Chart reference as <repo>/<chart>
        chart: String,

        /// Chart version (default: newest)
        #[arg(long)]
        version: Option<String>,
    },
}

#[derive(Subcommand)]
enum SyncCommands {
    /// Watch kubeconfig files or directories
    Add {
        /// Paths to add
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Preferences file (default: <config dir>/chartdeck/preferences.yaml)
        #[arg(long, env = "CHARTDECK_PREFERENCES")]
        preferences: Option<PathBuf>,
    },

    /// List watched paths
    List {
        /// Preferences file (default: <config dir>/chartdeck/preferences.yaml)
        #[arg(long, env = "CHARTDECK_PREFERENCES")]
        preferences: Option<PathBuf>,
    },
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug { "debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit paths win; anything not given falls back to the Helm defaults
fn cache_settings(config: Option<PathBuf>, cache: Option<PathBuf>) -> Result<CacheSettings> {
    match (config, cache) {
        (Some(config), Some(cache)) => Ok(CacheSettings::new(config, cache)),
        (config, cache) => {
            let defaults = CacheSettings::from_env()?;
            Ok(CacheSettings::new(
                config.unwrap_or(defaults.repository_config),
                cache.unwrap_or(defaults.repository_cache),
            ))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = || cache_settings(cli.repository_config.clone(), cli.repository_cache.clone());

    match cli.command {
        Commands::Repo { command } => match command {
            RepoCommands::List => commands::repo::list(&settings()?),
            RepoCommands::Update => commands::repo::update(settings()?).await,
            RepoCommands::Add { name, url } => commands::repo::add(&settings()?, &name, &url),
            RepoCommands::Remove { name } => commands::repo::remove(&settings()?, &name),
        },

        Commands::Search { query, repo, json } => {
            commands::search::run(settings()?, query.as_deref(), repo.as_deref(), json).await
        }

        Commands::Show { command } => match command {
            ShowCommands::Chart {
                chart,
                version,
                json,
            } => commands::show::chart(settings()?, &chart, version.as_deref(), json).await,
            ShowCommands::Readme { chart, version } => {
                commands::show::readme(settings()?, &chart, version.as_deref()).await
            }
            ShowCommands::Values { chart, version } => {
                commands::show::values(settings()?, &chart, version.as_deref()).await
            }
        },

        Commands::Sync { command } => match command {
            SyncCommands::Add { paths, preferences } => {
                commands::sync::add(preferences.as_deref(), &paths)
            }
            SyncCommands::List { preferences } => commands::sync::list(preferences.as_deref()),
        },
    }
}

#[tokio::main]
async fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_explicit_settings() {
        let settings = cache_settings(
            Some(PathBuf::from("/etc/helm/repositories.yaml")),
            Some(PathBuf::from("/var/cache/helm")),
        )
        .unwrap();
        assert_eq!(
            settings.index_path("stable"),
            PathBuf::from("/var/cache/helm/stable-index.yaml")
        );
    }

    #[test]
    fn test_show_chart_version_is_an_argument() {
        let cli = Cli::try_parse_from(["chartdeck", "show", "chart", "stable/nginx", "--version", "1.0.0"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Show {
                command: ShowCommands::Chart { version: Some(ref v), .. }
            } if v == "1.0.0"
        ));

        // The root still answers --version
        let err = Cli::try_parse_from(["chartdeck", "--version"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_parse_show_values() {
        let cli = Cli::try_parse_from([
            "chartdeck",
            "show",
            "values",
            "stable/nginx",
            "--version",
            "1.2.0",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Show {
                command: ShowCommands::Values { ref chart, version: Some(ref v) }
            } if chart == "stable/nginx" && v == "1.2.0"
        ));
    }
}
