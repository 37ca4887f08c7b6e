//! Repository management commands

use chartdeck_repo::{CacheSettings, RepoError, Repository, RepositoryConfig};
use console::style;

use super::open_cache;
use crate::display;
use crate::error::{CliError, Result};

/// List configured repositories
pub fn list(settings: &CacheSettings) -> Result<()> {
    let config = RepositoryConfig::load_or_default(&settings.repository_config)?;

    if config.repositories.is_empty() {
        println!("No repositories configured.");
        println!();
        println!("Add one with: chartdeck repo add <name> <url>");
        return Ok(());
    }

    println!("{:<20} {:<6} {}", "NAME", "TYPE", "URL");
    for repo in &config.repositories {
        let repo_type = repo
            .repo_type()
            .map(|t| t.to_string())
            .unwrap_or_else(|_| "?".to_string());
        println!("{:<20} {:<6} {}", repo.name, repo_type, repo.url);
    }

    Ok(())
}

/// Add a repository to repositories.yaml
pub fn add(settings: &CacheSettings, name: &str, url: &str) -> Result<()> {
    let mut config = RepositoryConfig::load_or_default(&settings.repository_config)?;

    let repo = Repository::new(name, url).map_err(|e| CliError::input(e.to_string()))?;
    let repo_type = repo.repo_type()?;

    config.add(repo).map_err(|e| match e {
        e @ RepoError::RepositoryAlreadyExists { .. } => CliError::input_with_help(
            e.to_string(),
            format!("Remove it first with 'chartdeck repo remove {}'", name),
        ),
        other => other.into(),
    })?;
    config.save_to(&settings.repository_config)?;

    display::success(&format!(
        "\"{}\" has been added to your repositories ({})",
        name, repo_type
    ));
    Ok(())
}

/// Remove a repository and its cached index
pub fn remove(settings: &CacheSettings, name: &str) -> Result<()> {
    let mut config = RepositoryConfig::load_or_default(&settings.repository_config)?;
    config.remove(name)?;
    config.save_to(&settings.repository_config)?;

    let index = settings.index_path(name);
    if index.exists() {
        std::fs::remove_file(&index)?;
    }

    display::success(&format!("\"{}\" has been removed from your repositories", name));
    Ok(())
}

/// Re-fetch every repository index
pub async fn update(settings: CacheSettings) -> Result<()> {
    let (cache, _) = open_cache(settings);
    cache.refresh().await?;

    let repositories = cache.list_repositories().await?;
    if repositories.is_empty() {
        println!("No repositories configured.");
        return Ok(());
    }

    let mut missing = 0;
    for repo in repositories.iter() {
        if repo.cache_location.exists() {
            println!(
                "...Successfully got an update from the \"{}\" chart repository",
                style(&repo.name).cyan()
            );
        } else {
            missing += 1;
            display::warning(&format!(
                "Unable to get an update from the \"{}\" chart repository ({})",
                repo.name, repo.url
            ));
        }
    }

    if missing == 0 {
        println!("Update Complete.");
    }
    Ok(())
}
