//! Search command

use chartdeck_repo::{CacheSettings, ChartVersion, list_catalog};

use super::open_cache;
use crate::display;
use crate::error::Result;

fn matches_query(chart: &ChartVersion, query: &str) -> bool {
    let query = query.to_lowercase();
    chart.name.to_lowercase().contains(&query)
        || chart
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&query))
        || chart
            .keywords
            .iter()
            .any(|k| k.to_lowercase().contains(&query))
}

/// List the newest installable version of every matching chart
pub async fn run(
    settings: CacheSettings,
    query: Option<&str>,
    repo_name: Option<&str>,
    json_output: bool,
) -> Result<()> {
    let (cache, content) = open_cache(settings);
    let catalog = list_catalog(&cache, content).await?;

    if let Some(name) = repo_name {
        // Surface unknown repository names instead of printing nothing
        cache.get_repository(name).await?;
    }

    let results: Vec<(&str, &ChartVersion)> = catalog
        .iter()
        .filter(|(repo, _)| repo_name.is_none_or(|name| name == repo.as_str()))
        .flat_map(|(repo, groups)| {
            groups
                .values()
                .filter_map(|versions| versions.first())
                .map(move |top| (repo.as_str(), top))
        })
        .filter(|(_, top)| query.is_none_or(|q| matches_query(top, q)))
        .collect();

    if json_output {
        let json: Vec<serde_json::Value> = results
            .iter()
            .map(|(repo, chart)| {
                serde_json::json!({
                    "name": format!("{}/{}", repo, chart.name),
                    "version": chart.version,
                    "app_version": chart.app_version,
                    "description": chart.description,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results found");
        return Ok(());
    }

    println!("{}", display::chart_header());
    for (repo, chart) in results {
        println!("{}", display::chart_row(repo, chart));
    }

    Ok(())
}
