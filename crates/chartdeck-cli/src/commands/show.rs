//! Show command: chart versions, readme and default values

use chartdeck_repo::{CacheSettings, ChartCatalog};
use console::style;

use super::open_cache;
use crate::display;
use crate::error::{CliError, Result};

/// Split `<repo>/<chart>`
fn parse_chart_ref(reference: &str) -> Result<(&str, &str)> {
    match reference.split_once('/') {
        Some((repo, chart)) if !repo.is_empty() && !chart.is_empty() && !chart.contains('/') => {
            Ok((repo, chart))
        }
        _ => Err(CliError::input_with_help(
            format!("invalid chart reference '{}'", reference),
            "Use <repo>/<chart>, e.g. stable/nginx",
        )),
    }
}

async fn open_catalog(settings: CacheSettings, reference: &str) -> Result<(ChartCatalog, String)> {
    let (repo, chart) = parse_chart_ref(reference)?;
    let (cache, content) = open_cache(settings);
    cache.initialize().await?;
    Ok((cache.catalog(repo, content).await?, chart.to_string()))
}

pub async fn chart(
    settings: CacheSettings,
    reference: &str,
    version: Option<&str>,
    json_output: bool,
) -> Result<()> {
    let (catalog, chart) = open_catalog(settings, reference).await?;
    let detail = catalog.get_chart(&chart, version.unwrap_or("")).await?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    println!("{}", style(reference).cyan().bold());
    if let Some(description) = detail
        .versions
        .first()
        .and_then(|top| top.description.as_deref())
    {
        println!("{}", description);
    }
    println!();
    println!("{}", style("Versions:").bold());
    for entry in &detail.versions {
        println!("{}", display::version_line(entry));
    }

    if !detail.readme.is_empty() {
        println!();
        println!("{}", detail.readme);
    }
    Ok(())
}

pub async fn readme(settings: CacheSettings, reference: &str, version: Option<&str>) -> Result<()> {
    let (catalog, chart) = open_catalog(settings, reference).await?;
    let readme = catalog.get_readme(&chart, version.unwrap_or("")).await?;
    print!("{}", readme);
    Ok(())
}

pub async fn values(settings: CacheSettings, reference: &str, version: Option<&str>) -> Result<()> {
    let (catalog, chart) = open_catalog(settings, reference).await?;
    let values = catalog.get_values(&chart, version.unwrap_or("")).await?;
    let yaml = values.to_yaml().map_err(|e| CliError::internal(e.to_string()))?;
    print!("{}", yaml);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chart_ref() {
        assert_eq!(parse_chart_ref("stable/nginx").unwrap(), ("stable", "nginx"));
        assert!(parse_chart_ref("nginx").is_err());
        assert!(parse_chart_ref("/nginx").is_err());
        assert!(parse_chart_ref("stable/").is_err());
        assert!(parse_chart_ref("a/b/c").is_err());
    }
}
