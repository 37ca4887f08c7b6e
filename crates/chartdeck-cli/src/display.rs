//! Display formatting for CLI output

use chartdeck_repo::ChartVersion;
use console::style;

/// Truncate to `max` characters, marking the cut with an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// One search result row
pub fn chart_row(repo: &str, chart: &ChartVersion) -> String {
    format!(
        "{:<35} {:<15} {:<15} {}",
        format!("{}/{}", repo, chart.name),
        chart.version,
        chart.app_version.as_deref().unwrap_or(""),
        truncate(chart.description.as_deref().unwrap_or(""), 50)
    )
}

pub fn chart_header() -> String {
    format!(
        "{:<35} {:<15} {:<15} {}",
        "NAME", "CHART VERSION", "APP VERSION", "DESCRIPTION"
    )
}

/// Version list entry, marking deprecated versions
pub fn version_line(chart: &ChartVersion) -> String {
    let mut line = format!("  {}", style(&chart.version).cyan());
    if let Some(app_version) = &chart.app_version {
        line.push_str(&format!("  (app {})", app_version));
    }
    if chart.deprecated {
        line.push_str(&format!("  {}", style("deprecated").yellow()));
    }
    line
}

pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), message);
}
