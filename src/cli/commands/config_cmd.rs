//! Configuration display.

use console::style;

use crate::cli::icons::dim_arrow;
use crate::config::{Config, Settings};

/// Print the effective settings. Secrets are masked.
pub async fn cmd_config_show(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    let source = config
        .source_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "none (defaults and environment)".to_string());

    println!("\n{}", style("Effective Settings").bold());
    println!("{}", "-".repeat(60));
    println!("  {} Config file: {}", dim_arrow(), source);
    println!();

    for (key, value) in settings.summary() {
        println!("{:<18} {}", format!("{}:", key), value);
    }
    Ok(())
}
