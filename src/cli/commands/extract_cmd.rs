//! Offline extraction of a saved listing page.

use std::path::Path;

use crate::cli::helpers::build_extractor;
use crate::cli::icons::{success, warn};
use crate::config::Settings;
use crate::services::{fingerprint, fingerprint_prefix};

use super::check::print_item;

/// Run the extractor over `file` and print the items.
pub async fn cmd_extract(settings: &Settings, file: &Path, json: bool) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }
    let content = tokio::fs::read_to_string(file).await?;
    let extractor = build_extractor(settings)?;
    let items = extractor.extract(&content);

    if json {
        let rows: Vec<_> = items
            .iter()
            .map(|item| {
                serde_json::json!({
                    "fingerprint": fingerprint(item),
                    "fresh": settings.freshness.is_fresh(&item.recency_phrase),
                    "item": item,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("{} No items found in {}", warn(), file.display());
        return Ok(());
    }

    for item in &items {
        let fp = fingerprint(item);
        print_item(item, fingerprint_prefix(&fp), &[]);
    }
    println!();
    println!("{} {} items extracted", success(), items.len());
    Ok(())
}
