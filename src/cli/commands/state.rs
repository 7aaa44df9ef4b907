//! Dedup store inspection and reset.

use console::style;

use crate::cli::helpers::open_store;
use crate::cli::icons::{dim_arrow, success, warn};
use crate::config::Settings;
use crate::services::fingerprint_prefix;

const RECENT_SHOWN: usize = 5;

/// Show the stored fingerprint count and save time.
pub async fn cmd_state_show(settings: &Settings) -> anyhow::Result<()> {
    let store = open_store(settings);

    println!("\n{}", style("Dedup Store").bold());
    println!("{}", "-".repeat(40));
    println!("{:<16} {}", "File:", store.path().display());
    println!("{:<16} {} / {}", "Fingerprints:", store.len(), store.cap());
    println!(
        "{:<16} {}",
        "Last saved:",
        store
            .last_saved()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".to_string())
    );

    if !store.is_empty() {
        println!("\n{}", style("Most recent:").dim());
        let recent: Vec<&str> = store.iter().collect();
        for fp in recent.iter().rev().take(RECENT_SHOWN) {
            println!("  {} {}", dim_arrow(), fingerprint_prefix(fp));
        }
    }
    Ok(())
}

/// Remove every stored fingerprint. The next watch run starts with a fresh baseline.
pub async fn cmd_state_clear(settings: &Settings, confirm: bool) -> anyhow::Result<()> {
    let mut store = open_store(settings);

    if store.is_empty() && store.last_saved().is_none() {
        println!("{} No saved state at {}", warn(), store.path().display());
        return Ok(());
    }

    if !confirm {
        println!(
            "{} This will forget {} fingerprints in {}",
            warn(),
            store.len(),
            store.path().display()
        );
        println!("Use --confirm to proceed.");
        return Ok(());
    }

    let count = store.len();
    store.clear();
    store.save_to_durable()?;

    println!("{} Cleared {} fingerprints", success(), count);
    Ok(())
}
