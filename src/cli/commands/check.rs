//! One-shot fetch and extraction, read-only.

use console::style;

use crate::cli::helpers::{build_extractor, build_fetcher, open_store};
use crate::cli::icons::{dim_arrow, info, success, warn};
use crate::config::Settings;
use crate::models::CandidateItem;
use crate::scrapers::Fetcher;
use crate::services::{fingerprint, fingerprint_prefix, item_link};
use crate::utils::truncate_chars;

const PREVIEW_CHARS: usize = 100;

/// Fetch the listing once and show what a cycle would see.
pub async fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    let extractor = build_extractor(settings)?;
    let fetcher = build_fetcher(settings)?;
    let store = open_store(settings);

    println!("{} Fetching {}", info(), settings.target_url);
    let page = fetcher.fetch(&settings.target_url).await?;
    let items = extractor.extract(&page.content);

    if items.is_empty() {
        println!(
            "{} No items extracted ({} bytes, HTTP {})",
            warn(),
            page.content.len(),
            page.status
        );
        return Ok(());
    }

    let mut fresh = 0;
    let mut known = 0;
    for item in &items {
        let fp = fingerprint(item);
        let is_fresh = settings.freshness.is_fresh(&item.recency_phrase);
        let is_known = store.has(&fp);
        fresh += usize::from(is_fresh);
        known += usize::from(is_known);

        let mut flags = Vec::new();
        if is_fresh {
            flags.push(style("fresh").green().to_string());
        }
        if is_known {
            flags.push(style("known").dim().to_string());
        }
        print_item(item, fingerprint_prefix(&fp), &flags);
        println!(
            "    {} {}",
            dim_arrow(),
            item_link(item, &settings.detail_base_url, &settings.target_url)
        );
    }

    println!();
    println!(
        "{} {} items, {} fresh, {} already stored",
        success(),
        items.len(),
        fresh,
        known
    );
    Ok(())
}

/// Print one item as a compact block.
pub(super) fn print_item(item: &CandidateItem, prefix: &str, flags: &[String]) {
    println!(
        "{:>3}. {} {} {} {}",
        item.position + 1,
        style(prefix).dim(),
        style(&item.category).bold(),
        style(&item.recency_phrase).cyan(),
        flags.join(" ")
    );
    println!(
        "    {}",
        truncate_chars(&item.raw_text, PREVIEW_CHARS)
    );

    let mut details = Vec::new();
    if let Some(author) = &item.author {
        details.push(format!("by {}", author));
    }
    if let Some(amount) = &item.monetary_amount {
        details.push(amount.clone());
    }
    if let Some(domain) = &item.domain {
        details.push(domain.clone());
    }
    for address in &item.addresses {
        details.push(format!("{} {}", address.chain, address.address));
    }
    if !details.is_empty() {
        println!("    {} {}", dim_arrow(), details.join(" | "));
    }
}
