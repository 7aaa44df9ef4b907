//! Listing-page extraction.
//!
//! Turns a fetched page into `CandidateItem`s. HTML pages are split into
//! items with a CSS selector. When the selector matches nothing, each item is
//! the element enclosing one recency phrase; plain text is segmented on lines
//! that open with a recency phrase. An item's text never depends on what is
//! listed next to it, so footer text cannot attach to the last item.
//! Every field except the raw text, position and recency phrase is optional,
//! and a field that cannot be derived is simply left empty.

mod address;
mod amount;
mod author;
mod category;
mod domain;

pub use address::extract_addresses;
pub use amount::{extract_amount, parse_amount_value};
pub use author::extract_author;
pub use category::{classify_by_keywords, detect_category, is_category_label};
pub use domain::{extract_domain, is_valid_domain};

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use thiserror::Error;
use tracing::debug;

use crate::models::CandidateItem;
use crate::utils::{collapse_whitespace, find_recency, looks_like_html, split_label_seams};

/// Report cards on the listing page.
pub const DEFAULT_ITEM_SELECTOR: &str = "div.create-ScamReportCard";

/// Detail-page links; the capture group is the report id.
pub const DEFAULT_DETAIL_PATTERN: &str = r"/scam-report/([A-Za-z0-9_-]+)";

/// Field lines taken along after an item's recency line in plain text.
const MAX_FIELD_LINES: usize = 8;

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// A line that carries one of an item's labelled fields.
static FIELD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:reported\s*by\b|(?:amount(?:\s*lost)?|lost|address(?:es)?|wallets?|domain|website|url|chain|network)\s*:)",
    )
    .unwrap()
});

/// Errors building an extractor from configuration.
#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("Invalid item selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Invalid detail pattern: {0}")]
    InvalidDetailPattern(#[from] regex::Error),

    #[error("Detail pattern must contain exactly one capture group")]
    DetailPatternGroups,
}

/// Extraction settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// CSS selector for item containers. `None` always uses text segmentation.
    pub item_selector: Option<String>,
    /// Regex with one capture group applied to hrefs and URLs to find the detail id.
    pub detail_pattern: String,
    /// Hosts never reported as the item's domain (the monitored site).
    pub ignored_hosts: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            item_selector: Some(DEFAULT_ITEM_SELECTOR.to_string()),
            detail_pattern: DEFAULT_DETAIL_PATTERN.to_string(),
            ignored_hosts: Vec::new(),
        }
    }
}

/// Text of one item before field extraction.
#[derive(Debug, Default)]
struct RawBlock {
    segments: Vec<String>,
    links: Vec<String>,
}

/// Compiled extractor.
#[derive(Debug)]
pub struct Extractor {
    item_selector: Option<Selector>,
    detail_pattern: Regex,
    ignored_hosts: Vec<String>,
}

impl Extractor {
    /// Compile an extractor, validating selector and detail pattern.
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractorError> {
        let item_selector = config
            .item_selector
            .as_deref()
            .map(|s| {
                Selector::parse(s).map_err(|e| ExtractorError::InvalidSelector {
                    selector: s.to_string(),
                    message: format!("{:?}", e),
                })
            })
            .transpose()?;

        let detail_pattern = Regex::new(&config.detail_pattern)?;
        if detail_pattern.captures_len() != 2 {
            return Err(ExtractorError::DetailPatternGroups);
        }

        Ok(Self {
            item_selector,
            detail_pattern,
            ignored_hosts: config
                .ignored_hosts
                .into_iter()
                .map(|h| h.trim_start_matches("www.").to_ascii_lowercase())
                .collect(),
        })
    }

    /// Extract candidate items from a fetched page. Never fails; entries
    /// without a recency phrase are skipped.
    pub fn extract(&self, raw_page: &str) -> Vec<CandidateItem> {
        let blocks = if looks_like_html(raw_page) {
            self.html_blocks(raw_page)
        } else {
            let lines: Vec<String> = raw_page
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
            segment_text(&lines)
        };

        let total = blocks.len();
        let items: Vec<CandidateItem> = blocks
            .into_iter()
            .filter_map(|block| self.build_item(block))
            .enumerate()
            .map(|(position, mut item)| {
                item.position = position;
                item
            })
            .collect();

        if items.len() < total {
            debug!(
                "Skipped {} block(s) without a recency phrase",
                total - items.len()
            );
        }
        items
    }

    fn html_blocks(&self, raw_page: &str) -> Vec<RawBlock> {
        let document = Html::parse_document(raw_page);

        if let Some(selector) = &self.item_selector {
            let blocks: Vec<RawBlock> = document
                .select(selector)
                .map(element_block)
                .filter(|block| !block.segments.is_empty())
                .collect();

            if !blocks.is_empty() {
                return blocks;
            }
            debug!("Item selector matched nothing, grouping by recency elements");
        }

        match recency_containers(&document) {
            Some(containers) => containers.into_iter().map(element_block).collect(),
            None => segment_text(&text_segments(document.root_element())),
        }
    }

    fn build_item(&self, block: RawBlock) -> Option<CandidateItem> {
        let raw_text = block.segments.join(" ");
        let recency = find_recency(&raw_text)?;
        let recency_phrase = collapse_whitespace(recency.as_str());

        let leading = raw_text[..recency.start()].trim();
        let leading = (!leading.is_empty()).then_some(leading);

        let repaired = split_label_seams(&raw_text);
        let detail_id = block
            .links
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(raw_text.as_str()))
            .find_map(|s| self.detail_pattern.captures(s).map(|c| c[1].to_string()));

        Some(CandidateItem {
            category: detect_category(leading, &raw_text),
            author: extract_author(&repaired),
            recency_phrase,
            monetary_amount: extract_amount(&repaired),
            domain: extract_domain(&repaired, &self.ignored_hosts),
            addresses: extract_addresses(&raw_text),
            detail_id,
            position: 0,
            raw_text,
        })
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default()).expect("default extractor config is valid")
    }
}

/// Extract items with the default configuration.
pub fn extract(raw_page: &str) -> Vec<CandidateItem> {
    Extractor::default().extract(raw_page)
}

fn element_block(element: ElementRef<'_>) -> RawBlock {
    RawBlock {
        segments: text_segments(element),
        links: element
            .select(&ANCHOR)
            .filter_map(|a| a.value().attr("href"))
            .map(str::to_string)
            .collect(),
    }
}

/// Trimmed, non-empty text nodes under `element`, skipping script and style content.
fn text_segments(element: ElementRef<'_>) -> Vec<String> {
    element
        .descendants()
        .filter_map(|node| visible_text(node.value(), node.parent().map(|p| p.value())))
        .map(str::to_string)
        .collect()
}

fn visible_text<'a>(node: &'a Node, parent: Option<&Node>) -> Option<&'a str> {
    let text = node.as_text()?.trim();
    let in_code = parent
        .and_then(Node::as_element)
        .is_some_and(|e| matches!(e.name(), "script" | "style" | "noscript" | "template"));
    (!in_code && !text.is_empty()).then_some(text)
}

/// Item containers for pages without item markup.
///
/// Each text node that opens an item names its enclosing element; that
/// element is widened to the largest ancestor still holding no other such
/// node, stopping below `body` and `main`. Returns `None` when no element
/// could be widened (a flat run of siblings), leaving the page to text
/// segmentation.
fn recency_containers(document: &Html) -> Option<Vec<ElementRef<'_>>> {
    let holders: Vec<ElementRef<'_>> = document
        .root_element()
        .descendants()
        .filter(|node| {
            visible_text(node.value(), node.parent().map(|p| p.value())).is_some_and(opens_item)
        })
        .filter_map(|node| node.parent().and_then(ElementRef::wrap))
        .collect();

    let holders_within = |element: ElementRef<'_>| {
        element
            .descendants()
            .filter(|node| holders.iter().any(|h| h.id() == node.id()))
            .count()
    };

    let mut containers: Vec<ElementRef<'_>> = Vec::new();
    let mut widened = false;
    for holder in &holders {
        let mut container = *holder;
        while let Some(parent) = container.parent().and_then(ElementRef::wrap) {
            let page_level = matches!(parent.value().name(), "html" | "body" | "main");
            if page_level || holders_within(parent) > 1 {
                break;
            }
            container = parent;
            widened = true;
        }
        if !containers.iter().any(|c| c.id() == container.id()) {
            containers.push(container);
        }
    }

    (widened && !containers.is_empty()).then_some(containers)
}

/// Whether `segment` opens an item: its recency phrase comes first, or only
/// a category heading precedes it ("Phishing Scam5 minutes ago…"). A phrase
/// inside a sentence ("Contacted me 2 days ago") does not.
fn opens_item(segment: &str) -> bool {
    let Some(recency) = find_recency(segment) else {
        return false;
    };
    let leading = segment[..recency.start()].trim();
    leading.is_empty() || is_category_label(leading)
}

/// Group text segments into items.
///
/// An item is the segment that opens it, the category heading on the line
/// before when the recency phrase opens the segment, and the field lines
/// directly after. Free text between items and page chrome belong to no item.
fn segment_text(segments: &[String]) -> Vec<RawBlock> {
    segments
        .iter()
        .enumerate()
        .filter(|(_, segment)| opens_item(segment))
        .map(|(index, opener)| {
            let mut block = RawBlock::default();

            let opens_with_recency =
                find_recency(opener).is_some_and(|m| opener[..m.start()].trim().is_empty());
            if opens_with_recency {
                let label = index
                    .checked_sub(1)
                    .map(|i| &segments[i])
                    .filter(|s| is_label_segment(s));
                block.segments.extend(label.cloned());
            }

            block.segments.push(opener.clone());
            block.segments.extend(
                segments[index + 1..]
                    .iter()
                    .take_while(|s| !opens_item(s) && is_field_line(s))
                    .take(MAX_FIELD_LINES)
                    .cloned(),
            );
            block
        })
        .collect()
}

fn is_label_segment(segment: &str) -> bool {
    find_recency(segment).is_none() && is_category_label(segment)
}

fn is_field_line(segment: &str) -> bool {
    FIELD_LINE.is_match(segment) || !extract_addresses(segment).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OTHER_CATEGORY;
    use crate::services::fingerprint;

    const GENESIS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";

    fn card(category: &str, when: &str, body: &str, id: &str) -> String {
        format!(
            r#"<div class="create-ScamReportCard">
                <p>{category}</p><span>{when}</span>
                <p>{body}</p>
                <a href="/scam-report/{id}">View</a>
            </div>"#
        )
    }

    #[test]
    fn test_html_cards() {
        let page = format!(
            "<html><body><h1>Latest reports</h1>{}{}</body></html>",
            card(
                "Phishing Scam",
                "2 minutes ago",
                &format!("Reported by alice. Sent funds to {} Amount lost: 1,250 USD via https://claim-airdrop.xyz/connect", GENESIS),
                "abc-123"
            ),
            card("Rug Pull", "3 hours ago", "Token vanished.", "def-456"),
        );

        let extractor = Extractor::new(ExtractorConfig {
            ignored_hosts: vec!["www.chainabuse.com".to_string()],
            ..Default::default()
        })
        .unwrap();
        let items = extractor.extract(&page);

        assert_eq!(items.len(), 2);
        let first = &items[0];
        assert_eq!(first.position, 0);
        assert_eq!(first.category, "Phishing Scam");
        assert_eq!(first.recency_phrase, "2 minutes ago");
        assert_eq!(first.author.as_deref(), Some("alice"));
        assert_eq!(first.monetary_amount.as_deref(), Some("1,250 USD"));
        assert_eq!(first.domain.as_deref(), Some("claim-airdrop.xyz"));
        assert_eq!(first.address_strings(), vec![GENESIS]);
        assert_eq!(first.detail_id.as_deref(), Some("abc-123"));

        let second = &items[1];
        assert_eq!(second.position, 1);
        assert_eq!(second.category, "Rug Pull");
        assert_eq!(second.author, None);
        assert_eq!(second.domain, None);
        assert!(second.addresses.is_empty());
        assert_eq!(second.detail_id.as_deref(), Some("def-456"));
    }

    #[test]
    fn test_selector_miss_falls_back_to_text() {
        let page = r#"<html><head><script>var x = "1 minute ago";</script></head><body>
            <nav>Home</nav>
            <div><span>Phishing Scam</span><span>1 minute ago</span><span>Reported by bob</span></div>
            <div><span>Romance Scam</span><span>10 minutes ago</span><span>met on a dating app</span></div>
        </body></html>"#;

        let items = extract(page);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].category, "Phishing Scam");
        assert_eq!(items[0].author.as_deref(), Some("bob"));
        assert_eq!(items[1].category, "Romance Scam");
        assert_eq!(items[1].recency_phrase, "10 minutes ago");
    }

    #[test]
    fn test_plain_text_with_concatenation_artifacts() {
        let page = format!(
            "Scam reports\nPhishing Scam5 minutes agoReported by carol\nwallet {}Reported\n3 hours ago something else",
            GENESIS
        );
        let items = extract(&page);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].category, "Phishing Scam");
        assert_eq!(items[0].recency_phrase, "5 minutes ago");
        assert_eq!(items[0].author.as_deref(), Some("carol"));
        assert_eq!(items[0].address_strings(), vec![GENESIS]);
        // The address line is not a heading and the text has no keywords.
        assert_eq!(items[1].category, OTHER_CATEGORY);
    }

    #[test]
    fn test_footer_text_not_attached_to_last_text_item() {
        let rug = "Rug Pull\njust now Liquidity pulled";
        let phishing = "Phishing Scam\n2 hours ago Fake site";

        let rug_last = extract(&format!("Latest reports\n{phishing}\n{rug}\nAbout us Privacy policy"));
        let rug_first = extract(&format!("Latest reports\n{rug}\n{phishing}"));

        assert_eq!(rug_last.len(), 2);
        assert_eq!(rug_last[1].raw_text, "Rug Pull just now Liquidity pulled");
        assert_eq!(rug_last[1].raw_text, rug_first[0].raw_text);
        assert_eq!(fingerprint(&rug_last[1]), fingerprint(&rug_first[0]));
    }

    #[test]
    fn test_recency_inside_sentence_does_not_start_item() {
        let page = "Latest reports\nPhishing Scam\n1 minute ago Fake wallet site\nContacted me 2 days ago on Telegram\nRug Pull\n3 hours ago Token vanished";
        let items = extract(page);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].category, "Phishing Scam");
        assert_eq!(items[0].recency_phrase, "1 minute ago");
        assert_eq!(items[1].category, "Rug Pull");
        assert_eq!(items[1].position, 1);
    }

    #[test]
    fn test_field_lines_follow_text_item() {
        let page = format!(
            "Phishing Scam\n2 minutes ago Fake airdrop\nReported by dana\nAddresses{}Reported by dana\nAmount lost: 2 ETH\nAbout us",
            GENESIS
        );
        let items = extract(&page);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].author.as_deref(), Some("dana"));
        assert_eq!(items[0].monetary_amount.as_deref(), Some("2 ETH"));
        assert_eq!(items[0].address_strings(), vec![GENESIS]);
        assert!(!items[0].raw_text.contains("About us"));
    }

    #[test]
    fn test_unmarked_html_items_grouped_by_element() {
        fn entry(category: &str, when: &str, body: &str) -> String {
            format!("<li><b>{category}</b> <span>{when}</span><p>{body}</p></li>")
        }
        let rug = entry("Rug Pull", "just now", "Liquidity pulled");
        let phishing = entry("Phishing Scam", "2 hours ago", "Fake site");
        let wrap = |entries: &str, footer: &str| {
            format!("<html><body><h1>Latest reports</h1><ul>{entries}</ul>{footer}</body></html>")
        };
        let footer = "<footer><a href=\"/about\">About us</a> Privacy policy</footer>";

        let rug_last = extract(&wrap(&format!("{phishing}{rug}"), footer));
        let rug_first = extract(&wrap(&format!("{rug}{phishing}"), ""));
        let rug_alone = extract(&wrap(&rug, footer));

        assert_eq!(rug_last.len(), 2);
        assert_eq!(rug_last[1].raw_text, "Rug Pull just now Liquidity pulled");
        assert_eq!(rug_last[1].category, "Rug Pull");
        assert_eq!(fingerprint(&rug_last[1]), fingerprint(&rug_first[0]));
        assert_eq!(fingerprint(&rug_alone[0]), fingerprint(&rug_first[0]));
    }

    #[test]
    fn test_flat_html_segmented_as_text() {
        let page = "<html><body><p>Phishing Scam</p><p>2 minutes ago</p><p>Reported by erin</p><p>About</p></body></html>";
        let items = extract(page);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, "Phishing Scam");
        assert_eq!(items[0].author.as_deref(), Some("erin"));
        assert_eq!(items[0].raw_text, "Phishing Scam 2 minutes ago Reported by erin");
    }

    #[test]
    fn test_blocks_without_recency_skipped() {
        let page = r#"<div class="create-ScamReportCard"><p>Phishing Scam</p><p>no time here</p></div>"#;
        assert!(extract(page).is_empty());
    }

    #[test]
    fn test_detail_id_from_text_url() {
        let page = "Ponzi Scheme 1 minute ago https://www.chainabuse.com/scam-report/xyz_9 details";
        let items = extract(page);
        assert_eq!(items[0].detail_id.as_deref(), Some("xyz_9"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad_selector = Extractor::new(ExtractorConfig {
            item_selector: Some("div[".to_string()),
            ..Default::default()
        });
        assert!(matches!(bad_selector, Err(ExtractorError::InvalidSelector { .. })));

        let no_group = Extractor::new(ExtractorConfig {
            detail_pattern: "/report/".to_string(),
            ..Default::default()
        });
        assert!(matches!(no_group, Err(ExtractorError::DetailPatternGroups)));
    }

    #[test]
    fn test_malformed_input_never_panics() {
        for input in ["", "<", "<<>>", "ago ago ago", "\u{0}\u{1}", "<div class=\"create-ScamReportCard\">"] {
            let _ = extract(input);
        }
    }
}
