//! Alert message rendering (Telegram HTML subset).

use crate::models::CandidateItem;
use crate::utils::{collapse_whitespace, html_escape, repair_concatenation, truncate_chars};

/// Telegram rejects messages of 4096 characters or more.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Address lines listed before the rest are summarised.
pub const MAX_ADDRESS_LINES: usize = 10;

/// Cap for single-value fields before escaping.
const MAX_FIELD_CHARS: usize = 64;

/// Escaped links longer than this are left out of the message.
const MAX_LINK_CHARS: usize = 1024;

/// Link to the item's detail page, or the listing page when the item has no
/// detail id.
pub fn item_link(item: &CandidateItem, detail_base_url: &str, listing_url: &str) -> String {
    match &item.detail_id {
        Some(id) => format!("{}/{}", detail_base_url.trim_end_matches('/'), id),
        None => listing_url.to_string(),
    }
}

/// Readable body: seams repaired, whitespace collapsed, with the leading
/// category label and the recency phrase removed since both get their own line.
pub fn display_body(item: &CandidateItem) -> String {
    let mut body = collapse_whitespace(&repair_concatenation(&item.raw_text));
    if let Some(rest) = body.strip_prefix(item.category.as_str()) {
        body = rest.trim_start().to_string();
    }
    if !item.recency_phrase.is_empty() {
        body = body.replacen(item.recency_phrase.as_str(), "", 1);
    }
    collapse_whitespace(&body)
}

/// Render the alert for one item.
///
/// Every field line is bounded, so only the body is shortened to fit
/// [`MAX_MESSAGE_CHARS`] and markup is never cut.
pub fn format_message(item: &CandidateItem, link: &str) -> String {
    let mut head = format!(
        "<b>🚨 {}</b>\n🕒 {}\n",
        field(&item.category),
        field(&item.recency_phrase)
    );

    let mut tail = String::new();
    if let Some(amount) = &item.monetary_amount {
        tail.push_str(&format!("\n<b>Amount:</b> {}", field(amount)));
    }
    if let Some(author) = &item.author {
        tail.push_str(&format!("\n<b>Reported by:</b> {}", field(author)));
    }
    if let Some(domain) = &item.domain {
        tail.push_str(&format!("\n<b>Domain:</b> {}", field(domain)));
    }
    if !item.addresses.is_empty() {
        tail.push_str("\n<b>Addresses:</b>");
        for address in item.addresses.iter().take(MAX_ADDRESS_LINES) {
            tail.push_str(&format!(
                "\n<code>{}</code> ({})",
                html_escape(&truncate_chars(&address.address, 2 * MAX_FIELD_CHARS)),
                field(&address.chain)
            ));
        }
        let hidden = item.addresses.len().saturating_sub(MAX_ADDRESS_LINES);
        if hidden > 0 {
            tail.push_str(&format!("\n… and {} more", hidden));
        }
    }
    let link = html_escape(link);
    if link.chars().count() <= MAX_LINK_CHARS {
        tail.push_str(&format!("\n\n<a href=\"{}\">View report</a>", link));
    }

    let used = head.chars().count() + tail.chars().count() + 2;
    let budget = MAX_MESSAGE_CHARS.saturating_sub(used);
    head.push('\n');
    head.push_str(&escaped_within(&display_body(item), budget));
    head.push('\n');
    head.push_str(&tail);
    head
}

fn field(value: &str) -> String {
    html_escape(&truncate_chars(value, MAX_FIELD_CHARS))
}

/// Escape `text`, truncating first so the escaped result fits in `budget` chars.
fn escaped_within(text: &str, budget: usize) -> String {
    let mut limit = budget;
    loop {
        let escaped = html_escape(&truncate_chars(text, limit));
        let len = escaped.chars().count();
        if len <= budget || limit == 0 {
            return escaped;
        }
        limit = limit.saturating_sub(len - budget);
    }
}
