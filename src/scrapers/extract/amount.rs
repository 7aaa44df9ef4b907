//! Monetary amount extraction.

use std::sync::LazyLock;

use regex::Regex;

static AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\$\s?(?P<dnum>\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)|(?P<num>\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)\s*(?P<code>USDT|USDC|BUSD|USD|EUR|GBP|BTC|ETH|TRX|BNB|SOL|LTC|ADA|MATIC|DAI|XRP|DOGE)\b)",
    )
    .unwrap()
});

static AMOUNT_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)amount\s*lost").unwrap());

/// Extract an amount such as "1,234.56 USD".
///
/// The first amount after an "amount lost" anchor wins; without an anchor,
/// the last amount in document order wins.
pub fn extract_amount(text: &str) -> Option<String> {
    if let Some(anchor) = AMOUNT_ANCHOR.find(text) {
        if let Some(caps) = AMOUNT.captures(&text[anchor.end()..]) {
            return Some(format_amount(&caps));
        }
    }

    AMOUNT
        .captures_iter(text)
        .last()
        .map(|caps| format_amount(&caps))
}

fn format_amount(caps: &regex::Captures<'_>) -> String {
    match (caps.name("dnum"), caps.name("num"), caps.name("code")) {
        (Some(n), _, _) => format!("{} USD", n.as_str()),
        (_, Some(n), Some(code)) => format!("{} {}", n.as_str(), code.as_str().to_uppercase()),
        _ => caps[0].to_string(),
    }
}

/// Numeric value of an extracted amount ("1,234.56 USD" -> 1234.56).
pub fn parse_amount_value(amount: &str) -> Option<f64> {
    amount
        .split_whitespace()
        .next()?
        .replace(',', "")
        .parse()
        .ok()
}
