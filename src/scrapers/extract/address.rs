//! Wallet address extraction.
//!
//! Each family is found as a maximal run of its alphabet and then trimmed to
//! the longest prefix that passes the family's checksum, so text glued to
//! the end of an address ("…DivfNaReported") never produces a fragment.
//! EVM and Cardano addresses are accepted on structure alone.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::models::{AddressFamily, WalletAddress};
use crate::utils::split_label_seams;

const BASE58_ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const BECH32_CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const BECH32_CONST: u32 = 1;
const BECH32M_CONST: u32 = 0x2bc8_30a3;

/// Any Base58 run long enough to hold a legacy or Tron address. Runs may
/// start inside a preceding word ("Addresses1A1z…"), so candidate starts are
/// tried at every offset.
static BASE58_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[1-9A-HJ-NP-Za-km-z]{26,}").unwrap());
static BECH32_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:bc1|ltc1)[02-9ac-hj-np-z]{6,}").unwrap());
static EVM_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"0x[0-9a-fA-F]{40,}").unwrap());
static CARDANO_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"addr1[02-9ac-hj-np-z]{50,}").unwrap());

/// EVM chain hints, checked in order against the lowercased item text.
static EVM_CHAIN_HINTS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"\b(?:polygon|matic)\b").unwrap(), "Polygon"),
        (Regex::new(r"\barbitrum\b").unwrap(), "Arbitrum"),
        (Regex::new(r"\b(?:avalanche|avax)\b").unwrap(), "Avalanche"),
        (Regex::new(r"\b(?:bsc|bnb|binance smart chain)\b").unwrap(), "BNB Chain"),
        (Regex::new(r"\boptimism\b").unwrap(), "Optimism"),
        (Regex::new(r"\bbase\b").unwrap(), "Base"),
    ]
});

/// An accepted match and the byte span it covers in the scanned text.
#[derive(Debug, Clone)]
struct AddressSpan {
    start: usize,
    end: usize,
    address: WalletAddress,
}

/// Extract every wallet address from `text`, in document order.
pub fn extract_addresses(text: &str) -> Vec<WalletAddress> {
    let text = split_label_seams(text);
    let evm_chain = evm_chain_label(&text);

    let mut spans = Vec::new();

    for m in BASE58_RUN.find_iter(&text) {
        let legacy = checked_spans(m, b"13", 26, 34, |s| {
            matches!(base58check_version(s), Some(0x00 | 0x05))
        });
        for (start, len) in legacy {
            spans.push(span(start, len, &text, "Bitcoin", AddressFamily::BitcoinLegacy));
        }

        let tron = checked_spans(m, b"T", 34, 34, |s| base58check_version(s) == Some(0x41));
        for (start, len) in tron {
            spans.push(span(start, len, &text, "Tron", AddressFamily::Tron));
        }
    }

    for m in BECH32_RUN.find_iter(&text) {
        let chain = if m.as_str().starts_with("ltc1") {
            "Litecoin"
        } else {
            "Bitcoin"
        };
        if let Some(len) = longest_valid_prefix(m.as_str(), 14, 90, bech32_checksum_valid) {
            spans.push(span(m.start(), len, &text, chain, AddressFamily::Bech32));
        }
    }

    for m in EVM_RUN.find_iter(&text) {
        // A longer hex run is a transaction hash or similar, not an address.
        if m.as_str().len() == 42 {
            spans.push(span(m.start(), 42, &text, evm_chain, AddressFamily::Evm));
        }
    }

    for m in CARDANO_RUN.find_iter(&text) {
        if m.as_str().len() <= 110 {
            let len = m.as_str().len();
            spans.push(span(m.start(), len, &text, "Cardano", AddressFamily::Cardano));
        }
    }

    let mut seen = HashSet::new();
    resolve_overlaps(spans)
        .into_iter()
        .map(|s| s.address)
        .filter(|a| seen.insert(a.address.clone()))
        .collect()
}

fn span(
    start: usize,
    len: usize,
    text: &str,
    chain: &str,
    family: AddressFamily,
) -> AddressSpan {
    AddressSpan {
        start,
        end: start + len,
        address: WalletAddress::new(&text[start..start + len], chain, family),
    }
}

/// Keep the longest match for any text span.
///
/// A candidate fully inside an already accepted span is dropped; a candidate
/// that fully contains accepted spans replaces them. Output is ordered by
/// position.
fn resolve_overlaps(candidates: Vec<AddressSpan>) -> Vec<AddressSpan> {
    let mut accepted: Vec<AddressSpan> = Vec::new();

    for candidate in candidates {
        let contained = accepted
            .iter()
            .any(|a| a.start <= candidate.start && candidate.end <= a.end);
        if contained {
            continue;
        }
        accepted.retain(|a| !(candidate.start <= a.start && a.end <= candidate.end));
        accepted.push(candidate);
    }

    accepted.sort_by_key(|a| a.start);
    accepted
}

/// Chain label for EVM addresses from contextual keywords.
fn evm_chain_label(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    EVM_CHAIN_HINTS
        .iter()
        .find(|(pattern, _)| pattern.is_match(&lower))
        .map(|(_, label)| *label)
        .unwrap_or("Ethereum")
}

/// Checksum-valid `(start, len)` spans inside one alphabet run.
///
/// Every offset holding one of the `lead` bytes is tried as a start; after a
/// hit the scan resumes past the accepted address.
fn checked_spans(
    run: regex::Match<'_>,
    lead: &[u8],
    min: usize,
    max: usize,
    valid: impl Fn(&str) -> bool,
) -> Vec<(usize, usize)> {
    let s = run.as_str();
    let bytes = s.as_bytes();
    let mut found = Vec::new();
    let mut offset = 0;

    while offset + min <= s.len() {
        if lead.contains(&bytes[offset]) {
            if let Some(len) = longest_valid_prefix(&s[offset..], min, max, &valid) {
                found.push((run.start() + offset, len));
                offset += len;
                continue;
            }
        }
        offset += 1;
    }
    found
}

/// Length of the longest prefix of `run` (between `min` and `max` chars) accepted by `valid`.
/// Runs are ASCII, so byte and char lengths agree.
fn longest_valid_prefix(
    run: &str,
    min: usize,
    max: usize,
    valid: impl Fn(&str) -> bool,
) -> Option<usize> {
    let upper = run.len().min(max);
    (min..=upper).rev().find(|&len| valid(&run[..len]))
}

fn base58_decode(s: &str) -> Option<Vec<u8>> {
    let mut bytes: Vec<u8> = Vec::with_capacity(s.len());
    for c in s.bytes() {
        let mut carry = BASE58_ALPHABET.iter().position(|&a| a == c)? as u32;
        for b in bytes.iter_mut().rev() {
            carry += (*b as u32) * 58;
            *b = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.insert(0, (carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    let leading_zeros = s.bytes().take_while(|&c| c == b'1').count();
    let mut out = vec![0u8; leading_zeros];
    out.extend(bytes);
    Some(out)
}

/// Version byte of a valid 25-byte Base58Check payload.
fn base58check_version(s: &str) -> Option<u8> {
    let decoded = base58_decode(s)?;
    if decoded.len() != 25 {
        return None;
    }
    let (payload, checksum) = decoded.split_at(21);
    let digest = Sha256::digest(Sha256::digest(payload));
    (digest[..4] == *checksum).then_some(payload[0])
}

fn bech32_polymod(values: &[u8]) -> u32 {
    const GENERATOR: [u32; 5] = [
        0x3b6a_57b2,
        0x2650_8e6d,
        0x1ea1_19fa,
        0x3d42_33dd,
        0x2a14_62b3,
    ];
    let mut chk: u32 = 1;
    for &v in values {
        let top = chk >> 25;
        chk = ((chk & 0x01ff_ffff) << 5) ^ u32::from(v);
        for (i, g) in GENERATOR.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= g;
            }
        }
    }
    chk
}

/// Bech32 or Bech32m checksum check on a lowercase address.
fn bech32_checksum_valid(addr: &str) -> bool {
    let Some(sep) = addr.rfind('1') else {
        return false;
    };
    let (hrp, data) = (&addr[..sep], &addr[sep + 1..]);
    if hrp.is_empty() || data.len() < 6 {
        return false;
    }

    let mut values: Vec<u8> = hrp.bytes().map(|b| b >> 5).collect();
    values.push(0);
    values.extend(hrp.bytes().map(|b| b & 31));
    for c in data.bytes() {
        match BECH32_CHARSET.iter().position(|&x| x == c) {
            Some(v) => values.push(v as u8),
            None => return false,
        }
    }

    matches!(bech32_polymod(&values), BECH32_CONST | BECH32M_CONST)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";

    #[test]
    fn test_legacy_trailing_artifact_stripped() {
        let text = format!("Address: {}Reported by alice", GENESIS);
        let addrs = extract_addresses(&text);
        assert_eq!(addrs.len(), 1);
        assert_eq!(addrs[0].address, GENESIS);
        assert_eq!(addrs[0].chain, "Bitcoin");
    }

    #[test]
    fn test_legacy_glued_without_label() {
        // No label seam to split on: the checksum picks the real end.
        let text = format!("sent to {}xyz", GENESIS);
        let addrs = extract_addresses(&text);
        assert_eq!(addrs.len(), 1);
        assert_eq!(addrs[0].address, GENESIS);
    }

    #[test]
    fn test_legacy_glued_to_preceding_label() {
        let addrs = extract_addresses(&format!("Addresses{}Reported by bob", GENESIS));
        assert_eq!(addrs.len(), 1);
        assert_eq!(addrs[0].address, GENESIS);

        let addrs = extract_addresses(&format!("wallet:{}", GENESIS));
        assert_eq!(addrs[0].address, GENESIS);
    }

    #[test]
    fn test_tron_glued_to_preceding_word() {
        let addrs = extract_addresses("USDT contractTR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t");
        assert_eq!(addrs.len(), 1);
        assert_eq!(addrs[0].address, "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t");
        assert_eq!(addrs[0].chain, "Tron");
    }

    #[test]
    fn test_legacy_invalid_checksum_rejected() {
        let text = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNb";
        assert!(extract_addresses(text).is_empty());
    }

    #[test]
    fn test_p2sh_address() {
        let addrs = extract_addresses("wallet 3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy here");
        assert_eq!(addrs.len(), 1);
        assert_eq!(addrs[0].family, AddressFamily::BitcoinLegacy);
    }

    #[test]
    fn test_bech32_address() {
        let addr = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";
        let addrs = extract_addresses(&format!("to {}Reported", addr));
        assert_eq!(addrs.len(), 1);
        assert_eq!(addrs[0].address, addr);
        assert_eq!(addrs[0].family, AddressFamily::Bech32);
    }

    #[test]
    fn test_evm_chain_from_context() {
        let addr = "0x52908400098527886E0F7030069857D2E4169EE7";
        let addrs = extract_addresses(&format!("Scammer on Polygon {}", addr));
        assert_eq!(addrs.len(), 1);
        assert_eq!(addrs[0].chain, "Polygon");

        let addrs = extract_addresses(&format!("drained wallet {}", addr));
        assert_eq!(addrs[0].chain, "Ethereum");

        // "database" must not read as Base.
        let addrs = extract_addresses(&format!("database leak {}", addr));
        assert_eq!(addrs[0].chain, "Ethereum");
    }

    #[test]
    fn test_evm_long_hex_rejected() {
        let tx = format!("0x{}", "ab".repeat(32));
        assert!(extract_addresses(&tx).is_empty());
    }

    #[test]
    fn test_tron_address() {
        let addrs = extract_addresses("USDT contract TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t");
        assert_eq!(addrs.len(), 1);
        assert_eq!(addrs[0].chain, "Tron");
    }

    #[test]
    fn test_cardano_structural() {
        let addr = format!("addr1{}", "q".repeat(58));
        let addrs = extract_addresses(&format!("ada to {} now", addr));
        assert_eq!(addrs.len(), 1);
        assert_eq!(addrs[0].family, AddressFamily::Cardano);
    }

    #[test]
    fn test_duplicates_removed() {
        let text = format!("{} and again {}", GENESIS, GENESIS);
        assert_eq!(extract_addresses(&text).len(), 1);
    }

    fn test_span(start: usize, end: usize, addr: &str) -> AddressSpan {
        AddressSpan {
            start,
            end,
            address: WalletAddress::new(addr, "Bitcoin", AddressFamily::BitcoinLegacy),
        }
    }

    #[test]
    fn test_resolve_overlaps_drops_contained() {
        let resolved = resolve_overlaps(vec![
            test_span(0, 34, "long"),
            test_span(2, 30, "fragment"),
        ]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].address.address, "long");
    }

    #[test]
    fn test_resolve_overlaps_longer_replaces_shorter() {
        let resolved = resolve_overlaps(vec![
            test_span(5, 20, "short"),
            test_span(40, 50, "other"),
            test_span(0, 34, "long"),
        ]);
        let names: Vec<_> = resolved.iter().map(|s| s.address.address.as_str()).collect();
        assert_eq!(names, vec!["long", "other"]);
    }

    #[test]
    fn test_base58check_version() {
        assert_eq!(base58check_version(GENESIS), Some(0x00));
        assert_eq!(base58check_version("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"), Some(0x41));
        assert_eq!(base58check_version("0OIl"), None);
    }
}
