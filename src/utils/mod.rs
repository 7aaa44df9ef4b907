//! Shared utility functions.
//!
//! This module contains reusable utilities used across the codebase:
//! - `html`: HTML escaping and markup detection
//! - `recency`: relative-time phrase matching and parsing
//! - `text`: whitespace and concatenation repair

mod html;
pub mod recency;
mod text;

pub use html::{html_escape, looks_like_html};
pub use recency::{find_recency, parse_recency, Recency, RecencyUnit, RECENCY_PATTERN};
pub use text::{collapse_whitespace, repair_concatenation, split_label_seams, truncate_chars};
