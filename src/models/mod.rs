//! Data models for reportwatch.

mod address;
mod item;

pub use address::{AddressFamily, WalletAddress};
pub use item::{CandidateItem, OTHER_CATEGORY, UNKNOWN_AUTHOR};
