//! Durable state.

pub mod dedup_store;

pub use dedup_store::{DedupStore, StoreError, DEFAULT_MAX_FINGERPRINTS};
