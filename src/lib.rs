//! reportwatch - scam-report listing watcher.
//!
//! Polls a public scam-report listing, extracts report entries, and sends
//! an alert for each fresh report it has not seen before.

pub mod cli;
pub mod config;
pub mod models;
pub mod monitor;
pub mod repository;
pub mod scrapers;
pub mod server;
pub mod services;
pub mod utils;
