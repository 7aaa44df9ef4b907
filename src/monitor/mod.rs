//! Poll loop: the cycle state machine and its scheduler.

mod cycle;
mod handle;

pub use cycle::{CycleReport, Monitor, MonitorConfig, MonitorStatus, Phase};
pub use handle::MonitorHandle;

use thiserror::Error;

use crate::scrapers::FetchError;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Monitor is stopped")]
    NotRunning,

    #[error("Monitor task is no longer running")]
    Closed,
}
