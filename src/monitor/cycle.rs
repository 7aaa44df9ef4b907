//! One poll cycle: fetch, extract, fingerprint, classify, notify, record.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::MonitorError;
use crate::models::CandidateItem;
use crate::repository::DedupStore;
use crate::scrapers::extract::parse_amount_value;
use crate::scrapers::{Extractor, Fetcher};
use crate::services::notify::{format_message, item_link, Notifier};
use crate::services::{fingerprint, fingerprint_prefix, FreshnessPolicy};

/// Where the poll loop is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Waiting for the next tick.
    Idle,
    /// First successful cycle in flight; records without alerting.
    Baseline,
    /// Regular cycle in flight.
    Steady,
    /// Explicitly stopped; ticks are ignored until restarted.
    Stopped,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Baseline => "baseline",
            Phase::Steady => "steady",
            Phase::Stopped => "stopped",
        }
    }
}

/// Outcome of one completed cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub poll: u64,
    pub baseline: bool,
    pub items: usize,
    /// Fingerprints not present in the previous cycle.
    pub new_items: usize,
    /// New to this cycle but already in the dedup store.
    pub already_known: usize,
    pub notified: usize,
    pub notify_failures: usize,
    pub stale: usize,
    pub below_min_amount: usize,
    /// Fingerprints added to the dedup store.
    pub recorded: usize,
    /// Whether the store was written (false when nothing was added or the write failed).
    pub persisted: bool,
    pub finished_at: DateTime<Utc>,
}

/// Snapshot published to status readers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    pub is_running: bool,
    pub poll_count: u64,
    pub last_fingerprint_prefix: Option<String>,
    pub phase: Phase,
    pub stored_fingerprints: usize,
    pub last_cycle: Option<CycleReport>,
}

/// Static inputs of the poll loop.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Listing page to poll.
    pub target_url: String,
    /// Prefix for detail links; the item's detail id is appended.
    pub detail_base_url: String,
    pub freshness: FreshnessPolicy,
    /// Items with a parsed amount below this are recorded but not alerted.
    /// Zero disables the filter.
    pub min_amount: f64,
}

/// Poll-loop state machine. Owns the dedup store and the previous-cycle
/// snapshot; nothing else touches either.
pub struct Monitor {
    config: MonitorConfig,
    fetcher: Box<dyn Fetcher>,
    notifier: Box<dyn Notifier>,
    extractor: Extractor,
    store: DedupStore,
    poll_count: u64,
    is_running: bool,
    baseline_done: bool,
    phase: Phase,
    last_known: HashSet<String>,
    last_cycle: Option<CycleReport>,
    save_pending: bool,
    status: watch::Sender<MonitorStatus>,
}

impl Monitor {
    /// Build a running monitor. `store` should already be loaded.
    pub fn new(
        config: MonitorConfig,
        fetcher: Box<dyn Fetcher>,
        notifier: Box<dyn Notifier>,
        extractor: Extractor,
        store: DedupStore,
    ) -> Self {
        let (status, _) = watch::channel(MonitorStatus {
            is_running: true,
            poll_count: 0,
            last_fingerprint_prefix: None,
            phase: Phase::Idle,
            stored_fingerprints: 0,
            last_cycle: None,
        });

        let mut monitor = Self {
            config,
            fetcher,
            notifier,
            extractor,
            store,
            poll_count: 0,
            is_running: true,
            baseline_done: false,
            phase: Phase::Idle,
            last_known: HashSet::new(),
            last_cycle: None,
            save_pending: false,
            status,
        };
        monitor.publish();
        monitor
    }

    /// Receiver for status snapshots; never blocks on an in-flight cycle.
    pub fn subscribe(&self) -> watch::Receiver<MonitorStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> MonitorStatus {
        self.status.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn store(&self) -> &DedupStore {
        &self.store
    }

    /// Resume polling. Returns false if already running.
    pub fn start(&mut self) -> bool {
        if self.is_running {
            return false;
        }
        self.is_running = true;
        self.phase = Phase::Idle;
        info!("Monitor started");
        self.publish();
        true
    }

    /// Stop polling. Returns false if already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.is_running {
            return false;
        }
        self.is_running = false;
        self.phase = Phase::Stopped;
        info!("Monitor stopped");
        self.publish();
        true
    }

    /// Write the store if an earlier save failed or was never attempted.
    pub fn flush(&mut self) {
        if self.save_pending {
            self.persist();
        }
    }

    /// Run one cycle. A fetch failure leaves the dedup store and the
    /// previous-cycle snapshot untouched.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, MonitorError> {
        self.poll_count += 1;
        let poll = self.poll_count;
        let baseline = !self.baseline_done;
        self.phase = if baseline {
            Phase::Baseline
        } else {
            Phase::Steady
        };
        self.publish();

        let result = self.fetch_and_process(poll, baseline).await;

        self.phase = if self.is_running {
            Phase::Idle
        } else {
            Phase::Stopped
        };
        match &result {
            Ok(report) => self.last_cycle = Some(report.clone()),
            Err(e) => warn!(poll, error = %e, "Poll cycle failed"),
        }
        self.publish();
        result
    }

    async fn fetch_and_process(
        &mut self,
        poll: u64,
        baseline: bool,
    ) -> Result<CycleReport, MonitorError> {
        let page = self.fetcher.fetch(&self.config.target_url).await?;
        let items = self.extractor.extract(&page.content);
        if items.is_empty() {
            warn!(poll, "No items extracted from listing page");
        }

        let fingerprinted: Vec<(String, CandidateItem)> = items
            .into_iter()
            .map(|item| (fingerprint(&item), item))
            .collect();
        let current: HashSet<String> = fingerprinted.iter().map(|(fp, _)| fp.clone()).collect();

        let mut report = CycleReport {
            poll,
            baseline,
            items: fingerprinted.len(),
            new_items: 0,
            already_known: 0,
            notified: 0,
            notify_failures: 0,
            stale: 0,
            below_min_amount: 0,
            recorded: 0,
            persisted: false,
            finished_at: page.fetched_at,
        };

        if baseline {
            for (fp, _) in &fingerprinted {
                if self.store.add(fp.as_str()) {
                    report.recorded += 1;
                }
            }
            self.baseline_done = true;
            info!(
                poll,
                items = report.items,
                recorded = report.recorded,
                "Baseline recorded, no alerts sent"
            );
        } else {
            let mut seen = HashSet::new();
            for (fp, item) in &fingerprinted {
                if self.last_known.contains(fp) || !seen.insert(fp.as_str()) {
                    continue;
                }
                report.new_items += 1;

                if self.store.has(fp) {
                    report.already_known += 1;
                    continue;
                }

                if !self.config.freshness.is_fresh(&item.recency_phrase) {
                    debug!(
                        fingerprint = fingerprint_prefix(fp),
                        recency = %item.recency_phrase,
                        "New item is stale, recording without alert"
                    );
                    report.stale += 1;
                } else if self.below_min_amount(item) {
                    report.below_min_amount += 1;
                } else {
                    self.notify(item, fp, &mut report).await;
                }

                if self.store.add(fp.as_str()) {
                    report.recorded += 1;
                }
            }

            info!(
                poll,
                items = report.items,
                new = report.new_items,
                notified = report.notified,
                stale = report.stale,
                "Poll cycle complete"
            );
        }

        self.last_known = current;

        if report.recorded > 0 {
            report.persisted = self.persist();
        }
        report.finished_at = Utc::now();
        Ok(report)
    }

    async fn notify(&self, item: &CandidateItem, fp: &str, report: &mut CycleReport) {
        let link = item_link(
            item,
            &self.config.detail_base_url,
            &self.config.target_url,
        );
        let message = format_message(item, &link);

        match self.notifier.send(&message).await {
            Ok(()) => {
                report.notified += 1;
                info!(
                    fingerprint = fingerprint_prefix(fp),
                    category = %item.category,
                    "Alert sent"
                );
            }
            Err(e) => {
                report.notify_failures += 1;
                warn!(
                    fingerprint = fingerprint_prefix(fp),
                    error = %e,
                    "Failed to send alert, recording anyway"
                );
            }
        }
    }

    fn below_min_amount(&self, item: &CandidateItem) -> bool {
        if self.config.min_amount <= 0.0 {
            return false;
        }
        item.monetary_amount
            .as_deref()
            .and_then(parse_amount_value)
            .is_some_and(|value| value < self.config.min_amount)
    }

    fn persist(&mut self) -> bool {
        match self.store.save_to_durable() {
            Ok(()) => {
                self.save_pending = false;
                true
            }
            Err(e) => {
                self.save_pending = true;
                warn!(error = %e, "Failed to persist dedup store, keeping in-memory state");
                false
            }
        }
    }

    fn publish(&mut self) {
        self.status.send_replace(MonitorStatus {
            is_running: self.is_running,
            poll_count: self.poll_count,
            last_fingerprint_prefix: self
                .store
                .iter()
                .last()
                .map(|fp| fingerprint_prefix(fp).to_string()),
            phase: self.phase,
            stored_fingerprints: self.store.len(),
            last_cycle: self.last_cycle.clone(),
        });
    }
}
