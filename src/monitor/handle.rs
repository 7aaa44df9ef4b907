//! Single-flight scheduler around [`Monitor`].
//!
//! The monitor lives inside one tokio task. Ticks and control commands are
//! both handled by that task, so a manual check can never overlap a
//! scheduled cycle and a stop issued mid-cycle takes effect once the cycle
//! has persisted its state.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::{CycleReport, Monitor, MonitorError, MonitorStatus};

enum Command {
    Start(oneshot::Sender<bool>),
    Stop(oneshot::Sender<bool>),
    CheckNow(oneshot::Sender<Result<CycleReport, MonitorError>>),
    Shutdown(oneshot::Sender<()>),
}

/// Cloneable control handle for a spawned monitor task.
#[derive(Clone)]
pub struct MonitorHandle {
    commands: mpsc::Sender<Command>,
    status: watch::Receiver<MonitorStatus>,
}

impl MonitorHandle {
    /// Move `monitor` into a task that polls every `interval`. The first
    /// tick fires immediately.
    pub fn spawn(monitor: Monitor, interval: Duration) -> Self {
        let (commands, receiver) = mpsc::channel(16);
        let status = monitor.subscribe();
        tokio::spawn(run(monitor, interval, receiver));
        Self { commands, status }
    }

    /// Latest published status. Does not wait for an in-flight cycle.
    pub fn status(&self) -> MonitorStatus {
        self.status.borrow().clone()
    }

    /// Resume polling. Returns false if it was already running.
    pub async fn start(&self) -> Result<bool, MonitorError> {
        self.request(Command::Start).await
    }

    /// Stop polling after any in-flight cycle. Returns false if already stopped.
    pub async fn stop(&self) -> Result<bool, MonitorError> {
        self.request(Command::Stop).await
    }

    /// Run one cycle now, queued behind any in-flight cycle. Rejected while stopped.
    pub async fn check_now(&self) -> Result<CycleReport, MonitorError> {
        self.request(Command::CheckNow).await?
    }

    /// Finish the in-flight cycle, persist and end the task.
    pub async fn shutdown(&self) -> Result<(), MonitorError> {
        self.request(Command::Shutdown).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, MonitorError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .await
            .map_err(|_| MonitorError::Closed)?;
        rx.await.map_err(|_| MonitorError::Closed)
    }
}

async fn run(mut monitor: Monitor, interval: Duration, mut commands: mpsc::Receiver<Command>) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            command = commands.recv() => match command {
                Some(Command::Start(ack)) => {
                    let started = monitor.start();
                    if started {
                        ticker.reset_immediately();
                    }
                    let _ = ack.send(started);
                }
                Some(Command::Stop(ack)) => {
                    let _ = ack.send(monitor.stop());
                }
                Some(Command::CheckNow(ack)) => {
                    let result = if monitor.is_running() {
                        monitor.run_cycle().await
                    } else {
                        Err(MonitorError::NotRunning)
                    };
                    let _ = ack.send(result);
                }
                Some(Command::Shutdown(ack)) => {
                    monitor.flush();
                    info!("Monitor shut down");
                    let _ = ack.send(());
                    break;
                }
                None => {
                    monitor.flush();
                    debug!("All monitor handles dropped, exiting");
                    break;
                }
            },

            _ = ticker.tick() => {
                if monitor.is_running() {
                    // Errors are logged by the cycle and retried on the next tick.
                    let _ = monitor.run_cycle().await;
                }
            }
        }
    }
}
