use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, watch, Mutex};

use super::backoff::RetrySchedule;
use super::events::BridgeEvent;
use super::monitor::Monitor;
use super::process::{BridgeCommand, BridgeProcess};

/// Supervises one external bridge process for one device.
///
/// The monitoring loop is spawned at construction and lives until the
/// supervisor is dropped; `activate`/`deactivate` only flip the desired
/// state the loop acts on. Construction therefore requires a running
/// tokio runtime.
#[derive(Debug)]
pub struct BridgeSupervisor {
    command: BridgeCommand,
    active: watch::Sender<bool>,
    failures: Arc<AtomicU32>,
    process: Arc<Mutex<BridgeProcess>>,
    events: broadcast::Sender<BridgeEvent>,
    shutdown: broadcast::Sender<()>,
}

impl BridgeSupervisor {
    /// Create an inactive supervisor and start its monitoring loop
    pub fn new(command: BridgeCommand, schedule: RetrySchedule) -> Self {
        let (active_tx, active_rx) = watch::channel(false);
        let (events_tx, _) = broadcast::channel(64);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let failures = Arc::new(AtomicU32::new(0));
        let process = Arc::new(Mutex::new(BridgeProcess::new()));

        let monitor = Monitor::new(
            command.clone(),
            schedule,
            Arc::clone(&process),
            Arc::clone(&failures),
            events_tx.clone(),
            active_rx,
        );
        tokio::spawn(monitor.run(shutdown_rx));

        Self {
            command,
            active: active_tx,
            failures,
            process,
            events: events_tx,
            shutdown: shutdown_tx,
        }
    }

    /// The invocation this supervisor manages
    pub fn command(&self) -> &BridgeCommand {
        &self.command
    }

    /// Subscribe to delay/log events
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.events.subscribe()
    }

    /// Consecutive failed monitor cycles since the last success
    pub fn consecutive_failures(&self) -> u32 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Whether the desired state is active
    pub fn is_active(&self) -> bool {
        *self.active.borrow()
    }

    /// Mark the bridge as wanted; the monitoring loop starts it on its next pass
    pub fn activate(&self) {
        self.active.send_replace(true);
    }

    /// Mark the bridge as unwanted, reset the failure count and stop the child
    pub async fn deactivate(&self) {
        self.active.send_replace(false);
        self.failures.store(0, Ordering::Relaxed);
        self.stop().await;
    }

    /// Spawn the bridge now if it is not already alive
    pub async fn start(&self) -> Result<()> {
        self.process.lock().await.ensure_started(&self.command)
    }

    /// Forcefully terminate the child; termination failures are swallowed
    pub async fn stop(&self) {
        if self.process.lock().await.terminate().await {
            tracing::info!("stopped {}", self.command);
        }
    }

    /// `stop` followed by `start`
    pub async fn restart(&self) -> Result<()> {
        self.stop().await;
        self.start().await
    }

    /// Liveness probe on the current child
    pub async fn is_running(&self) -> bool {
        self.process.lock().await.is_alive()
    }
}

impl Drop for BridgeSupervisor {
    fn drop(&mut self) {
        // The monitoring loop exits at its next suspension point; an
        // already-running child is left as-is
        let _ = self.shutdown.send(());
    }
}
