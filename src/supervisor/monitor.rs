use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

use anyhow::{anyhow, Result};
use regex::Regex;
use tokio::sync::{broadcast, mpsc, watch, Mutex};
use tokio::time::sleep;

use super::backoff::RetrySchedule;
use super::events::BridgeEvent;
use super::process::{BridgeCommand, BridgeProcess};

fn delay_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"delay = (\d+)").expect("valid pattern"))
}

/// Classify one line of bridge output.
///
/// A `delay = <digits>` report anywhere in the line wins over the generic
/// log case; whitespace-only lines produce nothing.
pub fn classify(line: &str) -> Option<BridgeEvent> {
    if let Some(caps) = delay_pattern().captures(line) {
        return Some(BridgeEvent::DelayChanged(caps[1].to_string()));
    }

    if line.trim().is_empty() {
        return None;
    }

    Some(BridgeEvent::LogMessage(line.to_string()))
}

/// State owned by one supervisor's monitoring loop
pub(crate) struct Monitor {
    command: BridgeCommand,
    schedule: RetrySchedule,
    process: Arc<Mutex<BridgeProcess>>,
    failures: Arc<AtomicU32>,
    events: broadcast::Sender<BridgeEvent>,
    active: watch::Receiver<bool>,
    /// Merged output of the current child, taken from the process on spawn
    output: Option<mpsc::Receiver<String>>,
}

impl Monitor {
    pub(crate) fn new(
        command: BridgeCommand,
        schedule: RetrySchedule,
        process: Arc<Mutex<BridgeProcess>>,
        failures: Arc<AtomicU32>,
        events: broadcast::Sender<BridgeEvent>,
        active: watch::Receiver<bool>,
    ) -> Self {
        Self {
            command,
            schedule,
            process,
            failures,
            events,
            active,
            output: None,
        }
    }

    /// Run until shutdown. Process failures are folded into the failure
    /// counter and backoff; they never end the loop.
    pub(crate) async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            // Park while inactive; shutdown or a closed flag channel ends the loop
            tokio::select! {
                _ = shutdown.recv() => return,
                changed = self.active.wait_for(|active| *active) => {
                    if changed.is_err() {
                        return;
                    }
                }
            }

            let result = tokio::select! {
                _ = shutdown.recv() => return,
                result = self.cycle() => result,
            };

            match result {
                Ok(()) => {
                    self.failures.store(0, Ordering::Relaxed);
                }
                Err(err) => {
                    // Deactivation kills the child mid-read; that failure is
                    // not counted against the freshly reset counter
                    if *self.active.borrow() {
                        let fails = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
                        tracing::warn!("{} failed ({}): {:#}", self.command, fails, err);
                    }
                }
            }

            let delay = self.schedule.delay(self.failures.load(Ordering::Relaxed));
            tokio::select! {
                _ = shutdown.recv() => return,
                _ = sleep(delay) => {}
            }
        }
    }

    /// One start/read/classify/liveness cycle
    async fn cycle(&mut self) -> Result<()> {
        {
            let mut process = self.process.lock().await;
            process.ensure_started(&self.command)?;

            // A fresh spawn, here or via an explicit start/restart, yields a
            // new output stream
            if let Some(output) = process.take_output() {
                self.output = Some(output);
            }
        }

        // The lock is not held during the read, so stop/deactivate can
        // always terminate a child that produces no output
        let line = match self.output.as_mut() {
            Some(output) => output.recv().await,
            None => None,
        };
        let line = line.ok_or_else(|| anyhow!("output stream closed"))?;

        if let Some(event) = classify(&line) {
            // No subscribers is fine
            let _ = self.events.send(event);
        }

        if !self.process.lock().await.is_alive() {
            return Err(anyhow!("process died after read"));
        }

        Ok(())
    }
}
