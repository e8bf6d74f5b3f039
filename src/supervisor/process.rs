use std::fmt;
use std::process::Stdio;

use anyhow::{anyhow, Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

/// Invocation template for one bridge process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeCommand {
    /// Bridge executable, e.g. "alsa_in"
    pub program: String,
    /// JACK client name passed via -j
    pub jack_name: String,
    /// ALSA hardware address passed via -d, e.g. "hw:0,0"
    pub hw: String,
}

impl BridgeCommand {
    pub fn args(&self) -> [&str; 4] {
        ["-j", &self.jack_name, "-d", &self.hw]
    }
}

impl fmt::Display for BridgeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -j \"{}\" -d {}", self.program, self.jack_name, self.hw)
    }
}

/// Lifecycle state of the supervised child
#[derive(Debug)]
enum ProcessState {
    NotStarted,
    Running {
        child: Child,
        /// Merged stdout+stderr lines; handed out once per spawn
        output: Option<mpsc::Receiver<String>>,
    },
}

/// Owns at most one live bridge child process
#[derive(Debug)]
pub struct BridgeProcess {
    state: ProcessState,
}

impl BridgeProcess {
    pub fn new() -> Self {
        Self {
            state: ProcessState::NotStarted,
        }
    }

    /// Spawn the bridge if no live child exists; no-op otherwise.
    ///
    /// stdout and stderr are piped and forwarded line-by-line into a single
    /// merged channel, retrievable once via [`take_output`](Self::take_output).
    pub fn ensure_started(&mut self, command: &BridgeCommand) -> Result<()> {
        if self.is_alive() {
            return Ok(());
        }

        tracing::info!("starting {}", command);
        let mut child = Command::new(&command.program)
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn {}", command))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("bridge stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("bridge stderr not captured"))?;

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(forward_lines(stdout, tx.clone()));
        tokio::spawn(forward_lines(stderr, tx));

        self.state = ProcessState::Running {
            child,
            output: Some(rx),
        };

        Ok(())
    }

    /// Hand out the merged output receiver; Some exactly once per spawn
    pub fn take_output(&mut self) -> Option<mpsc::Receiver<String>> {
        match &mut self.state {
            ProcessState::Running { output, .. } => output.take(),
            ProcessState::NotStarted => None,
        }
    }

    /// Liveness probe; a failed probe counts as not alive
    pub fn is_alive(&mut self) -> bool {
        match &mut self.state {
            ProcessState::Running { child, .. } => matches!(child.try_wait(), Ok(None)),
            ProcessState::NotStarted => false,
        }
    }

    /// Forcefully terminate the child, swallowing any termination failure.
    /// Returns whether a child was actually killed.
    pub async fn terminate(&mut self) -> bool {
        match std::mem::replace(&mut self.state, ProcessState::NotStarted) {
            ProcessState::Running { mut child, .. } => child.kill().await.is_ok(),
            ProcessState::NotStarted => false,
        }
    }
}

impl Default for BridgeProcess {
    fn default() -> Self {
        Self::new()
    }
}

async fn forward_lines(reader: impl AsyncRead + Unpin, tx: mpsc::Sender<String>) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(line).await.is_err() {
            break;
        }
    }
}
