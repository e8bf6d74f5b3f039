use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::hal::Direction;

/// Which bridge executables connect ALSA devices to the JACK graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub capture_program: String,
    pub playback_program: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            capture_program: "alsa_in".to_string(),
            playback_program: "alsa_out".to_string(),
        }
    }
}

impl BridgeConfig {
    /// zita-ajbridge flavor of the bridge tools
    pub fn zita() -> Self {
        Self {
            capture_program: "zita-a2j".to_string(),
            playback_program: "zita-j2a".to_string(),
        }
    }

    /// Bridge executable for the given direction
    pub fn program_for(&self, direction: Direction) -> &str {
        match direction {
            Direction::Capture => &self.capture_program,
            Direction::Playback => &self.playback_program,
        }
    }

    /// Load from a JSON file, writing the defaults first if it is missing
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path).await?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .await
            .context("Failed to read bridge config")?;

        serde_json::from_str(&content).context("Failed to parse bridge config JSON")
    }

    /// Save as pretty JSON
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let json = serde_json::to_string_pretty(self)?;

        // Write to temporary file first
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, json)
            .await
            .context("Failed to write temporary config file")?;

        // Atomic rename
        fs::rename(&temp_path, path)
            .await
            .context("Failed to atomically update config file")?;

        Ok(())
    }
}
