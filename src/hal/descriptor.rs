use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::BridgeConfig;
use crate::supervisor::BridgeCommand;

use super::types::Direction;

/// Immutable identity of one hardware PCM endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub card_index: u32,
    pub card_name: String,
    pub card_detail: String,
    pub device_index: u32,
    pub device_name: String,
    pub device_detail: String,
    pub direction: Direction,
}

impl DeviceDescriptor {
    /// ALSA hardware address, e.g. "hw:0,0"
    pub fn hw(&self) -> String {
        format!("hw:{},{}", self.card_index, self.device_index)
    }

    /// Short "card: device" label
    pub fn display_name(&self) -> String {
        format!("{}: {}", self.card_name, self.device_name)
    }

    /// Long "card detail: device detail" label
    pub fn detail(&self) -> String {
        format!("{}: {}", self.card_detail, self.device_detail)
    }

    /// Exact (card name, device name) match
    pub fn matches_name(&self, card_name: &str, device_name: &str) -> bool {
        self.card_name == card_name && self.device_name == device_name
    }

    /// Bridge invocation for this endpoint under the given tool config
    pub fn bridge_command(&self, config: &BridgeConfig) -> BridgeCommand {
        BridgeCommand {
            program: config.program_for(self.direction).to_string(),
            jack_name: self.device_detail.clone(),
            hw: self.hw(),
        }
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.detail())
    }
}
