use serde::{Deserialize, Serialize};

/// Stream direction of a PCM endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Capture,
    Playback,
}

/// One PCM device as reported by an enumerator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcmInfo {
    pub index: u32,
    pub name: String,
    pub detail: String,
}

/// One sound card with its PCM devices for a single direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardInfo {
    pub index: u32,
    pub name: String,
    pub detail: String,
    pub devices: Vec<PcmInfo>,
}
