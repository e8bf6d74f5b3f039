use anyhow::Result;
use async_trait::async_trait;

use crate::hal::traits::CardEnumerator;
use crate::hal::types::{CardInfo, Direction, PcmInfo};

/// Enumerator returning a canned card list, for tests and demos
pub struct MockEnumerator {
    cards: Vec<CardInfo>,
}

impl MockEnumerator {
    pub fn new(cards: Vec<CardInfo>) -> Self {
        Self { cards }
    }

    /// One USB capture card with a single PCM device
    pub fn sample() -> Self {
        Self::new(vec![CardInfo {
            index: 0,
            name: "USB".to_string(),
            detail: "USB Audio".to_string(),
            devices: vec![PcmInfo {
                index: 0,
                name: "PCM".to_string(),
                detail: "PCM capture".to_string(),
            }],
        }])
    }
}

#[async_trait]
impl CardEnumerator for MockEnumerator {
    async fn enumerate(&self, _direction: Direction) -> Result<Vec<CardInfo>> {
        Ok(self.cards.clone())
    }
}
