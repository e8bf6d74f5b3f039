use anyhow::Result;
use async_trait::async_trait;

use super::types::{CardInfo, Direction};

/// Trait implemented by hardware enumerators for card/device discovery
#[async_trait]
pub trait CardEnumerator: Send + Sync {
    /// List sound cards exposing PCM devices for the given direction
    async fn enumerate(&self, direction: Direction) -> Result<Vec<CardInfo>>;
}
