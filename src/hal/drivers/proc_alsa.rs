use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::hal::traits::CardEnumerator;
use crate::hal::types::{CardInfo, Direction, PcmInfo};

/// Enumerates ALSA cards and PCM devices from /proc/asound, without a
/// libasound binding
pub struct ProcfsEnumerator {
    root: PathBuf,
}

impl ProcfsEnumerator {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/proc/asound"),
        }
    }

    /// Use an alternative procfs root (tests)
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Whether the ALSA procfs interface is present on this system
    pub fn available(&self) -> bool {
        self.root.join("cards").exists()
    }
}

impl Default for ProcfsEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CardEnumerator for ProcfsEnumerator {
    async fn enumerate(&self, direction: Direction) -> Result<Vec<CardInfo>> {
        let root = self.root.clone();

        // Plain file reads, but procfs can stall on a wedged driver
        tokio::task::spawn_blocking(move || {
            let cards_text = std::fs::read_to_string(root.join("cards"))
                .context("failed to read ALSA cards list")?;
            let pcm_text = std::fs::read_to_string(root.join("pcm"))
                .context("failed to read ALSA pcm list")?;

            Ok(build_cards(&cards_text, &pcm_text, direction))
        })
        .await?
    }
}

/// Join card headers with their direction-matching PCM devices; cards
/// without any matching device are dropped
pub fn build_cards(cards_text: &str, pcm_text: &str, direction: Direction) -> Vec<CardInfo> {
    let mut cards = parse_cards(cards_text);

    for (card_index, device) in parse_pcm(pcm_text, direction) {
        if let Some(card) = cards.iter_mut().find(|c| c.index == card_index) {
            card.devices.push(device);
        }
    }

    cards.retain(|card| !card.devices.is_empty());
    cards
}

/// Parse /proc/asound/cards header lines:
/// ` 0 [PCH            ]: HDA-Intel - HDA Intel PCH`
fn parse_cards(text: &str) -> Vec<CardInfo> {
    text.lines().filter_map(parse_card_line).collect()
}

fn parse_card_line(line: &str) -> Option<CardInfo> {
    let (prefix, rest) = line.split_once('[')?;
    let index = prefix.trim().parse().ok()?;
    let (id, rest) = rest.split_once(']')?;
    let detail = rest
        .split_once(" - ")
        .map(|(_, detail)| detail.trim())
        .unwrap_or("");

    Some(CardInfo {
        index,
        name: id.trim().to_string(),
        detail: detail.to_string(),
        devices: Vec::new(),
    })
}

/// Parse /proc/asound/pcm lines:
/// `00-00: ALC892 Analog : ALC892 Analog : playback 1 : capture 1`
fn parse_pcm(text: &str, direction: Direction) -> Vec<(u32, PcmInfo)> {
    let stream = match direction {
        Direction::Capture => "capture",
        Direction::Playback => "playback",
    };

    text.lines()
        .filter_map(|line| parse_pcm_line(line, stream))
        .collect()
}

fn parse_pcm_line(line: &str, stream: &str) -> Option<(u32, PcmInfo)> {
    let (address, rest) = line.split_once(':')?;
    let (card, device) = address.split_once('-')?;
    let card_index = card.trim().parse().ok()?;
    let device_index = device.trim().parse().ok()?;

    let fields: Vec<&str> = rest.split(" : ").map(str::trim).collect();
    if fields.len() < 2 {
        return None;
    }

    // Stream capability fields follow the id and name
    if !fields[2..].iter().any(|field| field.starts_with(stream)) {
        return None;
    }

    Some((
        card_index,
        PcmInfo {
            index: device_index,
            name: fields[0].to_string(),
            detail: fields[1].to_string(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARDS: &str = "\
 0 [PCH            ]: HDA-Intel - HDA Intel PCH
                      HDA Intel PCH at 0xf7f30000 irq 31
 1 [USB            ]: USB-Audio - Scarlett 2i2 USB
                      Focusrite Scarlett 2i2 USB at usb-0000:00:14.0-2, high speed
";

    const PCM: &str = "\
00-00: ALC892 Analog : ALC892 Analog : playback 1 : capture 1
00-03: HDMI 0 : HDMI 0 : playback 1
01-00: USB Audio : USB Audio #1 : playback 1 : capture 1
";

    #[test]
    fn test_parse_cards() {
        let cards = parse_cards(CARDS);

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].index, 0);
        assert_eq!(cards[0].name, "PCH");
        assert_eq!(cards[0].detail, "HDA Intel PCH");
        assert_eq!(cards[1].index, 1);
        assert_eq!(cards[1].name, "USB");
        assert_eq!(cards[1].detail, "Scarlett 2i2 USB");
    }

    #[test]
    fn test_parse_cards_skips_empty_list() {
        assert!(parse_cards("--- no soundcards ---\n").is_empty());
    }

    #[test]
    fn test_parse_pcm_capture() {
        let devices = parse_pcm(PCM, Direction::Capture);

        // The HDMI playback-only device is filtered out
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].0, 0);
        assert_eq!(devices[0].1.index, 0);
        assert_eq!(devices[0].1.name, "ALC892 Analog");
        assert_eq!(devices[1].0, 1);
        assert_eq!(devices[1].1.name, "USB Audio");
        assert_eq!(devices[1].1.detail, "USB Audio #1");
    }

    #[test]
    fn test_parse_pcm_playback() {
        let devices = parse_pcm(PCM, Direction::Playback);
        assert_eq!(devices.len(), 3);
    }

    #[test]
    fn test_build_cards_drops_cards_without_devices() {
        let pcm = "01-00: USB Audio : USB Audio #1 : playback 1 : capture 1\n";
        let cards = build_cards(CARDS, pcm, Direction::Capture);

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "USB");
        assert_eq!(cards[0].devices.len(), 1);
        assert_eq!(cards[0].devices[0].index, 0);
    }

    #[tokio::test]
    async fn test_enumerate_from_fixture_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cards"), CARDS).unwrap();
        std::fs::write(dir.path().join("pcm"), PCM).unwrap();

        let enumerator = ProcfsEnumerator::with_root(dir.path());
        assert!(enumerator.available());

        let cards = enumerator.enumerate(Direction::Capture).await.unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].devices[0].detail, "USB Audio #1");
    }
}
