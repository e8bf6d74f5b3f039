use std::collections::HashMap;

use anyhow::Result;

use crate::config::BridgeConfig;
use crate::error::RegistryError;
use crate::supervisor::{BridgeSupervisor, RetrySchedule};

use super::descriptor::DeviceDescriptor;
use super::traits::CardEnumerator;
use super::types::Direction;

/// One registry entry: the descriptor plus its process supervisor
#[derive(Debug)]
pub struct ManagedDevice {
    pub descriptor: DeviceDescriptor,
    pub supervisor: BridgeSupervisor,
}

/// All devices of one direction, each paired with a supervised bridge process
pub struct DeviceRegistry {
    direction: Direction,
    enumerator: Box<dyn CardEnumerator>,
    config: BridgeConfig,
    entries: Vec<ManagedDevice>,
    index: HashMap<String, usize>,
}

impl DeviceRegistry {
    /// Build a registry and populate it from the enumerator
    pub async fn new(
        direction: Direction,
        enumerator: Box<dyn CardEnumerator>,
        config: BridgeConfig,
    ) -> Result<Self> {
        let mut registry = Self {
            direction,
            enumerator,
            config,
            entries: Vec::new(),
            index: HashMap::new(),
        };
        registry.update().await?;
        Ok(registry)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Discard the current generation and rebuild it from the enumerator.
    ///
    /// Supervisors of the previous generation are not stopped here; bridges
    /// they already started keep running. Call [`stop`](Self::stop) first
    /// for a clean swap.
    pub async fn update(&mut self) -> Result<()> {
        let cards = self.enumerator.enumerate(self.direction).await?;

        self.entries.clear();
        self.index.clear();

        for card in cards {
            for device in card.devices {
                let descriptor = DeviceDescriptor {
                    card_index: card.index,
                    card_name: card.name.clone(),
                    card_detail: card.detail.clone(),
                    device_index: device.index,
                    device_name: device.name,
                    device_detail: device.detail,
                    direction: self.direction,
                };
                let supervisor = BridgeSupervisor::new(
                    descriptor.bridge_command(&self.config),
                    RetrySchedule::default(),
                );

                // First entry wins for a duplicated device name
                if !self.index.contains_key(&descriptor.device_name) {
                    self.index
                        .insert(descriptor.device_name.clone(), self.entries.len());
                }
                self.entries.push(ManagedDevice {
                    descriptor,
                    supervisor,
                });
            }
        }

        Ok(())
    }

    /// Entry for an exact device-name key
    pub fn get(&self, name: &str) -> Result<&ManagedDevice, RegistryError> {
        self.index
            .get(name)
            .map(|&position| &self.entries[position])
            .ok_or_else(|| RegistryError::UnknownDevice(name.to_string()))
    }

    /// First entry matching the (card, device) index pair
    pub fn by_hw(&self, card: u32, device: u32) -> Result<&ManagedDevice, RegistryError> {
        self.iter()
            .find(|entry| {
                entry.descriptor.card_index == card && entry.descriptor.device_index == device
            })
            .ok_or(RegistryError::UnknownHardware { card, device })
    }

    /// First entry matching the (card name, device name) pair
    pub fn by_name(
        &self,
        card_name: &str,
        device_name: &str,
    ) -> Result<&ManagedDevice, RegistryError> {
        self.iter()
            .find(|entry| entry.descriptor.matches_name(card_name, device_name))
            .ok_or_else(|| RegistryError::UnknownName {
                card_name: card_name.to_string(),
                device_name: device_name.to_string(),
            })
    }

    /// Deactivate every supervisor in the current generation
    pub async fn stop(&self) {
        for entry in &self.entries {
            entry.supervisor.deactivate().await;
        }
    }

    /// Current-generation entries in construction order
    pub fn iter(&self) -> impl Iterator<Item = &ManagedDevice> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
