use thiserror::Error;

/// Lookup failures surfaced by the device registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("device {0} not in list")]
    UnknownDevice(String),

    #[error("device hw:{card},{device} not in list")]
    UnknownHardware { card: u32, device: u32 },

    #[error("device [{card_name}:{device_name}] not in list")]
    UnknownName {
        card_name: String,
        device_name: String,
    },
}
