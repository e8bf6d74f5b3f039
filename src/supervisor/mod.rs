pub mod backoff;
pub mod bridge;
pub mod events;
pub mod monitor;
pub mod process;

pub use backoff::RetrySchedule;
pub use bridge::BridgeSupervisor;
pub use events::BridgeEvent;
pub use monitor::classify;
pub use process::{BridgeCommand, BridgeProcess};
