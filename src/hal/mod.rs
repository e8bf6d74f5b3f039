pub mod descriptor;
pub mod drivers;
pub mod mock;
pub mod registry;
pub mod traits;
pub mod types;

pub use descriptor::DeviceDescriptor;
pub use registry::{DeviceRegistry, ManagedDevice};
pub use traits::CardEnumerator;
pub use types::{CardInfo, Direction, PcmInfo};
