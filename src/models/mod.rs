// Output records handed to the reporter (camelCase JSON)

mod container;
mod image;
mod network;
mod snapshot;
mod system;

pub use container::ContainerRecord;
pub use image::ImageRecord;
pub use network::{IpamConfig, NetworkRecord};
pub use snapshot::Snapshot;
pub use system::SystemRecord;
