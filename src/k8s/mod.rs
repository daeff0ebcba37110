pub mod client;
pub mod types;
pub mod zone;

pub use client::{Inventory, InventorySource, K8sClient};
pub use types::{ClaimRecord, NodeRecord, VolumeRecord, ZoneSelector};
pub use zone::{resolve_volume_zone, ZoneResolution};
