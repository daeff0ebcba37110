//! Grouping keys. A dropped component is an empty string, rendered as `all`.

use std::hash::Hash;

pub const ALL_LABEL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyProjection {
    Full,
    AttributeOnly,
    ZoneOnly,
}

impl KeyProjection {
    pub const ALL: [KeyProjection; 3] = [
        KeyProjection::Full,
        KeyProjection::AttributeOnly,
        KeyProjection::ZoneOnly,
    ];
}

pub trait GroupingKey: Clone + Eq + Hash {
    fn project(&self, projection: KeyProjection) -> Self;

    /// Label values in the metric's label order, wildcards rendered as `all`.
    fn label_values(&self) -> [&str; 2];
}

fn label(value: &str) -> &str {
    if value.is_empty() {
        ALL_LABEL
    } else {
        value
    }
}

fn keep(value: &str, kept: bool) -> String {
    if kept {
        value.to_string()
    } else {
        String::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodeKey {
    pub instance_type: String,
    pub zone: String,
}

impl NodeKey {
    pub fn new(instance_type: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            instance_type: instance_type.into(),
            zone: zone.into(),
        }
    }
}

impl GroupingKey for NodeKey {
    fn project(&self, projection: KeyProjection) -> Self {
        Self {
            instance_type: keep(
                &self.instance_type,
                projection != KeyProjection::ZoneOnly,
            ),
            zone: keep(&self.zone, projection != KeyProjection::AttributeOnly),
        }
    }

    // instanceType, availabilityZone
    fn label_values(&self) -> [&str; 2] {
        [label(&self.instance_type), label(&self.zone)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VolumeKey {
    pub zone: String,
    pub storage_class: String,
}

impl VolumeKey {
    pub fn new(zone: impl Into<String>, storage_class: impl Into<String>) -> Self {
        Self {
            zone: zone.into(),
            storage_class: storage_class.into(),
        }
    }
}

impl GroupingKey for VolumeKey {
    fn project(&self, projection: KeyProjection) -> Self {
        Self {
            zone: keep(&self.zone, projection != KeyProjection::AttributeOnly),
            storage_class: keep(&self.storage_class, projection != KeyProjection::ZoneOnly),
        }
    }

    // storageClassName, availabilityZone
    fn label_values(&self) -> [&str; 2] {
        [label(&self.storage_class), label(&self.zone)]
    }
}
