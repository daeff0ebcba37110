//! Groups one cycle's inventory into per-key buckets and grand totals.

use crate::inventory::keys::{GroupingKey, KeyProjection, NodeKey, VolumeKey};
use crate::k8s::types::{ClaimRecord, NodeRecord, VolumeRecord, UNKNOWN};
use crate::k8s::zone::resolve_volume_zone;
use crate::k8s::Inventory;
use std::collections::HashMap;

/// Accumulated size and count for one grouping key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bucket {
    pub size: u64,
    pub count: u64,
}

impl Bucket {
    fn add(&mut self, size: u64) {
        self.size = self.size.saturating_add(size);
        self.count = self.count.saturating_add(1);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub node_count: u64,
    pub volume_count: u64,
    pub volume_size: u64,
    pub claim_count: u64,
    pub claim_size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregates {
    pub nodes: HashMap<NodeKey, u64>,
    pub volumes: HashMap<VolumeKey, Bucket>,
    pub claims: HashMap<VolumeKey, Bucket>,
    pub totals: Totals,
    pub ambiguous_zones: bool,
}

// All three projections of a record are applied together, never one alone.
fn accumulate<K, V>(buckets: &mut HashMap<K, V>, key: &K, mut apply: impl FnMut(&mut V))
where
    K: GroupingKey,
    V: Default,
{
    for projection in KeyProjection::ALL {
        apply(buckets.entry(key.project(projection)).or_default());
    }
}

pub fn aggregate(inventory: &Inventory) -> Aggregates {
    let mut aggregates = Aggregates::default();

    aggregate_nodes(&mut aggregates, &inventory.nodes);
    let zones = aggregate_volumes(&mut aggregates, &inventory.volumes);
    aggregate_claims(&mut aggregates, &inventory.claims, &zones);

    aggregates
}

fn aggregate_nodes(aggregates: &mut Aggregates, nodes: &[NodeRecord]) {
    for node in nodes {
        let key = NodeKey::new(node.instance_type.as_str(), node.zone.as_str());
        accumulate(&mut aggregates.nodes, &key, |count| *count += 1);
        aggregates.totals.node_count += 1;
    }
}

/// Returns the resolved zone of every volume by name, for claim lookups.
fn aggregate_volumes<'a>(
    aggregates: &mut Aggregates,
    volumes: &'a [VolumeRecord],
) -> HashMap<&'a str, String> {
    let mut zones = HashMap::with_capacity(volumes.len());

    for volume in volumes {
        let resolution = resolve_volume_zone(&volume.name, &volume.selectors);
        aggregates.ambiguous_zones |= resolution.ambiguous;

        let key = VolumeKey::new(resolution.zone.as_str(), volume.storage_class.as_str());
        accumulate(&mut aggregates.volumes, &key, |bucket| {
            bucket.add(volume.capacity_bytes)
        });

        let totals = &mut aggregates.totals;
        totals.volume_count = totals.volume_count.saturating_add(1);
        totals.volume_size = totals.volume_size.saturating_add(volume.capacity_bytes);
        zones.insert(volume.name.as_str(), resolution.zone);
    }

    zones
}

fn aggregate_claims(
    aggregates: &mut Aggregates,
    claims: &[ClaimRecord],
    zones: &HashMap<&str, String>,
) {
    for claim in claims {
        let zone = claim
            .volume_name
            .as_deref()
            .and_then(|name| zones.get(name))
            .map(String::as_str)
            .unwrap_or(UNKNOWN);

        let key = VolumeKey::new(zone, claim.storage_class.as_str());
        accumulate(&mut aggregates.claims, &key, |bucket| {
            bucket.add(claim.requested_bytes)
        });

        let totals = &mut aggregates.totals;
        totals.claim_count = totals.claim_count.saturating_add(1);
        totals.claim_size = totals.claim_size.saturating_add(claim.requested_bytes);
    }
}
