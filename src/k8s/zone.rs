//! Availability zone resolution for persistent volumes.

use crate::k8s::types::{ZoneSelector, UNKNOWN};
use tracing::warn;

/// Topology keys recognized as carrying an availability zone.
pub const ZONE_KEYS: [&str; 3] = [
    // Deprecated, still written by older provisioners
    "failure-domain.beta.kubernetes.io/zone",
    "topology.kubernetes.io/zone",
    // AWS EBS CSI driver
    "topology.ebs.csi.aws.com/zone",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneResolution {
    pub zone: String,
    pub ambiguous: bool,
}

impl ZoneResolution {
    fn unknown() -> Self {
        Self {
            zone: UNKNOWN.to_string(),
            ambiguous: false,
        }
    }
}

pub fn is_zone_key(key: &str) -> bool {
    ZONE_KEYS.contains(&key)
}

/// Last matching expression wins; a multi-valued one yields its first value
/// and marks the result ambiguous.
pub fn resolve_volume_zone(volume: &str, selectors: &[ZoneSelector]) -> ZoneResolution {
    let mut resolution = ZoneResolution::unknown();

    for selector in selectors.iter().filter(|s| is_zone_key(&s.key)) {
        let Some(first) = selector.values.first() else {
            continue;
        };

        if selector.values.len() > 1 {
            warn!(
                volume = %volume,
                zones = ?selector.values,
                chosen = %first,
                "Volume has more than one availability zone, using the first one"
            );
            resolution.ambiguous = true;
        }

        resolution.zone = first.clone();
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(key: &str, values: &[&str]) -> ZoneSelector {
        ZoneSelector {
            key: key.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn test_single_value_zone() {
        let resolution = resolve_volume_zone(
            "pv-1",
            &[selector("topology.ebs.csi.aws.com/zone", &["us-east-1c"])],
        );

        assert_eq!(resolution.zone, "us-east-1c");
        assert!(!resolution.ambiguous);
    }

    #[test]
    fn test_multi_value_zone_picks_first() {
        let resolution = resolve_volume_zone(
            "pv-1",
            &[selector(
                "topology.kubernetes.io/zone",
                &["us-east-1a", "us-east-1b"],
            )],
        );

        assert_eq!(resolution.zone, "us-east-1a");
        assert!(resolution.ambiguous);
    }

    #[test]
    fn test_no_affinity_is_unknown() {
        let resolution = resolve_volume_zone("pv-1", &[]);

        assert_eq!(resolution.zone, UNKNOWN);
        assert!(!resolution.ambiguous);
    }

    #[test]
    fn test_unrecognized_keys_ignored() {
        let resolution = resolve_volume_zone(
            "pv-1",
            &[selector("kubernetes.io/hostname", &["node-a", "node-b"])],
        );

        assert_eq!(resolution.zone, UNKNOWN);
        assert!(!resolution.ambiguous);
    }

    #[test]
    fn test_last_matching_expression_wins() {
        let resolution = resolve_volume_zone(
            "pv-1",
            &[
                selector("failure-domain.beta.kubernetes.io/zone", &["eu-west-1a"]),
                selector("topology.kubernetes.io/zone", &["eu-west-1b"]),
            ],
        );

        assert_eq!(resolution.zone, "eu-west-1b");
    }

    #[test]
    fn test_empty_value_list_skipped() {
        let resolution = resolve_volume_zone(
            "pv-1",
            &[
                selector("topology.kubernetes.io/zone", &["eu-west-1a"]),
                selector("topology.ebs.csi.aws.com/zone", &[]),
            ],
        );

        assert_eq!(resolution.zone, "eu-west-1a");
        assert!(!resolution.ambiguous);
    }

    #[test]
    fn test_ambiguity_sticks_after_later_single_value() {
        let resolution = resolve_volume_zone(
            "pv-1",
            &[
                selector("topology.kubernetes.io/zone", &["a", "b"]),
                selector("topology.ebs.csi.aws.com/zone", &["c"]),
            ],
        );

        assert_eq!(resolution.zone, "c");
        assert!(resolution.ambiguous);
    }
}
