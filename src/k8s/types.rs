use k8s_openapi::api::core::v1::{Node, PersistentVolume, PersistentVolumeClaim};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;
use tracing::warn;

pub const UNKNOWN: &str = "Unknown";

pub const INSTANCE_TYPE_LABEL: &str = "node.kubernetes.io/instance-type";
pub const ZONE_LABEL: &str = "topology.kubernetes.io/zone";

const STORAGE_RESOURCE: &str = "storage";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub name: String,
    pub instance_type: String,
    pub zone: String,
}

impl NodeRecord {
    pub fn from_k8s_node(node: &Node) -> Self {
        let labels = node.metadata.labels.as_ref();

        Self {
            name: node.metadata.name.clone().unwrap_or_default(),
            instance_type: label_or_unknown(labels, INSTANCE_TYPE_LABEL),
            zone: label_or_unknown(labels, ZONE_LABEL),
        }
    }
}

/// A single node-affinity match expression, flattened out of its selector term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSelector {
    pub key: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeRecord {
    pub name: String,
    pub capacity_bytes: u64,
    pub storage_class: String,
    /// Every match expression of every required selector term, in document order.
    pub selectors: Vec<ZoneSelector>,
}

impl VolumeRecord {
    pub fn from_k8s_volume(pv: &PersistentVolume) -> Self {
        let name = pv.metadata.name.clone().unwrap_or_default();
        let spec = pv.spec.as_ref();

        let capacity_bytes = spec
            .and_then(|s| s.capacity.as_ref())
            .map(|c| storage_bytes(&name, c))
            .unwrap_or(0);

        let selectors = spec
            .and_then(|s| s.node_affinity.as_ref())
            .and_then(|a| a.required.as_ref())
            .map(|required| {
                required
                    .node_selector_terms
                    .iter()
                    .flat_map(|term| term.match_expressions.iter().flatten())
                    .map(|expr| ZoneSelector {
                        key: expr.key.clone(),
                        values: expr.values.clone().unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            storage_class: class_or_unknown(spec.and_then(|s| s.storage_class_name.as_deref())),
            name,
            capacity_bytes,
            selectors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRecord {
    pub name: String,
    pub namespace: String,
    pub requested_bytes: u64,
    pub storage_class: String,
    pub volume_name: Option<String>,
}

impl ClaimRecord {
    pub fn from_k8s_claim(pvc: &PersistentVolumeClaim) -> Self {
        let name = pvc.metadata.name.clone().unwrap_or_default();
        let spec = pvc.spec.as_ref();

        let requested_bytes = spec
            .and_then(|s| s.resources.as_ref())
            .and_then(|r| r.requests.as_ref())
            .map(|requests| storage_bytes(&name, requests))
            .unwrap_or(0);

        Self {
            namespace: pvc.metadata.namespace.clone().unwrap_or_default(),
            requested_bytes,
            storage_class: class_or_unknown(spec.and_then(|s| s.storage_class_name.as_deref())),
            volume_name: spec
                .and_then(|s| s.volume_name.clone())
                .filter(|v| !v.is_empty()),
            name,
        }
    }
}

fn label_or_unknown(labels: Option<&BTreeMap<String, String>>, key: &str) -> String {
    labels
        .and_then(|l| l.get(key))
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| UNKNOWN.to_string())
}

// An empty class would read as the "any class" wildcard once grouped.
fn class_or_unknown(class: Option<&str>) -> String {
    match class {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

fn storage_bytes(owner: &str, resources: &BTreeMap<String, Quantity>) -> u64 {
    let Some(quantity) = resources.get(STORAGE_RESOURCE) else {
        return 0;
    };

    parse_quantity_bytes(quantity).unwrap_or_else(|| {
        warn!(resource = %owner, quantity = %quantity.0, "Invalid storage quantity, counting as 0 bytes");
        0
    })
}

/// Parse a Kubernetes resource quantity ("10Gi", "500M", "1.5e3") into bytes.
///
/// Fractional results are rounded up. Negative, malformed or out of range
/// quantities yield `None`.
pub fn parse_quantity_bytes(quantity: &Quantity) -> Option<u64> {
    let raw = quantity.0.trim();
    let split = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '+' || c == '-'))
        .unwrap_or(raw.len());
    let (number, suffix) = raw.split_at(split);

    let mantissa: f64 = number.parse().ok()?;

    let multiplier = match suffix {
        "" => 1.0,
        "Ki" => 1024f64,
        "Mi" => 1024f64.powi(2),
        "Gi" => 1024f64.powi(3),
        "Ti" => 1024f64.powi(4),
        "Pi" => 1024f64.powi(5),
        "Ei" => 1024f64.powi(6),
        "n" => 1e-9,
        "u" => 1e-6,
        "m" => 1e-3,
        "k" => 1e3,
        "M" => 1e6,
        "G" => 1e9,
        "T" => 1e12,
        "P" => 1e15,
        "E" => 1e18,
        exp if exp.starts_with(['e', 'E']) => {
            let exponent: i32 = exp[1..].parse().ok()?;
            10f64.powi(exponent)
        }
        _ => return None,
    };

    let bytes = mantissa * multiplier;
    // u64::MAX as f64 rounds up to 2^64
    if !bytes.is_finite() || bytes < 0.0 || bytes >= u64::MAX as f64 {
        return None;
    }

    Some(bytes.ceil() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{
        NodeSelector, NodeSelectorRequirement, NodeSelectorTerm, PersistentVolumeClaimSpec,
        PersistentVolumeSpec, VolumeNodeAffinity,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn q(s: &str) -> Quantity {
        Quantity(s.to_string())
    }

    #[test]
    fn test_parse_quantity_suffixes() {
        assert_eq!(parse_quantity_bytes(&q("1024")), Some(1024));
        assert_eq!(parse_quantity_bytes(&q("1Ki")), Some(1024));
        assert_eq!(parse_quantity_bytes(&q("10Gi")), Some(10 * 1024 * 1024 * 1024));
        assert_eq!(parse_quantity_bytes(&q("1.5Mi")), Some(1_572_864));
        assert_eq!(parse_quantity_bytes(&q("5G")), Some(5_000_000_000));
        assert_eq!(parse_quantity_bytes(&q("2k")), Some(2000));
        assert_eq!(parse_quantity_bytes(&q("1E")), Some(1_000_000_000_000_000_000));
    }

    #[test]
    fn test_parse_quantity_exponent_and_rounding() {
        assert_eq!(parse_quantity_bytes(&q("1e3")), Some(1000));
        assert_eq!(parse_quantity_bytes(&q("12E2")), Some(1200));
        assert_eq!(parse_quantity_bytes(&q("1500m")), Some(2));
    }

    #[test]
    fn test_parse_quantity_rejects_garbage() {
        assert_eq!(parse_quantity_bytes(&q("")), None);
        assert_eq!(parse_quantity_bytes(&q("lots")), None);
        assert_eq!(parse_quantity_bytes(&q("10Xi")), None);
        assert_eq!(parse_quantity_bytes(&q("-1Gi")), None);
    }

    #[test]
    fn test_parse_quantity_out_of_range() {
        assert_eq!(parse_quantity_bytes(&q("8Ei")), Some(1 << 63));
        assert_eq!(parse_quantity_bytes(&q("16Ei")), None);
        assert_eq!(parse_quantity_bytes(&q("1e30")), None);
    }

    #[test]
    fn test_node_labels_default_to_unknown() {
        let mut labels = BTreeMap::new();
        labels.insert(INSTANCE_TYPE_LABEL.to_string(), "m5.large".to_string());
        labels.insert(ZONE_LABEL.to_string(), "us-east-1a".to_string());

        let labelled = Node {
            metadata: ObjectMeta {
                name: Some("node-1".to_string()),
                labels: Some(labels),
                ..Default::default()
            },
            ..Default::default()
        };
        let bare = Node::default();

        let record = NodeRecord::from_k8s_node(&labelled);
        assert_eq!(record.instance_type, "m5.large");
        assert_eq!(record.zone, "us-east-1a");

        let record = NodeRecord::from_k8s_node(&bare);
        assert_eq!(record.instance_type, UNKNOWN);
        assert_eq!(record.zone, UNKNOWN);
    }

    #[test]
    fn test_volume_flattens_selector_terms() {
        let term = |key: &str, values: &[&str]| NodeSelectorTerm {
            match_expressions: Some(vec![NodeSelectorRequirement {
                key: key.to_string(),
                operator: "In".to_string(),
                values: Some(values.iter().map(|v| v.to_string()).collect()),
            }]),
            ..Default::default()
        };

        let mut capacity = BTreeMap::new();
        capacity.insert("storage".to_string(), q("10Gi"));

        let pv = PersistentVolume {
            metadata: ObjectMeta {
                name: Some("pv-1".to_string()),
                ..Default::default()
            },
            spec: Some(PersistentVolumeSpec {
                capacity: Some(capacity),
                storage_class_name: Some("gp3".to_string()),
                node_affinity: Some(VolumeNodeAffinity {
                    required: Some(NodeSelector {
                        node_selector_terms: vec![
                            term("kubernetes.io/hostname", &["ip-10-0-0-1"]),
                            term(ZONE_LABEL, &["us-east-1a", "us-east-1b"]),
                        ],
                    }),
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        let record = VolumeRecord::from_k8s_volume(&pv);
        assert_eq!(record.name, "pv-1");
        assert_eq!(record.capacity_bytes, 10 * 1024 * 1024 * 1024);
        assert_eq!(record.storage_class, "gp3");
        assert_eq!(record.selectors.len(), 2);
        assert_eq!(record.selectors[1].key, ZONE_LABEL);
        assert_eq!(record.selectors[1].values, vec!["us-east-1a", "us-east-1b"]);
    }

    #[test]
    fn test_volume_without_spec() {
        let record = VolumeRecord::from_k8s_volume(&PersistentVolume::default());

        assert_eq!(record.capacity_bytes, 0);
        assert_eq!(record.storage_class, UNKNOWN);
        assert!(record.selectors.is_empty());
    }

    #[test]
    fn test_claim_binding() {
        let bound = PersistentVolumeClaim {
            metadata: ObjectMeta {
                name: Some("data".to_string()),
                namespace: Some("default".to_string()),
                ..Default::default()
            },
            spec: Some(PersistentVolumeClaimSpec {
                storage_class_name: Some("gp3".to_string()),
                volume_name: Some("pv-1".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let pending = PersistentVolumeClaim {
            spec: Some(PersistentVolumeClaimSpec {
                volume_name: Some(String::new()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let record = ClaimRecord::from_k8s_claim(&bound);
        assert_eq!(record.volume_name.as_deref(), Some("pv-1"));
        assert_eq!(record.storage_class, "gp3");
        assert_eq!(record.requested_bytes, 0);

        let record = ClaimRecord::from_k8s_claim(&pending);
        assert_eq!(record.volume_name, None);
        assert_eq!(record.storage_class, UNKNOWN);
    }
}
