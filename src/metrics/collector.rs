use crate::inventory::{Aggregates, Bucket, GroupingKey, ALL_LABEL};
use crate::metrics::SizeUnit;
use crate::{ExporterError, Result};
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;
use tracing::debug;

pub const NODE_LABELS: [&str; 2] = ["instanceType", "availabilityZone"];
pub const VOLUME_LABELS: [&str; 2] = ["storageClassName", "availabilityZone"];

/// Label value of the anomaly series for volumes with several candidate zones.
pub const EXTRA_ZONES: &str = "ExtraZones";

pub struct InventoryMetrics {
    registry: Registry,
    unit: SizeUnit,
    node_count: GaugeVec,
    pvc_size: GaugeVec,
    pv_capacity: GaugeVec,
    pv_count: GaugeVec,
    pvc_count: GaugeVec,
    anomaly_errors: GaugeVec,
}

fn register_gauge_vec(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> Result<GaugeVec> {
    let gauge_vec = GaugeVec::new(Opts::new(name, help), labels)?;
    registry.register(Box::new(gauge_vec.clone()))?;
    Ok(gauge_vec)
}

impl InventoryMetrics {
    pub fn new(unit: SizeUnit) -> Result<Self> {
        let registry = Registry::new();

        let node_count = register_gauge_vec(
            &registry,
            "node_count",
            "Nodes counts grouped by instance types and availability zones",
            &NODE_LABELS,
        )?;
        let pvc_size = register_gauge_vec(
            &registry,
            "pvc_size",
            "PVC size grouped by storage class name and availability zones",
            &VOLUME_LABELS,
        )?;
        let pv_capacity = register_gauge_vec(
            &registry,
            "pv_capacity",
            "PV capacity grouped by storage class name and availability zones",
            &VOLUME_LABELS,
        )?;
        let pv_count = register_gauge_vec(
            &registry,
            "pv_count",
            "PV count grouped by storage class name and availability zones",
            &VOLUME_LABELS,
        )?;
        let pvc_count = register_gauge_vec(
            &registry,
            "pvc_count",
            "PVC count grouped by storage class name and availability zones",
            &VOLUME_LABELS,
        )?;
        let anomaly_errors = register_gauge_vec(
            &registry,
            "anomaly_errors",
            "Non-fatal inventory anomalies requiring attention",
            &["type"],
        )?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry,
            unit,
            node_count,
            pvc_size,
            pv_capacity,
            pv_count,
            pvc_count,
            anomaly_errors,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn unit(&self) -> SizeUnit {
        self.unit
    }

    /// Series are cleared before being repopulated. A concurrent scrape may
    /// observe the families half-written.
    pub fn project(&self, aggregates: &Aggregates) {
        self.node_count.reset();
        self.pvc_size.reset();
        self.pv_capacity.reset();
        self.pv_count.reset();
        self.pvc_count.reset();

        let totals = &aggregates.totals;
        let all = [ALL_LABEL, ALL_LABEL];
        self.node_count
            .with_label_values(&all)
            .set(totals.node_count as f64);
        self.pv_count
            .with_label_values(&all)
            .set(totals.volume_count as f64);
        self.pvc_count
            .with_label_values(&all)
            .set(totals.claim_count as f64);
        self.pv_capacity
            .with_label_values(&all)
            .set(self.unit.scale(totals.volume_size));
        self.pvc_size
            .with_label_values(&all)
            .set(self.unit.scale(totals.claim_size));

        self.anomaly_errors
            .with_label_values(&[EXTRA_ZONES])
            .set(if aggregates.ambiguous_zones { 1.0 } else { 0.0 });

        for (key, count) in &aggregates.nodes {
            self.node_count
                .with_label_values(&key.label_values())
                .set(*count as f64);
        }
        self.set_buckets(&aggregates.volumes, &self.pv_capacity, &self.pv_count);
        self.set_buckets(&aggregates.claims, &self.pvc_size, &self.pvc_count);

        debug!(
            nodes = aggregates.nodes.len(),
            volumes = aggregates.volumes.len(),
            claims = aggregates.claims.len(),
            "Projected inventory series"
        );
    }

    fn set_buckets<K: GroupingKey>(
        &self,
        buckets: &HashMap<K, Bucket>,
        size: &GaugeVec,
        count: &GaugeVec,
    ) {
        for (key, bucket) in buckets {
            let labels = key.label_values();
            size.with_label_values(&labels).set(self.unit.scale(bucket.size));
            count.with_label_values(&labels).set(bucket.count as f64);
        }
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;

        String::from_utf8(buffer).map_err(|e| ExporterError::MetricsError(e.to_string()))
    }
}
