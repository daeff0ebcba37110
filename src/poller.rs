//! Periodic fetch-aggregate-project loop.

use crate::inventory::{aggregate, Totals};
use crate::k8s::{Inventory, InventorySource};
use crate::metrics::InventoryMetrics;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Outcome of a completed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub totals: Totals,
    pub ambiguous_zones: bool,
}

pub struct Poller<S> {
    source: S,
    metrics: Arc<InventoryMetrics>,
    interval: Duration,
}

impl<S: InventorySource> Poller<S> {
    pub fn new(source: S, metrics: Arc<InventoryMetrics>) -> Self {
        Self {
            source,
            metrics,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Nothing is published unless all three lists were fetched.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let inventory = Inventory::fetch(&self.source).await?;

        let aggregates = aggregate(&inventory);
        self.metrics.project(&aggregates);

        if aggregates.ambiguous_zones {
            warn!("Some volumes declare more than one availability zone");
        }

        let report = CycleReport {
            totals: aggregates.totals,
            ambiguous_zones: aggregates.ambiguous_zones,
        };

        debug!(
            nodes = report.totals.node_count,
            volumes = report.totals.volume_count,
            claims = report.totals.claim_count,
            "Inventory cycle complete"
        );

        Ok(report)
    }

    /// Run cycles back to back, sleeping `interval` after each, until one fails.
    pub async fn run(&self) -> Result<()> {
        info!(interval = ?self.interval, "Start collecting metrics");

        loop {
            self.run_cycle().await?;
            tokio::time::sleep(self.interval).await;
        }
    }
}
