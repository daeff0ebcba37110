use crate::metrics::SizeUnit;
use crate::{ExporterError, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "kube-inventory-exporter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Exports Kubernetes node and persistent volume inventory as Prometheus gauges", long_about = None)]
pub struct Cli {
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(
        long,
        env = "UNITSIZE",
        help = "Unit for size metrics (KiB, MiB, GiB, TiB, PiB); bytes when unset"
    )]
    pub unit_size: Option<String>,

    #[arg(
        long,
        env = "LISTEN_ADDR",
        default_value = "0.0.0.0:3000",
        help = "Address the metrics endpoint listens on"
    )]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = "METRICS_PATH",
        default_value = "/metrics",
        help = "HTTP path serving the metrics"
    )]
    pub metrics_path: String,

    #[arg(
        long,
        env = "POLL_INTERVAL_SECS",
        default_value_t = 60,
        help = "Seconds to wait between inventory refreshes"
    )]
    pub interval_secs: u64,
}

impl Cli {
    pub fn validate(&self) -> Result<()> {
        if !self.metrics_path.starts_with('/') {
            return Err(ExporterError::ConfigError(format!(
                "metrics path must start with '/': {}",
                self.metrics_path
            )));
        }
        if self.metrics_path.contains([':', '*', '{', '}']) {
            return Err(ExporterError::ConfigError(format!(
                "metrics path must be a literal path without route parameters: {}",
                self.metrics_path
            )));
        }
        if self.interval_secs == 0 {
            return Err(ExporterError::ConfigError(
                "poll interval must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn size_unit(&self) -> SizeUnit {
        SizeUnit::from_config(self.unit_size.as_deref())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
