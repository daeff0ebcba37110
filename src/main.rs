use anyhow::Context;
use clap::Parser;
use kube_inventory_exporter::cli::Cli;
use kube_inventory_exporter::k8s::K8sClient;
use kube_inventory_exporter::metrics::{InventoryMetrics, MetricsExporter, SizeUnit};
use kube_inventory_exporter::poller::Poller;
use std::process;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let builder = FmtSubscriber::builder().with_max_level(log_level);
    let result = match EnvFilter::try_from_default_env() {
        Ok(filter) => tracing::subscriber::set_global_default(
            builder.with_env_filter(filter).finish(),
        ),
        Err(_) => tracing::subscriber::set_global_default(builder.finish()),
    };
    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
        process::exit(1);
    }

    info!("Starting kube-inventory-exporter v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    cli.validate()?;

    let unit = cli.size_unit();
    info!(unit_size = ?cli.unit_size, "Size unit configuration");
    if unit != SizeUnit::Bytes {
        info!("Size metrics will be reported in {}", unit);
    }

    let metrics =
        Arc::new(InventoryMetrics::new(unit).context("Failed to register inventory metrics")?);

    let client = K8sClient::try_default().await?;
    let poller = Poller::new(client, metrics.clone()).with_interval(cli.interval());
    let exporter = MetricsExporter::new(metrics, cli.metrics_path.clone());

    tokio::select! {
        result = poller.run() => result.context("Inventory polling failed"),
        result = exporter.serve(cli.listen_addr) => result.context("Metrics endpoint failed"),
    }
}
