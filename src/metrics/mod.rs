pub mod collector;
pub mod exporter;
pub mod units;

pub use collector::InventoryMetrics;
pub use exporter::MetricsExporter;
pub use units::SizeUnit;
