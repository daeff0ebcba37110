pub mod cli;
pub mod error;
pub mod inventory;
pub mod k8s;
pub mod metrics;
pub mod poller;

pub use error::{ExporterError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
