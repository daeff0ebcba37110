pub mod aggregator;
pub mod keys;

pub use aggregator::{aggregate, Aggregates, Bucket, Totals};
pub use keys::{GroupingKey, KeyProjection, NodeKey, VolumeKey, ALL_LABEL};
