//! Pipeline counters exposed on the health endpoint

mod stats;

pub use stats::{PipelineStats, StatsSnapshot};
