//! Complexity regulation ("phased search").
//!
//! Once per generation the evolutionary loop hands a [`StatisticsSnapshot`]
//! to a [`RegulationStrategy`] and biases its operators according to the
//! returned [`RegulationMode`].
//!
//! [`StatisticsSnapshot`]: phasesearch_shared::StatisticsSnapshot
//! [`RegulationMode`]: phasesearch_shared::RegulationMode

mod calc;
mod stats;
mod strategy;
mod types;

pub use calc::*;
pub use stats::RunningStatistics;
pub use strategy::{PhasedSearch, RegulationStrategy, StrategyKind};
pub use types::*;
