//! Complexity regulation for NEAT-style phased search.
//!
//! The evolutionary loop evaluates its population, builds a
//! [`StatisticsSnapshot`], and asks a [`RegulationStrategy`] whether the next
//! generation should keep complexifying or start simplifying.

pub mod config;
pub mod evaluation;
pub mod regulation;

pub use evaluation::{
    evaluate_and_regulate, evaluate_population, Candidate, Evaluated, EvaluatedGeneration,
    FitnessEvaluator,
};
pub use phasesearch_shared::{
    BlackBox, RegulationError, RegulationMode, RegulationResult, StatisticsSnapshot,
};
pub use regulation::{RegulationParams, RegulationStatus, RegulationStrategy, StrategyVariant};
