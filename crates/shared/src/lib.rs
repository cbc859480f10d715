use serde::{Deserialize, Serialize};

pub mod blackbox;

pub use blackbox::BlackBox;

/// Search phase emitted once per generation by a regulation strategy.
///
/// The evolutionary loop owns what a mode means for operator weighting;
/// typically `Simplifying` favours node/connection deletion and suppresses
/// addition operators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegulationMode {
    #[default]
    Complexifying,
    Simplifying,
}

impl RegulationMode {
    #[must_use]
    pub fn is_simplifying(self) -> bool {
        matches!(self, Self::Simplifying)
    }
}

impl std::fmt::Display for RegulationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complexifying => write!(f, "Complexifying"),
            Self::Simplifying => write!(f, "Simplifying"),
        }
    }
}

/// Population statistics for one generation.
///
/// Built by the evolutionary loop after fitness evaluation has completed for
/// the whole population. `mean_complexity` must use the same metric for the
/// entire run, otherwise ceiling comparisons are meaningless.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub generation: u64,
    pub mean_complexity: f64,
    pub best_fitness: f64,
    pub mean_fitness: f64,
}

impl StatisticsSnapshot {
    #[must_use]
    pub fn new(generation: u64, mean_complexity: f64, best_fitness: f64, mean_fitness: f64) -> Self {
        Self {
            generation,
            mean_complexity,
            best_fitness,
            mean_fitness,
        }
    }

    /// Aggregates `(complexity, fitness)` pairs of the post-selection population.
    pub fn from_population(generation: u64, members: &[(f64, f64)]) -> RegulationResult<Self> {
        if members.is_empty() {
            return Err(RegulationError::EmptyPopulation { generation });
        }
        let n = members.len() as f64;
        let mut complexity_sum = 0.0;
        let mut fitness_sum = 0.0;
        let mut best_fitness = f64::NEG_INFINITY;
        for &(complexity, fitness) in members {
            complexity_sum += complexity;
            fitness_sum += fitness;
            // NaN never wins a comparison, so it has to be carried explicitly
            if fitness.is_nan() || fitness > best_fitness {
                best_fitness = fitness;
            }
        }
        Ok(Self::new(generation, complexity_sum / n, best_fitness, fitness_sum / n))
    }

    /// Checks the data-quality rules: every metric finite, complexity non-negative.
    pub fn validate(&self) -> RegulationResult<()> {
        let fields = [
            ("mean_complexity", self.mean_complexity),
            ("best_fitness", self.best_fitness),
            ("mean_fitness", self.mean_fitness),
        ];
        for (name, val) in fields {
            if !val.is_finite() {
                return Err(RegulationError::InvalidSnapshot {
                    generation: self.generation,
                    reason: format!("{} must be finite, got {}", name, val),
                });
            }
        }
        if self.mean_complexity < 0.0 {
            return Err(RegulationError::InvalidSnapshot {
                generation: self.generation,
                reason: format!("mean_complexity must be >= 0, got {}", self.mean_complexity),
            });
        }
        Ok(())
    }
}

/// Error taxonomy for complexity regulation.
///
/// `NonIncreasingGeneration` and `Halted` are caller bugs and end the use of
/// a strategy instance. `InvalidConfig` is raised before any generation runs.
/// `InvalidSnapshot` is the recoverable data-quality case: strategies absorb
/// it and hold their mode.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegulationError {
    #[error("generation {received} does not follow previous generation {previous}")]
    NonIncreasingGeneration { previous: u64, received: u64 },
    #[error("strategy halted by an earlier usage error; refusing generation {generation}")]
    Halted { generation: u64 },
    #[error("invalid snapshot for generation {generation}: {reason}")]
    InvalidSnapshot { generation: u64, reason: String },
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error("cannot aggregate statistics for generation {generation}: population is empty")]
    EmptyPopulation { generation: u64 },
}

impl RegulationError {
    /// Usage and configuration errors terminate strategy use; data-quality
    /// errors do not.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::InvalidSnapshot { .. })
    }
}

pub type RegulationResult<T> = std::result::Result<T, RegulationError>;
