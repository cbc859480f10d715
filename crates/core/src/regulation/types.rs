use serde::{Deserialize, Serialize};

use phasesearch_shared::{RegulationError, RegulationMode, RegulationResult};

/// Maximum mode transitions kept in a strategy's history.
pub const MAX_TRANSITION_HISTORY: usize = 100;

// ══════════════════════════════════════════════════════════════
// Parameters
// ══════════════════════════════════════════════════════════════

/// Which regulation policy a run uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyVariant {
    /// Regulation disabled: always complexify.
    Null,
    #[default]
    FixedCeiling,
    /// Re-bases the ceiling after every simplifying phase.
    AdaptiveCeiling,
}

impl std::fmt::Display for StrategyVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::FixedCeiling => write!(f, "fixed_ceiling"),
            Self::AdaptiveCeiling => write!(f, "adaptive_ceiling"),
        }
    }
}

impl std::str::FromStr for StrategyVariant {
    type Err = RegulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "null" | "none" | "disabled" => Ok(Self::Null),
            "fixed" | "fixed_ceiling" => Ok(Self::FixedCeiling),
            "adaptive" | "adaptive_ceiling" => Ok(Self::AdaptiveCeiling),
            other => Err(RegulationError::InvalidConfig {
                field: "strategy",
                reason: format!(
                    "unknown strategy '{}', expected null, fixed_ceiling or adaptive_ceiling",
                    other
                ),
            }),
        }
    }
}

/// How the initial complexity ceiling is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum CeilingRule {
    /// Ceiling known up front.
    Absolute { value: f64 },
    /// Ceiling = mean complexity over the first `baseline_generations`
    /// valid snapshots, plus `headroom`. Unset until the baseline is complete.
    Relative {
        baseline_generations: u32,
        headroom: f64,
    },
}

impl CeilingRule {
    /// Number of valid generations the baseline needs (0 for absolute ceilings).
    #[must_use]
    pub fn baseline_generations(&self) -> usize {
        match self {
            Self::Absolute { .. } => 0,
            Self::Relative {
                baseline_generations,
                ..
            } => *baseline_generations as usize,
        }
    }
}

impl Default for CeilingRule {
    fn default() -> Self {
        Self::Relative {
            baseline_generations: 10,
            headroom: 30.0,
        }
    }
}

/// How the adaptive strategy derives a new ceiling from the mean
/// complexity observed when a simplifying phase ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeilingGrowth {
    Factor(f64),
    Increment(f64),
}

impl Default for CeilingGrowth {
    fn default() -> Self {
        Self::Factor(1.2)
    }
}

/// Regulation parameters for one evolutionary run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegulationParams {
    pub strategy: StrategyVariant,
    pub ceiling: CeilingRule,
    /// Hysteresis floor: generations spent simplifying before complexifying may resume.
    pub min_simplifying_generations: u32,
    /// Fraction below the ceiling complexity must reach to leave simplifying mode.
    pub relaxation_margin: f64,
    /// Adaptive strategy only.
    pub ceiling_growth: CeilingGrowth,
    /// Hard upper bound for any computed ceiling.
    pub ceiling_cap: Option<f64>,
    pub moving_average_window: usize,
    /// Also require the complexity moving average to stop falling before
    /// simplifying mode ends.
    pub plateau_exit: bool,
}

impl RegulationParams {
    /// Fixed ceiling at `ceiling`, other settings at their defaults.
    #[must_use]
    pub fn fixed(ceiling: f64) -> Self {
        Self {
            strategy: StrategyVariant::FixedCeiling,
            ceiling: CeilingRule::Absolute { value: ceiling },
            ..Self::default()
        }
    }

    /// Adaptive ceiling starting at `ceiling`, growing by `factor` after each
    /// simplifying phase.
    #[must_use]
    pub fn adaptive(ceiling: f64, factor: f64) -> Self {
        Self {
            strategy: StrategyVariant::AdaptiveCeiling,
            ceiling: CeilingRule::Absolute { value: ceiling },
            ceiling_growth: CeilingGrowth::Factor(factor),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> RegulationResult<()> {
        match self.ceiling {
            CeilingRule::Absolute { value } => {
                if !value.is_finite() || value <= 0.0 {
                    return Err(invalid("ceiling", format!("value must be > 0 and finite, got {}", value)));
                }
            }
            CeilingRule::Relative {
                baseline_generations,
                headroom,
            } => {
                if baseline_generations == 0 {
                    return Err(invalid("ceiling", "baseline_generations must be > 0".to_string()));
                }
                if !headroom.is_finite() || headroom <= 0.0 {
                    return Err(invalid("ceiling", format!("headroom must be > 0 and finite, got {}", headroom)));
                }
            }
        }
        if self.min_simplifying_generations == 0 {
            return Err(invalid("min_simplifying_generations", "must be > 0".to_string()));
        }
        if !self.relaxation_margin.is_finite() || !(0.0..1.0).contains(&self.relaxation_margin) {
            return Err(invalid(
                "relaxation_margin",
                format!("must be in [0.0, 1.0), got {}", self.relaxation_margin),
            ));
        }
        match self.ceiling_growth {
            CeilingGrowth::Factor(factor) => {
                if !factor.is_finite() || factor <= 1.0 {
                    return Err(invalid("ceiling_growth", format!("factor must be > 1 and finite, got {}", factor)));
                }
            }
            CeilingGrowth::Increment(step) => {
                if !step.is_finite() || step <= 0.0 {
                    return Err(invalid("ceiling_growth", format!("increment must be > 0 and finite, got {}", step)));
                }
            }
        }
        if let Some(cap) = self.ceiling_cap {
            if !cap.is_finite() || cap <= 0.0 {
                return Err(invalid("ceiling_cap", format!("must be > 0 and finite, got {}", cap)));
            }
            if let CeilingRule::Absolute { value } = self.ceiling {
                if cap < value {
                    return Err(invalid(
                        "ceiling_cap",
                        format!("cap {} is below the initial ceiling {}", cap, value),
                    ));
                }
            }
        }
        if self.moving_average_window == 0 {
            return Err(invalid("moving_average_window", "must be > 0".to_string()));
        }
        Ok(())
    }
}

impl Default for RegulationParams {
    fn default() -> Self {
        Self {
            strategy: StrategyVariant::default(),
            ceiling: CeilingRule::default(),
            min_simplifying_generations: 10,
            relaxation_margin: 0.1,
            ceiling_growth: CeilingGrowth::default(),
            ceiling_cap: None,
            moving_average_window: 10,
            plateau_exit: false,
        }
    }
}

fn invalid(field: &'static str, reason: String) -> RegulationError {
    RegulationError::InvalidConfig { field, reason }
}

// ══════════════════════════════════════════════════════════════
// Records
// ══════════════════════════════════════════════════════════════

/// A single mode change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeTransition {
    pub generation: u64,
    pub from: RegulationMode,
    pub to: RegulationMode,
    pub mean_complexity: f64,
    /// Ceiling in force after the transition.
    pub ceiling: Option<f64>,
}

/// Point-in-time view of a strategy, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulationStatus {
    pub strategy: StrategyVariant,
    pub mode: RegulationMode,
    pub complexity_ceiling: Option<f64>,
    pub relaxation_threshold: Option<f64>,
    pub generations_in_simplifying_mode: u32,
    pub last_generation: Option<u64>,
    pub complexity_moving_average: Option<f64>,
    pub transition_count: u64,
    pub rejected_snapshots: u64,
    pub halted: bool,
}
