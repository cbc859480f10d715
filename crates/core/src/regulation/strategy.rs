use std::collections::VecDeque;

use tracing::{debug, error, info, warn};

use phasesearch_shared::{RegulationError, RegulationMode, RegulationResult, StatisticsSnapshot};

use super::calc::{
    may_resume_complexifying, reaches_ceiling, rebased_ceiling, relative_ceiling,
    relaxation_threshold,
};
use super::stats::RunningStatistics;
use super::types::{
    CeilingGrowth, CeilingRule, ModeTransition, RegulationParams, RegulationStatus,
    StrategyVariant, MAX_TRANSITION_HISTORY,
};

// ══════════════════════════════════════════════════════════════
// Phased search state
// ══════════════════════════════════════════════════════════════

/// Ceiling, hysteresis and dwell state shared by the fixed and adaptive
/// variants.
#[derive(Debug, Clone)]
pub struct PhasedSearch {
    rule: CeilingRule,
    ceiling: Option<f64>,
    ceiling_cap: Option<f64>,
    min_simplifying_generations: u32,
    relaxation_margin: f64,
    plateau_exit: bool,
    generations_in_simplifying_mode: u32,
}

impl PhasedSearch {
    fn new(params: &RegulationParams) -> Self {
        let ceiling = match params.ceiling {
            CeilingRule::Absolute { value } => Some(value),
            CeilingRule::Relative { .. } => None,
        };
        Self {
            rule: params.ceiling,
            ceiling,
            ceiling_cap: params.ceiling_cap,
            min_simplifying_generations: params.min_simplifying_generations,
            relaxation_margin: params.relaxation_margin,
            plateau_exit: params.plateau_exit,
            generations_in_simplifying_mode: 0,
        }
    }

    #[must_use]
    pub fn ceiling(&self) -> Option<f64> {
        self.ceiling
    }

    #[must_use]
    pub fn relaxation_threshold(&self) -> Option<f64> {
        self.ceiling
            .map(|c| relaxation_threshold(c, self.relaxation_margin))
    }

    #[must_use]
    pub fn generations_in_simplifying_mode(&self) -> u32 {
        self.generations_in_simplifying_mode
    }

    /// Sets a relative ceiling as soon as its baseline is complete.
    fn establish_ceiling(&mut self, stats: &RunningStatistics) -> Option<f64> {
        if self.ceiling.is_none() {
            if let CeilingRule::Relative { headroom, .. } = self.rule {
                if let Some(baseline) = stats.baseline() {
                    let ceiling = relative_ceiling(baseline, headroom, self.ceiling_cap);
                    info!(
                        baseline = baseline,
                        headroom = headroom,
                        ceiling = ceiling,
                        "Complexity ceiling established from baseline"
                    );
                    self.ceiling = Some(ceiling);
                }
            }
        }
        self.ceiling
    }

    /// One generation of the phased-search state machine.
    fn step(
        &mut self,
        mode: RegulationMode,
        mean_complexity: f64,
        stats: &RunningStatistics,
    ) -> RegulationMode {
        let Some(ceiling) = self.establish_ceiling(stats) else {
            // baseline still filling; nothing to compare against yet
            return mode;
        };

        match mode {
            RegulationMode::Complexifying => {
                if reaches_ceiling(mean_complexity, ceiling) {
                    self.generations_in_simplifying_mode = 0;
                    RegulationMode::Simplifying
                } else {
                    RegulationMode::Complexifying
                }
            }
            RegulationMode::Simplifying => {
                let threshold = relaxation_threshold(ceiling, self.relaxation_margin);
                let settled = !self.plateau_exit || stats.is_plateaued();
                if settled
                    && may_resume_complexifying(
                        self.generations_in_simplifying_mode,
                        self.min_simplifying_generations,
                        mean_complexity,
                        threshold,
                    )
                {
                    self.generations_in_simplifying_mode = 0;
                    RegulationMode::Complexifying
                } else {
                    self.generations_in_simplifying_mode =
                        self.generations_in_simplifying_mode.saturating_add(1);
                    RegulationMode::Simplifying
                }
            }
        }
    }

    fn rebase(&mut self, mean_complexity: f64, growth: CeilingGrowth) {
        let previous = self.ceiling;
        let next = rebased_ceiling(mean_complexity, growth, self.ceiling_cap);
        info!(
            previous_ceiling = ?previous,
            ceiling = next,
            mean_complexity = mean_complexity,
            "Complexity ceiling re-based after simplifying phase"
        );
        self.ceiling = Some(next);
    }
}

/// Closed set of regulation policies, each carrying its own state.
#[derive(Debug, Clone)]
pub enum StrategyKind {
    Null,
    FixedCeiling(PhasedSearch),
    AdaptiveCeiling {
        search: PhasedSearch,
        growth: CeilingGrowth,
    },
}

impl StrategyKind {
    #[must_use]
    pub fn variant(&self) -> StrategyVariant {
        match self {
            Self::Null => StrategyVariant::Null,
            Self::FixedCeiling(_) => StrategyVariant::FixedCeiling,
            Self::AdaptiveCeiling { .. } => StrategyVariant::AdaptiveCeiling,
        }
    }

    fn search(&self) -> Option<&PhasedSearch> {
        match self {
            Self::Null => None,
            Self::FixedCeiling(search) | Self::AdaptiveCeiling { search, .. } => Some(search),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Regulation Strategy
// ══════════════════════════════════════════════════════════════

/// Decides, once per generation, whether the search may grow complexity.
///
/// One instance per evolutionary run. Calls must be sequential and carry
/// strictly increasing generation indices; the state is mutated in place
/// and is fully determined by the parameters plus the snapshots seen so far.
///
/// Snapshots with non-finite metrics or negative complexity are treated as
/// "no information": the current mode is returned, and neither the dwell
/// counter nor the ceiling nor the complexity window changes. The generation
/// index is still consumed.
#[derive(Debug, Clone)]
pub struct RegulationStrategy {
    kind: StrategyKind,
    mode: RegulationMode,
    last_generation: Option<u64>,
    halted: bool,
    stats: RunningStatistics,
    transitions: VecDeque<ModeTransition>,
    transition_count: u64,
}

impl RegulationStrategy {
    /// Builds a strategy; invalid parameters are rejected before any
    /// generation is processed.
    pub fn new(params: &RegulationParams) -> RegulationResult<Self> {
        params.validate()?;
        let kind = match params.strategy {
            StrategyVariant::Null => StrategyKind::Null,
            StrategyVariant::FixedCeiling => StrategyKind::FixedCeiling(PhasedSearch::new(params)),
            StrategyVariant::AdaptiveCeiling => StrategyKind::AdaptiveCeiling {
                search: PhasedSearch::new(params),
                growth: params.ceiling_growth,
            },
        };
        debug!(
            strategy = %params.strategy,
            ceiling = ?kind.search().and_then(PhasedSearch::ceiling),
            min_simplifying_generations = params.min_simplifying_generations,
            relaxation_margin = params.relaxation_margin,
            "Complexity regulation strategy created"
        );
        Ok(Self {
            kind,
            mode: RegulationMode::Complexifying,
            last_generation: None,
            halted: false,
            stats: RunningStatistics::new(
                params.moving_average_window,
                params.ceiling.baseline_generations(),
            ),
            transitions: VecDeque::new(),
            transition_count: 0,
        })
    }

    /// Regulation disabled.
    #[must_use]
    pub fn null() -> Self {
        Self {
            kind: StrategyKind::Null,
            mode: RegulationMode::Complexifying,
            last_generation: None,
            halted: false,
            stats: RunningStatistics::new(1, 0),
            transitions: VecDeque::new(),
            transition_count: 0,
        }
    }

    /// Returns the mode for `snapshot.generation` and advances internal state.
    ///
    /// Errors only on misuse: a generation index that does not strictly
    /// increase (which halts the strategy), or any call after that.
    pub fn determine_mode(&mut self, snapshot: &StatisticsSnapshot) -> RegulationResult<RegulationMode> {
        self.admit(snapshot.generation)?;

        if matches!(self.kind, StrategyKind::Null) {
            return Ok(RegulationMode::Complexifying);
        }

        if let Err(e) = snapshot.validate() {
            self.stats.record_rejected();
            warn!(
                generation = snapshot.generation,
                mode = %self.mode,
                error = %e,
                "Snapshot rejected, holding regulation mode"
            );
            return Ok(self.mode);
        }

        self.stats.record(snapshot);
        let previous = self.mode;
        let mean = snapshot.mean_complexity;

        let next = match &mut self.kind {
            StrategyKind::Null => RegulationMode::Complexifying,
            StrategyKind::FixedCeiling(search) => search.step(previous, mean, &self.stats),
            StrategyKind::AdaptiveCeiling { search, growth } => {
                let next = search.step(previous, mean, &self.stats);
                if previous.is_simplifying() && !next.is_simplifying() {
                    search.rebase(mean, *growth);
                }
                next
            }
        };

        if next != previous {
            self.record_transition(snapshot.generation, previous, next, mean);
        }
        self.mode = next;
        Ok(next)
    }

    /// Enforces the call contract: strictly increasing generations, no use
    /// after a usage error.
    fn admit(&mut self, generation: u64) -> RegulationResult<()> {
        if self.halted {
            return Err(RegulationError::Halted { generation });
        }
        if let Some(previous) = self.last_generation {
            if generation <= previous {
                self.halted = true;
                error!(
                    previous = previous,
                    received = generation,
                    "Non-increasing generation index, halting complexity regulation"
                );
                return Err(RegulationError::NonIncreasingGeneration {
                    previous,
                    received: generation,
                });
            }
        }
        self.last_generation = Some(generation);
        Ok(())
    }

    fn record_transition(
        &mut self,
        generation: u64,
        from: RegulationMode,
        to: RegulationMode,
        mean_complexity: f64,
    ) {
        let ceiling = self.ceiling();
        info!(
            generation = generation,
            from = %from,
            to = %to,
            mean_complexity = mean_complexity,
            ceiling = ?ceiling,
            "Complexity regulation mode changed"
        );
        self.transitions.push_back(ModeTransition {
            generation,
            from,
            to,
            mean_complexity,
            ceiling,
        });
        if self.transitions.len() > MAX_TRANSITION_HISTORY {
            self.transitions.pop_front();
        }
        self.transition_count += 1;
    }

    // ── Accessors ──

    #[must_use]
    pub fn mode(&self) -> RegulationMode {
        self.mode
    }

    #[must_use]
    pub fn kind(&self) -> &StrategyKind {
        &self.kind
    }

    #[must_use]
    pub fn variant(&self) -> StrategyVariant {
        self.kind.variant()
    }

    /// Current ceiling; `None` for the null strategy or while a relative
    /// baseline is still being collected.
    #[must_use]
    pub fn ceiling(&self) -> Option<f64> {
        self.kind.search().and_then(PhasedSearch::ceiling)
    }

    #[must_use]
    pub fn generations_in_simplifying_mode(&self) -> u32 {
        self.kind
            .search()
            .map_or(0, PhasedSearch::generations_in_simplifying_mode)
    }

    #[must_use]
    pub fn last_generation(&self) -> Option<u64> {
        self.last_generation
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    #[must_use]
    pub fn statistics(&self) -> &RunningStatistics {
        &self.stats
    }

    /// Most recent transitions, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &ModeTransition> {
        self.transitions.iter()
    }

    #[must_use]
    pub fn status(&self) -> RegulationStatus {
        RegulationStatus {
            strategy: self.variant(),
            mode: self.mode,
            complexity_ceiling: self.ceiling(),
            relaxation_threshold: self.kind.search().and_then(PhasedSearch::relaxation_threshold),
            generations_in_simplifying_mode: self.generations_in_simplifying_mode(),
            last_generation: self.last_generation,
            complexity_moving_average: self.stats.moving_average(),
            transition_count: self.transition_count,
            rejected_snapshots: self.stats.rejected_snapshots(),
            halted: self.halted,
        }
    }
}
