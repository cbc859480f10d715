use std::collections::VecDeque;

use phasesearch_shared::StatisticsSnapshot;

/// Rolling view of population complexity, owned by a single strategy.
///
/// Only snapshots that passed validation are recorded; rejected ones are
/// counted and otherwise ignored so that one bad generation cannot skew the
/// moving average or the baseline.
#[derive(Debug, Clone)]
pub struct RunningStatistics {
    window: VecDeque<f64>,
    capacity: usize,
    previous_average: Option<f64>,
    baseline_target: usize,
    baseline_sum: f64,
    baseline_count: usize,
    generations_observed: u64,
    rejected_snapshots: u64,
    peak_complexity: Option<f64>,
    best_fitness_seen: Option<f64>,
}

impl RunningStatistics {
    /// `capacity` bounds the complexity window; `baseline_target` is how many
    /// early generations make up the baseline (0 disables it).
    #[must_use]
    pub fn new(capacity: usize, baseline_target: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            previous_average: None,
            baseline_target,
            baseline_sum: 0.0,
            baseline_count: 0,
            generations_observed: 0,
            rejected_snapshots: 0,
            peak_complexity: None,
            best_fitness_seen: None,
        }
    }

    /// Records a validated snapshot.
    pub fn record(&mut self, snapshot: &StatisticsSnapshot) {
        let complexity = snapshot.mean_complexity;
        self.previous_average = self.moving_average();

        self.window.push_back(complexity);
        if self.window.len() > self.capacity {
            self.window.pop_front();
        }

        if self.baseline_count < self.baseline_target {
            self.baseline_sum += complexity;
            self.baseline_count += 1;
        }

        self.generations_observed += 1;
        self.peak_complexity = Some(self.peak_complexity.map_or(complexity, |p| p.max(complexity)));
        self.best_fitness_seen = Some(
            self.best_fitness_seen
                .map_or(snapshot.best_fitness, |b| b.max(snapshot.best_fitness)),
        );
    }

    pub fn record_rejected(&mut self) {
        self.rejected_snapshots += 1;
    }

    /// Mean of the complexity window.
    #[must_use]
    pub fn moving_average(&self) -> Option<f64> {
        if self.window.is_empty() {
            return None;
        }
        Some(self.window.iter().sum::<f64>() / self.window.len() as f64)
    }

    /// Moving average before the most recent record.
    #[must_use]
    pub fn previous_moving_average(&self) -> Option<f64> {
        self.previous_average
    }

    /// True once the moving average has stopped falling.
    #[must_use]
    pub fn is_plateaued(&self) -> bool {
        match (self.moving_average(), self.previous_average) {
            (Some(current), Some(previous)) => current >= previous,
            _ => false,
        }
    }

    /// Mean complexity over the first `baseline_target` recorded generations,
    /// available once all of them have been seen.
    #[must_use]
    pub fn baseline(&self) -> Option<f64> {
        if self.baseline_target == 0 || self.baseline_count < self.baseline_target {
            return None;
        }
        Some(self.baseline_sum / self.baseline_count as f64)
    }

    #[must_use]
    pub fn latest_complexity(&self) -> Option<f64> {
        self.window.back().copied()
    }

    #[must_use]
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    #[must_use]
    pub fn generations_observed(&self) -> u64 {
        self.generations_observed
    }

    #[must_use]
    pub fn rejected_snapshots(&self) -> u64 {
        self.rejected_snapshots
    }

    #[must_use]
    pub fn peak_complexity(&self) -> Option<f64> {
        self.peak_complexity
    }

    #[must_use]
    pub fn best_fitness_seen(&self) -> Option<f64> {
        self.best_fitness_seen
    }
}
