//! Population evaluation: black boxes in, one [`StatisticsSnapshot`] out.
//!
//! Every candidate is moved into its own blocking task, so a phenome is only
//! ever activated by one evaluation at a time. The snapshot is assembled
//! after all tasks have been joined; a strategy never sees a partial
//! generation.

use anyhow::Context;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::debug;

use phasesearch_shared::{BlackBox, RegulationError, RegulationMode, StatisticsSnapshot};

use crate::regulation::RegulationStrategy;

/// Scores one phenome. Implementations drive the box through
/// [`BlackBox::activate`]; state has already been reset when this is called.
pub trait FitnessEvaluator: Send + Sync {
    fn evaluate(&self, phenome: &mut dyn BlackBox) -> f64;
}

impl<F> FitnessEvaluator for F
where
    F: Fn(&mut dyn BlackBox) -> f64 + Send + Sync,
{
    fn evaluate(&self, phenome: &mut dyn BlackBox) -> f64 {
        self(phenome)
    }
}

/// A decoded genome awaiting evaluation.
#[derive(Debug, Clone)]
pub struct Candidate<B> {
    pub phenome: B,
    /// Genome size under the run's complexity metric (e.g. nodes + connections).
    pub complexity: f64,
}

impl<B> Candidate<B> {
    pub fn new(phenome: B, complexity: f64) -> Self {
        Self { phenome, complexity }
    }
}

#[derive(Debug, Clone)]
pub struct Evaluated<B> {
    pub candidate: Candidate<B>,
    pub fitness: f64,
}

/// Result of one generation's evaluation; `members` keeps the input order.
#[derive(Debug, Clone)]
pub struct EvaluatedGeneration<B> {
    pub snapshot: StatisticsSnapshot,
    pub members: Vec<Evaluated<B>>,
}

/// Evaluate every candidate in parallel and aggregate the snapshot.
pub async fn evaluate_population<B, E>(
    generation: u64,
    candidates: Vec<Candidate<B>>,
    evaluator: Arc<E>,
) -> anyhow::Result<EvaluatedGeneration<B>>
where
    B: BlackBox + 'static,
    E: FitnessEvaluator + ?Sized + 'static,
{
    if candidates.is_empty() {
        return Err(RegulationError::EmptyPopulation { generation }.into());
    }

    let population = candidates.len();
    let mut tasks = JoinSet::new();
    for (index, mut candidate) in candidates.into_iter().enumerate() {
        let evaluator = Arc::clone(&evaluator);
        tasks.spawn_blocking(move || {
            candidate.phenome.reset_state();
            let fitness = evaluator.evaluate(&mut candidate.phenome);
            (index, Evaluated { candidate, fitness })
        });
    }

    let mut slots: Vec<Option<Evaluated<B>>> = (0..population).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, evaluated) = joined
            .with_context(|| format!("Fitness evaluation task failed in generation {}", generation))?;
        slots[index] = Some(evaluated);
    }
    let members: Vec<Evaluated<B>> = slots.into_iter().flatten().collect();

    let pairs: Vec<(f64, f64)> = members
        .iter()
        .map(|m| (m.candidate.complexity, m.fitness))
        .collect();
    let snapshot = StatisticsSnapshot::from_population(generation, &pairs)?;

    debug!(
        generation = generation,
        population = population,
        mean_complexity = snapshot.mean_complexity,
        best_fitness = snapshot.best_fitness,
        mean_fitness = snapshot.mean_fitness,
        "Generation evaluated"
    );

    Ok(EvaluatedGeneration { snapshot, members })
}

/// Evaluate a generation, then ask `strategy` for the mode of the next one.
pub async fn evaluate_and_regulate<B, E>(
    strategy: &mut RegulationStrategy,
    generation: u64,
    candidates: Vec<Candidate<B>>,
    evaluator: Arc<E>,
) -> anyhow::Result<(RegulationMode, EvaluatedGeneration<B>)>
where
    B: BlackBox + 'static,
    E: FitnessEvaluator + ?Sized + 'static,
{
    let evaluated = evaluate_population(generation, candidates, evaluator).await?;
    let mode = strategy
        .determine_mode(&evaluated.snapshot)
        .with_context(|| format!("Complexity regulation failed at generation {}", generation))?;
    Ok((mode, evaluated))
}
