use phasesearch_core::{BlackBox, Candidate, StatisticsSnapshot};

/// Snapshot with fixed, finite fitness values.
pub fn snapshot(generation: u64, mean_complexity: f64) -> StatisticsSnapshot {
    StatisticsSnapshot::new(generation, mean_complexity, 1.0, 0.5)
}

/// Feed-forward box: output = weighted sum of inputs.
#[derive(Debug, Clone)]
pub struct LinearPhenome {
    weights: Vec<f64>,
    inputs: Vec<f64>,
    outputs: Vec<f64>,
}

impl LinearPhenome {
    pub fn new(weights: Vec<f64>) -> Self {
        let inputs = vec![0.0; weights.len()];
        Self {
            weights,
            inputs,
            outputs: vec![0.0],
        }
    }
}

impl BlackBox for LinearPhenome {
    fn input_count(&self) -> usize {
        self.inputs.len()
    }

    fn output_count(&self) -> usize {
        self.outputs.len()
    }

    fn inputs_mut(&mut self) -> &mut [f64] {
        &mut self.inputs
    }

    fn outputs(&self) -> &[f64] {
        &self.outputs
    }

    fn activate(&mut self) {
        self.outputs[0] = self
            .weights
            .iter()
            .zip(&self.inputs)
            .map(|(w, x)| w * x)
            .sum();
    }

    fn reset_state(&mut self) {}
}

/// Box with memory: output = input + previous output. Counts activations
/// and resets so tests can see how the evaluator drove it.
#[derive(Debug, Clone, Default)]
pub struct RecurrentPhenome {
    inputs: Vec<f64>,
    outputs: Vec<f64>,
    pub activations: usize,
    pub resets: usize,
}

impl RecurrentPhenome {
    /// A box whose memory already holds `carry`, as if left over from an
    /// earlier evaluation.
    pub fn with_carry(carry: f64) -> Self {
        Self {
            inputs: vec![0.0],
            outputs: vec![carry],
            activations: 0,
            resets: 0,
        }
    }
}

impl BlackBox for RecurrentPhenome {
    fn input_count(&self) -> usize {
        self.inputs.len()
    }

    fn output_count(&self) -> usize {
        self.outputs.len()
    }

    fn inputs_mut(&mut self) -> &mut [f64] {
        &mut self.inputs
    }

    fn outputs(&self) -> &[f64] {
        &self.outputs
    }

    fn activate(&mut self) {
        self.outputs[0] += self.inputs[0];
        self.activations += 1;
    }

    fn reset_state(&mut self) {
        for o in &mut self.outputs {
            *o = 0.0;
        }
        self.resets += 1;
    }
}

/// Box whose activation panics.
#[derive(Debug, Clone)]
pub struct PanickingPhenome {
    inputs: Vec<f64>,
    outputs: Vec<f64>,
}

impl PanickingPhenome {
    pub fn new() -> Self {
        Self {
            inputs: vec![0.0],
            outputs: vec![0.0],
        }
    }
}

impl BlackBox for PanickingPhenome {
    fn input_count(&self) -> usize {
        1
    }

    fn output_count(&self) -> usize {
        1
    }

    fn inputs_mut(&mut self) -> &mut [f64] {
        &mut self.inputs
    }

    fn outputs(&self) -> &[f64] {
        &self.outputs
    }

    fn activate(&mut self) {
        panic!("Intentional test panic");
    }

    fn reset_state(&mut self) {}
}

/// Fitness = output after activating with all-ones inputs.
pub fn ones_fitness(phenome: &mut dyn BlackBox) -> f64 {
    let inputs = vec![1.0; phenome.input_count()];
    phenome.activate_with(&inputs)[0]
}

/// Linear candidates whose fitness equals the sum of their weights and whose
/// complexity is the number of weights.
pub fn linear_population(weight_sets: &[&[f64]]) -> Vec<Candidate<LinearPhenome>> {
    weight_sets
        .iter()
        .map(|w| Candidate::new(LinearPhenome::new(w.to_vec()), w.len() as f64))
        .collect()
}
