//! Activation contract for phenomes decoded from genomes.
//!
//! Fitness evaluation drives a black box by writing its input vector,
//! calling [`BlackBox::activate`] and reading the output vector. Regulation
//! strategies never touch black boxes; they only see the aggregated
//! [`crate::StatisticsSnapshot`].

/// A computational unit with fixed-size input and output vectors.
///
/// Both vector lengths are fixed for the lifetime of the object. An instance
/// belongs to exactly one evaluation task at a time; move it (or clone it)
/// rather than sharing it across concurrent evaluations.
pub trait BlackBox: Send {
    fn input_count(&self) -> usize;

    fn output_count(&self) -> usize;

    /// Input vector, length `input_count()`.
    fn inputs_mut(&mut self) -> &mut [f64];

    /// Output vector, length `output_count()`, valid after `activate`.
    fn outputs(&self) -> &[f64];

    /// Consumes the current inputs and populates the outputs.
    fn activate(&mut self);

    /// Clears internal memory (e.g. recurrent node state) without resizing
    /// either vector.
    fn reset_state(&mut self);

    /// Copies `inputs` into the input vector, activates, and returns the outputs.
    ///
    /// Extra values are ignored and missing ones leave the previous inputs in place.
    fn activate_with(&mut self, inputs: &[f64]) -> &[f64] {
        let slots = self.inputs_mut();
        let n = slots.len().min(inputs.len());
        slots[..n].copy_from_slice(&inputs[..n]);
        self.activate();
        self.outputs()
    }
}

impl<B: BlackBox + ?Sized> BlackBox for Box<B> {
    fn input_count(&self) -> usize {
        (**self).input_count()
    }

    fn output_count(&self) -> usize {
        (**self).output_count()
    }

    fn inputs_mut(&mut self) -> &mut [f64] {
        (**self).inputs_mut()
    }

    fn outputs(&self) -> &[f64] {
        (**self).outputs()
    }

    fn activate(&mut self) {
        (**self).activate();
    }

    fn reset_state(&mut self) {
        (**self).reset_state();
    }
}
