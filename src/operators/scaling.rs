//! Fitness scaling
//!
//! Scale functions turn a fitness-sorted population into selection weights.

use crate::error::OperatorError;

/// Maps fitness values to selection weights.
///
/// `fitness` arrives sorted best first; the returned weights line up with it
/// position by position.
pub trait ScaleFunction: Send + Sync {
    /// Compute one selection weight per sorted position
    fn scale(&self, fitness: &[f64]) -> Result<Vec<f64>, OperatorError>;

    /// Population size this scale was configured for, if it is size-bound
    fn population_size(&self) -> Option<usize> {
        None
    }
}

/// Baker's linear ranking
///
/// The weight depends only on the sorted position `i` (0 = best):
/// `2 - β + 2(β - 1)(n - 1 - i) / (n - 1)`. Weights are non-negative for
/// `β ∈ [1, 2]` and always sum to `n`.
#[derive(Clone, Debug)]
pub struct LinearRank {
    /// Selection pressure β (1.0 = uniform, 2.0 = strongest)
    selection_pressure: f64,
    population_size: usize,
}

impl LinearRank {
    /// Create a linear ranking for a population of `population_size`
    pub fn new(selection_pressure: f64, population_size: usize) -> Result<Self, OperatorError> {
        if !(1.0..=2.0).contains(&selection_pressure) {
            return Err(OperatorError::InvalidConfiguration(format!(
                "selection pressure must be in [1.0, 2.0], got {selection_pressure}"
            )));
        }
        if population_size == 0 {
            return Err(OperatorError::InvalidConfiguration(
                "population size must be positive".to_string(),
            ));
        }
        Ok(Self {
            selection_pressure,
            population_size,
        })
    }

    /// Selection pressure β
    pub fn selection_pressure(&self) -> f64 {
        self.selection_pressure
    }

    /// Weight of the individual at sorted position `position`
    pub fn weight(&self, position: usize) -> f64 {
        let n = self.population_size;
        if n == 1 {
            return 1.0;
        }
        let sp = self.selection_pressure;
        let distance_from_worst = (n - 1).saturating_sub(position) as f64;
        2.0 - sp + 2.0 * (sp - 1.0) * distance_from_worst / (n - 1) as f64
    }
}

impl ScaleFunction for LinearRank {
    fn scale(&self, fitness: &[f64]) -> Result<Vec<f64>, OperatorError> {
        if fitness.len() != self.population_size {
            return Err(OperatorError::SizeMismatch {
                expected: self.population_size,
                actual: fitness.len(),
            });
        }
        Ok((0..fitness.len()).map(|i| self.weight(i)).collect())
    }

    fn population_size(&self) -> Option<usize> {
        Some(self.population_size)
    }
}

/// Identity scaling: the weight is the raw fitness.
///
/// Works as a fitness-proportionate baseline. All-zero fitness produces a
/// zero weight sum, which sampling rejects.
#[derive(Clone, Debug, Default)]
pub struct FitnessProportional;

impl ScaleFunction for FitnessProportional {
    fn scale(&self, fitness: &[f64]) -> Result<Vec<f64>, OperatorError> {
        Ok(fitness.to_vec())
    }
}
