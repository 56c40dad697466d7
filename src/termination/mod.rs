//! Termination criteria
//!
//! The generation loop stops on whichever criterion fires first, checked in
//! order: iteration budget, then population convergence.

use serde::{Deserialize, Serialize};

use crate::diagnostics::convergence::has_converged;
use crate::genome::traits::Genotype;
use crate::population::population::Population;

/// Evolution state for termination checking
#[derive(Clone, Debug)]
pub struct EvolutionState<'a, G> {
    /// Current generation index `t`
    pub generation: usize,
    /// The population of generation `t`
    pub population: &'a Population<G>,
}

/// Why a run stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Every individual shares one genotype
    Converged { generation: usize },
    /// The iteration budget was exhausted
    MaxIterationReached { generation: usize },
}

impl TerminationReason {
    /// Generation at which the run stopped
    pub fn generation(&self) -> usize {
        match self {
            Self::Converged { generation } | Self::MaxIterationReached { generation } => *generation,
        }
    }

    /// Convergence generation, or `-1` when the budget ran out
    pub fn convergence_index(&self) -> i64 {
        match self {
            Self::Converged { generation } => *generation as i64,
            Self::MaxIterationReached { .. } => -1,
        }
    }

    /// Whether the population converged
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }
}

/// Termination criterion trait
pub trait TerminationCriterion<G: Genotype>: Send + Sync {
    /// Check if evolution should terminate, and why
    fn check(&self, state: &EvolutionState<G>) -> Option<TerminationReason>;
}

/// Terminate once generation `t` equals the budget
#[derive(Clone, Debug)]
pub struct MaxIteration(pub usize);

impl MaxIteration {
    /// Create a new max iteration criterion
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl<G: Genotype> TerminationCriterion<G> for MaxIteration {
    fn check(&self, state: &EvolutionState<G>) -> Option<TerminationReason> {
        (state.generation == self.0).then_some(TerminationReason::MaxIterationReached {
            generation: state.generation,
        })
    }
}

/// Terminate when the population holds a single genotype
#[derive(Clone, Debug, Default)]
pub struct GenotypeConvergence;

impl<G: Genotype> TerminationCriterion<G> for GenotypeConvergence {
    fn check(&self, state: &EvolutionState<G>) -> Option<TerminationReason> {
        has_converged(state.population).then_some(TerminationReason::Converged {
            generation: state.generation,
        })
    }
}

pub mod prelude {
    pub use super::{
        EvolutionState, GenotypeConvergence, MaxIteration, TerminationCriterion, TerminationReason,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::individual::Individual;

    fn population(genotypes: &[&str]) -> Population<String> {
        Population::from_individuals(
            genotypes
                .iter()
                .map(|g| Individual::new(g.to_string(), 1.0, 1.0))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_max_iteration() {
        let pop = population(&["A", "B"]);
        let criterion = MaxIteration::new(3);

        let state = EvolutionState {
            generation: 2,
            population: &pop,
        };
        assert_eq!(criterion.check(&state), None);

        let state = EvolutionState {
            generation: 3,
            population: &pop,
        };
        assert_eq!(
            criterion.check(&state),
            Some(TerminationReason::MaxIterationReached { generation: 3 })
        );
    }

    #[test]
    fn test_genotype_convergence() {
        let diverse = population(&["A", "B"]);
        let uniform = population(&["A", "A"]);

        let state = EvolutionState {
            generation: 4,
            population: &diverse,
        };
        assert_eq!(GenotypeConvergence.check(&state), None);

        let state = EvolutionState {
            generation: 4,
            population: &uniform,
        };
        assert_eq!(
            GenotypeConvergence.check(&state),
            Some(TerminationReason::Converged { generation: 4 })
        );
    }

    #[test]
    fn test_convergence_index() {
        assert_eq!(
            TerminationReason::Converged { generation: 0 }.convergence_index(),
            0
        );
        assert_eq!(
            TerminationReason::MaxIterationReached { generation: 9 }.convergence_index(),
            -1
        );
        assert_eq!(
            TerminationReason::MaxIterationReached { generation: 9 }.generation(),
            9
        );
    }
}
