//! Generation observers
//!
//! Observers see the run at checkpoints but cannot influence it. They replace
//! plotting inside the loop: a caller that wants histograms or a total-score
//! curve renders them from the snapshots handed over here.

use crate::genome::traits::Genotype;
use crate::population::population::Population;
use crate::termination::TerminationReason;

/// Read-only view of the run at one generation
#[derive(Debug)]
pub struct GenerationSnapshot<'a, G> {
    /// Generation index `t`
    pub generation: usize,
    /// Population of generation `t`
    pub population: &'a Population<G>,
    /// Total score of every generation so far, `t` included
    pub total_scores: &'a [f64],
}

impl<G: Genotype> GenerationSnapshot<'_, G> {
    /// Fitness of each individual, best first
    pub fn fitness_distribution(&self) -> &[f64] {
        self.population.fitness_values()
    }
}

/// Callbacks invoked by the generation loop
pub trait GenerationObserver<G: Genotype> {
    /// Called at generations selected by `observe_every`, before selection
    fn on_generation(&mut self, _snapshot: &GenerationSnapshot<'_, G>) {}

    /// Called once after the loop stops
    fn on_termination(&mut self, _snapshot: &GenerationSnapshot<'_, G>, _reason: TerminationReason) {
    }
}

impl<G: Genotype> GenerationObserver<G> for () {}

/// Keeps a copy of every snapshot's fitness distribution
#[derive(Clone, Debug, Default)]
pub struct DistributionRecorder {
    /// `(generation, fitness distribution)` per checkpoint
    pub checkpoints: Vec<(usize, Vec<f64>)>,
    /// Total-score series at termination
    pub total_scores: Vec<f64>,
    pub termination: Option<TerminationReason>,
}

impl<G: Genotype> GenerationObserver<G> for DistributionRecorder {
    fn on_generation(&mut self, snapshot: &GenerationSnapshot<'_, G>) {
        self.checkpoints
            .push((snapshot.generation, snapshot.fitness_distribution().to_vec()));
    }

    fn on_termination(&mut self, snapshot: &GenerationSnapshot<'_, G>, reason: TerminationReason) {
        self.total_scores = snapshot.total_scores.to_vec();
        self.termination = Some(reason);
    }
}
