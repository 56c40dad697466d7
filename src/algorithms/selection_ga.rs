//! Selection-only genetic algorithm
//!
//! This module implements the generation loop used to study selection
//! dynamics: scale, sample, re-evaluate, and record statistics until the
//! population converges or the iteration budget runs out.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::algorithms::observer::{GenerationObserver, GenerationSnapshot};
use crate::diagnostics::{EvolutionStats, GenerationStats, RunStats};
use crate::error::{EvoResult, EvolutionError};
use crate::fitness::traits::Fitness;
use crate::genome::traits::Genotype;
use crate::operators::scaling::ScaleFunction;
use crate::operators::selection::SelectionOperator;
use crate::population::population::Population;
use crate::termination::{
    EvolutionState, GenotypeConvergence, MaxIteration, TerminationCriterion, TerminationReason,
};

/// Configuration for the selection GA
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelectionGAConfig {
    /// Population size `n`
    pub population_size: usize,
    /// Generation budget; the loop stops when `t` reaches it
    pub max_iteration: usize,
    /// Notify observers every this many generations
    pub observe_every: Option<usize>,
    /// Retain every generation's population in the result
    pub keep_populations: bool,
}

impl Default for SelectionGAConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_iteration: 10_000_000,
            observe_every: None,
            keep_populations: false,
        }
    }
}

/// Builder for SelectionGA
pub struct SelectionGABuilder<G, Fit, Sc, S> {
    config: SelectionGAConfig,
    fitness: Option<Fit>,
    scale: Option<Sc>,
    selection: Option<S>,
    _phantom: std::marker::PhantomData<G>,
}

impl<G: Genotype> SelectionGABuilder<G, (), (), ()> {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: SelectionGAConfig::default(),
            fitness: None,
            scale: None,
            selection: None,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<G: Genotype> Default for SelectionGABuilder<G, (), (), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G, Fit, Sc, S> SelectionGABuilder<G, Fit, Sc, S>
where
    G: Genotype,
{
    /// Replace the whole configuration
    pub fn config(mut self, config: SelectionGAConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the population size
    pub fn population_size(mut self, size: usize) -> Self {
        self.config.population_size = size;
        self
    }

    /// Set the generation budget
    pub fn max_iteration(mut self, max: usize) -> Self {
        self.config.max_iteration = max;
        self
    }

    /// Notify observers every `step` generations
    pub fn observe_every(mut self, step: usize) -> Self {
        self.config.observe_every = Some(step);
        self
    }

    /// Keep every generation's population in the result
    pub fn keep_populations(mut self, keep: bool) -> Self {
        self.config.keep_populations = keep;
        self
    }

    /// Set the fitness function
    pub fn fitness<NewFit>(self, fitness: NewFit) -> SelectionGABuilder<G, NewFit, Sc, S>
    where
        NewFit: Fitness<Genome = G>,
    {
        SelectionGABuilder {
            config: self.config,
            fitness: Some(fitness),
            scale: self.scale,
            selection: self.selection,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Set the scale function
    pub fn scale<NewSc>(self, scale: NewSc) -> SelectionGABuilder<G, Fit, NewSc, S>
    where
        NewSc: ScaleFunction,
    {
        SelectionGABuilder {
            config: self.config,
            fitness: self.fitness,
            scale: Some(scale),
            selection: self.selection,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Set the selection operator
    pub fn selection<NewS>(self, selection: NewS) -> SelectionGABuilder<G, Fit, Sc, NewS>
    where
        NewS: SelectionOperator,
    {
        SelectionGABuilder {
            config: self.config,
            fitness: self.fitness,
            scale: self.scale,
            selection: Some(selection),
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<G, Fit, Sc, S> SelectionGABuilder<G, Fit, Sc, S>
where
    G: Genotype,
    Fit: Fitness<Genome = G>,
    Sc: ScaleFunction,
    S: SelectionOperator,
{
    /// Build the SelectionGA instance
    pub fn build(self) -> Result<SelectionGA<G, Fit, Sc, S>, EvolutionError> {
        if self.config.population_size == 0 {
            return Err(EvolutionError::Configuration(
                "Population size must be positive".to_string(),
            ));
        }
        if self.config.observe_every == Some(0) {
            return Err(EvolutionError::Configuration(
                "Observation step must be positive".to_string(),
            ));
        }

        let fitness = self.fitness.ok_or_else(|| {
            EvolutionError::Configuration("Fitness function must be specified".to_string())
        })?;

        let scale = self.scale.ok_or_else(|| {
            EvolutionError::Configuration("Scale function must be specified".to_string())
        })?;

        let selection = self.selection.ok_or_else(|| {
            EvolutionError::Configuration("Selection operator must be specified".to_string())
        })?;

        if let Some(size) = scale.population_size() {
            if size != self.config.population_size {
                return Err(EvolutionError::Configuration(format!(
                    "Scale function sized for {size} individuals, population size is {}",
                    self.config.population_size
                )));
            }
        }

        Ok(SelectionGA {
            config: self.config,
            fitness,
            scale,
            selection,
            _phantom: std::marker::PhantomData,
        })
    }
}

/// Result of a run
#[derive(Clone, Debug)]
pub struct EvolutionResult<G> {
    /// Best genotype of the final population
    pub best_genotype: G,
    /// Its fitness
    pub best_fitness: f64,
    /// Index of the last generation
    pub generations: usize,
    /// Why the loop stopped
    pub termination: TerminationReason,
    /// Final aggregate statistics
    pub stats: RunStats,
    /// Per-generation statistics and running extrema
    pub history: EvolutionStats,
    /// Total score of every generation
    pub total_scores: Vec<f64>,
    /// The last population
    pub final_population: Population<G>,
    /// Every population, when `keep_populations` is set
    pub populations: Vec<Population<G>>,
}

/// Selection-only genetic algorithm
///
/// Scale and selection strategies are injected through the builder. The loop
/// itself is sequential; independent runs share nothing.
pub struct SelectionGA<G, Fit, Sc, S> {
    config: SelectionGAConfig,
    fitness: Fit,
    scale: Sc,
    selection: S,
    _phantom: std::marker::PhantomData<G>,
}

impl<G: Genotype> SelectionGA<G, (), (), ()> {
    /// Create a builder for SelectionGA
    pub fn builder() -> SelectionGABuilder<G, (), (), ()> {
        SelectionGABuilder::new()
    }
}

impl<G, Fit, Sc, S> SelectionGA<G, Fit, Sc, S>
where
    G: Genotype,
    Fit: Fitness<Genome = G>,
    Sc: ScaleFunction,
    S: SelectionOperator,
{
    /// Configuration in use
    pub fn config(&self) -> &SelectionGAConfig {
        &self.config
    }

    /// Run the loop from the given initial genotypes
    pub fn run<R: Rng>(&self, genotypes: Vec<G>, rng: &mut R) -> EvoResult<EvolutionResult<G>> {
        self.run_observed(genotypes, rng, &mut ())
    }

    /// Run the loop, reporting checkpoints to `observer`
    #[instrument(
        skip_all,
        fields(
            population_size = self.config.population_size,
            max_iteration = self.config.max_iteration
        )
    )]
    pub fn run_observed<R, O>(
        &self,
        genotypes: Vec<G>,
        rng: &mut R,
        observer: &mut O,
    ) -> EvoResult<EvolutionResult<G>>
    where
        R: Rng,
        O: GenerationObserver<G> + ?Sized,
    {
        let n = self.config.population_size;
        if genotypes.len() != n {
            return Err(EvolutionError::PopulationSize {
                expected: n,
                actual: genotypes.len(),
            });
        }

        let max_iteration = MaxIteration::new(self.config.max_iteration);
        let convergence = GenotypeConvergence;

        let mut population = Population::evaluate(genotypes, &self.fitness, &self.scale)?;
        let mut previous: Option<Population<G>> = None;
        let mut history = EvolutionStats::new(n);
        let mut total_scores = Vec::new();
        let mut populations = Vec::new();
        let mut generation = 0;

        tracing::info!("Starting run");

        let termination = loop {
            let total_score = population.total_fitness();
            total_scores.push(total_score);
            if self.config.keep_populations {
                populations.push(population.clone());
            }

            if let Some(prev) = previous.as_ref() {
                let stats = GenerationStats::between(prev, &population, generation)?;
                if stats.selection_intensity.is_none() {
                    tracing::warn!(
                        generation,
                        "Selection intensity undefined: previous generation has zero fitness variance"
                    );
                }
                history.record(stats);
            }

            let state = EvolutionState {
                generation,
                population: &population,
            };
            if let Some(reason) = max_iteration
                .check(&state)
                .or_else(|| convergence.check(&state))
            {
                break reason;
            }

            tracing::debug!(generation, total_score, "Iteration");

            if self.is_checkpoint(generation) {
                observer.on_generation(&GenerationSnapshot {
                    generation,
                    population: &population,
                    total_scores: &total_scores,
                });
            }

            let next = self
                .selection
                .next_generation(&population, &self.fitness, &self.scale, rng)?;
            if next.len() != n {
                return Err(EvolutionError::PopulationSize {
                    expected: n,
                    actual: next.len(),
                });
            }

            previous = Some(std::mem::replace(&mut population, next));
            generation += 1;
        };

        match termination {
            TerminationReason::Converged { generation } => {
                tracing::info!(generation, "Population converged");
            }
            TerminationReason::MaxIterationReached { generation } => {
                tracing::info!(generation, "Max iteration reached");
            }
        }

        observer.on_termination(
            &GenerationSnapshot {
                generation,
                population: &population,
                total_scores: &total_scores,
            },
            termination,
        );

        let stats = history.finalize(&population, termination);
        let best = population.best();

        Ok(EvolutionResult {
            best_genotype: best.genotype().clone(),
            best_fitness: best.fitness(),
            generations: generation,
            termination,
            stats,
            history,
            total_scores,
            final_population: population,
            populations,
        })
    }

    fn is_checkpoint(&self, generation: usize) -> bool {
        self.config
            .observe_every
            .map_or(false, |step| generation % step == 0)
    }
}
