//! Experiment fan-out
//!
//! Runs the selection GA over a grid of population sizes, epochs and
//! selection configurations. For every `(n, epoch)` one initial population is
//! generated and shared by all selection configurations, so they are compared
//! on the same starting point.
//!
//! Runs are independent; with the `parallel` feature they execute on the
//! rayon pool.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::algorithms::selection_ga::SelectionGA;
use crate::diagnostics::RunStats;
use crate::error::{EvoResult, EvolutionError};
use crate::fitness::traits::Fitness;
use crate::genome::traits::Genotype;
use crate::operators::scaling::LinearRank;
use crate::operators::selection::StochasticUniversalSampling;

/// One point of the selection grid
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Linear-rank selection pressure
    pub beta: f64,
    /// Use modified (jittered) SUS
    pub modified: bool,
}

impl SelectionConfig {
    /// Report label, `"{β}${modified}"`
    pub fn label(&self) -> String {
        let modified = if self.modified { "True" } else { "False" };
        format!("{:?}${modified}", self.beta)
    }
}

/// Experiment plan
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub population_sizes: Vec<usize>,
    pub max_iteration: usize,
    /// Independent repetitions per population size
    pub epochs: usize,
    pub betas: Vec<f64>,
    pub modified: Vec<bool>,
    /// Jitter used by modified SUS
    pub jitter: f64,
    /// Base seed; every run derives its own stream from it
    pub seed: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            population_sizes: vec![100, 500, 1000],
            max_iteration: 10_000_000,
            epochs: 10,
            betas: vec![1.2, 1.6, 2.0],
            modified: vec![true, false],
            jitter: 1.0,
            seed: 0,
        }
    }
}

impl ExperimentConfig {
    /// Cartesian product `betas × modified`
    pub fn selection_grid(&self) -> Vec<SelectionConfig> {
        self.betas
            .iter()
            .flat_map(|&beta| {
                self.modified
                    .iter()
                    .map(move |&modified| SelectionConfig { beta, modified })
            })
            .collect()
    }

    /// Reject plans that would fail part-way through
    pub fn validate(&self) -> EvoResult<()> {
        if self.population_sizes.is_empty() || self.population_sizes.contains(&0) {
            return Err(EvolutionError::Configuration(
                "Population sizes must be non-empty and positive".to_string(),
            ));
        }
        if self.epochs == 0 {
            return Err(EvolutionError::Configuration(
                "Epoch count must be positive".to_string(),
            ));
        }
        if self.betas.is_empty() || self.modified.is_empty() {
            return Err(EvolutionError::Configuration(
                "Selection grid is empty".to_string(),
            ));
        }
        for &beta in &self.betas {
            LinearRank::new(beta, 1)?;
        }
        if self.modified.contains(&true) {
            StochasticUniversalSampling::with_jitter(self.jitter)?;
        }
        Ok(())
    }
}

/// Outcome of a single run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub population_size: usize,
    pub epoch: usize,
    pub selection: SelectionConfig,
    pub stats: RunStats,
}

/// Mean of every report key over the epochs of one `(n, β, modified)`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub population_size: usize,
    pub label: String,
    pub selection: SelectionConfig,
    /// Number of runs averaged
    pub runs: usize,
    /// Per-key mean over the runs that reported the key
    pub metrics: BTreeMap<String, f64>,
}

struct RunPlan<G> {
    population_size: usize,
    epoch: usize,
    genotypes: Vec<G>,
}

fn derive_seed(base: u64, parts: &[u64]) -> u64 {
    parts.iter().fold(base, |acc, part| {
        acc.wrapping_mul(0x9E37_79B9_7F4A_7C15)
            .wrapping_add(part.wrapping_add(1))
    })
}

/// Run every `(n, epoch, selection)` combination of the plan
///
/// `generator(n, rng)` produces the initial genotypes for one `(n, epoch)`.
/// Reports come back ordered by population size, epoch, then selection grid.
pub fn run_experiment<G, Fit, Gen>(
    config: &ExperimentConfig,
    fitness: &Fit,
    generator: Gen,
) -> EvoResult<Vec<RunReport>>
where
    G: Genotype,
    Fit: Fitness<Genome = G>,
    Gen: Fn(usize, &mut StdRng) -> Vec<G>,
{
    config.validate()?;
    let grid = config.selection_grid();

    let mut plans = Vec::new();
    for &n in &config.population_sizes {
        for epoch in 0..config.epochs {
            let mut rng = StdRng::seed_from_u64(derive_seed(config.seed, &[n as u64, epoch as u64]));
            let genotypes = generator(n, &mut rng);
            if genotypes.len() != n {
                return Err(EvolutionError::PopulationSize {
                    expected: n,
                    actual: genotypes.len(),
                });
            }
            plans.push(RunPlan {
                population_size: n,
                epoch,
                genotypes,
            });
        }
    }

    let jobs: Vec<(&RunPlan<G>, usize, SelectionConfig)> = plans
        .iter()
        .flat_map(|plan| grid.iter().copied().enumerate().map(move |(i, s)| (plan, i, s)))
        .collect();

    tracing::info!(
        runs = jobs.len(),
        population_sizes = ?config.population_sizes,
        epochs = config.epochs,
        "Starting experiment"
    );

    let run_job = |(plan, index, selection): &(&RunPlan<G>, usize, SelectionConfig)| {
        run_single(config, fitness, plan, *index, *selection)
    };

    #[cfg(feature = "parallel")]
    let reports: EvoResult<Vec<RunReport>> = jobs.par_iter().map(run_job).collect();
    #[cfg(not(feature = "parallel"))]
    let reports: EvoResult<Vec<RunReport>> = jobs.iter().map(run_job).collect();

    reports
}

fn run_single<G, Fit>(
    config: &ExperimentConfig,
    fitness: &Fit,
    plan: &RunPlan<G>,
    index: usize,
    selection: SelectionConfig,
) -> EvoResult<RunReport>
where
    G: Genotype,
    Fit: Fitness<Genome = G>,
{
    let n = plan.population_size;
    let ga = SelectionGA::builder()
        .population_size(n)
        .max_iteration(config.max_iteration)
        .fitness(fitness)
        .scale(LinearRank::new(selection.beta, n)?)
        .selection(StochasticUniversalSampling::from_flag(
            selection.modified,
            config.jitter,
        )?)
        .build()?;

    let mut rng = StdRng::seed_from_u64(derive_seed(
        config.seed,
        &[n as u64, plan.epoch as u64, index as u64 + 1],
    ));
    let result = ga.run(plan.genotypes.clone(), &mut rng)?;

    tracing::debug!(
        population_size = n,
        epoch = plan.epoch,
        label = %selection.label(),
        ni = result.stats.ni,
        "Run finished"
    );

    Ok(RunReport {
        population_size: n,
        epoch: plan.epoch,
        selection,
        stats: result.stats,
    })
}

/// Average run reports per `(n, β, modified)`
///
/// Keys missing from a run (metrics it never observed) do not count towards
/// that key's mean.
pub fn aggregate(reports: &[RunReport]) -> Vec<AggregateReport> {
    let mut groups: Vec<(usize, SelectionConfig, Vec<&RunReport>)> = Vec::new();
    for report in reports {
        match groups
            .iter_mut()
            .find(|(n, s, _)| *n == report.population_size && *s == report.selection)
        {
            Some((_, _, members)) => members.push(report),
            None => groups.push((report.population_size, report.selection, vec![report])),
        }
    }

    groups
        .into_iter()
        .map(|(population_size, selection, members)| {
            let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
            for report in &members {
                for (key, value) in report.stats.to_map() {
                    let entry = sums.entry(key).or_insert((0.0, 0));
                    entry.0 += value;
                    entry.1 += 1;
                }
            }
            let metrics = sums
                .into_iter()
                .map(|(key, (sum, count))| (key, sum / count as f64))
                .collect();

            AggregateReport {
                population_size,
                label: selection.label(),
                selection,
                runs: members.len(),
                metrics,
            }
        })
        .collect()
}

/// Serialize aggregate reports as pretty JSON
pub fn reports_to_json(reports: &[AggregateReport]) -> EvoResult<String> {
    serde_json::to_string_pretty(reports).map_err(|e| EvolutionError::Serialization(e.to_string()))
}

pub mod prelude {
    pub use super::{
        aggregate, reports_to_json, run_experiment, AggregateReport, ExperimentConfig, RunReport,
        SelectionConfig,
    };
}
