//! Population type
//!
//! This module provides the immutable, fitness-sorted Population container.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::{EvoResult, EvolutionError};
use crate::fitness::traits::Fitness;
use crate::genome::traits::Genotype;
use crate::operators::scaling::ScaleFunction;
use crate::population::individual::Individual;

/// A population of individuals
///
/// Individuals are kept in descending fitness order. The sort is stable, so
/// ties retain the order in which the genotypes were supplied. Aggregates are
/// computed once at construction; a population is never modified afterwards.
#[derive(Clone, Debug)]
pub struct Population<G> {
    individuals: Vec<Individual<G>>,
    fitness_values: Vec<f64>,
    total_fitness: f64,
    mean_fitness: f64,
    fitness_std: f64,
}

impl<G: Genotype> Population<G> {
    /// Evaluate genotypes into a population.
    ///
    /// Every genotype is scored by `fitness`, the results are sorted by
    /// descending fitness, and `scale` assigns each sorted position its rank.
    pub fn evaluate<Fit, Sc>(genotypes: Vec<G>, fitness: &Fit, scale: &Sc) -> EvoResult<Self>
    where
        Fit: Fitness<Genome = G> + ?Sized,
        Sc: ScaleFunction + ?Sized,
    {
        if genotypes.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }

        let mut scored = Vec::with_capacity(genotypes.len());
        for genotype in genotypes {
            let value = fitness.evaluate(&genotype);
            if !value.is_finite() {
                return Err(EvolutionError::FitnessEvaluation(format!(
                    "non-finite fitness {value} for {genotype:?}"
                )));
            }
            scored.push((genotype, value));
        }
        scored.sort_by(|a, b| descending(a.1, b.1));

        let fitness_values: Vec<f64> = scored.iter().map(|(_, f)| *f).collect();
        let ranks = scale.scale(&fitness_values)?;
        if ranks.len() != scored.len() {
            return Err(EvolutionError::PopulationSize {
                expected: scored.len(),
                actual: ranks.len(),
            });
        }

        let individuals = scored
            .into_iter()
            .zip(ranks)
            .map(|((genotype, fitness), rank)| Individual::new(genotype, fitness, rank))
            .collect();

        Ok(Self::from_sorted(individuals, fitness_values))
    }

    /// Create a population from already-evaluated individuals
    pub fn from_individuals(mut individuals: Vec<Individual<G>>) -> EvoResult<Self> {
        if individuals.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        individuals.sort_by(|a, b| descending(a.fitness(), b.fitness()));
        let fitness_values = individuals.iter().map(|i| i.fitness()).collect();
        Ok(Self::from_sorted(individuals, fitness_values))
    }

    fn from_sorted(individuals: Vec<Individual<G>>, fitness_values: Vec<f64>) -> Self {
        let n = fitness_values.len() as f64;
        let total_fitness: f64 = fitness_values.iter().sum();
        let mean_fitness = total_fitness / n;
        let variance = fitness_values
            .iter()
            .map(|f| (f - mean_fitness).powi(2))
            .sum::<f64>()
            / n;

        Self {
            individuals,
            fitness_values,
            total_fitness,
            mean_fitness,
            fitness_std: variance.sqrt(),
        }
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Whether the population is empty
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Get an individual by sorted position
    pub fn get(&self, index: usize) -> Option<&Individual<G>> {
        self.individuals.get(index)
    }

    /// Get an iterator over the individuals, best first
    pub fn iter(&self) -> impl Iterator<Item = &Individual<G>> {
        self.individuals.iter()
    }

    /// Get the underlying individuals, best first
    pub fn individuals(&self) -> &[Individual<G>] {
        &self.individuals
    }

    /// Get the best individual
    pub fn best(&self) -> &Individual<G> {
        &self.individuals[0]
    }

    /// The `k` fittest individuals
    pub fn fittest(&self, k: usize) -> &[Individual<G>] {
        &self.individuals[..k.min(self.individuals.len())]
    }

    /// Sum of fitness over the population
    pub fn total_fitness(&self) -> f64 {
        self.total_fitness
    }

    /// Mean fitness
    pub fn mean_fitness(&self) -> f64 {
        self.mean_fitness
    }

    /// Population standard deviation of fitness (divisor `n`)
    pub fn fitness_std(&self) -> f64 {
        self.fitness_std
    }

    /// Fitness values in sorted order
    pub fn fitness_values(&self) -> &[f64] {
        &self.fitness_values
    }

    /// Selection weights in sorted order
    pub fn ranks(&self) -> Vec<f64> {
        self.individuals.iter().map(|i| i.rank()).collect()
    }

    /// Number of individuals carrying `genotype`
    pub fn count(&self, genotype: &G) -> usize {
        self.individuals
            .iter()
            .filter(|i| i.genotype() == genotype)
            .count()
    }

    /// Whether any individual carries `genotype`
    pub fn contains(&self, genotype: &G) -> bool {
        self.individuals.iter().any(|i| i.genotype() == genotype)
    }

    /// The set of distinct genotypes
    pub fn genotype_set(&self) -> HashSet<&G> {
        self.individuals.iter().map(|i| i.genotype()).collect()
    }

    /// Length of the leading run of individuals sharing the best genotype.
    ///
    /// Copies of the best genotype that appear after a different genotype
    /// are not counted.
    pub fn leading_best_count(&self) -> usize {
        let best = self.best().genotype();
        self.individuals
            .iter()
            .take_while(|i| i.genotype() == best)
            .count()
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

impl<G> std::ops::Index<usize> for Population<G> {
    type Output = Individual<G>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.individuals[index]
    }
}

impl<'a, G> IntoIterator for &'a Population<G> {
    type Item = &'a Individual<G>;
    type IntoIter = std::slice::Iter<'a, Individual<G>>;

    fn into_iter(self) -> Self::IntoIter {
        self.individuals.iter()
    }
}
