//! Convergence detection
//!
//! A population has converged once every individual carries the same genotype.

use crate::genome::traits::Genotype;
use crate::population::population::Population;

/// Number of distinct genotypes in the population
pub fn distinct_genotypes<G: Genotype>(population: &Population<G>) -> usize {
    population.genotype_set().len()
}

/// True iff the population holds exactly one distinct genotype
pub fn has_converged<G: Genotype>(population: &Population<G>) -> bool {
    let first = population.best().genotype();
    population.iter().all(|i| i.genotype() == first)
}
