//! Fitness traits
//!
//! This module defines the fitness evaluation trait consumed by the engine.

use crate::genome::traits::Genotype;

/// Fitness evaluation trait
///
/// Implementations must be deterministic per genotype: the engine re-evaluates
/// every sampled genotype and relies on equal genotypes scoring equally.
pub trait Fitness: Send + Sync {
    /// The genotype type being evaluated
    type Genome: Genotype;

    /// Evaluate fitness (higher = better)
    fn evaluate(&self, genome: &Self::Genome) -> f64;
}

impl<T: Fitness + ?Sized> Fitness for &T {
    type Genome = T::Genome;

    fn evaluate(&self, genome: &Self::Genome) -> f64 {
        (**self).evaluate(genome)
    }
}

/// A simple function wrapper for fitness evaluation
pub struct FnFitness<G, F>
where
    F: Fn(&G) -> f64,
{
    f: F,
    _marker: std::marker::PhantomData<fn(&G)>,
}

impl<G, F> FnFitness<G, F>
where
    F: Fn(&G) -> f64,
{
    /// Create a new function-based fitness evaluator
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<G, F> Fitness for FnFitness<G, F>
where
    G: Genotype,
    F: Fn(&G) -> f64 + Send + Sync,
{
    type Genome = G;

    fn evaluate(&self, genome: &Self::Genome) -> f64 {
        (self.f)(genome)
    }
}

/// Counts occurrences of one symbol in a string genotype.
///
/// The `"AAAA"` / `"BBBB"` style populations used across the tests score with
/// this function.
#[derive(Clone, Debug)]
pub struct SymbolCount {
    symbol: char,
}

impl SymbolCount {
    /// Create a counter for the given symbol
    pub fn new(symbol: char) -> Self {
        Self { symbol }
    }
}

impl Fitness for SymbolCount {
    type Genome = String;

    fn evaluate(&self, genome: &String) -> f64 {
        genome.chars().filter(|c| *c == self.symbol).count() as f64
    }
}
