//! Individual wrapper type
//!
//! This module provides the Individual type that pairs a genotype with its
//! fitness and its scaled selection rank.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::genome::traits::Genotype;

/// An individual in the population
///
/// Fitness and rank are fixed at construction. Equality and hashing look at
/// the genotype only, since both scores are derived from it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Individual<G> {
    genotype: G,
    fitness: f64,
    rank: f64,
}

impl<G: Genotype> Individual<G> {
    /// Create a new individual
    pub fn new(genotype: G, fitness: f64, rank: f64) -> Self {
        Self {
            genotype,
            fitness,
            rank,
        }
    }

    /// Get a reference to the genotype
    pub fn genotype(&self) -> &G {
        &self.genotype
    }

    /// Raw fitness score
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Scaled selection weight
    pub fn rank(&self) -> f64 {
        self.rank
    }

    /// Take the genotype out of this individual
    pub fn into_genotype(self) -> G {
        self.genotype
    }

    /// Check if this individual is strictly fitter than another
    pub fn is_better_than(&self, other: &Self) -> bool {
        self.fitness > other.fitness
    }
}

impl<G: Genotype> PartialEq for Individual<G> {
    fn eq(&self, other: &Self) -> bool {
        self.genotype == other.genotype
    }
}

impl<G: Genotype> Eq for Individual<G> {}

impl<G: Genotype> Hash for Individual<G> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.genotype.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_individual_accessors() {
        let individual = Individual::new("AAAA".to_string(), 4.0, 1.2);

        assert_eq!(individual.genotype(), "AAAA");
        assert_eq!(individual.fitness(), 4.0);
        assert_eq!(individual.rank(), 1.2);
        assert_eq!(individual.into_genotype(), "AAAA");
    }

    #[test]
    fn test_equality_ignores_scores() {
        let a = Individual::new("AAAA".to_string(), 4.0, 1.2);
        let b = Individual::new("AAAA".to_string(), 4.0, 0.8);
        let c = Individual::new("BBBB".to_string(), 4.0, 1.2);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_hash_follows_genotype() {
        let set: HashSet<Individual<String>> = vec![
            Individual::new("AAAA".to_string(), 4.0, 1.2),
            Individual::new("AAAA".to_string(), 4.0, 1.0),
            Individual::new("BBBB".to_string(), 0.0, 0.8),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_is_better_than() {
        let a = Individual::new(1u32, 10.0, 1.0);
        let b = Individual::new(2u32, 5.0, 1.0);

        assert!(a.is_better_than(&b));
        assert!(!b.is_better_than(&a));
        assert!(!a.is_better_than(&a.clone()));
    }
}
