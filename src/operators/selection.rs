//! Selection operators
//!
//! This module provides stochastic universal sampling (SUS) in its classic
//! shared-offset form and a modified form with per-pointer jitter.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, OperatorError};
use crate::fitness::traits::Fitness;
use crate::genome::traits::Genotype;
use crate::operators::scaling::ScaleFunction;
use crate::population::population::Population;

/// Selection operator trait
///
/// Resamples a whole generation at once from a weighted, sorted population.
pub trait SelectionOperator: Send + Sync {
    /// Draw `weights.len()` indices, with replacement, proportional to weight.
    ///
    /// Returned indices are non-decreasing.
    fn sample<R: Rng>(&self, weights: &[f64], rng: &mut R) -> Result<Vec<usize>, OperatorError>;

    /// Produce the next generation from `population`.
    ///
    /// Selected genotypes are re-evaluated through `fitness` and `scale`, so
    /// the new population is built exactly like the initial one.
    fn next_generation<G, Fit, Sc, R>(
        &self,
        population: &Population<G>,
        fitness: &Fit,
        scale: &Sc,
        rng: &mut R,
    ) -> EvoResult<Population<G>>
    where
        G: Genotype,
        Fit: Fitness<Genome = G> + ?Sized,
        Sc: ScaleFunction + ?Sized,
        R: Rng,
    {
        let picks = self.sample(&population.ranks(), rng)?;
        let genotypes = picks
            .into_iter()
            .map(|index| population[index].genotype().clone())
            .collect();
        Population::evaluate(genotypes, fitness, scale)
    }
}

/// Pointer placement strategy for SUS
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PointerSpacing {
    /// One shared random offset; pointers are exactly one step apart
    Classic,
    /// Each pointer keeps its own stratum but is shifted independently.
    ///
    /// Pointer `k` sits at `(k + frac(u + jitter * v_k)) * step` with `u`
    /// shared and `v_k` drawn per pointer. Every pointer stays uniform within
    /// its stratum, so expected counts remain proportional to weight.
    Jittered { jitter: f64 },
}

/// Stochastic universal sampling
#[derive(Clone, Debug)]
pub struct StochasticUniversalSampling {
    spacing: PointerSpacing,
}

impl StochasticUniversalSampling {
    /// Classic SUS with a single shared offset
    pub fn new() -> Self {
        Self {
            spacing: PointerSpacing::Classic,
        }
    }

    /// Modified SUS with full per-pointer jitter
    pub fn modified() -> Self {
        Self {
            spacing: PointerSpacing::Jittered { jitter: 1.0 },
        }
    }

    /// Modified SUS with the given jitter strength in `[0, 1]`
    pub fn with_jitter(jitter: f64) -> Result<Self, OperatorError> {
        if !(0.0..=1.0).contains(&jitter) {
            return Err(OperatorError::InvalidConfiguration(format!(
                "jitter must be in [0.0, 1.0], got {jitter}"
            )));
        }
        Ok(Self {
            spacing: PointerSpacing::Jittered { jitter },
        })
    }

    /// Pick the variant from the `modified` flag used in experiment configs
    pub fn from_flag(modified: bool, jitter: f64) -> Result<Self, OperatorError> {
        if modified {
            Self::with_jitter(jitter)
        } else {
            Ok(Self::new())
        }
    }

    /// Pointer placement in use
    pub fn spacing(&self) -> PointerSpacing {
        self.spacing
    }

    /// Whether this is the modified variant
    pub fn is_modified(&self) -> bool {
        matches!(self.spacing, PointerSpacing::Jittered { .. })
    }

    fn pointers<R: Rng>(&self, count: usize, step: f64, rng: &mut R) -> Vec<f64> {
        match self.spacing {
            PointerSpacing::Classic => {
                let start = rng.gen::<f64>() * step;
                (0..count).map(|k| start + k as f64 * step).collect()
            }
            PointerSpacing::Jittered { jitter } => {
                let shared: f64 = rng.gen();
                (0..count)
                    .map(|k| {
                        let offset = (shared + jitter * rng.gen::<f64>()).fract();
                        (k as f64 + offset) * step
                    })
                    .collect()
            }
        }
    }
}

impl Default for StochasticUniversalSampling {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionOperator for StochasticUniversalSampling {
    fn sample<R: Rng>(&self, weights: &[f64], rng: &mut R) -> Result<Vec<usize>, OperatorError> {
        if weights.is_empty() {
            return Err(OperatorError::SelectionFailed(
                "cannot sample from an empty population".to_string(),
            ));
        }
        if let Some((index, &weight)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(OperatorError::InvalidWeight { index, weight });
        }

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(OperatorError::ZeroWeightSum);
        }

        let step = total / weights.len() as f64;
        let pointers = self.pointers(weights.len(), step, rng);
        Ok(walk(weights, &pointers))
    }
}

/// Single pass over the cumulative weights. `pointers` must be ascending.
fn walk(weights: &[f64], pointers: &[f64]) -> Vec<usize> {
    let mut selected = Vec::with_capacity(pointers.len());
    let mut cumulative = 0.0;
    let mut next = 0;

    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight;
        while next < pointers.len() && pointers[next] < cumulative {
            selected.push(index);
            next += 1;
        }
    }

    // Rounding can leave the final pointers just past the accumulated total.
    if next < pointers.len() {
        let last = weights.iter().rposition(|w| *w > 0.0).unwrap_or(0);
        selected.extend(std::iter::repeat(last).take(pointers.len() - next));
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::traits::SymbolCount;
    use crate::operators::scaling::LinearRank;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn expected_frequencies(sus: &StochasticUniversalSampling, weights: &[f64], trials: usize) {
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts = vec![0usize; weights.len()];
        for _ in 0..trials {
            for index in sus.sample(weights, &mut rng).unwrap() {
                counts[index] += 1;
            }
        }
        for (count, weight) in counts.iter().zip(weights) {
            let mean = *count as f64 / trials as f64;
            assert!((mean - weight).abs() < 0.05, "mean {mean} vs weight {weight}");
        }
    }

    #[test]
    fn test_sample_size_matches_input() {
        let mut rng = StdRng::seed_from_u64(1);
        let weights = [1.5, 1.0, 0.5, 1.0];
        for sus in [StochasticUniversalSampling::new(), StochasticUniversalSampling::modified()] {
            let picks = sus.sample(&weights, &mut rng).unwrap();
            assert_eq!(picks.len(), weights.len());
            assert!(picks.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_classic_counts_are_floor_or_ceil_of_weight() {
        let mut rng = StdRng::seed_from_u64(3);
        let sus = StochasticUniversalSampling::new();
        let weights = [2.0, 1.5, 0.5, 0.0];
        for _ in 0..500 {
            let picks = sus.sample(&weights, &mut rng).unwrap();
            let first = picks.iter().filter(|i| **i == 0).count();
            let second = picks.iter().filter(|i| **i == 1).count();
            assert_eq!(first, 2);
            assert!(second == 1 || second == 2);
            assert!(!picks.contains(&3));
        }
    }

    #[test]
    fn test_classic_expected_frequency() {
        expected_frequencies(&StochasticUniversalSampling::new(), &[2.0, 1.0, 0.5, 0.5], 20_000);
    }

    #[test]
    fn test_modified_expected_frequency() {
        expected_frequencies(
            &StochasticUniversalSampling::modified(),
            &[1.6, 1.2, 0.8, 0.4],
            20_000,
        );
        expected_frequencies(
            &StochasticUniversalSampling::with_jitter(0.3).unwrap(),
            &[1.6, 1.2, 0.8, 0.4],
            20_000,
        );
    }

    #[test]
    fn test_modified_varies_pointer_gaps() {
        let sus = StochasticUniversalSampling::modified();
        let mut rng = StdRng::seed_from_u64(11);
        let pointers = sus.pointers(8, 1.0, &mut rng);
        let gaps: Vec<f64> = pointers.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(gaps.iter().any(|g| (g - 1.0).abs() > 1e-9));
        for (k, p) in pointers.iter().enumerate() {
            assert!(*p >= k as f64 && *p < (k + 1) as f64);
        }
    }

    #[test]
    fn test_classic_pointer_gaps_are_constant() {
        let sus = StochasticUniversalSampling::new();
        let mut rng = StdRng::seed_from_u64(11);
        let pointers = sus.pointers(8, 0.5, &mut rng);
        assert!(pointers[0] >= 0.0 && pointers[0] < 0.5);
        for w in pointers.windows(2) {
            assert!((w[1] - w[0] - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_weight_sum_fails_fast() {
        let mut rng = StdRng::seed_from_u64(0);
        let sus = StochasticUniversalSampling::new();
        assert_eq!(
            sus.sample(&[0.0, 0.0, 0.0], &mut rng),
            Err(OperatorError::ZeroWeightSum)
        );
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let sus = StochasticUniversalSampling::new();
        assert_eq!(
            sus.sample(&[1.0, -0.5], &mut rng),
            Err(OperatorError::InvalidWeight {
                index: 1,
                weight: -0.5
            })
        );
        assert!(sus.sample(&[f64::NAN, 1.0], &mut rng).is_err());
        assert!(matches!(
            sus.sample(&[], &mut rng),
            Err(OperatorError::SelectionFailed(_))
        ));
    }

    #[test]
    fn test_jitter_configuration() {
        assert!(StochasticUniversalSampling::with_jitter(-0.1).is_err());
        assert!(StochasticUniversalSampling::with_jitter(1.5).is_err());
        assert!(StochasticUniversalSampling::from_flag(true, 0.5)
            .unwrap()
            .is_modified());
        assert!(!StochasticUniversalSampling::from_flag(false, 9.0)
            .unwrap()
            .is_modified());
    }

    #[test]
    fn test_walk_trailing_pointer_goes_to_last_positive_weight() {
        let picks = walk(&[1.0, 1.0, 0.0], &[0.5, 1.5, 2.0]);
        assert_eq!(picks, vec![0, 1, 1]);
    }

    #[test]
    fn test_next_generation_reevaluates() {
        let mut rng = StdRng::seed_from_u64(5);
        let fitness = SymbolCount::new('A');
        let scale = LinearRank::new(2.0, 4).unwrap();
        let genotypes = ["AAAA", "AAAA", "AAAA", "BBBB"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let population = Population::evaluate(genotypes, &fitness, &scale).unwrap();

        let next = StochasticUniversalSampling::new()
            .next_generation(&population, &fitness, &scale, &mut rng)
            .unwrap();

        // BBBB carries weight 0 under β = 2, so it can never be sampled.
        assert_eq!(next.len(), 4);
        assert!(next.iter().all(|i| i.genotype() == "AAAA" && i.fitness() == 4.0));
        assert_eq!(next.ranks(), population.ranks());
    }
}
