//! Diagnostics and statistics
//!
//! This module computes the population-genetics statistics of a run:
//! selection differential, selection intensity, growth rate, reproduction
//! rate and loss of diversity, per generation and aggregated at the end.

pub mod convergence;

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError};
use crate::genome::traits::Genotype;
use crate::population::population::Population;
use crate::termination::TerminationReason;

/// Statistics comparing generation `t - 1` with generation `t`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation index `t`
    pub generation: usize,
    /// Mean fitness of generation `t`
    pub mean_fitness: f64,
    /// `mean(P_t) - mean(P_{t-1})`
    pub selection_differential: f64,
    /// Selection differential over the previous standard deviation.
    /// `None` when the previous generation had zero fitness variance.
    pub selection_intensity: Option<f64>,
    /// Leading run of the best genotype in generation `t`
    pub best_count: usize,
    /// Occurrences of the previous best genotype in generation `t - 1`
    pub previous_best_count: usize,
    /// `best_count / previous_best_count`, or 0 when the run shrank
    pub growth_rate: f64,
    /// Fraction of generation `t - 1` whose genotype survives into `t`
    pub reproduction_rate: f64,
    /// `1 - reproduction_rate`
    pub loss_of_diversity: f64,
}

impl GenerationStats {
    /// Compare two consecutive populations
    pub fn between<G: Genotype>(
        previous: &Population<G>,
        current: &Population<G>,
        generation: usize,
    ) -> EvoResult<Self> {
        let n = previous.len();
        if current.len() != n {
            return Err(EvolutionError::PopulationSize {
                expected: n,
                actual: current.len(),
            });
        }

        let selection_differential = current.mean_fitness() - previous.mean_fitness();
        let previous_std = previous.fitness_std();
        let selection_intensity =
            (previous_std > 0.0).then(|| selection_differential / previous_std);

        let best_count = current.leading_best_count();
        let previous_best_count = previous.count(previous.best().genotype());
        if previous_best_count == 0 {
            return Err(EvolutionError::Numerical(format!(
                "best genotype of generation {} has no occurrences",
                generation.saturating_sub(1)
            )));
        }
        let growth_rate = if best_count >= previous_best_count {
            best_count as f64 / previous_best_count as f64
        } else {
            0.0
        };

        let survivors: HashSet<&G> = current.genotype_set();
        let reproduced = previous
            .iter()
            .filter(|i| survivors.contains(i.genotype()))
            .count();
        let reproduction_rate = reproduced as f64 / n as f64;

        Ok(Self {
            generation,
            mean_fitness: current.mean_fitness(),
            selection_differential,
            selection_intensity,
            best_count,
            previous_best_count,
            growth_rate,
            reproduction_rate,
            loss_of_diversity: 1.0 - reproduction_rate,
        })
    }
}

/// A running extremum and the first generation at which it occurred
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extremum {
    pub value: f64,
    pub generation: usize,
}

impl Extremum {
    fn track_min(slot: &mut Option<Self>, value: f64, generation: usize) {
        if slot.map_or(true, |current| value < current.value) {
            *slot = Some(Self { value, generation });
        }
    }

    fn track_max(slot: &mut Option<Self>, value: f64, generation: usize) {
        if slot.map_or(true, |current| value > current.value) {
            *slot = Some(Self { value, generation });
        }
    }
}

/// Statistics collector for an entire run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Configured population size `n`
    pub population_size: usize,
    /// Per-generation statistics, from generation 1 onwards
    pub generations: Vec<GenerationStats>,
    pub selection_differential_min: Option<Extremum>,
    pub selection_differential_max: Option<Extremum>,
    pub selection_intensity_min: Option<Extremum>,
    pub selection_intensity_max: Option<Extremum>,
    pub reproduction_rate_min: Option<Extremum>,
    pub reproduction_rate_max: Option<Extremum>,
    pub loss_of_diversity_min: Option<Extremum>,
    pub loss_of_diversity_max: Option<Extremum>,
    /// Growth rate at generation 2
    pub growth_rate_early: Option<f64>,
    /// Growth rate when the best genotype first held half the population
    pub growth_rate_late: Option<Extremum>,
}

impl EvolutionStats {
    /// Create a new stats collector
    pub fn new(population_size: usize) -> Self {
        Self {
            population_size,
            ..Default::default()
        }
    }

    /// Record a generation's statistics
    pub fn record(&mut self, stats: GenerationStats) {
        let t = stats.generation;

        Extremum::track_min(&mut self.selection_differential_min, stats.selection_differential, t);
        Extremum::track_max(&mut self.selection_differential_max, stats.selection_differential, t);

        if let Some(intensity) = stats.selection_intensity {
            Extremum::track_min(&mut self.selection_intensity_min, intensity, t);
            Extremum::track_max(&mut self.selection_intensity_max, intensity, t);
        }

        if t == 2 {
            self.growth_rate_early = Some(stats.growth_rate);
        }
        if self.growth_rate_late.is_none()
            && stats.best_count as f64 >= self.population_size as f64 / 2.0
        {
            self.growth_rate_late = Some(Extremum {
                value: stats.growth_rate,
                generation: t,
            });
        }

        Extremum::track_min(&mut self.reproduction_rate_min, stats.reproduction_rate, t);
        Extremum::track_max(&mut self.reproduction_rate_max, stats.reproduction_rate, t);
        Extremum::track_min(&mut self.loss_of_diversity_min, stats.loss_of_diversity, t);
        Extremum::track_max(&mut self.loss_of_diversity_max, stats.loss_of_diversity, t);

        self.generations.push(stats);
    }

    /// Get the number of generations recorded
    pub fn num_generations(&self) -> usize {
        self.generations.len()
    }

    /// Generations whose selection intensity was undefined
    pub fn undefined_intensities(&self) -> usize {
        self.generations
            .iter()
            .filter(|g| g.selection_intensity.is_none())
            .count()
    }

    fn mean_of(&self, value: impl Fn(&GenerationStats) -> Option<f64>) -> Option<f64> {
        let values: Vec<f64> = self.generations.iter().filter_map(value).collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    /// Compute the final aggregate statistics
    pub fn finalize<G: Genotype>(
        &self,
        final_population: &Population<G>,
        termination: TerminationReason,
    ) -> RunStats {
        RunStats {
            s_min: self.selection_differential_min,
            s_max: self.selection_differential_max,
            i_min: self.selection_intensity_min,
            i_max: self.selection_intensity_max,
            gr_early: self.growth_rate_early,
            gr_late: self.growth_rate_late,
            rr_min: self.reproduction_rate_min,
            rr_max: self.reproduction_rate_max,
            teta_min: self.loss_of_diversity_min,
            teta_max: self.loss_of_diversity_max,
            s_avg: self.mean_of(|g| Some(g.selection_differential)),
            rr_avg: self.mean_of(|g| Some(g.reproduction_rate)),
            teta_avg: self.mean_of(|g| Some(g.loss_of_diversity)),
            i_avg: self.mean_of(|g| g.selection_intensity),
            gr_avg: self.mean_of(|g| Some(g.growth_rate)),
            f_avg: final_population.mean_fitness(),
            f_found: final_population.best().fitness(),
            ni: termination.convergence_index(),
            undefined_intensities: self.undefined_intensities(),
            termination,
        }
    }
}

/// Final statistics of a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub s_min: Option<Extremum>,
    pub s_max: Option<Extremum>,
    pub i_min: Option<Extremum>,
    pub i_max: Option<Extremum>,
    pub gr_early: Option<f64>,
    pub gr_late: Option<Extremum>,
    pub rr_min: Option<Extremum>,
    pub rr_max: Option<Extremum>,
    pub teta_min: Option<Extremum>,
    pub teta_max: Option<Extremum>,
    pub s_avg: Option<f64>,
    pub rr_avg: Option<f64>,
    pub teta_avg: Option<f64>,
    pub i_avg: Option<f64>,
    pub gr_avg: Option<f64>,
    /// Mean fitness of the final population
    pub f_avg: f64,
    /// Best fitness of the final population
    pub f_found: f64,
    /// Convergence generation, or -1
    pub ni: i64,
    /// Generations skipped by the intensity statistics
    pub undefined_intensities: usize,
    pub termination: TerminationReason,
}

impl RunStats {
    /// Flatten into the report map keyed `s_min`, `NI_s_min`, ... `NI`.
    ///
    /// Metrics that were never observed are omitted.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();

        let extrema = [
            ("s_min", self.s_min),
            ("s_max", self.s_max),
            ("I_min", self.i_min),
            ("I_max", self.i_max),
            ("RR_min", self.rr_min),
            ("RR_max", self.rr_max),
            ("Teta_min", self.teta_min),
            ("Teta_max", self.teta_max),
            ("GR_late", self.gr_late),
        ];
        for (key, extremum) in extrema {
            if let Some(e) = extremum {
                map.insert(key.to_string(), e.value);
                map.insert(format!("NI_{key}"), e.generation as f64);
            }
        }

        let scalars = [
            ("GR_early", self.gr_early),
            ("s_avg", self.s_avg),
            ("RR_avg", self.rr_avg),
            ("Teta_avg", self.teta_avg),
            ("I_avg", self.i_avg),
            ("GR_avg", self.gr_avg),
            ("F_avg", Some(self.f_avg)),
            ("F_found", Some(self.f_found)),
            ("NI", Some(self.ni as f64)),
        ];
        for (key, value) in scalars {
            if let Some(v) = value {
                map.insert(key.to_string(), v);
            }
        }

        map
    }

    /// Serialize the flattened report map as pretty JSON
    pub fn to_json(&self) -> EvoResult<String> {
        serde_json::to_string_pretty(&self.to_map())
            .map_err(|e| EvolutionError::Serialization(e.to_string()))
    }
}

pub mod prelude {
    pub use super::convergence::{distinct_genotypes, has_converged};
    pub use super::{EvolutionStats, Extremum, GenerationStats, RunStats};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::individual::Individual;

    fn population(members: &[(&str, f64)]) -> Population<String> {
        Population::from_individuals(
            members
                .iter()
                .map(|(g, f)| Individual::new(g.to_string(), *f, 1.0))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_selection_differential_and_intensity() {
        let previous = population(&[("A", 4.0), ("B", 2.0), ("C", 0.0), ("D", 2.0)]);
        let current = population(&[("A", 4.0), ("A", 4.0), ("B", 2.0), ("D", 2.0)]);

        let stats = GenerationStats::between(&previous, &current, 1).unwrap();
        assert_eq!(stats.selection_differential, 1.0);
        // std of [4, 2, 2, 0] = sqrt(2)
        let intensity = stats.selection_intensity.unwrap();
        assert!((intensity - 1.0 / 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_zero_variance_intensity_is_undefined() {
        let previous = population(&[("A", 1.0), ("B", 1.0)]);
        let current = population(&[("A", 1.0), ("A", 1.0)]);

        let stats = GenerationStats::between(&previous, &current, 1).unwrap();
        assert_eq!(stats.selection_differential, 0.0);
        assert_eq!(stats.selection_intensity, None);
    }

    #[test]
    fn test_growth_rate_counts_leading_run_only() {
        // Previous best "A" appears twice anywhere.
        let previous = population(&[("A", 5.0), ("B", 3.0), ("A", 5.0), ("C", 1.0)]);
        // "X" and "Y" tie for best; the sorted prefix of "X" has length 1.
        let current = population(&[("X", 6.0), ("Y", 6.0), ("X", 6.0), ("X", 6.0)]);

        let stats = GenerationStats::between(&previous, &current, 1).unwrap();
        assert_eq!(stats.previous_best_count, 2);
        assert_eq!(stats.best_count, 1);
        assert_eq!(stats.growth_rate, 0.0);
    }

    #[test]
    fn test_growth_rate_ratio() {
        let previous = population(&[("A", 5.0), ("B", 3.0), ("C", 1.0), ("D", 0.0)]);
        let current = population(&[("A", 5.0), ("A", 5.0), ("A", 5.0), ("B", 3.0)]);

        let stats = GenerationStats::between(&previous, &current, 1).unwrap();
        assert_eq!(stats.best_count, 3);
        assert_eq!(stats.previous_best_count, 1);
        assert_eq!(stats.growth_rate, 3.0);
    }

    #[test]
    fn test_reproduction_rate_and_loss_of_diversity() {
        let previous = population(&[("A", 4.0), ("B", 3.0), ("C", 2.0), ("D", 1.0)]);
        let current = population(&[("A", 4.0), ("A", 4.0), ("B", 3.0), ("B", 3.0)]);

        let stats = GenerationStats::between(&previous, &current, 1).unwrap();
        assert_eq!(stats.reproduction_rate, 0.5);
        assert_eq!(stats.loss_of_diversity, 0.5);
    }

    #[test]
    fn test_size_change_is_fatal() {
        let previous = population(&[("A", 1.0), ("B", 0.0)]);
        let current = population(&[("A", 1.0)]);
        assert!(matches!(
            GenerationStats::between(&previous, &current, 1),
            Err(EvolutionError::PopulationSize {
                expected: 2,
                actual: 1
            })
        ));
    }

    fn generation(t: usize, s: f64, best_count: usize, rr: f64) -> GenerationStats {
        GenerationStats {
            generation: t,
            mean_fitness: 0.0,
            selection_differential: s,
            selection_intensity: Some(s * 2.0),
            best_count,
            previous_best_count: 1,
            growth_rate: best_count as f64,
            reproduction_rate: rr,
            loss_of_diversity: 1.0 - rr,
        }
    }

    #[test]
    fn test_extrema_keep_first_occurrence() {
        let mut stats = EvolutionStats::new(4);
        stats.record(generation(1, 0.5, 1, 0.5));
        stats.record(generation(2, 0.5, 1, 0.75));
        stats.record(generation(3, -0.25, 2, 0.5));
        stats.record(generation(4, -0.25, 3, 0.75));

        let s_max = stats.selection_differential_max.unwrap();
        assert_eq!((s_max.value, s_max.generation), (0.5, 1));
        let s_min = stats.selection_differential_min.unwrap();
        assert_eq!((s_min.value, s_min.generation), (-0.25, 3));
        let rr_max = stats.reproduction_rate_max.unwrap();
        assert_eq!(rr_max.generation, 2);
        let teta_max = stats.loss_of_diversity_max.unwrap();
        assert_eq!((teta_max.value, teta_max.generation), (0.5, 1));
    }

    #[test]
    fn test_growth_rate_markers() {
        let mut stats = EvolutionStats::new(4);
        stats.record(generation(1, 0.0, 1, 1.0));
        stats.record(generation(2, 0.0, 1, 1.0));
        stats.record(generation(3, 0.0, 2, 1.0));
        stats.record(generation(4, 0.0, 3, 1.0));

        assert_eq!(stats.growth_rate_early, Some(1.0));
        let late = stats.growth_rate_late.unwrap();
        assert_eq!((late.value, late.generation), (2.0, 3));
    }

    #[test]
    fn test_undefined_intensity_skipped() {
        let mut stats = EvolutionStats::new(2);
        let mut flat = generation(1, 0.0, 1, 1.0);
        flat.selection_intensity = None;
        stats.record(flat);
        stats.record(generation(2, 1.0, 2, 0.5));

        let final_pop = population(&[("A", 1.0), ("A", 1.0)]);
        let run = stats.finalize(&final_pop, TerminationReason::Converged { generation: 2 });

        assert_eq!(run.undefined_intensities, 1);
        assert_eq!(run.i_avg, Some(2.0));
        assert_eq!(run.i_min.unwrap().generation, 2);
        assert_eq!(run.s_avg, Some(0.5));
    }

    #[test]
    fn test_finalize_without_generations() {
        let stats = EvolutionStats::new(3);
        let final_pop = population(&[("X", 2.0), ("X", 2.0), ("X", 2.0)]);
        let run = stats.finalize(&final_pop, TerminationReason::Converged { generation: 0 });

        assert_eq!(run.ni, 0);
        assert_eq!(run.f_avg, 2.0);
        assert_eq!(run.f_found, 2.0);
        assert_eq!(run.s_avg, None);
        assert_eq!(run.gr_avg, None);

        let map = run.to_map();
        assert_eq!(map.get("NI"), Some(&0.0));
        assert_eq!(map.get("F_found"), Some(&2.0));
        assert!(!map.contains_key("s_avg"));
        assert!(!map.contains_key("NI_s_min"));
    }

    #[test]
    fn test_report_map_keys() {
        let mut stats = EvolutionStats::new(2);
        stats.record(generation(1, 0.5, 1, 0.5));
        stats.record(generation(2, 0.25, 2, 1.0));
        let final_pop = population(&[("A", 1.0), ("B", 0.0)]);
        let run = stats.finalize(
            &final_pop,
            TerminationReason::MaxIterationReached { generation: 2 },
        );

        let map = run.to_map();
        for key in [
            "s_min", "NI_s_min", "s_max", "NI_s_max", "I_min", "NI_I_min", "I_max", "NI_I_max",
            "GR_early", "GR_late", "NI_GR_late", "RR_min", "NI_RR_min", "RR_max", "NI_RR_max",
            "Teta_min", "NI_Teta_min", "Teta_max", "NI_Teta_max", "s_avg", "RR_avg", "Teta_avg",
            "F_avg", "F_found", "I_avg", "GR_avg", "NI",
        ] {
            assert!(map.contains_key(key), "missing {key}");
        }
        assert_eq!(map["NI"], -1.0);
        assert_eq!(map["NI_GR_late"], 1.0);

        let json = run.to_json().unwrap();
        assert!(json.contains("\"RR_avg\""));
    }
}
