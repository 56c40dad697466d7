//! Selection Dynamics
//!
//! This example runs the selection-only GA on a small population where three
//! copies of `AAAA` compete with one `BBBB`. Fitness counts the `A` symbols,
//! linear-rank scaling sets the selection pressure and stochastic universal
//! sampling draws each new generation.
//!
//! The run stops once a single genotype remains, then prints the report map.

use rand::rngs::StdRng;
use rand::SeedableRng;
use selection_dynamics::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Selection Dynamics ===\n");

    // Create a seeded RNG for reproducibility
    let mut rng = StdRng::seed_from_u64(2024);

    const N: usize = 4;
    let initial: Vec<String> = ["AAAA", "AAAA", "AAAA", "BBBB"]
        .iter()
        .map(|g| g.to_string())
        .collect();

    for modified in [false, true] {
        let ga = SelectionGA::builder()
            .population_size(N)
            .max_iteration(1000)
            .fitness(SymbolCount::new('A'))
            .scale(LinearRank::new(1.2, N)?)
            .selection(StochasticUniversalSampling::from_flag(modified, 1.0)?)
            .build()?;

        let result = ga.run(initial.clone(), &mut rng)?;

        let label = SelectionConfig {
            beta: 1.2,
            modified,
        }
        .label();
        println!("Run {label}");
        println!("  Termination:  {:?}", result.termination);
        println!("  Best genome:  {}", result.best_genotype);
        println!("  Best fitness: {:.1}", result.best_fitness);
        println!("  Total scores: {:?}", result.total_scores);
        println!("\nReport:");
        println!("{}\n", result.stats.to_json()?);
    }

    Ok(())
}
