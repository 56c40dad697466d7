//! # selection-dynamics
//!
//! Selection-only genetic algorithm for studying selection pressure.
//!
//! A population of genotypes is repeatedly resampled by stochastic universal
//! sampling over linear-rank weights, with no crossover or mutation, until a
//! single genotype remains or an iteration budget runs out. Each generation is
//! measured: selection differential and intensity, growth rate of the best
//! genotype, reproduction rate and loss of diversity.
//!
//! ## Core Concepts
//!
//! - **Scale functions** turn sorted fitness into selection weights
//! - **Selection operators** sample a new generation from those weights
//! - **Run statistics** summarize a run as a flat, serializable report
//!
//! ## Quick Start
//!
//! A runnable version lives in `demos/selection_dynamics.rs`
//! (`cargo run --example selection_dynamics`).
//!
//! ```rust,ignore
//! use selection_dynamics::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!
//! let result = SelectionGA::builder()
//!     .population_size(4)
//!     .max_iteration(1000)
//!     .fitness(SymbolCount::new('A'))
//!     .scale(LinearRank::new(1.6, 4)?)
//!     .selection(StochasticUniversalSampling::modified())
//!     .build()?
//!     .run(vec!["AAAA".into(), "AABB".into(), "ABBB".into(), "BBBB".into()], &mut rng)?;
//!
//! println!("{}", result.stats.to_json()?);
//! ```

pub mod algorithms;
pub mod diagnostics;
pub mod error;
pub mod experiment;
pub mod fitness;
pub mod genome;
pub mod operators;
pub mod population;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::experiment::prelude::*;
    pub use crate::fitness::prelude::*;
    pub use crate::genome::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::termination::prelude::*;
}
