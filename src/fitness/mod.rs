//! Fitness abstraction
//!
//! This module provides the fitness trait and closure-backed evaluators.

pub mod traits;

pub mod prelude {
    pub use super::traits::*;
}
