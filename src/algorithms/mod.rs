//! Evolutionary algorithms
//!
//! This module provides the selection-only generation loop and its observers.

pub mod observer;
pub mod selection_ga;

pub mod prelude {
    pub use super::observer::*;
    pub use super::selection_ga::*;
}
