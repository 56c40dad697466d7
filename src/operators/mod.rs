//! Genetic operators
//!
//! This module provides scale functions and selection operators.

pub mod scaling;
pub mod selection;

pub mod prelude {
    pub use super::scaling::*;
    pub use super::selection::*;
}
