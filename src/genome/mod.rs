//! Genotype abstraction
//!
//! This module provides the `Genotype` trait consumed by populations and operators.

pub mod traits;

pub mod prelude {
    pub use super::traits::*;
}
