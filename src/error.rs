//! Error types for selection-dynamics
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Error type for scaling and selection operators
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// Selection could not produce a new generation
    #[error("Selection failed: {0}")]
    SelectionFailed(String),

    /// Invalid operator configuration
    #[error("Invalid operator configuration: {0}")]
    InvalidConfiguration(String),

    /// All selection weights are zero, so no pointer spacing exists
    #[error("Selection weights sum to zero")]
    ZeroWeightSum,

    /// A selection weight is negative or not finite
    #[error("Invalid selection weight {weight} at position {index}")]
    InvalidWeight { index: usize, weight: f64 },

    /// The operator was configured for a different population size
    #[error("Size mismatch: operator expects {expected} values, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Top-level error type for evolution runs
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Operator error
    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),

    /// Fitness evaluation produced an unusable value
    #[error("Fitness evaluation failed: {0}")]
    FitnessEvaluation(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Numerical degeneracy in a statistic
    #[error("Numerical instability: {0}")]
    Numerical(String),

    /// Empty population
    #[error("Empty population")]
    EmptyPopulation,

    /// Population size changed between generations
    #[error("Population size changed: expected {expected}, got {actual}")]
    PopulationSize { expected: usize, actual: usize },

    /// Report serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;
