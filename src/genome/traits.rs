//! Core genotype trait
//!
//! Genotypes are opaque to the selection machinery: they are only cloned,
//! compared for equality and hashed.

use std::fmt::Debug;
use std::hash::Hash;

/// Opaque candidate-solution representation.
///
/// Anything that can be cloned, compared and hashed qualifies. Fixed-length
/// strings over a small alphabet (`String`, `Vec<u8>`, `Vec<bool>`) are the
/// typical choice.
pub trait Genotype: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> Genotype for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}
