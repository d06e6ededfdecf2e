//! Finite-field arithmetic over pseudo-Mersenne primes `p = 2^n - c`.
//!
//! This module is the computational substrate curve-level arithmetic would
//! be built on: the unsaturated limb representation, the add/sub/mul/square
//! kernels, the inversion/square-root/Legendre power ladders, and the
//! pack/unpack and scratchpad hygiene that make the rest of it safe to use
//! with secret data. It intentionally stops there — twisted-Edwards point
//! addition, scalar multiplication, and point compression are consumers of
//! this module, not part of it.
//!
//! [`element::FieldElement`] is generic over the field's shape (`D`, `N`,
//! `C`); [`instances`] lists the concrete fields this crate ships.

pub mod bits;
pub mod consttime;
pub mod element;
pub mod error;
pub mod instances;
mod scratch;

pub use element::{FieldElement, RandomSource};
pub use error::DecodeError;
