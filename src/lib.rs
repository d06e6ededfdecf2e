//! Finite-field arithmetic over pseudo-Mersenne primes
//!
//! This crate provides the field-element engine that elliptic-curve
//! arithmetic is built on top of: the unsaturated limb representation, its
//! arithmetic kernels, and the power ladders for inversion, square root,
//! and the Legendre symbol, parameterized once over `(n, c)` and
//! instantiated for several concrete primes.
//!
//! The focus is on **clarity, predictability, and auditability**, rather
//! than on providing a large or high-level cryptographic API. The field
//! kernels are dependency-free, explicit in their semantics, and written
//! for constant-time execution on secret data.
//!
//! # Module overview
//!
//! - `field`
//!   The field-element engine itself: limb model and normalization,
//!   add/sub/mul/square kernels, inversion/square-root/Legendre power
//!   ladders, pack/unpack, and the per-thread scratchpad hygiene that keeps
//!   secret intermediates from lingering past their use. This is the only
//!   module this crate exists to provide; everything else here is
//!   supporting infrastructure it depends on.
//!
//! - `rng`
//!   A cryptographically secure pseudorandom number generator, built from a
//!   ChaCha20-based DRBG, used only as the entropy source behind
//!   `FieldElement::random` — the field engine itself never reaches into
//!   the OS or a clock.
//!
//! - `os`
//!   Platform-specific OS entropy sourcing consumed by `rng`.
//!
//! # Design goals
//!
//! - No heap allocation in the field kernels
//! - Constant-time execution: no branch or memory access pattern depends on
//!   secret limb contents
//! - Explicit, minimal APIs with caller contracts documented rather than
//!   checked at runtime where checking would cost constant-time guarantees
//!
//! This crate does not implement curve-level arithmetic (point addition,
//! scalar multiplication, point compression) or any end-user signing API —
//! those are consumers of the field engine, not part of it.

pub mod field;
mod os;
pub mod rng;
