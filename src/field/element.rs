//! The field-element engine: limb model, kernels, and power ladders.
//!
//! [`FieldElement`] is generic over three const parameters instead of being
//! hand-duplicated per prime the way a fixed-curve field type would be:
//! `D` is the limb count, `N` is the field's bit-width, `C` is the
//! pseudo-Mersenne subtrahend (`p = 2^N - C`). `DIGIT_BITS`,
//! `HIGH_DIGIT_BITS`, `MUL_DIGIT_BITS` and `PACKED_BYTES` are derived from
//! `(D, N)` rather than chosen by hand, which is what lets one copy of the
//! limb model, the add/sub/mul/square kernels, and the power-ladder
//! machinery serve every instantiation in [`super::instances`].
//!
//! ## Representation
//!
//! An element is `D` signed 64-bit limbs. Limbs `0..D-1` each carry
//! `DIGIT_BITS` value bits; limb `D-1` carries `HIGH_DIGIT_BITS` value bits
//! and, when the element is loose, a residual carry-out above that — a
//! count of still-unfolded multiples of `p`. Every limb's positional weight
//! is `2^(i * DIGIT_BITS)`, so `(D-1)*DIGIT_BITS + HIGH_DIGIT_BITS == N`.
//!
//! A value is *normalized* when every limb is within its value-bit range
//! and the top limb's residual carry-out is zero, i.e. the encoded integer
//! lies in `[0, p)`. Arithmetic kernels return loose results; callers that
//! need a canonical representative call [`FieldElement::normalize`]
//! explicitly, and the query operations (`eq`, `sign`, `legendre`, `pack`,
//! ...) normalize an internal copy before reading it.

use std::io::{Read, Write};

use super::bits::{read_bits, write_bits};
use super::consttime::{limbs_eq, limbs_is_zero, mask_from_bit, select_i64};
use super::error::DecodeError;
use super::scratch::with_scratchpad;

/// A source of cryptographically secure 64-bit random words.
///
/// This is the engine's only dependency on an entropy source, kept as a
/// trait rather than an owned generator so the random-element constructor
/// stays a pure consumer of whatever CSPRNG the caller already has running
/// (see [`crate::rng::Csprng`] for one implementation).
pub trait RandomSource {
    fn next_u64(&mut self) -> u64;
}

impl RandomSource for crate::rng::Csprng {
    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_le_bytes(buf)
    }
}

/// An element of the field `Z/pZ`, `p = 2^N - C`, represented as `D`
/// unsaturated 64-bit limbs.
#[derive(Clone, Copy)]
pub struct FieldElement<const D: usize, const N: u32, const C: u64>(pub(crate) [i64; D]);

/// `leading_ones` 1-bits followed by `low_bits_len` low-order bits of
/// `low_bits` — the compact description of an exponent of the shape
/// `2^k - m` that every power ladder in this engine reduces to.
struct LadderExponent {
    leading_ones: u32,
    low_bits: u64,
    low_bits_len: u32,
}

/// Decomposes `2^k - m` into [`LadderExponent`] form. `m` must be small
/// enough that its bit length fits comfortably below `k` — true for every
/// exponent this engine builds, since `m` is always derived from the small
/// pseudo-Mersenne subtrahend `C`.
const fn decompose(k: u32, m: u64) -> LadderExponent {
    if m == 0 {
        return LadderExponent {
            leading_ones: k,
            low_bits: 0,
            low_bits_len: 0,
        };
    }
    let low_bits_len = 64 - m.leading_zeros();
    let low_bits = ((1u128 << low_bits_len) - m as u128) as u64;
    LadderExponent {
        leading_ones: k - low_bits_len,
        low_bits,
        low_bits_len,
    }
}

const fn ceil_div_u32(a: u32, b: u32) -> u32 {
    (a + b - 1) / b
}

impl<const D: usize, const N: u32, const C: u64> FieldElement<D, N, C> {
    /// Bits carried by every limb except the top one.
    pub const DIGIT_BITS: u32 = ceil_div_u32(N, D as u32);

    /// Bits carried by the top limb (`limbs[D-1]`) when normalized.
    pub const HIGH_DIGIT_BITS: u32 = N - (D as u32 - 1) * Self::DIGIT_BITS;

    /// Half-limb width used to keep multiply's cross products within a
    /// single widened accumulator.
    pub const MUL_DIGIT_BITS: u32 = ceil_div_u32(Self::DIGIT_BITS, 2);

    /// Canonical encoding length in bytes.
    pub const PACKED_BYTES: usize = ceil_div_u32(N, 8) as usize;

    /// Inclusive bounds on the caller-supplied scalar for `add`/`sub`.
    ///
    /// The lower bound is `-(2^64 - 2^DIGIT_BITS)`: in a 64-bit
    /// two's-complement accumulator that is the same stored value as
    /// `-(2^DIGIT_BITS)` (since `2^64 ≡ 0 mod 2^64`), so it's written as a
    /// direct shift rather than a subtraction that would overflow on the
    /// way to computing `2^64` in an `i64`.
    pub const ADD_MIN: i64 = -(1i64 << Self::DIGIT_BITS);
    pub const ADD_MAX: i64 = 1i64 << Self::DIGIT_BITS;

    /// Inclusive bounds on the caller-supplied scalar for scalar `mul`.
    pub const MUL_MAX: i64 = 1i64 << Self::MUL_DIGIT_BITS;
    pub const MUL_MIN: i64 = -((1i64 << 32) - (1i64 << Self::MUL_DIGIT_BITS));

    /// `true` when `p ≡ 3 (mod 4)`, selecting the `(p+1)/4` square-root
    /// ladder; otherwise the engine assumes `p ≡ 5 (mod 8)` and uses the
    /// `(p+3)/8` ladder with the quartic-residue correction.
    const IS_3_MOD_4: bool = C % 4 == 1;

    /// `true` when `p ≡ 1 (mod 4)`, i.e. quartic residues/Legendre are
    /// meaningful for this field.
    const IS_1_MOD_4: bool = C % 4 == 3;

    /// Consistency check for the `(D, N)` pair backing this instantiation,
    /// evaluated once per monomorphization so a miswired entry in
    /// `field::instances` fails to build instead of misbehaving at runtime.
    pub(crate) const LAYOUT_OK: () = {
        assert!(D >= 1, "field must have at least one limb");
        assert!(
            Self::HIGH_DIGIT_BITS > 0 && Self::HIGH_DIGIT_BITS <= Self::DIGIT_BITS,
            "top limb width out of range for this (D, N)"
        );
        assert!(Self::DIGIT_BITS < 64, "digit width must leave carry headroom");
        assert!(C > 0 && C % 2 == 1, "pseudo-Mersenne subtrahend must be odd");
    };

    /// The additive identity.
    pub const ZERO: Self = Self([0i64; D]);

    /// The multiplicative identity.
    pub const ONE: Self = {
        let mut limbs = [0i64; D];
        limbs[0] = 1;
        Self(limbs)
    };

    /// `-1`, loose (top limb holds a one-count residual carry rather than a
    /// borrowed-down value) but valid as an operand to every kernel.
    pub const MINUS_ONE: Self = {
        let mut limbs = [0i64; D];
        limbs[0] = -1;
        Self(limbs)
    };

    // ---------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------

    /// Builds an element from a small (possibly negative) integer.
    ///
    /// `value` must lie within `[ADD_MIN, ADD_MAX)`; this is the same
    /// contract scalar `add`/`sub` place on their argument, since this
    /// constructor is implemented as `ZERO.add_small(value)`.
    pub fn from_i64(value: i64) -> Self {
        let _ = Self::LAYOUT_OK;
        Self::ZERO.add_small(value)
    }

    /// Builds an element from an unsigned integer, for convenience.
    pub fn from_u64(value: u64) -> Self {
        Self::from_i64(value as i64)
    }

    /// `1/2`, as `inv(2)` — `p` is always odd, so `2` is always invertible.
    pub fn half() -> Self {
        Self::from_i64(2).inv()
    }

    /// Samples a uniformly random loose element: `D` random 64-bit words,
    /// each masked down to its limb's value-bit width (`DIGIT_BITS`, or
    /// `HIGH_DIGIT_BITS` for the top limb).
    ///
    /// This does not reject values `>= p`; the resulting distribution is
    /// nearly but not exactly uniform modulo `p`. Curve-level consumers
    /// that need exactly-uniform scalars correct for this bias themselves.
    pub fn random(rng: &mut impl RandomSource) -> Self {
        let mut limbs = [0i64; D];
        for i in 0..D {
            let width = if i == D - 1 {
                Self::HIGH_DIGIT_BITS
            } else {
                Self::DIGIT_BITS
            };
            let word = rng.next_u64();
            limbs[i] = (word & ((1u64 << width) - 1)) as i64;
        }
        Self(limbs)
    }

    /// Decodes an element from exactly [`Self::PACKED_BYTES`] little-endian
    /// bytes. Does not reduce modulo `p`: high bits beyond bit `N-1` (if
    /// any, for byte-unaligned widths) are kept as loose carry.
    pub fn unpack(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < Self::PACKED_BYTES {
            return Err(DecodeError::TruncatedInput);
        }

        let mut limbs = [0i64; D];
        for i in 0..D {
            let width = if i == D - 1 {
                Self::HIGH_DIGIT_BITS
            } else {
                Self::DIGIT_BITS
            };
            let bit_pos = i * Self::DIGIT_BITS as usize;
            limbs[i] = read_bits(bytes, bit_pos, width) as i64;
        }
        Ok(Self(limbs))
    }

    /// Reads exactly [`Self::PACKED_BYTES`] bytes from a reader and decodes
    /// them the same way as [`Self::unpack`].
    pub fn from_stream(reader: &mut impl Read) -> Result<Self, DecodeError> {
        let mut buf = vec![0u8; Self::PACKED_BYTES];
        reader
            .read_exact(&mut buf)
            .map_err(|_| DecodeError::TruncatedStream)?;
        Self::unpack(&buf)
    }

    /// Overwrites `self` in place from another element.
    pub fn set(&mut self, other: &Self) {
        self.0 = other.0;
    }

    /// Overwrites `self` in place from a small integer.
    pub fn set_i64(&mut self, value: i64) {
        *self = Self::from_i64(value);
    }

    /// Overwrites `self` in place by unpacking bytes.
    pub fn set_bytes(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        *self = Self::unpack(bytes)?;
        Ok(())
    }

    /// Destroys this element's contents: every limb is overwritten with
    /// all-ones bits through a volatile write, the same convention the
    /// scratchpad uses so that "scrubbed" is distinguishable from
    /// "freshly zeroed" while debugging.
    pub fn destroy(&mut self) {
        for limb in self.0.iter_mut() {
            // SAFETY: `limb` is a valid, uniquely-borrowed `i64`.
            unsafe { std::ptr::write_volatile(limb, -1i64) };
        }
    }

    // ---------------------------------------------------------------
    // Limb model / normalization
    // ---------------------------------------------------------------

    /// Folds carries through every limb left-to-right, treating the final
    /// top-limb overflow as a multiple of `p` and re-injecting it (times
    /// `C`) into limb 0. Leaves the element loose (possibly still `>= p`,
    /// per the "at most one more reduction pass" bound from the kernel
    /// design), not normalized.
    fn carry_propagate(&mut self) {
        let mut carry: i64 = 0;
        for i in 0..D {
            let width = if i == D - 1 { Self::HIGH_DIGIT_BITS } else { Self::DIGIT_BITS };
            let sum = self.0[i] + carry;
            if i == D - 1 {
                self.0[i] = sum;
                carry = sum >> width;
            } else {
                self.0[i] = sum & ((1i64 << width) - 1);
                carry = sum >> width;
            }
        }
        // Fold the residual top-limb carry-out back in: 2^N === C (mod p).
        if carry != 0 {
            self.0[D - 1] -= carry << Self::HIGH_DIGIT_BITS;
            self.0[0] += carry * (C as i64);
            // The injected carry*C term is small (C is a small constant),
            // so one more limb-0-rooted ripple suffices to re-settle it.
            let mut extra = 0i64;
            for i in 0..D {
                let width = if i == D - 1 { Self::HIGH_DIGIT_BITS } else { Self::DIGIT_BITS };
                let sum = self.0[i] + extra;
                if i == D - 1 {
                    self.0[i] = sum;
                    extra = 0;
                } else {
                    self.0[i] = sum & ((1i64 << width) - 1);
                    extra = sum >> width;
                }
            }
        }
    }

    /// Brings `self` to the canonical representative in `[0, p)`.
    pub fn normalize(&mut self) {
        self.carry_propagate();

        // After one full carry fold the value lies in [0, 2p); probe
        // whether it is still >= p by adding C and checking whether that
        // overflows past 2^N. This ripple must not fold its own overflow
        // back into limb 0 the way carry_propagate does — folding here
        // would always leave the top limb's carry-out at zero, so the
        // probe would never fire. It propagates raw instead, leaving the
        // true overflow count readable by shifting the top limb down. The
        // probe copy is secret-dependent, so it is staged in the
        // scratchpad rather than a bare stack local and gets scrubbed on
        // the way out.
        let k = with_scratchpad::<D, _>(|pad| {
            pad.d0 = self.0;
            pad.d0[0] += C as i64;
            let mut carry = 0i64;
            for i in 0..D - 1 {
                let sum = pad.d0[i] + carry;
                pad.d0[i] = sum & ((1i64 << Self::DIGIT_BITS) - 1);
                carry = sum >> Self::DIGIT_BITS;
            }
            pad.d0[D - 1] += carry;
            pad.d0[D - 1] >> Self::HIGH_DIGIT_BITS
        });
        let mask = mask_from_bit((k != 0) as u8);

        // x - p == x + C - 2^N: fold C into limb 0 and clear the 2^N bit
        // at the top limb, both conditioned on the probe above, then
        // ripple the small resulting carry forward.
        self.0[0] += mask & (C as i64);
        self.0[D - 1] &= !(mask & (1i64 << Self::HIGH_DIGIT_BITS));

        let mut carry = 0i64;
        for i in 0..D {
            let width = if i == D - 1 { Self::HIGH_DIGIT_BITS } else { Self::DIGIT_BITS };
            let sum = self.0[i] + carry;
            self.0[i] = sum & ((1i64 << width) - 1);
            carry = sum >> width;
        }
    }

    /// Returns a normalized copy without mutating `self`.
    fn normalized(&self) -> Self {
        let mut out = *self;
        out.normalize();
        out
    }

    // ---------------------------------------------------------------
    // Add / sub
    // ---------------------------------------------------------------

    /// Adds `b` (scaled by `b_sign`, `±1`) into `a` with no pre-existing
    /// residual carry on either side — the shape `add_small`/`sub_small`
    /// need, where `b` is a bare scalar at limb 0 and `a`'s own top-limb
    /// carry-out should simply pass through untouched.
    fn add_with_carry_in(a: &[i64; D], b: &[i64; D], mut carry: i64) -> Self {
        let mut out = [0i64; D];
        for i in 0..D {
            let width = if i == D - 1 { Self::HIGH_DIGIT_BITS } else { Self::DIGIT_BITS };
            let sum = a[i] + b[i] + carry;
            if i == D - 1 {
                out[i] = sum;
            } else {
                out[i] = sum & ((1i64 << width) - 1);
                carry = sum >> width;
            }
        }
        Self(out)
    }

    /// Adds `b_sign * b` into `a`, where both `a` and `b` may already carry
    /// a residual high-limb carry-out from a prior loose operation.
    ///
    /// Each input's own carry-out is extracted first (so it isn't also
    /// summed in at the top limb's raw position, which would count it
    /// twice) and re-injected, scaled by `c`, as the carry-in at limb 0;
    /// the top limb then combines only the two operands' masked value bits
    /// plus the propagated carry, and is left unmasked to expose the
    /// result's own carry-out for the next operation.
    fn combine(a: &[i64; D], b: &[i64; D], b_sign: i64) -> Self {
        let top_mask = (1i64 << Self::HIGH_DIGIT_BITS) - 1;
        let carry_a = a[D - 1] >> Self::HIGH_DIGIT_BITS;
        let carry_b = b[D - 1] >> Self::HIGH_DIGIT_BITS;
        let mut carry = (carry_a + b_sign * carry_b) * (C as i64);

        let mut out = [0i64; D];
        for i in 0..D {
            if i == D - 1 {
                let ai = a[i] & top_mask;
                let bi = b_sign * (b[i] & top_mask);
                out[i] = ai + bi + carry;
            } else {
                let sum = a[i] + b_sign * b[i] + carry;
                out[i] = sum & ((1i64 << Self::DIGIT_BITS) - 1);
                carry = sum >> Self::DIGIT_BITS;
            }
        }
        Self(out)
    }

    /// Field addition. Works correctly with `other` aliasing `self`.
    pub fn add(&self, other: &Self) -> Self {
        Self::combine(&self.0, &other.0, 1)
    }

    /// Field subtraction: `self - other`. Works with `other` aliasing
    /// `self`.
    pub fn sub(&self, other: &Self) -> Self {
        Self::combine(&self.0, &other.0, -1)
    }

    /// Additive inverse.
    pub fn neg(&self) -> Self {
        Self::ZERO.sub(self)
    }

    /// Adds a bounded scalar (`ADD_MIN..ADD_MAX`) to limb 0 only.
    pub fn add_small(&self, scalar: i64) -> Self {
        Self::add_with_carry_in(&self.0, &[0i64; D], scalar)
    }

    /// Subtracts a bounded scalar (`ADD_MIN..ADD_MAX`) from limb 0 only.
    pub fn sub_small(&self, scalar: i64) -> Self {
        self.add_small(-scalar)
    }

    // ---------------------------------------------------------------
    // Multiply / square
    // ---------------------------------------------------------------

    /// Folds a `2D-1`-limb wide product down to `D` loose limbs using
    /// `2^N === C (mod p)`, then carry-propagates.
    ///
    /// The teacher's Ed25519 kernel keeps every intermediate in `i64` by
    /// splitting each limb into two ~13-bit halves before multiplying,
    /// because its limbs are only 25-26 bits wide net of headroom. This
    /// engine's limbs are 52-58 bits wide, so a raw `i64 * i64` cross
    /// product would itself overflow `i64`; rather than introduce a second
    /// half-limb split on top of the existing one, cross products and
    /// their accumulation are widened one step further to `i128` — the
    /// same "promote before multiplying" principle the teacher's `mul!`
    /// macro applies one level down, just at the next width up.
    fn fold_and_settle(wide: &mut [i128; 2 * D - 1]) -> Self {
        let delta = Self::DIGIT_BITS - Self::HIGH_DIGIT_BITS;
        let scale = (C as i128) << delta;

        for k in (D..2 * D - 1).rev() {
            let carry = wide[k];
            wide[k] = 0;
            wide[k - D] += carry * scale;
        }

        let mut limbs = [0i64; D];
        let mut carry: i128 = 0;
        for i in 0..D {
            let width = if i == D - 1 { Self::HIGH_DIGIT_BITS } else { Self::DIGIT_BITS };
            let sum = wide[i] + carry;
            if i == D - 1 {
                limbs[i] = sum as i64;
                carry = 0;
            } else {
                limbs[i] = (sum & ((1i128 << width) - 1)) as i64;
                carry = sum >> width;
            }
        }

        let mut out = Self(limbs);
        out.carry_propagate();
        out
    }

    /// Field multiplication.
    pub fn mul(&self, other: &Self) -> Self {
        let mut wide = [0i128; 2 * D - 1];
        for i in 0..D {
            let ai = self.0[i] as i128;
            for j in 0..D {
                wide[i + j] += ai * (other.0[j] as i128);
            }
        }
        Self::fold_and_settle(&mut wide)
    }

    /// Field squaring — exploits `a_i * a_j == a_j * a_i` to halve the
    /// number of cross products relative to a generic `mul(self, self)`.
    pub fn square(&self) -> Self {
        let mut wide = [0i128; 2 * D - 1];
        for i in 0..D {
            let ai = self.0[i] as i128;
            wide[2 * i] += ai * ai;
            for j in (i + 1)..D {
                wide[i + j] += 2 * ai * (self.0[j] as i128);
            }
        }
        Self::fold_and_settle(&mut wide)
    }

    /// Multiplies by a bounded scalar (`MUL_MIN..MUL_MAX`).
    ///
    /// Performs a single carry-fold pass. The caller is responsible for an
    /// intervening `normalize` before chaining a second `mul_small` on the
    /// result if the first scalar was near `MUL_MAX` — see the open
    /// question in `DESIGN.md` about back-to-back scalar multiplies.
    pub fn mul_small(&self, scalar: i64) -> Self {
        let s = scalar as i128;
        let mut limbs = [0i64; D];
        let mut carry: i128 = 0;
        for i in 0..D {
            let width = if i == D - 1 { Self::HIGH_DIGIT_BITS } else { Self::DIGIT_BITS };
            let product = (self.0[i] as i128) * s + carry;
            if i == D - 1 {
                limbs[i] = product as i64;
                carry = 0;
            } else {
                limbs[i] = (product & ((1i128 << width) - 1)) as i64;
                carry = product >> width;
            }
        }

        let mut out = Self(limbs);
        if carry != 0 {
            out.0[0] += (carry * (C as i128)) as i64;
        }
        out.carry_propagate();
        out
    }

    /// Divides by a bounded scalar via `self * inv(FieldElement::from(b))`.
    pub fn div_small(&self, scalar: i64) -> Self {
        self.mul(&Self::from_i64(scalar).inv())
    }

    /// Field division: `self / other`.
    pub fn div(&self, other: &Self) -> Self {
        self.mul(&other.inv())
    }

    // ---------------------------------------------------------------
    // Power ladders: inverse, Legendre, square root
    // ---------------------------------------------------------------

    /// Runs the square-and-multiply ladder described by `exp`. The running
    /// accumulator and the fixed base are staged in the thread's
    /// scratchpad (`d0`, `d1`) rather than bare stack locals, so the
    /// secret-dependent intermediate values the ladder produces are
    /// scrubbed before this call returns.
    fn pow_ladder(&self, exp: &LadderExponent) -> Self {
        with_scratchpad::<D, _>(|pad| {
            pad.d1 = self.0;
            pad.d0 = if exp.leading_ones == 0 { Self::ONE.0 } else { self.0 };

            for _ in 1..exp.leading_ones {
                pad.d0 = Self(pad.d0).square().mul(&Self(pad.d1)).0;
            }
            for bit in (0..exp.low_bits_len).rev() {
                pad.d0 = Self(pad.d0).square().0;
                if (exp.low_bits >> bit) & 1 == 1 {
                    pad.d0 = Self(pad.d0).mul(&Self(pad.d1)).0;
                }
            }
            Self(pad.d0)
        })
    }

    /// Multiplicative inverse via `self^(p-2)`. Returns `ZERO` for a zero
    /// input, matching `0^(p-2) = 0` under the ladder — the caller must
    /// guard against this where dividing by zero is a real possibility.
    pub fn inv(&self) -> Self {
        self.pow_ladder(&decompose(N, C + 2))
    }

    /// Legendre symbol, as `+1` (quadratic residue) or `-1` (non-residue),
    /// via `self^((p-1)/2)`.
    pub fn legendre(&self) -> i32 {
        let r = self.pow_ladder(&decompose(N - 1, (C + 1) / 2)).normalized();
        let is_one = limbs_eq(&r.0, &Self::ONE.0);
        if is_one == 1 { 1 } else { -1 }
    }

    /// Quartic Legendre symbol via `self^((p-1)/4)`. Only meaningful when
    /// `p ≡ 1 (mod 4)` (`Self::IS_1_MOD_4`); undefined (but well-formed)
    /// otherwise, same convention as `sqrt` on a non-residue.
    pub fn legendre_quartic(&self) -> i32 {
        debug_assert!(Self::IS_1_MOD_4, "quartic residue is only meaningful for p ≡ 1 (mod 4)");
        let r = self.pow_ladder(&decompose(N - 2, (C + 1) / 4)).normalized();
        let is_one = limbs_eq(&r.0, &Self::ONE.0);
        if is_one == 1 { 1 } else { -1 }
    }

    /// The field's "2" constant, used by the `p ≡ 5 (mod 8)` square-root
    /// correction factor.
    fn sqrt_correction_base() -> Self {
        Self::from_i64(2).pow_ladder(&decompose(N - 2, (C + 1) / 4))
    }

    /// Square root, meaningful only when `self` is a quadratic residue
    /// (check with [`Self::legendre`] first — this method does not gate on
    /// it). Produces a well-formed but mathematically meaningless result
    /// for a non-residue input.
    pub fn sqrt(&self) -> Self {
        if Self::IS_3_MOD_4 {
            self.pow_ladder(&decompose(N - 2, (C - 1) / 4))
        } else {
            let candidate = self.pow_ladder(&decompose(N - 3, (C - 3) / 8));
            let target = self.normalized();

            // Each of these calls stages its own scratchpad internally
            // (pow_ladder/square/mul), so they must run to completion
            // before this function opens its own scratchpad borrow below
            // — nesting them inside that borrow would re-enter the same
            // thread-local RefCell while it's still held.
            let is_direct_hit = limbs_eq(&candidate.square().normalized().0, &target.0);
            let corrected = candidate.mul(&Self::sqrt_correction_base());

            // The candidate and its corrected twin are both one squaring
            // away from revealing which branch is live; the final
            // branch-free select is staged in the scratchpad's third
            // buffer, fed only the already-materialized limb arrays above,
            // so it is scrubbed on the way out.
            with_scratchpad::<D, _>(|pad| {
                pad.d2 = corrected.0;
                let mut out = Self::ZERO;
                for i in 0..D {
                    out.0[i] = select_i64(is_direct_hit, pad.d2[i], candidate.0[i]);
                }
                out
            })
        }
    }

    /// Inverse square root: `1/sqrt(self)`, implemented as
    /// `inv(self) * sqrt(self)` — correct whenever `self` is a quadratic
    /// residue, since then `self^((p-1)/2) = 1` makes the two ladders'
    /// exponents agree modulo the multiplicative order of `self`.
    pub fn inv_sqrt(&self) -> Self {
        self.inv().mul(&self.sqrt())
    }

    // ---------------------------------------------------------------
    // Constant-time queries and bit-level helpers
    // ---------------------------------------------------------------

    /// `true` iff `self` is exactly zero.
    pub fn is_zero(&self) -> bool {
        limbs_is_zero(&self.normalized().0) == 1
    }

    /// Constant-time equality of normalized representatives.
    pub fn eq(&self, other: &Self) -> bool {
        limbs_eq(&self.normalized().0, &other.normalized().0) == 1
    }

    /// The least significant bit of the canonical encoding — the
    /// convention this engine uses for "sign" of a field element.
    pub fn sign(&self) -> u8 {
        (self.normalized().0[0] & 1) as u8
    }

    /// `+1` / `-1` form of [`Self::sign`].
    pub fn signum(&self) -> i32 {
        if self.sign() == 0 { 1 } else { -1 }
    }

    /// Extracts bit `index` (`0` is least significant) of the canonical
    /// encoding.
    pub fn bit(&self, index: u32) -> u8 {
        let bytes = self.normalized().pack();
        let byte = bytes[(index / 8) as usize];
        (byte >> (index % 8)) & 1
    }

    /// Returns `self` if its sign bit is `0`, `-self` otherwise — the
    /// canonical non-negative representative under this engine's sign
    /// convention.
    pub fn abs(&self) -> Self {
        let neg = self.neg();
        let mut out = Self::ZERO;
        let flag = self.sign();
        for i in 0..D {
            out.0[i] = select_i64(flag, self.0[i], neg.0[i]);
        }
        out
    }

    /// Returns an all-zero or all-one-bits-per-limb mask element for
    /// `flag` (which must be `0` or `1`) — the branch-free building block
    /// curve-level conditional selects are built from.
    pub fn mask(flag: u8) -> Self {
        Self([mask_from_bit(flag); D])
    }

    /// Bitwise OR, limb by limb — paired with [`Self::mask`] for
    /// branch-free selection: `a.mask_and(flag).or(&b.mask_and(!flag))`.
    pub fn or(&self, other: &Self) -> Self {
        let mut out = Self::ZERO;
        for i in 0..D {
            out.0[i] = self.0[i] | other.0[i];
        }
        out
    }

    // ---------------------------------------------------------------
    // Pack / unpack
    // ---------------------------------------------------------------

    /// Encodes the canonical representative as [`Self::PACKED_BYTES`]
    /// little-endian bytes. Normalizes a copy first; `self` is unchanged.
    pub fn pack(&self) -> Vec<u8> {
        let normalized = self.normalized();
        let mut out = vec![0u8; Self::PACKED_BYTES];
        for i in 0..D {
            let width = if i == D - 1 { Self::HIGH_DIGIT_BITS } else { Self::DIGIT_BITS };
            let bit_pos = i * Self::DIGIT_BITS as usize;
            write_bits(&mut out, bit_pos, width, normalized.0[i] as u64);
        }
        out
    }

    /// Writes [`Self::pack`]'s output to a writer.
    pub fn to_stream(&self, writer: &mut impl Write) -> Result<(), DecodeError> {
        writer
            .write_all(&self.pack())
            .map_err(|_| DecodeError::TruncatedStream)
    }

    /// Lowercase hex encoding of [`Self::pack`]'s output.
    pub fn to_hex(&self) -> String {
        let bytes = self.pack();
        let mut s = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            s.push_str(&format!("{byte:02x}"));
        }
        s
    }
}

impl<const D: usize, const N: u32, const C: u64> std::ops::Add for FieldElement<D, N, C> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        FieldElement::add(&self, &rhs)
    }
}

impl<const D: usize, const N: u32, const C: u64> std::ops::Sub for FieldElement<D, N, C> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        FieldElement::sub(&self, &rhs)
    }
}

impl<const D: usize, const N: u32, const C: u64> std::ops::Mul for FieldElement<D, N, C> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        FieldElement::mul(&self, &rhs)
    }
}

impl<const D: usize, const N: u32, const C: u64> std::ops::Neg for FieldElement<D, N, C> {
    type Output = Self;
    fn neg(self) -> Self {
        FieldElement::neg(&self)
    }
}

impl<const D: usize, const N: u32, const C: u64> PartialEq for FieldElement<D, N, C> {
    fn eq(&self, other: &Self) -> bool {
        FieldElement::eq(self, other)
    }
}

impl<const D: usize, const N: u32, const C: u64> std::fmt::Debug for FieldElement<D, N, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FieldElement").field(&self.to_hex()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::instances::Field222x117 as F;

    #[test]
    fn destroy_sets_every_limb_to_all_ones() {
        let mut x = F::from_i64(12345);
        x.destroy();
        assert!(x.0.iter().all(|&limb| limb == -1i64));
    }

    #[test]
    fn ladder_decomposition_reconstructs_the_exponent() {
        // p - 2, as (leading_ones, low_bits, low_bits_len): rebuild the
        // exponent from the decomposition and compare against a direct
        // bit-by-bit construction.
        let exp = decompose(222, 117 + 2);
        let reconstructed: u128 = ((1u128 << exp.leading_ones) - 1) << exp.low_bits_len
            | exp.low_bits as u128;
        let expected = (1u128 << 222) - (117 + 2);
        assert_eq!(reconstructed, expected);
    }

    #[test]
    fn zero_and_one_round_trip_through_pack() {
        assert_eq!(F::ZERO.pack(), vec![0u8; F::PACKED_BYTES]);
        let mut expected_one = vec![0u8; F::PACKED_BYTES];
        expected_one[0] = 1;
        assert_eq!(F::ONE.pack(), expected_one);
    }

    #[test]
    fn inverse_of_zero_is_zero() {
        assert!(F::ZERO.inv().eq(&F::ZERO));
    }

    #[test]
    fn small_scalar_ops_match_full_element_ops() {
        let a = F::from_i64(41);
        let b = F::from_i64(7);
        assert!(a.add_small(7).eq(&a.add(&b)));
        assert!(a.sub_small(7).eq(&a.sub(&b)));
        assert!(a.mul_small(7).eq(&a.mul(&b)));
        assert!(a.div_small(7).eq(&a.div(&b)));
    }

    #[test]
    fn abs_has_even_sign() {
        let a = F::from_i64(13).sub(&F::from_i64(40)); // negative, loose
        let canon = a.abs();
        assert_eq!(canon.sign(), 0);
    }
}
