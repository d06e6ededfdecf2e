//! Concrete field instantiations.
//!
//! Each alias fixes `(D, N, C)` for one pseudo-Mersenne prime `p = 2^N - C`;
//! every operation on it comes from the single generic
//! [`super::element::FieldElement`] rather than a hand-duplicated copy, the
//! way the design notes ask for. `D` is chosen as the smallest limb count
//! that keeps `DIGIT_BITS` comfortably under 64 with carry headroom to
//! spare; `LAYOUT_OK` below fails to compile if a `D` is ever miswired
//! against its `(N, C)`.
//!
//! The branch between the `p ≡ 3 (mod 4)` and `p ≡ 5 (mod 8)` square-root
//! ladders is selected by `C mod 4` (see `FieldElement::IS_3_MOD_4`), so
//! every `C` below was chosen to actually land in one of those two residue
//! classes — `C mod 8 == 3` for the fields using the `5 mod 8` ladder.

use super::element::FieldElement;

/// `p = 2^222 - 117`.
pub type Field222x117 = FieldElement<4, 222, 117>;

/// `p = 2^383 - 187`.
pub type Field383x187 = FieldElement<7, 383, 187>;

/// `p = 2^414 - 17`.
pub type Field414x17 = FieldElement<8, 414, 17>;

/// `p = 2^511 - 187`.
pub type Field511x187 = FieldElement<9, 511, 187>;

/// `p = 2^255 - 19` — the Curve25519 base field, included for scale
/// comparison against the teacher's fixed radix-2^25.5 implementation.
pub type Field255x19 = FieldElement<5, 255, 19>;

/// `p = 2^130 - 5` — the Poly1305 field.
pub type Field130x5 = FieldElement<3, 130, 5>;

const _CHECK_222X117: () = Field222x117::LAYOUT_OK;
const _CHECK_383X187: () = Field383x187::LAYOUT_OK;
const _CHECK_414X17: () = Field414x17::LAYOUT_OK;
const _CHECK_511X187: () = Field511x187::LAYOUT_OK;
const _CHECK_255X19: () = Field255x19::LAYOUT_OK;
const _CHECK_130X5: () = Field130x5::LAYOUT_OK;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_layout_matches_modulus_bit_width() {
        assert_eq!(
            (Field222x117::DIGIT_BITS as usize) * 3 + Field222x117::HIGH_DIGIT_BITS as usize,
            222
        );
        assert_eq!(
            (Field255x19::DIGIT_BITS as usize) * 4 + Field255x19::HIGH_DIGIT_BITS as usize,
            255
        );
        assert_eq!(
            (Field130x5::DIGIT_BITS as usize) * 2 + Field130x5::HIGH_DIGIT_BITS as usize,
            130
        );
    }

    #[test]
    fn packed_bytes_matches_ceil_n_over_8() {
        assert_eq!(Field222x117::PACKED_BYTES, 28);
        assert_eq!(Field255x19::PACKED_BYTES, 32);
        assert_eq!(Field130x5::PACKED_BYTES, 17);
    }
}
