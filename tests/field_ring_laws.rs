//! Property tests for the algebraic laws and invariants the field engine
//! must hold for every instantiation — exercised here against the
//! 2^222 - 117 and 2^255 - 19 fields as representative samples of the
//! `p ≡ 3 (mod 4)` and `p ≡ 5 (mod 8)` square-root branches.

use proptest::prelude::*;

use pmersenne_field::field::instances::{Field222x117, Field255x19};

macro_rules! field_law_tests {
    ($mod_name:ident, $field:ty, $packed_bytes:expr) => {
        mod $mod_name {
            use super::*;

            fn arb_element() -> impl Strategy<Value = $field> {
                proptest::collection::vec(any::<u8>(), $packed_bytes)
                    .prop_map(|bytes| <$field>::unpack(&bytes).unwrap())
            }

            proptest! {
                #[test]
                fn closure_under_normalization(x in arb_element()) {
                    let mut n = x;
                    n.normalize();
                    let mut twice = n;
                    twice.normalize();
                    prop_assert!(twice.eq(&n));
                }

                #[test]
                fn add_is_commutative(a in arb_element(), b in arb_element()) {
                    prop_assert!(a.add(&b).eq(&b.add(&a)));
                }

                #[test]
                fn add_is_associative(a in arb_element(), b in arb_element(), c in arb_element()) {
                    let lhs = a.add(&b).add(&c);
                    let rhs = a.add(&b.add(&c));
                    prop_assert!(lhs.eq(&rhs));
                }

                #[test]
                fn mul_is_commutative(a in arb_element(), b in arb_element()) {
                    prop_assert!(a.mul(&b).eq(&b.mul(&a)));
                }

                #[test]
                fn mul_distributes_over_add(a in arb_element(), b in arb_element(), c in arb_element()) {
                    let lhs = a.mul(&b.add(&c));
                    let rhs = a.mul(&b).add(&a.mul(&c));
                    prop_assert!(lhs.eq(&rhs));
                }

                #[test]
                fn neg_is_zero_minus_x(a in arb_element()) {
                    prop_assert!(a.neg().eq(&<$field>::ZERO.sub(&a)));
                }

                #[test]
                fn sub_is_add_of_neg(a in arb_element(), b in arb_element()) {
                    prop_assert!(a.sub(&b).eq(&a.add(&b.neg())));
                }

                #[test]
                fn multiplicative_inverse(a in arb_element()) {
                    prop_assume!(!a.is_zero());
                    prop_assert!(a.mul(&a.inv()).eq(&<$field>::ONE));
                }

                #[test]
                fn square_root_of_a_square(a in arb_element()) {
                    prop_assume!(!a.is_zero());
                    let square = a.square();
                    prop_assert_eq!(square.legendre(), 1);
                    let root = square.sqrt();
                    prop_assert!(root.square().eq(&square));
                }

                #[test]
                fn inverse_square_root(a in arb_element()) {
                    prop_assume!(!a.is_zero());
                    let square = a.square();
                    let isr = square.inv_sqrt();
                    prop_assert!(square.mul(&isr.square()).eq(&<$field>::ONE));
                }

                #[test]
                fn legendre_of_a_square_is_one(a in arb_element()) {
                    prop_assume!(!a.is_zero());
                    prop_assert_eq!(a.mul(&a).legendre(), 1);
                }

                #[test]
                fn legendre_is_multiplicative(a in arb_element(), b in arb_element()) {
                    prop_assume!(!a.is_zero() && !b.is_zero());
                    prop_assert_eq!(a.legendre() * b.legendre(), a.mul(&b).legendre());
                }

                #[test]
                fn pack_unpack_round_trip(a in arb_element()) {
                    let mut n = a;
                    n.normalize();
                    let bytes = n.pack();
                    let back = <$field>::unpack(&bytes).unwrap();
                    prop_assert!(back.eq(&n));
                }

                #[test]
                fn alias_safety_add(a in arb_element()) {
                    let doubled_distinct = a.add(&a);
                    let mut aliased = a;
                    aliased = aliased.add(&aliased);
                    prop_assert!(doubled_distinct.eq(&aliased));
                }

                #[test]
                fn alias_safety_mul(a in arb_element()) {
                    let squared_distinct = a.mul(&a);
                    let mut aliased = a;
                    aliased = aliased.mul(&aliased);
                    prop_assert!(squared_distinct.eq(&aliased));
                }

            }
        }
    };
}

field_law_tests!(field_222x117, Field222x117, 28);
field_law_tests!(field_255x19, Field255x19, 32);
