//! Concrete end-to-end scenarios against the 2^222 - 117 field.

use pmersenne_field::field::instances::Field222x117 as F;
use pmersenne_field::rng::Csprng;

#[test]
fn s1_zero_bytes_unpack_to_zero() {
    let bytes = [0u8; 28];
    let x = F::unpack(&bytes).unwrap();

    assert!(x.eq(&F::ZERO));
    assert!(x.is_zero());
    assert_eq!(x.pack(), vec![0u8; 28]);
}

#[test]
fn s2_p_minus_one_is_a_non_residue_and_adds_to_zero() {
    let mut bytes = [0xffu8; 28];
    bytes[0] = 0x8a;
    bytes[27] = 0x3f;

    let x = F::unpack(&bytes).unwrap();

    // p ≡ 3 (mod 4) for this field, so -1 is a non-residue.
    assert_eq!(x.legendre(), -1);

    let mut y = x.add_small(1);
    y.normalize();
    assert!(y.eq(&F::ZERO));
}

#[test]
fn s3_four_is_square_of_two() {
    let two = F::from_i64(2);
    let four = two.mul(&two);

    assert!(four.eq(&two.square()));

    let four_inv = four.inv();
    assert!(four_inv.mul(&four).eq(&F::ONE));

    let root = four.sqrt();
    assert!(root.mul(&root).eq(&four));
}

#[test]
fn s4_three_sqrt_or_negated_three_is_a_residue() {
    let three = F::from_i64(3);
    let sign = three.legendre();

    if sign == 1 {
        let root = three.sqrt();
        assert!(root.square().eq(&three));
    } else {
        let neg_three = F::ZERO.sub(&three);
        assert_eq!(neg_three.legendre(), -sign);
    }
}

#[test]
fn s5_out_of_range_encoding_normalizes_below_p() {
    let mut bytes = [0xffu8; 28];
    bytes[0] = 0x8c;

    let mut x = F::unpack(&bytes).unwrap();
    let loose_pack = x.pack(); // pack() normalizes a copy internally.
    x.normalize();
    let canonical_pack = x.pack();

    assert_eq!(loose_pack, canonical_pack);

    // normalize is idempotent.
    let mut twice = x;
    twice.normalize();
    assert!(twice.eq(&x));
}

#[test]
fn s6_random_element_inverse_round_trips() {
    let mut rng = Csprng::from_seed([7u8; 32]);
    let mut r = F::random(&mut rng);
    if r.is_zero() {
        r = r.add_small(1);
    }

    let s = r.inv();
    let t = r.mul(&s);

    assert!(t.eq(&F::ONE));
}
