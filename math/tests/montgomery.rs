use math::modulus::prime::Prime;
use math::modulus::{ModularArith, ONCE};
use sampling::source::Source;

#[test]
fn montgomery_and_barrett_products_agree() {
    let mut source: Source = Source::new([2u8; 32]);
    for q in [12289u64, 0x3ffffffffffffu64 - 0x1ffe, (1 << 61) - 1] {
        if let Ok(prime) = Prime::new(q) {
            for _ in 0..2000 {
                let a: u64 = source.next_mod(q);
                let b: u64 = source.next_mod(q);
                let want: u64 = ((a as u128 * b as u128) % q as u128) as u64;
                assert_eq!(prime.mul_barrett(a, b), want);
                let a_mont: u64 = prime.to_montgomery(a);
                assert_eq!(prime.montgomery.mul_external::<ONCE>(a_mont, b), want);
                assert_eq!(prime.from_montgomery(a_mont), a);
            }
        }
    }
}

#[test]
fn centered_lift_is_symmetric() {
    let prime: Prime<u64> = Prime::new(12289).unwrap();
    assert_eq!(prime.center(0), 0);
    assert_eq!(prime.center(6144), 6144);
    assert_eq!(prime.center(6145), -6144);
    assert_eq!(prime.center(12288), -1);
    assert_eq!(prime.from_signed(-1), 12288);
}
