mod common;

use binfhe::lwe::LweCiphertext;
use binfhe::Params;

#[test]
fn ten_thousand_bits_round_trip() {
    let params: Params = Params::standard();
    let (sk, keys, mut source) = common::keys(&params, 1);
    for i in 0..10_000u32 {
        let bit: bool = source.next_bit();
        let ct: LweCiphertext = sk.encrypt_bit(bit, &mut source);
        assert_eq!(sk.decrypt_bit(&ct).unwrap(), bit, "trial {}", i);
    }
    for i in 0..1_000u32 {
        let bit: bool = source.next_bit();
        let ct: LweCiphertext = keys.public_key().encrypt_bit(bit, &mut source);
        assert_eq!(sk.decrypt_bit(&ct).unwrap(), bit, "public trial {}", i);
    }
}

#[test]
fn small_messages_round_trip() {
    let params: Params = Params::test();
    let (sk, _, mut source) = common::keys(&params, 2);
    for m in 0..4u64 {
        let ct: LweCiphertext = sk.encrypt_message(m, 4, &mut source).unwrap();
        assert_eq!(sk.decrypt_message(&ct, 4).unwrap(), m);
    }
}
