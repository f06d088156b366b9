mod common;

use binfhe::lwe::LweCiphertext;
use binfhe::params::BlindRotationMethod;
use binfhe::{Bootstrapper, BootstrapContext, Error, KeyMaterial, Params};
use std::fs::File;
use std::io::BufWriter;

#[test]
fn key_pack_file_round_trip() {
    let params: Params = Params::test().with_method(BlindRotationMethod::Lmkcdey);
    let (sk, keys, mut source) = common::keys(&params, 41);
    let path = std::env::temp_dir().join(format!("binfhe-keypack-{}.bin", std::process::id()));
    {
        let mut writer: BufWriter<File> = BufWriter::new(File::create(&path).unwrap());
        keys.write_to(&mut writer).unwrap();
    }
    let loaded: KeyMaterial = KeyMaterial::read_from(&params, &mut File::open(&path).unwrap()).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, keys);

    let bootstrapper: Bootstrapper = Bootstrapper::new(&params).unwrap();
    let mut ctx: BootstrapContext = bootstrapper.context();
    for bit in [false, true] {
        let ct: LweCiphertext = sk.encrypt_bit(bit, &mut source);
        assert_eq!(sk.decrypt_bit(&bootstrapper.bootstrap(&loaded, &mut ctx, &ct).unwrap()).unwrap(), bit);
    }
}

#[test]
fn flipped_key_bit_is_detected() {
    let params: Params = Params::test();
    let (_, keys, _) = common::keys(&params, 42);
    let mut bytes: Vec<u8> = keys.to_key_pack();
    // First byte of the first section body.
    bytes[binfhe::keypack::HEADER_BYTES] ^= 0x80;
    assert!(matches!(
        KeyMaterial::from_key_pack(&params, &bytes),
        Err(Error::KeyPackCorrupt(_))
    ));
}
