//! Fixed-layout ciphertext buffer of u64 words:
//! word 0 holds the bit width, word 1 the payload word count, words 2..16 are
//! zero and words 16.. carry the payload, zero padded or truncated to the
//! declared count. The payload is one LWE ciphertext per message bit, least
//! significant first, each `n + 1` words (a then b).

use crate::keys::SecretKey;
use crate::lwe::ciphertext::LweCiphertext;
use crate::lwe::public_key::PublicKey;
use byteorder::{ByteOrder, LittleEndian};
use math::error::{Error, Result};
use sampling::source::Source;

pub const METADATA_WORDS: usize = 16;

pub fn encode_buffer(bit_width: u64, payload: &[u64], payload_words: usize) -> Vec<u64> {
    let mut buf: Vec<u64> = vec![0; METADATA_WORDS + payload_words];
    buf[0] = bit_width;
    buf[1] = payload_words as u64;
    let copied: usize = payload.len().min(payload_words);
    buf[METADATA_WORDS..METADATA_WORDS + copied].copy_from_slice(&payload[..copied]);
    buf
}

/// Returns the bit width and the declared payload.
pub fn decode_buffer(buf: &[u64]) -> Result<(u64, &[u64])> {
    if buf.len() < METADATA_WORDS {
        return Err(Error::ParameterMismatch(format!(
            "{} words cannot hold the {}-word metadata",
            buf.len(),
            METADATA_WORDS
        )));
    }
    let payload_words: usize = usize::try_from(buf[1])
        .ok()
        .filter(|w| METADATA_WORDS.checked_add(*w).is_some_and(|end| end <= buf.len()))
        .ok_or_else(|| {
            Error::ParameterMismatch(format!(
                "buffer declares {} payload words but holds {}",
                buf[1],
                buf.len() - METADATA_WORDS
            ))
        })?;
    Ok((buf[0], &buf[METADATA_WORDS..METADATA_WORDS + payload_words]))
}

/// Public-key encryption of the low `bit_width` bits of `msg`.
pub fn encrypt_to_buffer(pk: &PublicKey, msg: u64, bit_width: usize, source: &mut Source) -> Result<Vec<u64>> {
    if bit_width == 0 || bit_width > 64 {
        return Err(Error::RangeError(format!("bit width {} is not in 1..=64", bit_width)));
    }
    let mut payload: Vec<u64> = Vec::with_capacity(bit_width * (pk.n() + 1));
    for i in 0..bit_width {
        let ct: LweCiphertext = pk.encrypt_bit((msg >> i) & 1 == 1, source);
        payload.extend_from_slice(ct.a());
        payload.push(ct.b());
    }
    let words: usize = payload.len();
    Ok(encode_buffer(bit_width as u64, &payload, words))
}

pub fn decrypt_buffer(sk: &SecretKey, buf: &[u64]) -> Result<u64> {
    let (bit_width, payload) = decode_buffer(buf)?;
    let lwe = &sk.params().lwe;
    let stride: usize = lwe.n + 1;
    if bit_width == 0 || bit_width > 64 || payload.len() != bit_width as usize * stride {
        return Err(Error::ParameterMismatch(format!(
            "{} payload words for {} bits of dimension {}",
            payload.len(),
            bit_width,
            lwe.n
        )));
    }
    let mut msg: u64 = 0;
    for (i, chunk) in payload.chunks_exact(stride).enumerate() {
        let ct: LweCiphertext = LweCiphertext::from_parts(chunk[..lwe.n].to_vec(), chunk[lwe.n], lwe.q)?;
        msg |= (sk.decrypt_bit(&ct)? as u64) << i;
    }
    Ok(msg)
}

/// Little-endian bytes of a buffer.
pub fn to_bytes(buf: &[u64]) -> Vec<u8> {
    let mut bytes: Vec<u8> = vec![0; buf.len() * 8];
    LittleEndian::write_u64_into(buf, &mut bytes);
    bytes
}

pub fn from_bytes(bytes: &[u8]) -> Result<Vec<u64>> {
    if bytes.len() % 8 != 0 {
        return Err(Error::ParameterMismatch(format!(
            "{} bytes is not a whole number of words",
            bytes.len()
        )));
    }
    let mut buf: Vec<u64> = vec![0; bytes.len() / 8];
    LittleEndian::read_u64_into(bytes, &mut buf);
    Ok(buf)
}
