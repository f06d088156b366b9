//! Key pack: evaluation keys in one little-endian blob.
//!
//! ```text
//! 0    magic u32 = "KEY2"     4   version u32 = 2
//! 8    endian u32 = 1         12  flags u32 (bit 0: automorphism keys present)
//! 16   4 x {len u64, offset u64, elem_bits u32, reserved u32}: brk, aut, ksk, pk
//! 112  checksum u64 (CRC32C of all section bytes, in section order)
//! 120  reserved
//! 128  sections, each 64-byte aligned and zero padded
//! ```
//! `len` counts elements of `elem_bits` bits.

use crate::arena::KeyArena;
use crate::blind_rotation::BlindRotationKey;
use crate::keys::KeyMaterial;
use crate::lwe::ciphertext::LweCiphertext;
use crate::lwe::keyswitch_key::LweKeySwitchKey;
use crate::lwe::public_key::PublicKey;
use crate::params::Params;
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use math::error::{Error, Result};
use math::ring::Ring;
use std::io::{Read, Write};

pub const MAGIC: u32 = 0x3259_454B;
pub const VERSION: u32 = 2;
pub const ENDIAN_LITTLE: u32 = 1;
pub const HEADER_BYTES: usize = 128;
pub const SECTION_ALIGN: usize = 64;
pub const FLAG_AUTOMORPHISM: u32 = 1;

const SECTIONS: usize = 4;
const CHECKSUM_AT: usize = 112;

/// One entry of the section table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Section {
    pub len: u64,
    pub offset: u64,
    pub elem_bits: u32,
}

impl Section {
    fn bytes(&self) -> Option<usize> {
        (self.len as usize).checked_mul(self.elem_bits as usize / 8)
    }
}

/// Smallest of 16, 32, 64 bits holding every word.
fn elem_bits(words: &[u64]) -> u32 {
    let max: u64 = words.iter().copied().max().unwrap_or(0);
    if max < 1 << 16 {
        16
    } else if max < 1 << 32 {
        32
    } else {
        64
    }
}

fn align(x: usize) -> usize {
    x.div_ceil(SECTION_ALIGN) * SECTION_ALIGN
}

fn public_key_words(pk: &PublicKey) -> Vec<u64> {
    let mut words: Vec<u64> = Vec::with_capacity(pk.rows().len() * (pk.n() + 1));
    for row in pk.rows() {
        words.extend_from_slice(row.a());
        words.push(row.b());
    }
    words
}

fn corrupt(msg: impl Into<String>) -> Error {
    let msg: String = msg.into();
    tracing::warn!(reason = %msg, "rejecting key pack");
    Error::KeyPackCorrupt(msg)
}

impl KeyMaterial {
    /// Serializes the evaluation keys as a key pack.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let empty: Vec<u64> = Vec::new();
        let pk: Vec<u64> = public_key_words(&self.public_key);
        let payloads: [&[u64]; SECTIONS] = [
            self.brk.brk().words(),
            self.brk.aut().map_or(&empty[..], |a| a.words()),
            self.ksk.words(),
            &pk,
        ];
        let mut sections: [Section; SECTIONS] = [Section::default(); SECTIONS];
        let mut cursor: usize = HEADER_BYTES;
        for (s, words) in sections.iter_mut().zip(payloads.iter()) {
            s.elem_bits = elem_bits(words);
            s.len = words.len() as u64;
            s.offset = cursor as u64;
            cursor = align(cursor + words.len() * s.elem_bits as usize / 8);
        }

        let mut body: Vec<u8> = Vec::with_capacity(cursor - HEADER_BYTES);
        let mut checksum: u32 = 0;
        for (s, words) in sections.iter().zip(payloads.iter()) {
            body.resize(s.offset as usize - HEADER_BYTES, 0);
            let start: usize = body.len();
            for w in words.iter() {
                match s.elem_bits {
                    16 => body.write_u16::<LittleEndian>(*w as u16)?,
                    32 => body.write_u32::<LittleEndian>(*w as u32)?,
                    _ => body.write_u64::<LittleEndian>(*w)?,
                }
            }
            checksum = crc32c::crc32c_append(checksum, &body[start..]);
        }
        body.resize(cursor - HEADER_BYTES, 0);

        let flags: u32 = if self.brk.aut().is_some() { FLAG_AUTOMORPHISM } else { 0 };
        writer.write_u32::<LittleEndian>(MAGIC)?;
        writer.write_u32::<LittleEndian>(VERSION)?;
        writer.write_u32::<LittleEndian>(ENDIAN_LITTLE)?;
        writer.write_u32::<LittleEndian>(flags)?;
        for s in sections.iter() {
            writer.write_u64::<LittleEndian>(s.len)?;
            writer.write_u64::<LittleEndian>(s.offset)?;
            writer.write_u32::<LittleEndian>(s.elem_bits)?;
            writer.write_u32::<LittleEndian>(0)?;
        }
        writer.write_u64::<LittleEndian>(checksum as u64)?;
        writer.write_u64::<LittleEndian>(0)?;
        writer.write_all(&body)
    }

    pub fn to_key_pack(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut bytes);
        bytes
    }

    /// Loads a key pack written for `params`. Header, layout and checksum
    /// failures are [Error::KeyPackCorrupt]; sections of the wrong size for
    /// `params` are [Error::ParameterMismatch].
    pub fn read_from<R: Read>(params: &Params, reader: &mut R) -> Result<Self> {
        let mut bytes: Vec<u8> = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| corrupt(format!("unreadable key pack: {}", e)))?;
        Self::from_key_pack(params, &bytes)
    }

    pub fn from_key_pack(params: &Params, bytes: &[u8]) -> Result<Self> {
        params.validate()?;
        let (flags, sections) = parse_header(bytes)?;

        let mut checksum: u32 = 0;
        for s in sections.iter() {
            let start: usize = s.offset as usize;
            checksum = crc32c::crc32c_append(checksum, &bytes[start..start + s.bytes().unwrap_or(0)]);
        }
        if checksum as u64 != LittleEndian::read_u64(&bytes[CHECKSUM_AT..]) {
            return Err(corrupt("checksum mismatch"));
        }
        if (flags & FLAG_AUTOMORPHISM != 0) != (sections[1].len != 0) {
            return Err(corrupt("automorphism flag disagrees with the section table"));
        }

        let words: Vec<Vec<u64>> = sections.iter().map(|s| read_section(bytes, s)).collect();
        let ring: Ring = Ring::from_params(&params.ring)?;
        let (brk_layout, aut_layout) = BlindRotationKey::layouts(params);
        let ksk_words: usize =
            params.extracted_dimension() * params.key_switch.gadget.digits * (params.lwe.n + 1);
        let pk_words: usize = params.public_key_rows * (params.lwe.n + 1);
        let expected: [usize; SECTIONS] = [
            brk_layout.words(),
            aut_layout.map_or(0, |l| l.words()),
            ksk_words,
            pk_words,
        ];
        for (i, (w, e)) in words.iter().zip(expected.iter()).enumerate() {
            if w.len() != *e {
                return Err(Error::ParameterMismatch(format!(
                    "key pack section {} holds {} words, the parameter set needs {}",
                    i,
                    w.len(),
                    e
                )));
            }
        }

        let n: usize = params.ring.degree;
        let channels: usize = ring.channels();
        let residues_ok = |w: &[u64]| {
            w.iter()
                .enumerate()
                .all(|(i, x)| *x < ring.basis().prime((i / n) % channels).q)
        };
        if !residues_ok(&words[0]) || !residues_ok(&words[1]) {
            return Err(corrupt("key arena holds unreduced residues"));
        }
        if words[2].iter().any(|x| *x >= ring.q()) {
            return Err(corrupt("key-switching key holds unreduced values"));
        }

        let brk: KeyArena = KeyArena::from_words(brk_layout, &words[0])?;
        let aut: Option<KeyArena> = match aut_layout {
            Some(layout) => Some(KeyArena::from_words(layout, &words[1])?),
            None => None,
        };
        let brk: BlindRotationKey = BlindRotationKey::from_arenas(params, brk, aut)?;
        let ksk: LweKeySwitchKey = LweKeySwitchKey::from_words(
            words[2].clone(),
            params.extracted_dimension(),
            params.lwe.n,
            params.key_switch.gadget,
            ring.q(),
        )?;
        let rows: Vec<LweCiphertext> = words[3]
            .chunks_exact(params.lwe.n + 1)
            .map(|row| {
                LweCiphertext::from_parts(row[..params.lwe.n].to_vec(), row[params.lwe.n], params.lwe.q)
                    .map_err(|_| corrupt("public key holds unreduced values"))
            })
            .collect::<Result<_>>()?;
        let public_key: PublicKey = PublicKey::from_rows(rows, params.lwe.n, params.lwe.q)?;
        tracing::debug!(bytes = bytes.len(), "key pack loaded");
        KeyMaterial::from_parts(params, brk, ksk, public_key)
    }
}

fn parse_header(bytes: &[u8]) -> Result<(u32, [Section; SECTIONS])> {
    if bytes.len() < HEADER_BYTES {
        return Err(corrupt(format!("{} bytes is shorter than the header", bytes.len())));
    }
    let mut header: &[u8] = &bytes[..HEADER_BYTES];
    let read = |e: std::io::Error| corrupt(format!("truncated header: {}", e));
    let magic: u32 = header.read_u32::<LittleEndian>().map_err(read)?;
    let version: u32 = header.read_u32::<LittleEndian>().map_err(read)?;
    let endian: u32 = header.read_u32::<LittleEndian>().map_err(read)?;
    let flags: u32 = header.read_u32::<LittleEndian>().map_err(read)?;
    if magic != MAGIC {
        return Err(corrupt(format!("bad magic {:#x}", magic)));
    }
    if version != VERSION {
        return Err(corrupt(format!("unsupported version {}", version)));
    }
    if endian != ENDIAN_LITTLE {
        return Err(corrupt(format!("unsupported endian tag {}", endian)));
    }
    let mut sections: [Section; SECTIONS] = [Section::default(); SECTIONS];
    let mut end: usize = HEADER_BYTES;
    for s in sections.iter_mut() {
        s.len = header.read_u64::<LittleEndian>().map_err(read)?;
        s.offset = header.read_u64::<LittleEndian>().map_err(read)?;
        s.elem_bits = header.read_u32::<LittleEndian>().map_err(read)?;
        header.read_u32::<LittleEndian>().map_err(read)?;
        if !matches!(s.elem_bits, 16 | 32 | 64) {
            return Err(corrupt(format!("element width {} bits", s.elem_bits)));
        }
        let offset: usize = usize::try_from(s.offset).map_err(|_| corrupt("offset overflows"))?;
        if offset % SECTION_ALIGN != 0 || offset < end {
            return Err(corrupt(format!("misplaced section at offset {}", offset)));
        }
        end = s
            .bytes()
            .and_then(|b| b.checked_add(offset))
            .filter(|e| *e <= bytes.len())
            .ok_or_else(|| corrupt(format!("section at {} runs past the end", offset)))?;
    }
    Ok((flags, sections))
}

fn read_section(bytes: &[u8], s: &Section) -> Vec<u64> {
    let start: usize = s.offset as usize;
    let data: &[u8] = &bytes[start..start + s.bytes().unwrap_or(0)];
    match s.elem_bits {
        16 => data.chunks_exact(2).map(|c| LittleEndian::read_u16(c) as u64).collect(),
        32 => data.chunks_exact(4).map(|c| LittleEndian::read_u32(c) as u64).collect(),
        _ => data.chunks_exact(8).map(LittleEndian::read_u64).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{HEADER_BYTES, MAGIC};
    use crate::blind_rotation::tests::small_params;
    use crate::keys::KeyMaterial;
    use crate::params::{BlindRotationMethod, Params, SecretKind};
    use byteorder::{ByteOrder, LittleEndian};
    use math::error::Error;
    use sampling::source::Source;

    fn pack(method: BlindRotationMethod) -> (Params, KeyMaterial, Vec<u8>) {
        let params: Params = small_params(method, SecretKind::Binary);
        let mut source: Source = Source::new([51u8; 32]);
        let (_, keys) = KeyMaterial::generate(&params, &mut source).unwrap();
        let bytes: Vec<u8> = keys.to_key_pack();
        (params, keys, bytes)
    }

    #[test]
    fn header_layout_is_fixed() {
        let (_, _, bytes) = pack(BlindRotationMethod::Lmkcdey);
        assert_eq!(LittleEndian::read_u32(&bytes[0..]), MAGIC);
        assert_eq!(&bytes[0..4], b"KEY2");
        assert_eq!(LittleEndian::read_u32(&bytes[4..]), 2);
        assert_eq!(LittleEndian::read_u32(&bytes[12..]), 1);
        let brk_offset: u64 = LittleEndian::read_u64(&bytes[24..]);
        assert_eq!(brk_offset, HEADER_BYTES as u64);
        // 25-bit primes fit in 32-bit elements, Q does not.
        assert_eq!(LittleEndian::read_u32(&bytes[32..]), 32);
        assert_eq!(LittleEndian::read_u32(&bytes[16 + 2 * 24 + 16..]), 64);
        for i in 0..4 {
            assert_eq!(LittleEndian::read_u64(&bytes[16 + i * 24 + 8..]) % 64, 0);
        }
    }

    #[test]
    fn packs_load_back() {
        for method in [BlindRotationMethod::Ginx, BlindRotationMethod::Lmkcdey] {
            let (params, keys, bytes) = pack(method);
            let loaded: KeyMaterial = KeyMaterial::read_from(&params, &mut &bytes[..]).unwrap();
            assert_eq!(loaded, keys);
        }
    }

    #[test]
    fn corruption_is_detected() {
        let (params, _, bytes) = pack(BlindRotationMethod::Ginx);

        let mut flipped: Vec<u8> = bytes.clone();
        let last: usize = flipped.len() - 200;
        flipped[last] ^= 1;
        assert!(matches!(
            KeyMaterial::from_key_pack(&params, &flipped),
            Err(Error::KeyPackCorrupt(_))
        ));

        let mut bad_magic: Vec<u8> = bytes.clone();
        bad_magic[0] = 0;
        assert!(matches!(
            KeyMaterial::from_key_pack(&params, &bad_magic),
            Err(Error::KeyPackCorrupt(_))
        ));

        let mut bad_width: Vec<u8> = bytes.clone();
        LittleEndian::write_u32(&mut bad_width[32..], 24);
        assert!(matches!(
            KeyMaterial::from_key_pack(&params, &bad_width),
            Err(Error::KeyPackCorrupt(_))
        ));

        assert!(matches!(
            KeyMaterial::from_key_pack(&params, &bytes[..bytes.len() / 2]),
            Err(Error::KeyPackCorrupt(_))
        ));
        assert!(matches!(
            KeyMaterial::from_key_pack(&params, &bytes[..10]),
            Err(Error::KeyPackCorrupt(_))
        ));
    }

    #[test]
    fn packs_for_other_parameters_are_rejected() {
        let (params, _, bytes) = pack(BlindRotationMethod::Ginx);
        let mut other: Params = params;
        other.public_key_rows += 1;
        assert!(matches!(
            KeyMaterial::from_key_pack(&other, &bytes),
            Err(Error::ParameterMismatch(_))
        ));
    }
}
