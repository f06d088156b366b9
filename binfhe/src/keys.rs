use crate::blind_rotation::BlindRotationKey;
use crate::concurrency::alloc::Allocator;
use crate::lwe::ciphertext::LweCiphertext;
use crate::lwe::keyswitch_key::LweKeySwitchKey;
use crate::lwe::public_key::PublicKey;
use crate::lwe::secret::LweSecret;
use crate::params::{Params, SecretKind};
use crate::rlwe::secret::RlweSecret;
use math::error::{Error, Result};
use math::gadget::GadgetParams;
use math::modulus::prime::Modulus;
use math::ring::Ring;
use sampling::distributions::Distribution;
use sampling::source::Source;

/// Secret LWE key of dimension `dim`.
pub fn generate_secret_key(dim: usize, kind: SecretKind, source: &mut Source) -> LweSecret {
    LweSecret::generate(dim, kind, source)
}

pub fn generate_bootstrap_key(
    lwe: &LweSecret,
    rlwe: &RlweSecret,
    ring: &Ring,
    params: &Params,
    source: &mut Source,
) -> Result<BlindRotationKey> {
    BlindRotationKey::generate(ring, lwe, rlwe, params, source)
}

/// Key switching `from` (signed coefficients) to `to` at `modulus`.
pub fn generate_keyswitch_key(
    from: &[i64],
    to: &LweSecret,
    gadget: &GadgetParams,
    modulus: &Modulus<u64>,
    sigma: f64,
    source: &mut Source,
) -> Result<LweKeySwitchKey> {
    LweKeySwitchKey::generate(from, to, gadget, modulus, sigma, source)
}

/// Client-side secrets.
#[derive(Clone, Debug)]
pub struct SecretKey {
    pub(crate) params: Params,
    pub(crate) lwe: LweSecret,
    pub(crate) rlwe: RlweSecret,
}

impl SecretKey {
    pub fn generate(params: &Params, source: &mut Source) -> Result<Self> {
        params.validate()?;
        let ring: Ring = Ring::from_params(&params.ring)?;
        Self::generate_with(params, &ring, source)
    }

    fn generate_with(params: &Params, ring: &Ring, source: &mut Source) -> Result<Self> {
        Ok(Self {
            params: *params,
            lwe: generate_secret_key(params.lwe.n, params.lwe.secret, source),
            rlwe: RlweSecret::generate(ring, params.blind_rotation.rank, Distribution::Ternary, source)?,
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn lwe(&self) -> &LweSecret {
        &self.lwe
    }

    pub fn rlwe(&self) -> &RlweSecret {
        &self.rlwe
    }

    pub fn encrypt_bit(&self, bit: bool, source: &mut Source) -> LweCiphertext {
        self.lwe
            .encrypt_bit(bit, self.params.lwe.q, self.params.lwe.sigma, source)
    }

    pub fn decrypt_bit(&self, ct: &LweCiphertext) -> Result<bool> {
        self.lwe.decrypt_bit(ct)
    }

    pub fn encrypt_message(&self, m: u64, t: u64, source: &mut Source) -> Result<LweCiphertext> {
        self.lwe
            .encrypt_message(m, t, self.params.lwe.q, self.params.lwe.sigma, source)
    }

    pub fn decrypt_message(&self, ct: &LweCiphertext, t: u64) -> Result<u64> {
        self.lwe.decrypt_message(ct, t)
    }
}

/// Evaluation keys: everything a server needs to compute on ciphertexts.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyMaterial {
    pub(crate) params: Params,
    pub(crate) brk: BlindRotationKey,
    pub(crate) ksk: LweKeySwitchKey,
    pub(crate) public_key: PublicKey,
}

impl KeyMaterial {
    /// Samples a fresh secret key and the matching evaluation keys.
    pub fn generate(params: &Params, source: &mut Source) -> Result<(SecretKey, KeyMaterial)> {
        params.validate()?;
        let ring: Ring = Ring::from_params(&params.ring)?;
        let sk: SecretKey = SecretKey::generate_with(params, &ring, source)?;
        let keys: KeyMaterial = Self::derive(params, &ring, &sk, source)?;
        Ok((sk, keys))
    }

    /// Evaluation keys for an existing secret key.
    pub fn derive(params: &Params, ring: &Ring, sk: &SecretKey, source: &mut Source) -> Result<Self> {
        let span = tracing::debug_span!("keygen", n = params.lwe.n, degree = params.ring.degree);
        let _enter = span.enter();
        let brk: BlindRotationKey = generate_bootstrap_key(&sk.lwe, &sk.rlwe, ring, params, source)?;
        let ksk: LweKeySwitchKey = generate_keyswitch_key(
            &sk.rlwe.extracted(),
            &sk.lwe,
            &params.key_switch.gadget,
            ring.basis().modulus(),
            params.key_switch.sigma,
            source,
        )?;
        let public_key: PublicKey = PublicKey::generate(&sk.lwe, &params.lwe, params.public_key_rows, source);
        tracing::debug!(
            brk_words = brk.brk().words().len(),
            aut_words = brk.aut().map(|a| a.words().len()).unwrap_or(0),
            ksk_words = ksk.words().len(),
            "evaluation keys ready"
        );
        Ok(Self {
            params: *params,
            brk,
            ksk,
            public_key,
        })
    }

    /// Assembles keys read back from storage, checking every shape.
    pub fn from_parts(
        params: &Params,
        brk: BlindRotationKey,
        ksk: LweKeySwitchKey,
        public_key: PublicKey,
    ) -> Result<Self> {
        let keys: KeyMaterial = Self {
            params: *params,
            brk,
            ksk,
            public_key,
        };
        keys.check(params)?;
        Ok(keys)
    }

    /// Fails with ParameterMismatch unless the keys were built for `params`.
    pub fn check(&self, params: &Params) -> Result<()> {
        let ring_q: u64 = Ring::from_params(&params.ring)?.q();
        let (brk_layout, aut_layout) = BlindRotationKey::layouts(params);
        let ok: bool = self.brk.n_lwe() == params.lwe.n
            && self.brk.method() == params.blind_rotation.method
            && *self.brk.brk().layout() == brk_layout
            && self.brk.aut().map(|a| *a.layout()) == aut_layout
            && self.ksk.n_in() == params.extracted_dimension()
            && self.ksk.n_out() == params.lwe.n
            && self.ksk.q() == ring_q
            && *self.ksk.gadget() == params.key_switch.gadget
            && self.public_key.n() == params.lwe.n
            && self.public_key.q() == params.lwe.q;
        if !ok {
            return Err(Error::ParameterMismatch(
                "key material does not match the parameter set".into(),
            ));
        }
        Ok(())
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn brk(&self) -> &BlindRotationKey {
        &self.brk
    }

    pub fn ksk(&self) -> &LweKeySwitchKey {
        &self.ksk
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Deep copy of the blind-rotation arenas on memory domain `node`; the
    /// key-switching and public keys are shared by value.
    pub fn replicate(&self, alloc: &dyn Allocator, node: usize) -> Result<Self> {
        Ok(Self {
            params: self.params,
            brk: self.brk.replicate(alloc, node)?,
            ksk: self.ksk.clone(),
            public_key: self.public_key.clone(),
        })
    }
}
