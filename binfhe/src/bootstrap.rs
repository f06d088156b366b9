use crate::arena::ArenaLayout;
use crate::blind_rotation::lmkcdey::GENERATOR;
use crate::blind_rotation::test_vector::sign_test_vector;
use crate::blind_rotation::{
    blind_rotate, switch_to_2n, switch_to_odd, BlindRotationKey, BlindRotationScratch, LmkcdeyTables,
};
use crate::keys::KeyMaterial;
use crate::lwe::ciphertext::LweCiphertext;
use crate::params::{BlindRotationMethod, Params};
use crate::rlwe::ciphertext::RlweCiphertext;
use math::error::{Error, Result};
use math::poly::Poly;
use math::ring::Ring;

/// Stages of one bootstrap, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapState {
    Initialized,
    ModSwitched,
    /// Blind rotation in progress.
    Accumulating,
    Extracted,
    KeySwitched,
    Done,
}

/// Per-thread buffers of [Bootstrapper::bootstrap]. Never shared between
/// concurrent bootstraps.
#[derive(Clone, Debug)]
pub struct BootstrapContext {
    state: BootstrapState,
    rotations: Vec<usize>,
    acc: RlweCiphertext,
    seed: Poly<u64>,
    scratch: BlindRotationScratch,
    extracted: LweCiphertext,
    switched: LweCiphertext,
}

impl BootstrapContext {
    pub fn state(&self) -> BootstrapState {
        self.state
    }

    fn advance(&mut self, state: BootstrapState) {
        tracing::trace!(from = ?self.state, to = ?state, "bootstrap");
        self.state = state;
    }
}

/// Precomputed, read-only state of bootstrapping for one parameter set.
#[derive(Clone, Debug)]
pub struct Bootstrapper {
    params: Params,
    ring: Ring,
    test_vector: Poly<u64>,
    lmkcdey: Option<LmkcdeyTables>,
    brk_layout: ArenaLayout,
    aut_layout: Option<ArenaLayout>,
}

impl Bootstrapper {
    pub fn new(params: &Params) -> Result<Self> {
        params.validate()?;
        let ring: Ring = Ring::from_params(&params.ring)?;
        let test_vector: Poly<u64> = sign_test_vector(&ring)?;
        let lmkcdey: Option<LmkcdeyTables> = match params.blind_rotation.method {
            BlindRotationMethod::Ginx => None,
            BlindRotationMethod::Lmkcdey => Some(LmkcdeyTables::new(ring.n(), params.blind_rotation.window)?),
        };
        tracing::debug!(
            method = ?params.blind_rotation.method,
            n = params.lwe.n,
            degree = ring.n(),
            log_q = ring.basis().log_q(),
            "bootstrapper ready"
        );
        let (brk_layout, aut_layout) = BlindRotationKey::layouts(params);
        Ok(Self {
            params: *params,
            ring,
            test_vector,
            lmkcdey,
            brk_layout,
            aut_layout,
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    /// Fresh scratch for one worker.
    pub fn context(&self) -> BootstrapContext {
        let rank: usize = self.params.blind_rotation.rank;
        BootstrapContext {
            state: BootstrapState::Initialized,
            rotations: vec![0; self.params.lwe.n],
            acc: RlweCiphertext::new(&self.ring, rank),
            seed: self.ring.new_poly(),
            scratch: BlindRotationScratch::new(&self.ring, &self.params),
            extracted: LweCiphertext::new(self.params.extracted_dimension(), self.ring.q()),
            switched: LweCiphertext::new(self.params.lwe.n, self.ring.q()),
        }
    }

    /// Refreshes an encrypted bit: `ct` decrypting to m yields a fresh
    /// encryption of m with noise independent of the input.
    pub fn bootstrap(
        &self,
        keys: &KeyMaterial,
        ctx: &mut BootstrapContext,
        ct: &LweCiphertext,
    ) -> Result<LweCiphertext> {
        self.check_ciphertext(ct)?;
        let mut shifted: LweCiphertext = ct.clone();
        shifted.add_constant(-((self.params.lwe.q / 8) as i64));
        self.sign_bootstrap(keys, ctx, &shifted)
    }

    /// Sign bootstrap: returns a fresh encryption of q/4 when the phase of
    /// `ct` lies in [0, q/2) and of 0 otherwise. Gates fold their offset
    /// into `ct` before calling this.
    pub(crate) fn sign_bootstrap(
        &self,
        keys: &KeyMaterial,
        ctx: &mut BootstrapContext,
        ct: &LweCiphertext,
    ) -> Result<LweCiphertext> {
        self.check_ciphertext(ct)?;
        self.check_keys(keys)?;
        let lwe = &self.params.lwe;
        ctx.state = BootstrapState::Initialized;
        let n: usize = self.ring.n();
        let two_n: usize = 2 * n;

        let b: usize = switch_to_2n(ct.b(), lwe.q, n);
        match self.params.blind_rotation.method {
            BlindRotationMethod::Ginx => ctx
                .rotations
                .iter_mut()
                .zip(ct.a())
                .for_each(|(r, a)| *r = switch_to_2n(*a, lwe.q, n)),
            BlindRotationMethod::Lmkcdey => ctx
                .rotations
                .iter_mut()
                .zip(ct.a())
                .for_each(|(r, a)| *r = switch_to_odd(*a, lwe.q, n)),
        }
        ctx.advance(BootstrapState::ModSwitched);

        // ACC = f * X^-b, pre-twisted by psi_{-g} for LMKCDEY.
        for p in ctx.acc.polys.iter_mut() {
            p.zero();
            p.set_flags(false, false);
        }
        match &self.lmkcdey {
            None => self
                .ring
                .mul_monomial(&self.test_vector, two_n - b, &mut ctx.acc.polys[0])?,
            Some(_) => {
                self.ring.mul_monomial(&self.test_vector, two_n - b, &mut ctx.seed)?;
                self.ring
                    .automorphism(&ctx.seed, two_n - GENERATOR, &mut ctx.acc.polys[0])?;
            }
        }
        ctx.advance(BootstrapState::Accumulating);
        blind_rotate(
            &self.ring,
            keys.brk(),
            self.lmkcdey.as_ref(),
            &ctx.rotations,
            &mut ctx.acc,
            &mut ctx.scratch,
        )?;

        ctx.acc.sample_extract(&self.ring, &mut ctx.extracted)?;
        ctx.advance(BootstrapState::Extracted);

        keys.ksk().keyswitch(&ctx.extracted, &mut ctx.switched)?;
        ctx.advance(BootstrapState::KeySwitched);

        let mut out: LweCiphertext = ctx.switched.mod_switch(lwe.q);
        out.add_constant((lwe.q / 8) as i64);
        ctx.advance(BootstrapState::Done);
        Ok(out)
    }

    fn check_ciphertext(&self, ct: &LweCiphertext) -> Result<()> {
        let lwe = &self.params.lwe;
        if ct.n() != lwe.n || ct.q() != lwe.q {
            return Err(Error::ParameterMismatch(format!(
                "bootstrapping (n={}, q={}) with parameters (n={}, q={})",
                ct.n(),
                ct.q(),
                lwe.n,
                lwe.q
            )));
        }
        Ok(())
    }

    /// Shape of the evaluation keys against the cached layouts, so a mismatch
    /// fails before the blind rotation starts.
    fn check_keys(&self, keys: &KeyMaterial) -> Result<()> {
        let brk: &BlindRotationKey = keys.brk();
        let ksk = keys.ksk();
        let ok: bool = brk.n_lwe() == self.params.lwe.n
            && brk.method() == self.params.blind_rotation.method
            && *brk.brk().layout() == self.brk_layout
            && brk.aut().map(|a| *a.layout()) == self.aut_layout
            && ksk.n_in() == self.params.extracted_dimension()
            && ksk.n_out() == self.params.lwe.n
            && ksk.q() == self.ring.q()
            && *ksk.gadget() == self.params.key_switch.gadget;
        if !ok {
            return Err(Error::ParameterMismatch(
                "key material was generated for another parameter set".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BootstrapContext, BootstrapState, Bootstrapper};
    use crate::blind_rotation::tests::small_params;
    use crate::keys::KeyMaterial;
    use crate::lwe::ciphertext::LweCiphertext;
    use crate::params::{BlindRotationMethod, Params, SecretKind};
    use math::error::Error;
    use sampling::source::Source;

    #[test]
    fn bootstrap_reads_the_sign_of_the_phase() {
        for (method, secret) in [
            (BlindRotationMethod::Ginx, SecretKind::Binary),
            (BlindRotationMethod::Ginx, SecretKind::Ternary),
            (BlindRotationMethod::Lmkcdey, SecretKind::Ternary),
        ] {
            let params: Params = small_params(method, secret);
            let mut source: Source = Source::new([21u8; 32]);
            let (sk, keys) = KeyMaterial::generate(&params, &mut source).unwrap();
            let bootstrapper: Bootstrapper = Bootstrapper::new(&params).unwrap();
            let mut ctx: BootstrapContext = bootstrapper.context();
            let q: u64 = params.lwe.q;
            for phase in [q / 8, 3 * q / 8, 5 * q / 8, 7 * q / 8] {
                let ct: LweCiphertext = sk.lwe().encrypt_phase(phase, q, params.lwe.sigma, &mut source);
                let out: LweCiphertext = bootstrapper.sign_bootstrap(&keys, &mut ctx, &ct).unwrap();
                assert_eq!(ctx.state(), BootstrapState::Done);
                assert_eq!(sk.decrypt_bit(&out).unwrap(), phase < q / 2, "{:?} {:?} {}", method, secret, phase);
            }
        }
    }

    #[test]
    fn encrypted_bits_refresh_to_themselves() {
        for (method, secret) in [
            (BlindRotationMethod::Ginx, SecretKind::Binary),
            (BlindRotationMethod::Ginx, SecretKind::Ternary),
            (BlindRotationMethod::Lmkcdey, SecretKind::Ternary),
        ] {
            let params: Params = small_params(method, secret);
            let mut source: Source = Source::new([23u8; 32]);
            let (sk, keys) = KeyMaterial::generate(&params, &mut source).unwrap();
            let bootstrapper: Bootstrapper = Bootstrapper::new(&params).unwrap();
            let mut ctx: BootstrapContext = bootstrapper.context();
            for i in 0..40 {
                let bit: bool = i % 2 == 1;
                let ct: LweCiphertext = sk.encrypt_bit(bit, &mut source);
                let out: LweCiphertext = bootstrapper.bootstrap(&keys, &mut ctx, &ct).unwrap();
                assert_eq!(sk.decrypt_bit(&out).unwrap(), bit, "{:?} {:?} trial {}", method, secret, i);
            }
        }
    }

    #[test]
    fn keys_for_another_ring_fail_before_rotation() {
        let params: Params = small_params(BlindRotationMethod::Ginx, SecretKind::Binary);
        let mut other: Params = params;
        other.ring.degree = 128;
        let mut source: Source = Source::new([24u8; 32]);
        let (_, keys) = KeyMaterial::generate(&params, &mut source).unwrap();
        let (other_sk, other_keys) = KeyMaterial::generate(&other, &mut source).unwrap();
        let bootstrapper: Bootstrapper = Bootstrapper::new(&other).unwrap();
        let mut ctx: BootstrapContext = bootstrapper.context();

        let ct: LweCiphertext = other_sk.encrypt_bit(true, &mut source);
        bootstrapper.bootstrap(&other_keys, &mut ctx, &ct).unwrap();
        assert_eq!(ctx.state(), BootstrapState::Done);
        assert!(matches!(
            bootstrapper.bootstrap(&keys, &mut ctx, &ct),
            Err(Error::ParameterMismatch(_))
        ));
        assert_eq!(ctx.state(), BootstrapState::Done);
    }

    #[test]
    fn mismatched_ciphertexts_are_rejected() {
        let params: Params = small_params(BlindRotationMethod::Ginx, SecretKind::Binary);
        let mut source: Source = Source::new([22u8; 32]);
        let (_, keys) = KeyMaterial::generate(&params, &mut source).unwrap();
        let bootstrapper: Bootstrapper = Bootstrapper::new(&params).unwrap();
        let mut ctx: BootstrapContext = bootstrapper.context();
        let ct: LweCiphertext = LweCiphertext::new(params.lwe.n + 1, params.lwe.q);
        assert!(matches!(
            bootstrapper.bootstrap(&keys, &mut ctx, &ct),
            Err(Error::ParameterMismatch(_))
        ));
        let ct: LweCiphertext = LweCiphertext::new(params.lwe.n, params.lwe.q / 2);
        assert!(bootstrapper.bootstrap(&keys, &mut ctx, &ct).is_err());
    }
}
