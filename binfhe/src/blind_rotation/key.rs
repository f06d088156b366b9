use crate::arena::{ArenaLayout, KeyArena};
use crate::concurrency::alloc::Allocator;
use crate::lwe::secret::LweSecret;
use crate::params::{BlindRotationMethod, Params, SecretKind};
use crate::rgsw::{constant, encrypt_rgsw, monomial, GadgetMatrix};
use crate::rlwe::automorphism_key::encrypt_automorphism_key;
use crate::rlwe::secret::RlweSecret;
use crate::blind_rotation::lmkcdey::{galois_elements, GENERATOR};
use math::error::{Error, Result};
use math::poly::Poly;
use math::ring::Ring;
use sampling::source::Source;

/// Blind-rotation key material laid out in flat arenas.
///
/// GINX: one RGSW per coordinate encrypting s_i (binary secrets), or two per
/// coordinate encrypting [s_i = 1] and [s_i = -1] (ternary secrets), stored at
/// matrices 2i and 2i + 1.
/// LMKCDEY: one RGSW(X^{s_i}) per coordinate plus `window + 1` automorphism
/// keys for g^1..g^window and -g.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlindRotationKey {
    pub(crate) method: BlindRotationMethod,
    pub(crate) secret: SecretKind,
    pub(crate) brk: KeyArena,
    pub(crate) aut: Option<KeyArena>,
    pub(crate) n_lwe: usize,
}

impl BlindRotationKey {
    /// Arena shapes implied by `params`: (RGSW keys, automorphism keys).
    pub fn layouts(params: &Params) -> (ArenaLayout, Option<ArenaLayout>) {
        let br = &params.blind_rotation;
        let k: usize = br.rank;
        let per_coordinate: usize = match (br.method, params.lwe.secret) {
            (BlindRotationMethod::Ginx, SecretKind::Ternary) => 2,
            _ => 1,
        };
        let brk: ArenaLayout = ArenaLayout {
            matrices: per_coordinate * params.lwe.n,
            rows: (k + 1) * br.gadget.digits,
            cols: k + 1,
            channels: params.ring.channels,
            n: params.ring.degree,
        };
        let aut: Option<ArenaLayout> = match br.method {
            BlindRotationMethod::Ginx => None,
            BlindRotationMethod::Lmkcdey => Some(ArenaLayout {
                matrices: br.window + 1,
                rows: k * br.gadget.digits,
                cols: k + 1,
                channels: params.ring.channels,
                n: params.ring.degree,
            }),
        };
        (brk, aut)
    }

    pub fn generate(
        ring: &Ring,
        lwe: &LweSecret,
        rlwe: &RlweSecret,
        params: &Params,
        source: &mut Source,
    ) -> Result<Self> {
        if lwe.n() != params.lwe.n || lwe.kind() != params.lwe.secret {
            return Err(Error::ParameterMismatch(format!(
                "LWE secret (n={}, {:?}) for parameters (n={}, {:?})",
                lwe.n(),
                lwe.kind(),
                params.lwe.n,
                params.lwe.secret
            )));
        }
        if rlwe.rank() != params.blind_rotation.rank || rlwe.n() != ring.n() {
            return Err(Error::ParameterMismatch(format!(
                "RLWE secret of rank {} and degree {} for rank {} and degree {}",
                rlwe.rank(),
                rlwe.n(),
                params.blind_rotation.rank,
                ring.n()
            )));
        }
        let br = &params.blind_rotation;
        let (brk_layout, aut_layout) = Self::layouts(params);
        let mut brk: KeyArena = KeyArena::new(brk_layout)?;
        match (br.method, lwe.kind()) {
            (BlindRotationMethod::Ginx, SecretKind::Binary) => {
                for (i, s) in lwe.coeffs().iter().enumerate() {
                    let m: Poly<u64> = constant(ring, *s)?;
                    encrypt_rgsw(ring, rlwe, &br.gadget, &m, br.sigma, source, &mut brk.matrix_mut(i))?;
                }
            }
            (BlindRotationMethod::Ginx, SecretKind::Ternary) => {
                for (i, s) in lwe.coeffs().iter().enumerate() {
                    let plus: Poly<u64> = constant(ring, (*s == 1) as i64)?;
                    let minus: Poly<u64> = constant(ring, (*s == -1) as i64)?;
                    encrypt_rgsw(ring, rlwe, &br.gadget, &plus, br.sigma, source, &mut brk.matrix_mut(2 * i))?;
                    encrypt_rgsw(ring, rlwe, &br.gadget, &minus, br.sigma, source, &mut brk.matrix_mut(2 * i + 1))?;
                }
            }
            (BlindRotationMethod::Lmkcdey, _) => {
                for (i, s) in lwe.coeffs().iter().enumerate() {
                    let m: Poly<u64> = monomial(ring, *s)?;
                    encrypt_rgsw(ring, rlwe, &br.gadget, &m, br.sigma, source, &mut brk.matrix_mut(i))?;
                }
            }
        }
        let aut: Option<KeyArena> = match aut_layout {
            Some(layout) => {
                let mut aut: KeyArena = KeyArena::new(layout)?;
                for (j, gal_el) in galois_elements(ring.n(), br.window).into_iter().enumerate() {
                    encrypt_automorphism_key(
                        ring,
                        rlwe,
                        &br.gadget,
                        gal_el,
                        br.sigma,
                        source,
                        &mut aut.matrix_mut(j),
                    )?;
                }
                Some(aut)
            }
            None => None,
        };
        tracing::debug!(
            method = ?br.method,
            secret = ?lwe.kind(),
            matrices = brk_layout.matrices,
            automorphisms = aut_layout.map(|l| l.matrices).unwrap_or(0),
            generator = GENERATOR,
            "blind-rotation key generated"
        );
        Ok(Self {
            method: br.method,
            secret: lwe.kind(),
            brk,
            aut,
            n_lwe: lwe.n(),
        })
    }

    /// Rebuilds a key from arenas read back from storage.
    pub fn from_arenas(params: &Params, brk: KeyArena, aut: Option<KeyArena>) -> Result<Self> {
        let (brk_layout, aut_layout) = Self::layouts(params);
        if *brk.layout() != brk_layout || aut.as_ref().map(|a| *a.layout()) != aut_layout {
            return Err(Error::ParameterMismatch(
                "blind-rotation arenas do not match the parameter set".into(),
            ));
        }
        Ok(Self {
            method: params.blind_rotation.method,
            secret: params.lwe.secret,
            brk,
            aut,
            n_lwe: params.lwe.n,
        })
    }

    pub fn replicate(&self, alloc: &dyn Allocator, node: usize) -> Result<Self> {
        Ok(Self {
            method: self.method,
            secret: self.secret,
            brk: self.brk.replicate(alloc, node)?,
            aut: match &self.aut {
                Some(aut) => Some(aut.replicate(alloc, node)?),
                None => None,
            },
            n_lwe: self.n_lwe,
        })
    }

    #[inline(always)]
    pub fn n_lwe(&self) -> usize {
        self.n_lwe
    }

    #[inline(always)]
    pub fn method(&self) -> BlindRotationMethod {
        self.method
    }

    pub fn brk(&self) -> &KeyArena {
        &self.brk
    }

    pub fn aut(&self) -> Option<&KeyArena> {
        self.aut.as_ref()
    }

    /// Automorphism key j: g^(j+1) for j < window, -g for j = window.
    pub(crate) fn automorphism_key(&self, j: usize) -> Result<GadgetMatrix<&[u64]>> {
        match &self.aut {
            Some(aut) if j < aut.matrices() => Ok(aut.matrix(j)),
            _ => Err(Error::ParameterMismatch(format!(
                "no automorphism key at index {}",
                j
            ))),
        }
    }
}
