use math::error::{Error, Result};
use math::gadget::GadgetParams;
use math::modulus::MAX_MODULUS;
use math::ring::RingParams;
use serde::{Deserialize, Serialize};

/// Distribution of the LWE secret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecretKind {
    Binary,
    Ternary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlindRotationMethod {
    /// One RGSW key per LWE coordinate (two for ternary secrets), CMux style.
    Ginx,
    /// RGSW(X^s_i) keys combined with automorphisms over a window of powers of g = 5.
    Lmkcdey,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LweParams {
    /// Dimension n.
    pub n: usize,
    /// Ciphertext modulus q, at least 8 and at most 2^62.
    pub q: u64,
    pub sigma: f64,
    pub secret: SecretKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlindRotationParams {
    pub method: BlindRotationMethod,
    pub gadget: GadgetParams,
    pub sigma: f64,
    /// RLWE rank k.
    pub rank: usize,
    /// Number of automorphism keys g^1..g^window (LMKCDEY only).
    pub window: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeySwitchParams {
    pub gadget: GadgetParams,
    pub sigma: f64,
}

/// A full parameter set. Passed by reference into every entry point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub lwe: LweParams,
    pub ring: RingParams,
    pub blind_rotation: BlindRotationParams,
    pub key_switch: KeySwitchParams,
    /// Number of zero encryptions in the public key.
    pub public_key_rows: usize,
}

impl Params {
    /// n = 585, q = 2^14 over N = 1024 with two 27-bit channel primes.
    pub fn standard() -> Self {
        Self {
            lwe: LweParams {
                n: 585,
                q: 1 << 14,
                sigma: 3.19,
                secret: SecretKind::Binary,
            },
            ring: RingParams {
                degree: 1024,
                prime_bits: 27,
                channels: 2,
            },
            blind_rotation: BlindRotationParams {
                method: BlindRotationMethod::Ginx,
                gadget: GadgetParams {
                    log_base: 9,
                    digits: 3,
                    rm: 27,
                },
                sigma: 3.59,
                rank: 1,
                window: 10,
            },
            key_switch: KeySwitchParams {
                gadget: GadgetParams {
                    log_base: 7,
                    digits: 3,
                    rm: 33,
                },
                sigma: 3.14,
            },
            public_key_rows: 1024,
        }
    }

    /// Small insecure set for fast tests.
    pub fn test() -> Self {
        Self {
            lwe: LweParams {
                n: 64,
                q: 1 << 14,
                sigma: 3.19,
                secret: SecretKind::Binary,
            },
            ring: RingParams {
                degree: 256,
                prime_bits: 25,
                channels: 2,
            },
            blind_rotation: BlindRotationParams {
                method: BlindRotationMethod::Ginx,
                gadget: GadgetParams {
                    log_base: 8,
                    digits: 3,
                    rm: 26,
                },
                sigma: 3.59,
                rank: 1,
                window: 10,
            },
            key_switch: KeySwitchParams {
                gadget: GadgetParams {
                    log_base: 6,
                    digits: 4,
                    rm: 26,
                },
                sigma: 3.14,
            },
            public_key_rows: 256,
        }
    }

    pub fn with_method(mut self, method: BlindRotationMethod) -> Self {
        self.blind_rotation.method = method;
        self
    }

    pub fn with_secret(mut self, secret: SecretKind) -> Self {
        self.lwe.secret = secret;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let params: Params = serde_json::from_str(json)
            .map_err(|e| Error::ParameterMismatch(format!("invalid parameter set: {}", e)))?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json(&self) -> String {
        // A struct of numbers and unit enums always serializes.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Rejects inconsistent sets. Gadget spans are checked against the
    /// largest modulus the ring can produce, 2^(prime_bits * channels).
    pub fn validate(&self) -> Result<()> {
        let lwe: &LweParams = &self.lwe;
        if lwe.n == 0 {
            return Err(Error::ParameterMismatch("LWE dimension is zero".into()));
        }
        if lwe.q < 8 || lwe.q > MAX_MODULUS {
            return Err(Error::RangeError(format!(
                "LWE modulus {} is outside [8, 2^62]",
                lwe.q
            )));
        }
        let ring: &RingParams = &self.ring;
        if !ring.degree.is_power_of_two() || ring.degree < 2 {
            return Err(Error::ParameterMismatch(format!(
                "ring degree {} is not a power of two",
                ring.degree
            )));
        }
        if ring.channels == 0 {
            return Err(Error::ParameterMismatch("ring has no CRT channel".into()));
        }
        let log_q: u32 = ring.prime_bits * ring.channels as u32;
        if log_q > 62 {
            return Err(Error::RangeError(format!(
                "ring modulus of {} bits does not fit in 62 bits",
                log_q
            )));
        }
        let br: &BlindRotationParams = &self.blind_rotation;
        if br.rank == 0 {
            return Err(Error::ParameterMismatch("RLWE rank is zero".into()));
        }
        br.gadget.check_against(log_q, ring.prime_bits)?;
        self.key_switch.gadget.check_against(log_q, ring.prime_bits)?;
        if br.method == BlindRotationMethod::Lmkcdey {
            if br.window == 0 {
                return Err(Error::ParameterMismatch("automorphism window is zero".into()));
            }
            if br.window >= ring.degree / 2 {
                return Err(Error::ParameterMismatch(format!(
                    "window {} exceeds the order of g modulo 2N",
                    br.window
                )));
            }
        }
        if self.public_key_rows == 0 {
            return Err(Error::ParameterMismatch("public key has no rows".into()));
        }
        Ok(())
    }

    /// Dimension of the LWE ciphertext produced by sample extraction.
    pub fn extracted_dimension(&self) -> usize {
        self.blind_rotation.rank * self.ring.degree
    }
}

#[cfg(test)]
mod tests {
    use super::{BlindRotationMethod, Params};
    use math::error::Error;

    #[test]
    fn presets_are_valid() {
        Params::standard().validate().unwrap();
        Params::test().validate().unwrap();
        Params::test()
            .with_method(BlindRotationMethod::Lmkcdey)
            .validate()
            .unwrap();
    }

    #[test]
    fn json_round_trip() {
        let params: Params = Params::standard();
        let json: String = params.to_json();
        assert!(json.contains("\"degree\": 1024"));
        assert_eq!(Params::from_json(&json).unwrap(), params);
    }

    #[test]
    fn inconsistent_sets_are_rejected() {
        let mut params: Params = Params::test();
        params.key_switch.gadget.digits = 2;
        assert!(matches!(params.validate(), Err(Error::ParameterMismatch(_))));

        let mut params: Params = Params::test();
        params.ring.prime_bits = 32;
        assert!(matches!(params.validate(), Err(Error::RangeError(_))));

        let mut params: Params = Params::test().with_method(BlindRotationMethod::Lmkcdey);
        params.blind_rotation.window = 0;
        assert!(params.validate().is_err());

        assert!(Params::from_json("{\"lwe\": 3}").is_err());
    }
}
