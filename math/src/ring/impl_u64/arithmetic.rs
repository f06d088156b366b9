use crate::error::{Error, Result};
use crate::modulus::{ModularArith, ReduceOnce, ONCE};
use crate::poly::Poly;
use crate::ring::Ring;
use itertools::izip;

fn check_same_form(a: &Poly<u64>, b: &Poly<u64>) -> Result<()> {
    if a.is_ntt() != b.is_ntt() || a.is_montgomery() != b.is_montgomery() {
        return Err(Error::DomainError(format!(
            "operands disagree on representation: (ntt={}, montgomery={}) vs (ntt={}, montgomery={})",
            a.is_ntt(),
            a.is_montgomery(),
            b.is_ntt(),
            b.is_montgomery()
        )));
    }
    Ok(())
}

fn require_ntt(a: &Poly<u64>, op: &str) -> Result<()> {
    if !a.is_ntt() {
        return Err(Error::DomainError(format!("{} requires an NTT-domain operand", op)));
    }
    Ok(())
}

fn require_coefficients(a: &Poly<u64>, op: &str) -> Result<()> {
    if a.is_ntt() {
        return Err(Error::DomainError(format!(
            "{} requires a coefficient-domain operand",
            op
        )));
    }
    Ok(())
}

impl Ring {
    /// Forward NTT of every channel.
    pub fn ntt(&self, a: &mut Poly<u64>) -> Result<()> {
        self.check_shape(a)?;
        require_coefficients(a, "ntt")?;
        self.ntt_raw(a.raw_mut());
        let montgomery: bool = a.is_montgomery();
        a.set_flags(true, montgomery);
        Ok(())
    }

    /// Inverse NTT of every channel.
    pub fn intt(&self, a: &mut Poly<u64>) -> Result<()> {
        self.check_shape(a)?;
        require_ntt(a, "intt")?;
        self.intt_raw(a.raw_mut());
        let montgomery: bool = a.is_montgomery();
        a.set_flags(false, montgomery);
        Ok(())
    }

    /// Forward NTT of a channel-major buffer of whole polynomials.
    /// Representation bookkeeping is left to the caller.
    pub fn ntt_raw(&self, a: &mut [u64]) {
        let kernel = self.kernel();
        let channels: usize = self.channels();
        a.chunks_exact_mut(self.n())
            .enumerate()
            .for_each(|(i, a)| kernel.ntt(self.table(i % channels), a));
    }

    /// Inverse of [Ring::ntt_raw].
    pub fn intt_raw(&self, a: &mut [u64]) {
        let kernel = self.kernel();
        let channels: usize = self.channels();
        a.chunks_exact_mut(self.n())
            .enumerate()
            .for_each(|(i, a)| kernel.intt(self.table(i % channels), a));
    }

    pub fn to_montgomery(&self, a: &mut Poly<u64>) -> Result<()> {
        self.check_shape(a)?;
        if a.is_montgomery() {
            return Err(Error::DomainError("polynomial already in Montgomery form".into()));
        }
        for c in 0..self.channels() {
            let prime = self.basis().prime(c);
            a.at_mut(c)
                .iter_mut()
                .for_each(|x| *x = prime.to_montgomery(*x));
        }
        let ntt: bool = a.is_ntt();
        a.set_flags(ntt, true);
        Ok(())
    }

    pub fn from_montgomery(&self, a: &mut Poly<u64>) -> Result<()> {
        self.check_shape(a)?;
        if !a.is_montgomery() {
            return Err(Error::DomainError("polynomial not in Montgomery form".into()));
        }
        for c in 0..self.channels() {
            let prime = self.basis().prime(c);
            a.at_mut(c)
                .iter_mut()
                .for_each(|x| *x = prime.from_montgomery(*x));
        }
        let ntt: bool = a.is_ntt();
        a.set_flags(ntt, false);
        Ok(())
    }

    /// Relabels the polynomial as Montgomery (or plain) without converting.
    pub fn force_montgomery(&self, a: &mut Poly<u64>, montgomery: bool) {
        let ntt: bool = a.is_ntt();
        a.set_flags(ntt, montgomery);
    }

    /// c = a * b with both operands in NTT domain and Montgomery form.
    /// The product stays in NTT domain and Montgomery form.
    pub fn multiply(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) -> Result<()> {
        self.check_shape(a)?;
        self.check_shape(b)?;
        self.check_shape(c)?;
        require_ntt(a, "multiply")?;
        require_ntt(b, "multiply")?;
        if !a.is_montgomery() || !b.is_montgomery() {
            return Err(Error::DomainError(
                "multiply requires both operands in Montgomery form".into(),
            ));
        }
        for ch in 0..self.channels() {
            let montgomery = &self.basis().prime(ch).montgomery;
            self.kernel()
                .mul_mont(montgomery, a.at(ch), b.at(ch), c.at_mut(ch));
        }
        c.set_flags(true, true);
        Ok(())
    }

    /// c = a * b with `a` in NTT domain and Montgomery form and `b` in NTT
    /// domain, plain form. The product is plain.
    pub fn multiply_external(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) -> Result<()> {
        self.check_external(a, b)?;
        self.check_shape(c)?;
        for ch in 0..self.channels() {
            let montgomery = &self.basis().prime(ch).montgomery;
            self.kernel()
                .mul_mont(montgomery, a.at(ch), b.at(ch), c.at_mut(ch));
        }
        c.set_flags(true, false);
        Ok(())
    }

    /// c += a * b, same operand forms as [Ring::multiply_external]; `c` must be
    /// in NTT domain, plain form.
    pub fn multiply_accumulate_external(
        &self,
        a: &Poly<u64>,
        b: &Poly<u64>,
        c: &mut Poly<u64>,
    ) -> Result<()> {
        self.check_external(a, b)?;
        self.check_shape(c)?;
        if !c.is_ntt() || c.is_montgomery() {
            return Err(Error::DomainError(
                "accumulator must be in NTT domain, plain form".into(),
            ));
        }
        self.multiply_accumulate_raw(a.raw(), b.raw(), c.raw_mut());
        Ok(())
    }

    /// c += a * 2^-64 * b on channel-major buffers of one polynomial each.
    pub fn multiply_accumulate_raw(&self, a: &[u64], b: &[u64], c: &mut [u64]) {
        let n: usize = self.n();
        izip!(a.chunks_exact(n), b.chunks_exact(n), c.chunks_exact_mut(n))
            .enumerate()
            .for_each(|(ch, (a, b, c))| {
                self.kernel()
                    .mul_mont_add(&self.basis().prime(ch).montgomery, a, b, c)
            });
    }

    fn check_external(&self, a: &Poly<u64>, b: &Poly<u64>) -> Result<()> {
        self.check_shape(a)?;
        self.check_shape(b)?;
        require_ntt(a, "multiply_external")?;
        require_ntt(b, "multiply_external")?;
        if !a.is_montgomery() || b.is_montgomery() {
            return Err(Error::DomainError(
                "multiply_external expects one Montgomery and one plain operand".into(),
            ));
        }
        Ok(())
    }

    /// c = a + b.
    pub fn add(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) -> Result<()> {
        self.check_shape(a)?;
        self.check_shape(b)?;
        self.check_shape(c)?;
        check_same_form(a, b)?;
        for ch in 0..self.channels() {
            let q: u64 = self.basis().prime(ch).q;
            izip!(a.at(ch), b.at(ch), c.at_mut(ch)).for_each(|(a, b, c)| *c = (a + b).reduce_once(q));
        }
        c.set_flags(a.is_ntt(), a.is_montgomery());
        Ok(())
    }

    /// a += b.
    pub fn add_assign(&self, a: &mut Poly<u64>, b: &Poly<u64>) -> Result<()> {
        self.check_shape(a)?;
        self.check_shape(b)?;
        check_same_form(a, b)?;
        for ch in 0..self.channels() {
            let q: u64 = self.basis().prime(ch).q;
            izip!(a.at_mut(ch), b.at(ch)).for_each(|(a, b)| *a = (*a + b).reduce_once(q));
        }
        Ok(())
    }

    /// a -= b.
    pub fn sub_assign(&self, a: &mut Poly<u64>, b: &Poly<u64>) -> Result<()> {
        self.check_shape(a)?;
        self.check_shape(b)?;
        check_same_form(a, b)?;
        for ch in 0..self.channels() {
            let q: u64 = self.basis().prime(ch).q;
            izip!(a.at_mut(ch), b.at(ch)).for_each(|(a, b)| *a = (*a + q - b).reduce_once(q));
        }
        Ok(())
    }

    /// a = -a.
    pub fn neg_assign(&self, a: &mut Poly<u64>) -> Result<()> {
        self.check_shape(a)?;
        for ch in 0..self.channels() {
            let q: u64 = self.basis().prime(ch).q;
            a.at_mut(ch).iter_mut().for_each(|a| *a = (q - *a).reduce_once(q));
        }
        Ok(())
    }

    /// a = s * a for a signed scalar s; valid in any representation.
    pub fn mul_scalar_assign(&self, a: &mut Poly<u64>, s: i64) -> Result<()> {
        self.check_shape(a)?;
        for ch in 0..self.channels() {
            let prime = self.basis().prime(ch);
            let scalar = prime.barrett.prepare(prime.from_signed(s));
            a.at_mut(ch)
                .iter_mut()
                .for_each(|a| *a = prime.barrett.mul_external::<ONCE>(scalar, *a));
        }
        Ok(())
    }

    /// out = X^k * a for any k (taken mod 2N); coefficient domain only.
    pub fn mul_monomial(&self, a: &Poly<u64>, k: usize, out: &mut Poly<u64>) -> Result<()> {
        self.check_shape(a)?;
        self.check_shape(out)?;
        require_coefficients(a, "mul_monomial")?;
        let n: usize = self.n();
        let mask: usize = 2 * n - 1;
        let k: usize = k & mask;
        for ch in 0..self.channels() {
            let q: u64 = self.basis().prime(ch).q;
            let (src, dst) = (a.at(ch), out.at_mut(ch));
            for (i, x) in src.iter().enumerate() {
                let j: usize = (i + k) & mask;
                if j < n {
                    dst[j] = *x;
                } else {
                    dst[j - n] = (q - *x).reduce_once(q);
                }
            }
        }
        out.set_flags(false, a.is_montgomery());
        Ok(())
    }

    /// acc += (X^k - 1) * a; coefficient domain only.
    pub fn add_rotated_difference(&self, a: &Poly<u64>, k: usize, acc: &mut Poly<u64>) -> Result<()> {
        self.check_shape(a)?;
        self.check_shape(acc)?;
        require_coefficients(a, "add_rotated_difference")?;
        check_same_form(a, acc)?;
        let n: usize = self.n();
        let mask: usize = 2 * n - 1;
        let k: usize = k & mask;
        for ch in 0..self.channels() {
            let q: u64 = self.basis().prime(ch).q;
            let (src, dst) = (a.at(ch), acc.at_mut(ch));
            for (i, x) in src.iter().enumerate() {
                dst[i] = (dst[i] + q - *x).reduce_once(q);
            }
            for (i, x) in src.iter().enumerate() {
                let j: usize = (i + k) & mask;
                if j < n {
                    dst[j] = (dst[j] + *x).reduce_once(q);
                } else {
                    dst[j - n] = (dst[j - n] + q - *x).reduce_once(q);
                }
            }
        }
        Ok(())
    }

    /// Sets every channel from signed coefficients.
    pub fn set_signed(&self, a: &mut Poly<u64>, coeffs: &[i64]) -> Result<()> {
        self.check_shape(a)?;
        if coeffs.len() != self.n() {
            return Err(Error::ParameterMismatch(format!(
                "{} coefficients given for degree {}",
                coeffs.len(),
                self.n()
            )));
        }
        for ch in 0..self.channels() {
            let prime = self.basis().prime(ch);
            izip!(a.at_mut(ch), coeffs).for_each(|(a, c)| *a = prime.from_signed(*c));
        }
        a.set_flags(false, false);
        Ok(())
    }

    /// Sets one channel from residues, rejecting unreduced inputs.
    pub fn set_channel(&self, a: &mut Poly<u64>, channel: usize, residues: &[u64]) -> Result<()> {
        self.check_shape(a)?;
        let q: u64 = self.basis().prime(channel).q;
        for (a, r) in izip!(a.at_mut(channel), residues) {
            *a = crate::modulus::canonical(*r, q)?;
        }
        Ok(())
    }

    /// Returns coefficient j lifted to (-Q/2, Q/2].
    pub fn coeff_centered(&self, a: &Poly<u64>, j: usize) -> Result<i64> {
        self.check_shape(a)?;
        if a.is_ntt() || a.is_montgomery() {
            return Err(Error::DomainError(
                "coefficients are only readable in coefficient domain, plain form".into(),
            ));
        }
        let n: usize = self.n();
        let column: Vec<u64> = (0..self.channels()).map(|c| a.raw()[c * n + j]).collect();
        Ok(self.basis().reconstruct_centered(&column))
    }

    /// Returns all coefficients lifted to (-Q/2, Q/2].
    pub fn to_signed(&self, a: &Poly<u64>) -> Result<Vec<i64>> {
        (0..self.n()).map(|j| self.coeff_centered(a, j)).collect()
    }
}
