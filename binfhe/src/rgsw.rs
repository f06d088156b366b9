use crate::rlwe::secret::RlweSecret;
use math::error::{Error, Result};
use math::gadget::GadgetParams;
use math::modulus::ModularArith;
use math::poly::Poly;
use math::ring::Ring;
use sampling::source::Source;

/// `rows` gadget rows of `cols` polynomials each, polynomials channel-major,
/// stored in NTT domain and Montgomery form. Row (c, i) sits at index
/// `c * digits + i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GadgetMatrix<D> {
    data: D,
    rows: usize,
    cols: usize,
    channels: usize,
    n: usize,
}

impl GadgetMatrix<Vec<u64>> {
    pub fn alloc(rows: usize, cols: usize, channels: usize, n: usize) -> Self {
        Self {
            data: vec![0; rows * cols * channels * n],
            rows,
            cols,
            channels,
            n,
        }
    }
}

impl<D: AsRef<[u64]>> GadgetMatrix<D> {
    pub fn from_data(data: D, rows: usize, cols: usize, channels: usize, n: usize) -> Self {
        debug_assert_eq!(data.as_ref().len(), rows * cols * channels * n);
        Self {
            data,
            rows,
            cols,
            channels,
            n,
        }
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline(always)]
    pub fn poly_size(&self) -> usize {
        self.channels * self.n
    }

    /// Polynomial `col` of row `row`.
    #[inline(always)]
    pub fn at(&self, row: usize, col: usize) -> &[u64] {
        #[cfg(debug_assertions)]
        {
            assert!(row < self.rows, "row {} >= {}", row, self.rows);
            assert!(col < self.cols, "col {} >= {}", col, self.cols);
        }
        let size: usize = self.poly_size();
        let start: usize = (row * self.cols + col) * size;
        &self.data.as_ref()[start..start + size]
    }

    pub fn as_view(&self) -> GadgetMatrix<&[u64]> {
        GadgetMatrix {
            data: self.data.as_ref(),
            rows: self.rows,
            cols: self.cols,
            channels: self.channels,
            n: self.n,
        }
    }
}

impl<D: AsRef<[u64]> + AsMut<[u64]>> GadgetMatrix<D> {
    #[inline(always)]
    pub fn row_mut(&mut self, row: usize) -> &mut [u64] {
        #[cfg(debug_assertions)]
        {
            assert!(row < self.rows, "row {} >= {}", row, self.rows);
        }
        let size: usize = self.cols * self.poly_size();
        &mut self.data.as_mut()[row * size..(row + 1) * size]
    }

    #[inline(always)]
    pub fn at_mut(&mut self, row: usize, col: usize) -> &mut [u64] {
        let size: usize = self.poly_size();
        &mut self.row_mut(row)[col * size..(col + 1) * size]
    }
}

/// Returns message * g_i, optionally negated, in coefficient domain.
pub(crate) fn gadget_multiple(
    ring: &Ring,
    message: &Poly<u64>,
    gadget: &GadgetParams,
    i: usize,
    negate: bool,
) -> Result<Poly<u64>> {
    let mut out: Poly<u64> = message.clone();
    for c in 0..ring.channels() {
        let prime = ring.basis().prime(c);
        let mut weight: u64 = gadget.weight(i, prime);
        if negate {
            weight = prime.neg(weight);
        }
        out.at_mut(c)
            .iter_mut()
            .for_each(|x| *x = prime.mul_barrett(*x, weight));
    }
    Ok(out)
}

/// X^e in coefficient domain, e taken mod 2N.
pub fn monomial(ring: &Ring, e: i64) -> Result<Poly<u64>> {
    let n: i64 = ring.n() as i64;
    let e: i64 = e.rem_euclid(2 * n);
    let mut coeffs: Vec<i64> = vec![0; ring.n()];
    if e < n {
        coeffs[e as usize] = 1;
    } else {
        coeffs[(e - n) as usize] = -1;
    }
    let mut p: Poly<u64> = ring.new_poly();
    ring.set_signed(&mut p, &coeffs)?;
    Ok(p)
}

/// Constant polynomial c.
pub fn constant(ring: &Ring, c: i64) -> Result<Poly<u64>> {
    let mut coeffs: Vec<i64> = vec![0; ring.n()];
    coeffs[0] = c;
    let mut p: Poly<u64> = ring.new_poly();
    ring.set_signed(&mut p, &coeffs)?;
    Ok(p)
}

/// Fills `out` with RGSW(message): (k + 1) * digits rows where row (c, i)
/// encrypts zero plus message * g_i on polynomial c.
pub fn encrypt_rgsw<D: AsRef<[u64]> + AsMut<[u64]>>(
    ring: &Ring,
    secret: &RlweSecret,
    gadget: &GadgetParams,
    message: &Poly<u64>,
    sigma: f64,
    source: &mut Source,
    out: &mut GadgetMatrix<D>,
) -> Result<()> {
    let k: usize = secret.rank();
    if out.rows() != (k + 1) * gadget.digits || out.cols() != k + 1 {
        return Err(Error::ParameterMismatch(format!(
            "RGSW of {}x{} polynomials for rank {} and {} digits",
            out.rows(),
            out.cols(),
            k,
            gadget.digits
        )));
    }
    for c in 0..=k {
        for i in 0..gadget.digits {
            let scaled: Poly<u64> = gadget_multiple(ring, message, gadget, i, false)?;
            secret.encrypt_row(
                ring,
                Some((c, &scaled)),
                sigma,
                source,
                out.row_mut(c * gadget.digits + i),
            )?;
        }
    }
    Ok(())
}
