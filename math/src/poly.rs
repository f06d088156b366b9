/// A ring element over one or more CRT channels, stored channel-major:
/// coefficient j of channel c lives at `data[c * n + j]`.
///
/// The two flags record the representation. Arithmetic requires operands to
/// agree on both; products are only defined in the NTT domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly<O> {
    pub n: usize,
    pub channels: usize,
    pub data: Vec<O>,
    ntt: bool,
    montgomery: bool,
}

impl<O: Default + Clone + Copy> Poly<O> {
    /// Returns the zero polynomial in coefficient domain, plain form.
    pub fn new(n: usize, channels: usize) -> Self {
        Self {
            n,
            channels,
            data: vec![O::default(); n * channels],
            ntt: false,
            montgomery: false,
        }
    }

    /// Wraps raw channel-major data with the given representation flags.
    pub fn from_raw(n: usize, channels: usize, data: Vec<O>, ntt: bool, montgomery: bool) -> Self {
        debug_assert_eq!(data.len(), n * channels);
        Self {
            n,
            channels,
            data,
            ntt,
            montgomery,
        }
    }

    #[inline(always)]
    pub fn n(&self) -> usize {
        self.n
    }

    #[inline(always)]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline(always)]
    pub fn is_ntt(&self) -> bool {
        self.ntt
    }

    #[inline(always)]
    pub fn is_montgomery(&self) -> bool {
        self.montgomery
    }

    /// Overwrites both representation flags without touching the data.
    #[inline(always)]
    pub fn set_flags(&mut self, ntt: bool, montgomery: bool) {
        self.ntt = ntt;
        self.montgomery = montgomery;
    }

    #[inline(always)]
    pub fn at(&self, channel: usize) -> &[O] {
        &self.data[channel * self.n..(channel + 1) * self.n]
    }

    #[inline(always)]
    pub fn at_mut(&mut self, channel: usize) -> &mut [O] {
        &mut self.data[channel * self.n..(channel + 1) * self.n]
    }

    #[inline(always)]
    pub fn raw(&self) -> &[O] {
        &self.data
    }

    #[inline(always)]
    pub fn raw_mut(&mut self) -> &mut [O] {
        &mut self.data
    }

    /// Zeroes the data and resets to coefficient domain, plain form.
    pub fn zero(&mut self) {
        self.data.fill(O::default());
        self.ntt = false;
        self.montgomery = false;
    }

    pub fn copy_from(&mut self, other: &Poly<O>) {
        debug_assert_eq!(self.data.len(), other.data.len());
        self.data.copy_from_slice(&other.data);
        self.ntt = other.ntt;
        self.montgomery = other.montgomery;
    }
}
