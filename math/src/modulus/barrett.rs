/// An operand paired with its Shoup quotient floor(value * 2^64 / q),
/// for repeated multiplication by the same constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Barrett<O>(pub O, pub O);

impl<O> Barrett<O> {
    #[inline(always)]
    pub fn value(&self) -> &O {
        &self.0
    }

    #[inline(always)]
    pub fn quotient(&self) -> &O {
        &self.1
    }
}

/// Barrett constants for a modulus q of `shift` bits:
/// `hi = floor(2^64 / q)` for single-word reduction and
/// `mu = floor(2^(2 * shift) / q)` for reduction of double-word products.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BarrettPrecomp<O> {
    pub q: O,
    pub two_q: O,
    pub four_q: O,
    pub hi: O,
    pub mu: O,
    pub shift: u32,
    pub one: Barrett<O>,
}
