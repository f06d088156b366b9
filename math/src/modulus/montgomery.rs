use crate::modulus::barrett::BarrettPrecomp;

/// Montgomery is a generic type alias marking
/// an element in the Montgomery domain (x * 2^64 mod q).
pub type Montgomery<O> = O;

/// MontgomeryPrecomp is a generic struct storing
/// precomputations for Montgomery arithmetic with R = 2^64.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MontgomeryPrecomp<O> {
    pub q: O,
    pub two_q: O,
    pub four_q: O,
    pub barrett: BarrettPrecomp<O>,
    /// q^-1 mod 2^64.
    pub q_inv: O,
    /// -q^-1 mod 2^64.
    pub neg_q_inv: O,
    /// 2^64 mod q.
    pub one: Montgomery<O>,
    /// 2^128 mod q.
    pub r2: O,
    pub minus_one: Montgomery<O>,
}
