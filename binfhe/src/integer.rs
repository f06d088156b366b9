//! Two's-complement integer circuits over little-endian bit vectors.
//!
//! Every builder appends gates to a [Circuit] and returns the result wires.
//! Shifts and rotations by constant amounts only rewire.

use crate::circuit::{Circuit, Wire};
use crate::gates::Gate;
use crate::keys::SecretKey;
use crate::lwe::ciphertext::LweCiphertext;
use math::error::{Error, Result};
use sampling::source::Source;

/// Encrypts the low `width` bits of `value`, least significant first.
pub fn encrypt_int(sk: &SecretKey, value: i64, width: usize, source: &mut Source) -> Vec<LweCiphertext> {
    (0..width)
        .map(|i| sk.encrypt_bit((value >> i.min(63)) & 1 == 1, source))
        .collect()
}

/// Decrypts and sign-extends.
pub fn decrypt_int(sk: &SecretKey, bits: &[LweCiphertext]) -> Result<i64> {
    let plain: Vec<bool> = bits.iter().map(|b| sk.decrypt_bit(b)).collect::<Result<_>>()?;
    Ok(from_bits(&plain))
}

/// Low `width` bits of `value`.
pub fn to_bits(value: i64, width: usize) -> Vec<bool> {
    (0..width).map(|i| (value >> i.min(63)) & 1 == 1).collect()
}

/// Sign-extending inverse of [to_bits].
pub fn from_bits(bits: &[bool]) -> i64 {
    let w: usize = bits.len();
    if w == 0 {
        return 0;
    }
    let mut x: i64 = 0;
    for (i, b) in bits.iter().enumerate().take(64) {
        x |= (*b as i64) << i;
    }
    if w < 64 && bits[w - 1] {
        x |= -1i64 << w;
    }
    x
}

fn check_widths(a: &[Wire], b: &[Wire]) -> Result<()> {
    if a.len() != b.len() || a.is_empty() {
        return Err(Error::ParameterMismatch(format!(
            "operands of {} and {} bits",
            a.len(),
            b.len()
        )));
    }
    Ok(())
}

fn not(c: &mut Circuit, a: Wire) -> Result<Wire> {
    match a {
        Wire::Const(b) => Ok(Wire::Const(!b)),
        _ => c.push(Gate::Not, &[a]),
    }
}

fn sign_extend(a: &[Wire], width: usize) -> Vec<Wire> {
    let mut out: Vec<Wire> = a.to_vec();
    let sign: Wire = a[a.len() - 1];
    out.resize(width, sign);
    out
}

/// a + b + carry, w bits; the final carry is dropped.
fn ripple(c: &mut Circuit, a: &[Wire], b: &[Wire], mut carry: Wire) -> Result<Vec<Wire>> {
    let w: usize = a.len();
    let mut sum: Vec<Wire> = Vec::with_capacity(w);
    for i in 0..w {
        if carry == Wire::Const(false) {
            sum.push(c.push(Gate::Xor, &[a[i], b[i]])?);
            if i + 1 < w {
                carry = c.push(Gate::And, &[a[i], b[i]])?;
            }
        } else {
            sum.push(c.push(Gate::XorN(3), &[a[i], b[i], carry])?);
            if i + 1 < w {
                carry = c.push(Gate::Maj3, &[a[i], b[i], carry])?;
            }
        }
    }
    Ok(sum)
}

pub fn add(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> Result<Vec<Wire>> {
    check_widths(a, b)?;
    ripple(c, a, b, Wire::Const(false))
}

/// a + NOT b + 1.
pub fn sub(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> Result<Vec<Wire>> {
    check_widths(a, b)?;
    let nb: Vec<Wire> = b.iter().map(|x| not(c, *x)).collect::<Result<_>>()?;
    ripple(c, a, &nb, Wire::Const(true))
}

pub fn neg(c: &mut Circuit, a: &[Wire]) -> Result<Vec<Wire>> {
    let zero: Vec<Wire> = vec![Wire::Const(false); a.len()];
    sub(c, &zero, a)
}

/// Bitwise s ? a : b.
pub fn select(c: &mut Circuit, s: Wire, a: &[Wire], b: &[Wire]) -> Result<Vec<Wire>> {
    check_widths(a, b)?;
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| c.push(Gate::Mux, &[s, *x, *y]))
        .collect()
}

pub fn abs(c: &mut Circuit, a: &[Wire]) -> Result<Vec<Wire>> {
    let negated: Vec<Wire> = neg(c, a)?;
    select(c, a[a.len() - 1], &negated, a)
}

/// max(a, 0).
pub fn relu(c: &mut Circuit, a: &[Wire]) -> Result<Vec<Wire>> {
    let positive: Wire = not(c, a[a.len() - 1])?;
    a.iter().map(|x| c.push(Gate::And, &[positive, *x])).collect()
}

fn all(c: &mut Circuit, bits: &[Wire]) -> Result<Wire> {
    let mut layer: Vec<Wire> = bits.to_vec();
    while layer.len() > 1 {
        let mut next: Vec<Wire> = Vec::with_capacity(layer.len().div_ceil(2));
        for pair in layer.chunks(2) {
            next.push(match pair {
                [x, y] => c.push(Gate::And, &[*x, *y])?,
                [x] => *x,
                _ => unreachable!(),
            });
        }
        layer = next;
    }
    Ok(layer[0])
}

pub fn eq(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> Result<Wire> {
    check_widths(a, b)?;
    let same: Vec<Wire> = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| c.push(Gate::Xnor, &[*x, *y]))
        .collect::<Result<_>>()?;
    all(c, &same)
}

pub fn ne(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> Result<Wire> {
    let e: Wire = eq(c, a, b)?;
    not(c, e)
}

/// Signed a < b: sign of a - b computed on w + 1 bits.
pub fn lt(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> Result<Wire> {
    check_widths(a, b)?;
    let w: usize = a.len() + 1;
    let diff: Vec<Wire> = sub(c, &sign_extend(a, w), &sign_extend(b, w))?;
    Ok(diff[w - 1])
}

pub fn gt(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> Result<Wire> {
    lt(c, b, a)
}

pub fn le(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> Result<Wire> {
    let g: Wire = gt(c, a, b)?;
    not(c, g)
}

pub fn ge(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> Result<Wire> {
    let l: Wire = lt(c, a, b)?;
    not(c, l)
}

pub fn max(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> Result<Vec<Wire>> {
    let l: Wire = lt(c, a, b)?;
    select(c, l, b, a)
}

pub fn min(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> Result<Vec<Wire>> {
    let l: Wire = lt(c, a, b)?;
    select(c, l, a, b)
}

pub fn shl(a: &[Wire], k: usize) -> Vec<Wire> {
    let w: usize = a.len();
    (0..w)
        .map(|i| if i >= k { a[i - k] } else { Wire::Const(false) })
        .collect()
}

/// Arithmetic right shift.
pub fn shr(a: &[Wire], k: usize) -> Vec<Wire> {
    let w: usize = a.len();
    (0..w).map(|i| a[(i + k).min(w - 1)]).collect()
}

pub fn rotl(a: &[Wire], k: usize) -> Vec<Wire> {
    let w: usize = a.len();
    (0..w).map(|i| a[(i + w - k % w) % w]).collect()
}

pub fn rotr(a: &[Wire], k: usize) -> Vec<Wire> {
    let w: usize = a.len();
    (0..w).map(|i| a[(i + k) % w]).collect()
}

/// Low w bits of a * b. Two's-complement products agree with unsigned
/// ones on the low bits, so partial products are added shift by shift.
pub fn smull(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> Result<Vec<Wire>> {
    check_widths(a, b)?;
    let w: usize = a.len();
    let mut acc: Vec<Wire> = a
        .iter()
        .map(|x| c.push(Gate::And, &[*x, b[0]]))
        .collect::<Result<_>>()?;
    for i in 1..w {
        let partial: Vec<Wire> = a[..w - i]
            .iter()
            .map(|x| c.push(Gate::And, &[*x, b[i]]))
            .collect::<Result<_>>()?;
        let high: Vec<Wire> = add(c, &acc[i..], &partial)?;
        acc.truncate(i);
        acc.extend(high);
    }
    Ok(acc)
}

/// Unsigned restoring division of w-bit values; returns the quotient.
fn udiv(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> Result<Vec<Wire>> {
    let w: usize = a.len();
    let zero: Wire = Wire::Const(false);
    let mut divisor: Vec<Wire> = b.to_vec();
    divisor.resize(w + 2, zero);
    let mut rem: Vec<Wire> = vec![zero; w + 1];
    let mut quotient: Vec<Wire> = vec![zero; w];
    for i in (0..w).rev() {
        let mut shifted: Vec<Wire> = Vec::with_capacity(w + 2);
        shifted.push(a[i]);
        shifted.extend_from_slice(&rem[..w]);
        shifted.push(zero);
        let diff: Vec<Wire> = sub(c, &shifted, &divisor)?;
        let fits: Wire = not(c, diff[w + 1])?;
        quotient[i] = fits;
        rem = select(c, fits, &diff[..w + 1], &shifted[..w + 1])?;
    }
    Ok(quotient)
}

/// Signed division truncating toward zero. Division by zero yields an
/// unspecified value.
pub fn sdiv(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> Result<Vec<Wire>> {
    check_widths(a, b)?;
    let w: usize = a.len();
    let (sa, sb) = (a[w - 1], b[w - 1]);
    let ua: Vec<Wire> = abs(c, a)?;
    let ub: Vec<Wire> = abs(c, b)?;
    let q: Vec<Wire> = udiv(c, &ua, &ub)?;
    let negative: Wire = c.push(Gate::Xor, &[sa, sb])?;
    let nq: Vec<Wire> = neg(c, &q)?;
    select(c, negative, &nq, &q)
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: usize = 4;

    fn wrap(x: i64) -> i64 {
        from_bits(&to_bits(x, W))
    }

    type Binary = fn(&mut Circuit, &[Wire], &[Wire]) -> Result<Vec<Wire>>;

    fn check_binary(op: Binary, want: impl Fn(i64, i64) -> Option<i64>) {
        let mut c: Circuit = Circuit::new(0);
        let a: Vec<Wire> = c.add_inputs(W);
        let b: Vec<Wire> = c.add_inputs(W);
        let out: Vec<Wire> = op(&mut c, &a, &b).unwrap();
        c.set_outputs(&out).unwrap();
        for x in -8..8i64 {
            for y in -8..8i64 {
                let Some(expected) = want(x, y) else { continue };
                let mut inputs: Vec<bool> = to_bits(x, W);
                inputs.extend(to_bits(y, W));
                let got: i64 = from_bits(&c.evaluate_plain(&inputs).unwrap());
                assert_eq!(got, wrap(expected), "{} op {}", x, y);
            }
        }
    }

    type Predicate = fn(&mut Circuit, &[Wire], &[Wire]) -> Result<Wire>;

    fn check_predicate(op: Predicate, want: impl Fn(i64, i64) -> bool) {
        let mut c: Circuit = Circuit::new(0);
        let a: Vec<Wire> = c.add_inputs(W);
        let b: Vec<Wire> = c.add_inputs(W);
        let out: Wire = op(&mut c, &a, &b).unwrap();
        c.add_output(out).unwrap();
        for x in -8..8i64 {
            for y in -8..8i64 {
                let mut inputs: Vec<bool> = to_bits(x, W);
                inputs.extend(to_bits(y, W));
                assert_eq!(c.evaluate_plain(&inputs).unwrap()[0], want(x, y), "{} ? {}", x, y);
            }
        }
    }

    fn check_unary(op: impl Fn(&mut Circuit, &[Wire]) -> Result<Vec<Wire>>, want: impl Fn(i64) -> i64) {
        let mut c: Circuit = Circuit::new(0);
        let a: Vec<Wire> = c.add_inputs(W);
        let out: Vec<Wire> = op(&mut c, &a).unwrap();
        c.set_outputs(&out).unwrap();
        for x in -8..8i64 {
            let got: i64 = from_bits(&c.evaluate_plain(&to_bits(x, W)).unwrap());
            assert_eq!(got, wrap(want(x)), "op {}", x);
        }
    }

    #[test]
    fn bit_conversions_sign_extend() {
        assert_eq!(to_bits(-3, 4), vec![true, false, true, true]);
        assert_eq!(from_bits(&to_bits(-3, 4)), -3);
        assert_eq!(from_bits(&to_bits(5, 4)), 5);
        assert_eq!(from_bits(&to_bits(i64::MIN, 64)), i64::MIN);
    }

    #[test]
    fn arithmetic_wraps_like_i4() {
        check_binary(add, |x, y| Some(x + y));
        check_binary(sub, |x, y| Some(x - y));
        check_binary(smull, |x, y| Some(x * y));
        check_binary(max, |x, y| Some(x.max(y)));
        check_binary(min, |x, y| Some(x.min(y)));
        check_binary(sdiv, |x, y| if y == 0 { None } else { Some(x.wrapping_div(y)) });
        check_unary(neg, |x| -x);
        check_unary(abs, |x| x.abs());
        check_unary(relu, |x| x.max(0));
    }

    #[test]
    fn comparisons_are_signed() {
        check_predicate(eq, |x, y| x == y);
        check_predicate(ne, |x, y| x != y);
        check_predicate(lt, |x, y| x < y);
        check_predicate(le, |x, y| x <= y);
        check_predicate(gt, |x, y| x > y);
        check_predicate(ge, |x, y| x >= y);
    }

    #[test]
    fn shifts_and_rotations_rewire() {
        check_unary(|_, a| Ok(shl(a, 1)), |x| x << 1);
        check_unary(|_, a| Ok(shr(a, 2)), |x| x >> 2);
        check_unary(|_, a| Ok(rotl(a, 1)), |x| {
            let u: i64 = x & 0xf;
            ((u << 1) | (u >> 3)) & 0xf
        });
        check_unary(|_, a| Ok(rotr(a, 1)), |x| {
            let u: i64 = x & 0xf;
            ((u >> 1) | (u << 3)) & 0xf
        });
    }
}
