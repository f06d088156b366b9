use crate::bootstrap::{BootstrapContext, Bootstrapper};
use crate::keys::KeyMaterial;
use crate::lwe::ciphertext::LweCiphertext;
use crate::lwe::encryption::encode_bit;
use math::error::{Error, Result};

/// Boolean gates with one bootstrap each, except NOT (none) and MUX (three).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gate {
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Xnor,
    Not,
    /// Parity of any number (at least 2) of inputs.
    XorN(usize),
    Maj3,
    /// True when all three inputs agree.
    Eq3,
    /// (a AND b) XOR c.
    AndXor,
    /// (a OR b) XOR c.
    OrXor,
    /// MUX(s, a, b) = s ? a : b.
    Mux,
    Refresh,
}

impl Gate {
    pub fn arity(&self) -> usize {
        match self {
            Gate::Not | Gate::Refresh => 1,
            Gate::And | Gate::Or | Gate::Nand | Gate::Nor | Gate::Xor | Gate::Xnor => 2,
            Gate::XorN(k) => *k,
            Gate::Maj3 | Gate::Eq3 | Gate::AndXor | Gate::OrXor | Gate::Mux => 3,
        }
    }

    pub fn bootstraps(&self) -> usize {
        match self {
            Gate::Not => 0,
            Gate::Mux => 3,
            _ => 1,
        }
    }

    /// Plaintext truth table.
    pub fn eval_plain(&self, inputs: &[bool]) -> Result<bool> {
        self.check_arity(inputs.len())?;
        let x = |i: usize| inputs[i];
        Ok(match self {
            Gate::And => x(0) & x(1),
            Gate::Or => x(0) | x(1),
            Gate::Nand => !(x(0) & x(1)),
            Gate::Nor => !(x(0) | x(1)),
            Gate::Xor => x(0) ^ x(1),
            Gate::Xnor => !(x(0) ^ x(1)),
            Gate::Not => !x(0),
            Gate::XorN(_) => inputs.iter().fold(false, |acc, b| acc ^ b),
            Gate::Maj3 => (x(0) as u8 + x(1) as u8 + x(2) as u8) >= 2,
            Gate::Eq3 => x(0) == x(1) && x(1) == x(2),
            Gate::AndXor => (x(0) & x(1)) ^ x(2),
            Gate::OrXor => (x(0) | x(1)) ^ x(2),
            Gate::Mux => {
                if x(0) {
                    x(1)
                } else {
                    x(2)
                }
            }
            Gate::Refresh => x(0),
        })
    }

    pub(crate) fn check_arity(&self, given: usize) -> Result<()> {
        let valid: bool = match self {
            Gate::XorN(k) => *k >= 2 && given == *k,
            _ => given == self.arity(),
        };
        if !valid {
            return Err(Error::ParameterMismatch(format!(
                "{:?} applied to {} inputs",
                self, given
            )));
        }
        Ok(())
    }

    /// Input weights and constant offset, in units of q/8, of the linear
    /// combination whose sign is the gate output. None for NOT and MUX.
    fn recipe(&self) -> Option<(Vec<i64>, i64)> {
        Some(match self {
            Gate::And => (vec![1, 1], -3),
            Gate::Or => (vec![1, 1], -1),
            Gate::Nand => (vec![-1, -1], 3),
            Gate::Nor => (vec![-1, -1], 1),
            Gate::Xor => (vec![2, 2], -2),
            Gate::Xnor => (vec![-2, -2], 2),
            Gate::XorN(k) => (vec![2; *k], -2),
            Gate::Maj3 => (vec![1, 1, 1], -3),
            Gate::Eq3 => (vec![1, 1, 1], 3),
            Gate::AndXor => (vec![1, 1, 2], -3),
            Gate::OrXor => (vec![1, 1, 2], -1),
            Gate::Refresh => (vec![1], -1),
            Gate::Not | Gate::Mux => return None,
        })
    }
}

/// Evaluates gates with one Bootstrapper and one set of evaluation keys.
#[derive(Clone, Copy, Debug)]
pub struct GateEvaluator<'a> {
    bootstrapper: &'a Bootstrapper,
    keys: &'a KeyMaterial,
}

impl<'a> GateEvaluator<'a> {
    pub fn new(bootstrapper: &'a Bootstrapper, keys: &'a KeyMaterial) -> Result<Self> {
        keys.check(bootstrapper.params())?;
        Ok(Self { bootstrapper, keys })
    }

    /// For keys already checked against the bootstrapper's parameters.
    pub(crate) fn new_unchecked(bootstrapper: &'a Bootstrapper, keys: &'a KeyMaterial) -> Self {
        Self { bootstrapper, keys }
    }

    pub fn bootstrapper(&self) -> &Bootstrapper {
        self.bootstrapper
    }

    pub fn keys(&self) -> &KeyMaterial {
        self.keys
    }

    pub fn context(&self) -> BootstrapContext {
        self.bootstrapper.context()
    }

    /// Noiseless encryption of a constant bit.
    pub fn constant(&self, bit: bool) -> LweCiphertext {
        let lwe = &self.bootstrapper.params().lwe;
        LweCiphertext::trivial(encode_bit(bit, lwe.q), lwe.n, lwe.q)
    }

    /// The unbootstrapped linear combination of `gate`.
    pub fn precombine(&self, gate: Gate, inputs: &[&LweCiphertext]) -> Result<LweCiphertext> {
        gate.check_arity(inputs.len())?;
        let (weights, offset) = gate
            .recipe()
            .ok_or_else(|| Error::ParameterMismatch(format!("{:?} has no linear pre-combination", gate)))?;
        let lwe = &self.bootstrapper.params().lwe;
        let mut out: LweCiphertext = LweCiphertext::new(lwe.n, lwe.q);
        for (ct, w) in inputs.iter().zip(weights.iter()) {
            let mut term: LweCiphertext = (*ct).clone();
            term.mul_scalar_assign(*w);
            out.add_assign(&term)?;
        }
        out.add_constant(offset * (lwe.q / 8) as i64);
        Ok(out)
    }

    pub fn evaluate(
        &self,
        ctx: &mut BootstrapContext,
        gate: Gate,
        inputs: &[&LweCiphertext],
    ) -> Result<LweCiphertext> {
        gate.check_arity(inputs.len())?;
        match gate {
            Gate::Not => self.not(inputs[0]),
            Gate::Mux => self.mux(ctx, inputs[0], inputs[1], inputs[2]),
            _ => {
                let combined: LweCiphertext = self.precombine(gate, inputs)?;
                self.bootstrapper.sign_bootstrap(self.keys, ctx, &combined)
            }
        }
    }

    /// q/4 - c, no bootstrap.
    pub fn not(&self, a: &LweCiphertext) -> Result<LweCiphertext> {
        let mut out: LweCiphertext = self.constant(true);
        out.sub_assign(a)?;
        Ok(out)
    }

    pub fn and(&self, ctx: &mut BootstrapContext, a: &LweCiphertext, b: &LweCiphertext) -> Result<LweCiphertext> {
        self.evaluate(ctx, Gate::And, &[a, b])
    }

    pub fn or(&self, ctx: &mut BootstrapContext, a: &LweCiphertext, b: &LweCiphertext) -> Result<LweCiphertext> {
        self.evaluate(ctx, Gate::Or, &[a, b])
    }

    pub fn nand(&self, ctx: &mut BootstrapContext, a: &LweCiphertext, b: &LweCiphertext) -> Result<LweCiphertext> {
        self.evaluate(ctx, Gate::Nand, &[a, b])
    }

    pub fn nor(&self, ctx: &mut BootstrapContext, a: &LweCiphertext, b: &LweCiphertext) -> Result<LweCiphertext> {
        self.evaluate(ctx, Gate::Nor, &[a, b])
    }

    pub fn xor(&self, ctx: &mut BootstrapContext, a: &LweCiphertext, b: &LweCiphertext) -> Result<LweCiphertext> {
        self.evaluate(ctx, Gate::Xor, &[a, b])
    }

    pub fn xnor(&self, ctx: &mut BootstrapContext, a: &LweCiphertext, b: &LweCiphertext) -> Result<LweCiphertext> {
        self.evaluate(ctx, Gate::Xnor, &[a, b])
    }

    /// Parity of all inputs with a single bootstrap.
    pub fn xor_many(&self, ctx: &mut BootstrapContext, inputs: &[&LweCiphertext]) -> Result<LweCiphertext> {
        self.evaluate(ctx, Gate::XorN(inputs.len()), inputs)
    }

    pub fn maj3(
        &self,
        ctx: &mut BootstrapContext,
        a: &LweCiphertext,
        b: &LweCiphertext,
        c: &LweCiphertext,
    ) -> Result<LweCiphertext> {
        self.evaluate(ctx, Gate::Maj3, &[a, b, c])
    }

    pub fn eq3(
        &self,
        ctx: &mut BootstrapContext,
        a: &LweCiphertext,
        b: &LweCiphertext,
        c: &LweCiphertext,
    ) -> Result<LweCiphertext> {
        self.evaluate(ctx, Gate::Eq3, &[a, b, c])
    }

    pub fn and_xor(
        &self,
        ctx: &mut BootstrapContext,
        a: &LweCiphertext,
        b: &LweCiphertext,
        c: &LweCiphertext,
    ) -> Result<LweCiphertext> {
        self.evaluate(ctx, Gate::AndXor, &[a, b, c])
    }

    pub fn or_xor(
        &self,
        ctx: &mut BootstrapContext,
        a: &LweCiphertext,
        b: &LweCiphertext,
        c: &LweCiphertext,
    ) -> Result<LweCiphertext> {
        self.evaluate(ctx, Gate::OrXor, &[a, b, c])
    }

    /// s ? a : b, as OR(AND(s, a), AND(NOT s, b)).
    pub fn mux(
        &self,
        ctx: &mut BootstrapContext,
        s: &LweCiphertext,
        a: &LweCiphertext,
        b: &LweCiphertext,
    ) -> Result<LweCiphertext> {
        let taken: LweCiphertext = self.and(ctx, s, a)?;
        let not_s: LweCiphertext = self.not(s)?;
        let other: LweCiphertext = self.and(ctx, &not_s, b)?;
        self.or(ctx, &taken, &other)
    }

    /// Bootstraps a single ciphertext, keeping its bit.
    pub fn refresh(&self, ctx: &mut BootstrapContext, a: &LweCiphertext) -> Result<LweCiphertext> {
        self.evaluate(ctx, Gate::Refresh, &[a])
    }
}
