use crate::bootstrap::BootstrapContext;
use crate::gates::{Gate, GateEvaluator};
use crate::lwe::ciphertext::LweCiphertext;
use math::error::{Error, Result};

/// Source of a gate input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Wire {
    /// Circuit input i.
    Input(usize),
    /// Output of node i.
    Node(usize),
    Const(bool),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub gate: Gate,
    pub inputs: Vec<Wire>,
}

/// Data-flow graph of gates. Nodes only read inputs, constants and earlier
/// nodes, so the node list is a topological order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Circuit {
    inputs: usize,
    nodes: Vec<Node>,
    outputs: Vec<Wire>,
}

impl Circuit {
    pub fn new(inputs: usize) -> Self {
        Self {
            inputs,
            nodes: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn outputs(&self) -> &[Wire] {
        &self.outputs
    }

    pub fn input(&self, i: usize) -> Wire {
        Wire::Input(i)
    }

    /// Appends `count` fresh inputs and returns their wires.
    pub fn add_inputs(&mut self, count: usize) -> Vec<Wire> {
        let first: usize = self.inputs;
        self.inputs += count;
        (first..first + count).map(Wire::Input).collect()
    }

    fn check_wire(&self, wire: Wire) -> Result<()> {
        let ok: bool = match wire {
            Wire::Input(i) => i < self.inputs,
            Wire::Node(i) => i < self.nodes.len(),
            Wire::Const(_) => true,
        };
        if !ok {
            return Err(Error::ParameterMismatch(format!(
                "{:?} does not exist yet",
                wire
            )));
        }
        Ok(())
    }

    pub fn push(&mut self, gate: Gate, inputs: &[Wire]) -> Result<Wire> {
        gate.check_arity(inputs.len())?;
        for w in inputs {
            self.check_wire(*w)?;
        }
        self.nodes.push(Node {
            gate,
            inputs: inputs.to_vec(),
        });
        Ok(Wire::Node(self.nodes.len() - 1))
    }

    pub fn add_output(&mut self, wire: Wire) -> Result<()> {
        self.check_wire(wire)?;
        self.outputs.push(wire);
        Ok(())
    }

    pub fn set_outputs(&mut self, wires: &[Wire]) -> Result<()> {
        for w in wires {
            self.check_wire(*w)?;
        }
        self.outputs = wires.to_vec();
        Ok(())
    }

    /// Total bootstraps of one evaluation.
    pub fn bootstrap_count(&self) -> usize {
        self.nodes.iter().map(|n| n.gate.bootstraps()).sum()
    }

    /// For every node, the number of node inputs it waits on and the nodes
    /// reading its output (one entry per reading edge).
    pub fn dependencies(&self) -> (Vec<usize>, Vec<Vec<usize>>) {
        let mut pending: Vec<usize> = vec![0; self.nodes.len()];
        let mut readers: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            for w in node.inputs.iter() {
                if let Wire::Node(j) = w {
                    pending[i] += 1;
                    readers[*j].push(i);
                }
            }
        }
        (pending, readers)
    }

    fn check_inputs(&self, given: usize) -> Result<()> {
        if given != self.inputs {
            return Err(Error::ParameterMismatch(format!(
                "{} inputs given to a circuit of {}",
                given, self.inputs
            )));
        }
        Ok(())
    }

    pub fn evaluate_plain(&self, inputs: &[bool]) -> Result<Vec<bool>> {
        self.check_inputs(inputs.len())?;
        let mut values: Vec<bool> = Vec::with_capacity(self.nodes.len());
        let read = |values: &[bool], w: &Wire| -> bool {
            match w {
                Wire::Input(i) => inputs[*i],
                Wire::Node(i) => values[*i],
                Wire::Const(b) => *b,
            }
        };
        for node in self.nodes.iter() {
            let args: Vec<bool> = node.inputs.iter().map(|w| read(&values, w)).collect();
            values.push(node.gate.eval_plain(&args)?);
        }
        Ok(self.outputs.iter().map(|w| read(&values, w)).collect())
    }

    /// Sequential encrypted evaluation in node order.
    pub fn evaluate(
        &self,
        eval: &GateEvaluator,
        ctx: &mut BootstrapContext,
        inputs: &[LweCiphertext],
    ) -> Result<Vec<LweCiphertext>> {
        self.check_inputs(inputs.len())?;
        let mut values: Vec<LweCiphertext> = Vec::with_capacity(self.nodes.len());
        for node in self.nodes.iter() {
            let args: Vec<LweCiphertext> = node
                .inputs
                .iter()
                .map(|w| resolve(eval, inputs, &values, *w))
                .collect();
            let refs: Vec<&LweCiphertext> = args.iter().collect();
            values.push(eval.evaluate(ctx, node.gate, &refs)?);
        }
        Ok(self
            .outputs
            .iter()
            .map(|w| resolve(eval, inputs, &values, *w))
            .collect())
    }
}

/// Ciphertext carried by `wire`, given the node values computed so far.
pub(crate) fn resolve(
    eval: &GateEvaluator,
    inputs: &[LweCiphertext],
    values: &[LweCiphertext],
    wire: Wire,
) -> LweCiphertext {
    match wire {
        Wire::Input(i) => inputs[i].clone(),
        Wire::Node(i) => values[i].clone(),
        Wire::Const(b) => eval.constant(b),
    }
}

#[cfg(test)]
mod tests {
    use super::{Circuit, Wire};
    use crate::gates::Gate;

    fn half_adder() -> Circuit {
        let mut c: Circuit = Circuit::new(2);
        let (a, b) = (c.input(0), c.input(1));
        let s: Wire = c.push(Gate::Xor, &[a, b]).unwrap();
        let carry: Wire = c.push(Gate::And, &[a, b]).unwrap();
        c.set_outputs(&[s, carry]).unwrap();
        c
    }

    #[test]
    fn plain_evaluation_follows_node_order() {
        let c: Circuit = half_adder();
        assert_eq!(c.evaluate_plain(&[true, true]).unwrap(), vec![false, true]);
        assert_eq!(c.evaluate_plain(&[true, false]).unwrap(), vec![true, false]);
        assert_eq!(c.bootstrap_count(), 2);
        assert!(c.evaluate_plain(&[true]).is_err());
    }

    #[test]
    fn forward_references_are_rejected() {
        let mut c: Circuit = Circuit::new(1);
        assert!(c.push(Gate::Not, &[Wire::Node(0)]).is_err());
        assert!(c.push(Gate::Not, &[Wire::Input(1)]).is_err());
        let n: Wire = c.push(Gate::Not, &[Wire::Input(0)]).unwrap();
        c.push(Gate::And, &[n, Wire::Const(true)]).unwrap();
        assert!(c.add_output(Wire::Node(5)).is_err());
    }

    #[test]
    fn dependencies_count_node_edges() {
        let mut c: Circuit = half_adder();
        let (s, carry) = (Wire::Node(0), Wire::Node(1));
        c.push(Gate::Or, &[s, carry]).unwrap();
        c.push(Gate::Maj3, &[s, s, Wire::Input(0)]).unwrap();
        let (pending, readers) = c.dependencies();
        assert_eq!(pending, vec![0, 0, 2, 2]);
        assert_eq!(readers[0], vec![2, 3, 3]);
        assert_eq!(readers[1], vec![2]);
    }
}
