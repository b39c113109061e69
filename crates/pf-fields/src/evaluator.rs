//! Stack machine that runs compiled programs against a snapshot.

use pf_core::Real;
use pf_formula::{Instruction, Program};
use tracing::trace;

use crate::availability::check_requested_quantity;
use crate::error::{FieldError, FieldResult};
use crate::quantity::{DerivedQuantity, QuantityKind};
use crate::registry::{MAX_DEFINITION_DEPTH, QuantityRegistry};
use crate::snapshot::{DEFAULT_UNIT, Snapshot};
use crate::value::Value;

/// Evaluates programs for one snapshot, resolving variables through a registry.
///
/// Variables naming derived quantities are evaluated recursively, unscaled.
/// The evaluator keeps the chain of derived quantities currently being
/// computed and fails with `CyclicDefinition` when a name reappears, or with
/// `DefinitionTooDeep` once the chain reaches [`MAX_DEFINITION_DEPTH`].
pub struct Evaluator<'a> {
    registry: &'a QuantityRegistry,
    snapshot: &'a dyn Snapshot,
    resolving: Vec<String>,
}

impl<'a> Evaluator<'a> {
    pub fn new(registry: &'a QuantityRegistry, snapshot: &'a dyn Snapshot) -> Self {
        Self {
            registry,
            snapshot,
            resolving: Vec::new(),
        }
    }

    /// Run `program` and return one value per particle.
    pub fn evaluate(&mut self, program: &Program) -> FieldResult<Vec<Real>> {
        let value = self.run(program)?;
        let snapshot = self.snapshot;
        value.into_array(|| Ok(snapshot.particle_count()?))
    }

    /// Evaluate a derived quantity's program without applying its scaling factor.
    pub fn evaluate_quantity(&mut self, quantity: &DerivedQuantity) -> FieldResult<Vec<Real>> {
        let name = quantity.name();
        if self.resolving.iter().any(|n| n == name) {
            let mut chain = self.resolving.clone();
            chain.push(name.to_string());
            return Err(FieldError::CyclicDefinition { chain });
        }
        if self.resolving.len() >= MAX_DEFINITION_DEPTH {
            return Err(FieldError::DefinitionTooDeep {
                name: name.to_string(),
                limit: MAX_DEFINITION_DEPTH,
            });
        }

        trace!(name, depth = self.resolving.len(), "evaluating derived quantity");
        self.resolving.push(name.to_string());
        let result = self.evaluate(quantity.program());
        self.resolving.pop();
        result
    }

    fn run(&mut self, program: &Program) -> FieldResult<Value> {
        let capacity = program.max_stack_depth().unwrap_or(program.len());
        let mut stack: Vec<Value> = Vec::with_capacity(capacity);

        for instr in program.instructions() {
            match instr {
                Instruction::Literal(v) => stack.push(Value::Scalar(*v)),
                Instruction::Variable(name) => {
                    let values = self.fetch_variable(name)?;
                    stack.push(Value::Array(values));
                }
                Instruction::Unary(op) => {
                    let operand = pop_operand(&mut stack, instr)?;
                    stack.push(operand.unary(*op));
                }
                Instruction::Binary(op) => {
                    let rhs = pop_operand(&mut stack, instr)?;
                    let lhs = pop_operand(&mut stack, instr)?;
                    stack.push(lhs.binary(*op, rhs)?);
                }
            }
        }

        let result = stack
            .pop()
            .ok_or_else(|| FieldError::malformed("program left no value on the stack"))?;
        if !stack.is_empty() {
            return Err(FieldError::malformed(format!(
                "program left {} values on the stack",
                stack.len() + 1
            )));
        }
        Ok(result)
    }

    /// Resolve a variable exactly as a top-level fetch would: availability
    /// first, then a direct extraction or a recursive evaluation.
    fn fetch_variable(&mut self, name: &str) -> FieldResult<Vec<Real>> {
        let registry = self.registry;
        match check_requested_quantity(registry, name, self.snapshot)? {
            QuantityKind::Direct => Ok(self.snapshot.extract_array(name, DEFAULT_UNIT)?),
            QuantityKind::Derived => {
                let quantity = registry
                    .derived(name)
                    .ok_or_else(|| FieldError::UnknownQuantity {
                        name: name.to_string(),
                    })?;
                self.evaluate_quantity(quantity)
            }
        }
    }
}

fn pop_operand(stack: &mut Vec<Value>, instr: &Instruction) -> FieldResult<Value> {
    stack
        .pop()
        .ok_or_else(|| FieldError::malformed(format!("'{instr}' found too few operands")))
}

/// Evaluate `program` once against `snapshot`.
pub fn evaluate(
    registry: &QuantityRegistry,
    program: &Program,
    snapshot: &dyn Snapshot,
) -> FieldResult<Vec<Real>> {
    Evaluator::new(registry, snapshot).evaluate(program)
}
