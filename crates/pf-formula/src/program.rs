//! Compiled postfix programs and their instruction set.

use core::fmt;
use std::str::FromStr;

use pf_core::Real;

use crate::error::FormulaError;

/// Operation that pops one operand and pushes one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Unary minus.
    Neg,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Arcsin,
    Arccos,
    Arctan,
    Exp,
    /// Natural logarithm.
    Log,
    Log10,
    Abs,
    /// Sign: -1, 0 or 1 (NaN stays NaN).
    Sgn,
    Trunc,
    Round,
}

impl UnaryOp {
    const FUNCTIONS: [UnaryOp; 14] = [
        Self::Sqrt,
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Arcsin,
        Self::Arccos,
        Self::Arctan,
        Self::Exp,
        Self::Log,
        Self::Log10,
        Self::Abs,
        Self::Sgn,
        Self::Trunc,
        Self::Round,
    ];

    /// Look up a one-argument function by its formula name.
    pub fn from_function_name(name: &str) -> Option<Self> {
        Self::FUNCTIONS.into_iter().find(|op| op.name() == name)
    }

    /// Name used in formulas and in the postfix rendering.
    pub fn name(self) -> &'static str {
        match self {
            Self::Neg => "neg",
            Self::Sqrt => "sqrt",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Arcsin => "arcsin",
            Self::Arccos => "arccos",
            Self::Arctan => "arctan",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Log10 => "log10",
            Self::Abs => "abs",
            Self::Sgn => "sgn",
            Self::Trunc => "trunc",
            Self::Round => "round",
        }
    }

    #[inline]
    pub fn apply(self, x: Real) -> Real {
        match self {
            Self::Neg => -x,
            Self::Sqrt => x.sqrt(),
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Arcsin => x.asin(),
            Self::Arccos => x.acos(),
            Self::Arctan => x.atan(),
            Self::Exp => x.exp(),
            Self::Log => x.ln(),
            Self::Log10 => x.log10(),
            Self::Abs => x.abs(),
            Self::Sgn => {
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    x
                }
            }
            Self::Trunc => x.trunc(),
            Self::Round => x.round(),
        }
    }
}

/// Operation that pops two operands (left pushed first) and pushes one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Real power, `left ^ right`.
    Pow,
    /// Two-argument arctangent, `arctan2(y, x)`.
    Arctan2,
}

impl BinaryOp {
    /// Look up a two-argument function by its formula name.
    pub fn from_function_name(name: &str) -> Option<Self> {
        match name {
            "arctan2" => Some(Self::Arctan2),
            _ => None,
        }
    }

    /// Operator symbol or function name used in the postfix rendering.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
            Self::Arctan2 => "arctan2",
        }
    }

    #[inline]
    pub fn apply(self, left: Real, right: Real) -> Real {
        match self {
            Self::Add => left + right,
            Self::Sub => left - right,
            Self::Mul => left * right,
            Self::Div => left / right,
            Self::Pow => left.powf(right),
            Self::Arctan2 => left.atan2(right),
        }
    }
}

/// One step of a compiled program.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Push a scalar constant.
    Literal(Real),
    /// Push the per-particle array of a named quantity.
    Variable(String),
    /// Pop one operand, push `op(operand)`.
    Unary(UnaryOp),
    /// Pop two operands, push `op(left, right)`.
    Binary(BinaryOp),
}

impl Instruction {
    /// Operands consumed from the stack.
    pub fn pops(&self) -> usize {
        match self {
            Self::Literal(_) | Self::Variable(_) => 0,
            Self::Unary(_) => 1,
            Self::Binary(_) => 2,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => write!(f, "{v}"),
            Self::Variable(name) => f.write_str(name),
            Self::Unary(op) => f.write_str(op.name()),
            Self::Binary(op) => f.write_str(op.symbol()),
        }
    }
}

/// A compiled formula: instructions in postfix order.
///
/// Programs produced by [`compile`](crate::compile) always leave exactly one
/// value on the stack. Hand-assembled programs (see
/// [`Program::from_instructions`]) carry no such guarantee, so executors must
/// still check stack balance at run time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Wrap an instruction sequence without validating it.
    pub fn from_instructions(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Distinct variable names in order of first use.
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for instr in &self.instructions {
            if let Instruction::Variable(name) = instr {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Deepest operand stack reached while running the program.
    ///
    /// Returns `None` if an instruction would underflow the stack or the
    /// program does not finish with exactly one value.
    pub fn max_stack_depth(&self) -> Option<usize> {
        let mut depth = 0_usize;
        let mut max_depth = 0_usize;
        for instr in &self.instructions {
            depth = depth.checked_sub(instr.pops())?;
            depth += 1;
            max_depth = max_depth.max(depth);
        }
        (depth == 1).then_some(max_depth)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instr) in self.instructions.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{instr}")?;
        }
        Ok(())
    }
}

impl FromStr for Program {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::compile(s)
    }
}
