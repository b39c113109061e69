//! Formula compiler for derived particle quantities.
//!
//! A formula such as `sqrt(x^2 + y^2)` is compiled once into a [`Program`]: a
//! flat postfix sequence of [`Instruction`]s that a stack machine can replay
//! against any snapshot.
//!
//! # Grammar
//!
//! Precedence from lowest to highest:
//! - `+`, `-` (left-associative)
//! - `*`, `/` (left-associative)
//! - unary `-` / `+`
//! - `^` (right-associative, exponent may carry a unary sign)
//! - function call `name(arg, ...)`
//! - parenthesized expression
//! - numeric literal, named constant (`PI`, `E`) or identifier
//!
//! Identifiers are not resolved here; a formula may name a quantity that is
//! only registered later.
//!
//! Sub-expressions may nest at most [`MAX_NESTING`] levels deep (parentheses,
//! call arguments, unary signs and exponents all count).

pub mod compiler;
pub mod error;
pub mod lexer;
pub mod program;

pub use compiler::{MAX_NESTING, NAMED_CONSTANTS, compile, named_constant};
pub use error::{FormulaError, FormulaResult};
pub use program::{BinaryOp, Instruction, Program, UnaryOp};
