//! Recursive-descent compiler from formula text to a postfix [`Program`].
//!
//! Each precedence level parses its operands first and then emits its own
//! operator, so instructions come out in evaluation order without an
//! intermediate syntax tree.

use pf_core::Real;
use tracing::trace;

use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{Token, TokenKind, tokenize};
use crate::program::{BinaryOp, Instruction, Program, UnaryOp};

/// Compile formula text into a program.
///
/// Pure function of `text`: the same text always yields the same program.
pub fn compile(text: &str) -> FormulaResult<Program> {
    let tokens = tokenize(text)?;
    let mut compiler = Compiler::new(text, tokens);
    compiler.compile_formula()?;
    let program = Program::from_instructions(compiler.ops);
    debug_assert!(
        program.max_stack_depth().is_some(),
        "compiler emitted an unbalanced program for '{text}'"
    );
    trace!(formula = text, program = %program, "compiled formula");
    Ok(program)
}

/// A function name resolved to the instruction that implements it.
#[derive(Debug, Clone, Copy)]
enum Callable {
    Unary(UnaryOp),
    Binary(BinaryOp),
}

impl Callable {
    fn lookup(name: &str) -> Option<Self> {
        UnaryOp::from_function_name(name)
            .map(Self::Unary)
            .or_else(|| BinaryOp::from_function_name(name).map(Self::Binary))
    }

    fn arity(self) -> usize {
        match self {
            Self::Unary(_) => 1,
            Self::Binary(_) => 2,
        }
    }

    fn instruction(self) -> Instruction {
        match self {
            Self::Unary(op) => Instruction::Unary(op),
            Self::Binary(op) => Instruction::Binary(op),
        }
    }
}

/// Names that compile to literals when not used as a call.
///
/// A formula can never refer to a variable with one of these names.
pub const NAMED_CONSTANTS: [(&str, Real); 2] =
    [("PI", core::f64::consts::PI), ("E", core::f64::consts::E)];

/// Deepest nesting of parentheses, calls and unary signs accepted.
pub const MAX_NESTING: usize = 256;

/// Value of a named constant, if `name` is one.
pub fn named_constant(name: &str) -> Option<Real> {
    NAMED_CONSTANTS
        .iter()
        .find(|(constant, _)| *constant == name)
        .map(|&(_, value)| value)
}

struct Compiler<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    ops: Vec<Instruction>,
}

impl<'a> Compiler<'a> {
    fn new(text: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            text,
            tokens,
            pos: 0,
            depth: 0,
            ops: Vec::new(),
        }
    }

    fn error(&self, message: String) -> FormulaError {
        FormulaError::Parse {
            message,
            text: self.text.to_string(),
        }
    }

    fn current(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn current_pos(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|t| t.pos)
            .unwrap_or(self.text.len())
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.current().clone();
        self.pos += 1;
        kind
    }

    fn emit(&mut self, op: Instruction) {
        self.ops.push(op);
    }

    /// Whole formula: one expression followed by end of input.
    fn compile_formula(&mut self) -> FormulaResult<()> {
        if *self.current() == TokenKind::Eof {
            return Err(self.error("empty expression".to_string()));
        }
        self.parse_additive()?;
        match self.current() {
            TokenKind::Eof => Ok(()),
            TokenKind::RParen => Err(self.error(format!(
                "unbalanced ')' at position {}",
                self.current_pos()
            ))),
            other => Err(self.error(format!(
                "unexpected trailing {} at position {}",
                other.describe(),
                self.current_pos()
            ))),
        }
    }

    /// Additive: `+`, `-`
    fn parse_additive(&mut self) -> FormulaResult<()> {
        self.parse_multiplicative()?;
        loop {
            let op = match self.current() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            self.parse_multiplicative()?;
            self.emit(Instruction::Binary(op));
        }
        Ok(())
    }

    /// Multiplicative: `*`, `/`
    fn parse_multiplicative(&mut self) -> FormulaResult<()> {
        self.parse_unary()?;
        loop {
            let op = match self.current() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            self.parse_unary()?;
            self.emit(Instruction::Binary(op));
        }
        Ok(())
    }

    /// Every nested sub-expression passes through here, so this is where
    /// nesting depth is bounded.
    fn parse_unary(&mut self) -> FormulaResult<()> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(format!(
                "formula nested too deeply (limit {MAX_NESTING}) at position {}",
                self.current_pos()
            )));
        }
        self.depth += 1;
        let result = self.parse_sign();
        self.depth -= 1;
        result
    }

    /// Unary sign: `-x` negates, `+x` is a no-op.
    fn parse_sign(&mut self) -> FormulaResult<()> {
        match self.current() {
            TokenKind::Minus => {
                self.advance();
                self.parse_unary()?;
                self.emit(Instruction::Unary(UnaryOp::Neg));
                Ok(())
            }
            TokenKind::Plus => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    /// Power: `base ^ exponent`, right-associative, so `2^3^2` is `2^(3^2)`
    /// and `-x^2` is `-(x^2)`.
    fn parse_power(&mut self) -> FormulaResult<()> {
        self.parse_primary()?;
        if *self.current() == TokenKind::Caret {
            self.advance();
            self.parse_unary()?;
            self.emit(Instruction::Binary(BinaryOp::Pow));
        }
        Ok(())
    }

    /// Atoms, calls and parenthesized sub-expressions.
    fn parse_primary(&mut self) -> FormulaResult<()> {
        let pos = self.current_pos();
        match self.advance() {
            TokenKind::Number(value) => {
                self.emit(Instruction::Literal(value));
                Ok(())
            }
            TokenKind::Ident(name) => {
                if *self.current() == TokenKind::LParen {
                    return self.parse_call(name);
                }
                match named_constant(&name) {
                    Some(value) => self.emit(Instruction::Literal(value)),
                    None => self.emit(Instruction::Variable(name)),
                }
                Ok(())
            }
            TokenKind::LParen => {
                self.parse_additive()?;
                self.expect_close_paren(pos)
            }
            TokenKind::Eof => Err(self.error("unexpected end of formula".to_string())),
            other => Err(self.error(format!(
                "unexpected {} at position {pos}",
                other.describe()
            ))),
        }
    }

    /// `name(arg, ...)`; the current token is the opening parenthesis.
    fn parse_call(&mut self, name: String) -> FormulaResult<()> {
        let open_pos = self.current_pos();
        let callable = Callable::lookup(&name).ok_or_else(|| FormulaError::UnknownFunction {
            name: name.clone(),
            text: self.text.to_string(),
        })?;
        self.advance();

        let mut found = 0_usize;
        if *self.current() != TokenKind::RParen {
            loop {
                self.parse_additive()?;
                found += 1;
                if *self.current() == TokenKind::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect_close_paren(open_pos)?;

        if found != callable.arity() {
            return Err(FormulaError::Arity {
                name,
                expected: callable.arity(),
                found,
                text: self.text.to_string(),
            });
        }
        self.emit(callable.instruction());
        Ok(())
    }

    fn expect_close_paren(&mut self, open_pos: usize) -> FormulaResult<()> {
        match self.current() {
            TokenKind::RParen => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Err(self.error(format!(
                "missing ')' for '(' at position {open_pos}"
            ))),
            other => Err(self.error(format!(
                "expected ')' but found {} at position {}",
                other.describe(),
                self.current_pos()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postfix(text: &str) -> String {
        compile(text).unwrap().to_string()
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(postfix("1+2*3"), "1 2 3 * +");
        assert_eq!(postfix("(1+2)*3"), "1 2 + 3 *");
        assert_eq!(postfix("a-b-c"), "a b - c -");
        assert_eq!(postfix("a/b/c"), "a b / c /");
        assert_eq!(postfix("2^3^2"), "2 3 2 ^ ^");
    }

    #[test]
    fn unary_minus_binds_looser_than_power() {
        assert_eq!(postfix("-x^2"), "x 2 ^ neg");
        assert_eq!(postfix("2^-x"), "2 x neg ^");
        assert_eq!(postfix("-x*y"), "x neg y *");
        assert_eq!(postfix("--x"), "x neg neg");
        assert_eq!(postfix("+x"), "x");
    }

    #[test]
    fn function_calls() {
        assert_eq!(postfix("sqrt(x^2+y^2)"), "x 2 ^ y 2 ^ + sqrt");
        assert_eq!(postfix("arctan2(y,x)"), "y x arctan2");
        assert_eq!(postfix("arccos(z/r)"), "z r / arccos");
        assert_eq!(postfix("sin(theta)*cos(phi)"), "theta sin phi cos *");
    }

    #[test]
    fn named_constants_become_literals() {
        let program = compile("2*PI").unwrap();
        assert_eq!(
            program.instructions(),
            &[
                Instruction::Literal(2.0),
                Instruction::Literal(core::f64::consts::PI),
                Instruction::Binary(BinaryOp::Mul),
            ]
        );
        assert_eq!(compile("E").unwrap().instructions(), &[Instruction::Literal(core::f64::consts::E)]);
    }

    #[test]
    fn lowercase_e_is_a_variable() {
        assert_eq!(compile("e").unwrap().instructions(), &[Instruction::Variable("e".into())]);
    }

    #[test]
    fn malformed_input_is_rejected() {
        for bad in ["", "   ", "sqrt(x^2+y^2", "(x", "x)", "x y", "x +", "*x", "()", "x,y", "f(x"] {
            let err = compile(bad).unwrap_err();
            assert_eq!(err.text(), bad, "error for {bad:?} should carry the text");
        }
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let deep = format!("{}x{}", "(".repeat(10_000), ")".repeat(10_000));
        let err = compile(&deep).unwrap_err();
        assert!(matches!(
            err,
            FormulaError::Parse { ref message, .. } if message.contains("nested too deeply")
        ));
        assert_eq!(err.text(), deep);

        let signs = format!("{}x", "-".repeat(10_000));
        assert!(compile(&signs).is_err());

        let calls = format!("{}x{}", "sqrt(".repeat(10_000), ")".repeat(10_000));
        assert!(compile(&calls).is_err());

        let powers = vec!["2"; 10_000].join("^");
        assert!(compile(&powers).is_err());
    }

    #[test]
    fn nesting_up_to_the_limit_compiles() {
        let depth = MAX_NESTING - 1;
        let nested = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(postfix(&nested), "x");
    }

    #[test]
    fn constant_table_matches_lookup() {
        for (name, value) in NAMED_CONSTANTS {
            assert_eq!(named_constant(name), Some(value));
        }
        assert_eq!(named_constant("pi"), None);
    }

    #[test]
    fn unknown_function_is_rejected() {
        let err = compile("foo(x)").unwrap_err();
        assert!(matches!(err, FormulaError::UnknownFunction { ref name, .. } if name == "foo"));
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let err = compile("arctan2(y)").unwrap_err();
        assert!(matches!(
            err,
            FormulaError::Arity {
                expected: 2,
                found: 1,
                ..
            }
        ));
        let err = compile("sqrt(x, y)").unwrap_err();
        assert!(matches!(
            err,
            FormulaError::Arity {
                expected: 1,
                found: 2,
                ..
            }
        ));
        let err = compile("sin()").unwrap_err();
        assert!(matches!(err, FormulaError::Arity { found: 0, .. }));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn formula() -> impl Strategy<Value = String> {
        let leaf = prop_oneof![
            prop::sample::select(vec!["x", "y", "z", "m", "r", "PI"]).prop_map(str::to_string),
            (0_u32..100).prop_map(|n| n.to_string()),
        ];
        leaf.prop_recursive(4, 32, 2, |inner| {
            prop_oneof![
                (inner.clone(), prop::sample::select(vec!["+", "-", "*", "/", "^"]), inner.clone())
                    .prop_map(|(a, op, b)| format!("{a} {op} {b}")),
                inner.clone().prop_map(|a| format!("-({a})")),
                inner.clone().prop_map(|a| format!("({a})")),
                (prop::sample::select(vec!["sqrt", "sin", "cos", "arccos", "abs"]), inner.clone())
                    .prop_map(|(f, a)| format!("{f}({a})")),
                (inner.clone(), inner).prop_map(|(a, b)| format!("arctan2({a}, {b})")),
            ]
        })
    }

    proptest! {
        #[test]
        fn compiled_programs_are_balanced(text in formula()) {
            let program = compile(&text).unwrap();
            prop_assert!(program.max_stack_depth().is_some());
        }

        #[test]
        fn compilation_is_deterministic(text in formula()) {
            prop_assert_eq!(compile(&text).unwrap(), compile(&text).unwrap());
        }

        #[test]
        fn whitespace_is_insignificant(text in formula()) {
            let squeezed: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            prop_assert_eq!(compile(&text).unwrap(), compile(&squeezed).unwrap());
        }
    }
}
