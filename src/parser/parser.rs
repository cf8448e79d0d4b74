//! Operator-precedence unit parser.
//!
//! A shunting-yard pass over the token stream. `*` and `/` share a
//! precedence level and associate left; `^` binds tighter. Digits directly
//! after an operand are an implicit power (`in3` is `in^3`).
//!
//! Parsing stops at the first token that cannot continue the expression
//! (an identifier right after an operand, an unmatched `)`, anything the
//! lexer could not classify) and the rest of the input is handed back as
//! trailing text.

use super::lexer::{digits_value, Token, TokenKind};
use crate::model::{Prefix, Unit};
use crate::registry::UnitRegistry;
use crate::{Error, Result};

/// How identifiers become units.
pub(crate) enum Resolver<'r> {
    /// Unknown names are an error
    Lookup(&'r UnitRegistry),
    /// Unknown names become new dimensionless primitives
    Create(&'r mut UnitRegistry),
}

impl Resolver<'_> {
    fn resolve(&mut self, name: &str) -> Result<Unit> {
        match self {
            Resolver::Lookup(reg) => reg.lookup(name).ok_or_else(|| Error::UnknownUnit(name.to_string())),
            Resolver::Create(reg) => match reg.lookup(name) {
                Some(unit) => Ok(unit),
                None => reg.create_unit(name),
            },
        }
    }
}

#[derive(Debug, Clone)]
enum Operand {
    Unit(Unit),
    Int(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Mul,
    Div,
    Pow,
    LParen,
}

impl Op {
    /// Lower binds tighter.
    fn precedence(self) -> u8 {
        match self {
            Op::Pow => 1,
            Op::Mul | Op::Div => 2,
            Op::LParen => u8::MAX,
        }
    }
}

/// Parser state: token slice, cursor and the two shunting-yard stacks.
struct Parser<'t, 'r> {
    tokens: &'t [Token],
    pos: usize,
    resolver: Resolver<'r>,
    operands: Vec<(Operand, usize)>,
    ops: Vec<(Op, usize)>,
}

impl<'t, 'r> Parser<'t, 'r> {
    fn new(tokens: &'t [Token], resolver: Resolver<'r>) -> Self {
        Self { tokens, pos: 0, resolver, operands: Vec::new(), ops: Vec::new() }
    }

    fn peek(&self) -> &'t Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> &'t Token {
        let tok = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn error(position: usize, message: impl Into<String>) -> Error {
        Error::UnitSyntax { position, message: message.into() }
    }

    fn push_op(&mut self, op: Op, position: usize) -> Result<()> {
        while let Some(&(top, _)) = self.ops.last() {
            if top == Op::LParen || top.precedence() > op.precedence() {
                break;
            }
            self.reduce()?;
        }
        self.ops.push((op, position));
        Ok(())
    }

    fn reduce(&mut self) -> Result<()> {
        let Some((op, position)) = self.ops.pop() else {
            return Ok(());
        };
        let (rhs, _) = self.operands.pop().ok_or_else(|| Self::error(position, "Missing operand"))?;
        let (lhs, lhs_pos) = self.operands.pop().ok_or_else(|| Self::error(position, "Missing operand"))?;

        let result = match (op, lhs, rhs) {
            (Op::Pow, Operand::Int(10), Operand::Int(exp)) => {
                let exp = i32::try_from(exp).map_err(|_| Self::error(position, "Exponent out of range"))?;
                Operand::Unit(Unit::dimensionless().with_prefix(Prefix::from_power(exp)))
            }
            (Op::Pow, Operand::Int(base), Operand::Int(exp)) => {
                let exp = u32::try_from(exp).map_err(|_| Self::error(position, "Negative power of a plain number"))?;
                let value = base.checked_pow(exp).ok_or_else(|| Self::error(position, "Integer overflow"))?;
                Operand::Int(value)
            }
            (Op::Pow, Operand::Unit(unit), Operand::Int(exp)) => {
                let exp = i32::try_from(exp).map_err(|_| Self::error(position, "Exponent out of range"))?;
                Operand::Unit(unit.pow(exp))
            }
            (Op::Pow, _, Operand::Unit(_)) => {
                return Err(Self::error(position, "Exponent must be an integer"));
            }
            (Op::Mul, lhs, rhs) => {
                let lhs = Self::as_unit(lhs, lhs_pos)?;
                let rhs = Self::as_unit(rhs, position)?;
                Operand::Unit(lhs.mul(&rhs))
            }
            (Op::Div, lhs, rhs) => {
                let lhs = Self::as_unit(lhs, lhs_pos)?;
                let rhs = Self::as_unit(rhs, position)?;
                Operand::Unit(lhs.div(&rhs))
            }
            (Op::LParen, _, _) => return Err(Self::error(position, "Unclosed parenthesis")),
        };
        self.operands.push((result, lhs_pos));
        Ok(())
    }

    /// Plain numbers stand for units only as `1` or a power of ten.
    fn as_unit(operand: Operand, position: usize) -> Result<Unit> {
        match operand {
            Operand::Unit(unit) => Ok(unit),
            Operand::Int(n) => {
                let text = n.to_string();
                let zeros = text.len() - 1;
                if n > 0 && text.starts_with('1') && text[1..].bytes().all(|b| b == b'0') {
                    Ok(Unit::dimensionless().with_prefix(Prefix::from_power(zeros as i32)))
                } else {
                    Err(Self::error(position, format!("Numeric factor {n} in unit")))
                }
            }
        }
    }

    /// Run to the first token that cannot continue the expression.
    /// Returns the byte offset where parsing stopped.
    fn run(&mut self) -> Result<usize> {
        let mut expect_operand = true;
        let mut depth = 0usize;

        let stop = loop {
            let tok = self.peek();
            let at = tok.span.start;
            match tok.kind {
                TokenKind::Ident if expect_operand => {
                    self.advance();
                    let unit = self.resolver.resolve(&tok.text)?;
                    self.operands.push((Operand::Unit(unit), at));
                    expect_operand = false;
                }
                TokenKind::Digits if expect_operand => {
                    self.advance();
                    self.operands.push((Operand::Int(digits_value(tok)?), at));
                    expect_operand = false;
                }
                TokenKind::Digits => {
                    self.advance();
                    self.push_op(Op::Pow, at)?;
                    self.operands.push((Operand::Int(digits_value(tok)?), at));
                }
                TokenKind::Star | TokenKind::Slash | TokenKind::Caret if !expect_operand => {
                    self.advance();
                    let op = match tok.kind {
                        TokenKind::Star => Op::Mul,
                        TokenKind::Slash => Op::Div,
                        _ => Op::Pow,
                    };
                    self.push_op(op, at)?;
                    expect_operand = true;
                }
                TokenKind::LParen if expect_operand => {
                    self.advance();
                    self.ops.push((Op::LParen, at));
                    depth += 1;
                }
                TokenKind::RParen if !expect_operand && depth > 0 => {
                    self.advance();
                    while let Some(&(op, _)) = self.ops.last() {
                        if op == Op::LParen {
                            break;
                        }
                        self.reduce()?;
                    }
                    self.ops.pop();
                    depth -= 1;
                }
                _ => break at,
            }
        };

        if expect_operand {
            let message = if self.operands.is_empty() && self.ops.is_empty() { "Expected a unit" } else { "Expected an operand" };
            return Err(Self::error(stop, message));
        }
        if depth > 0 {
            return Err(Self::error(stop, "Unclosed parenthesis"));
        }
        while !self.ops.is_empty() {
            self.reduce()?;
        }
        Ok(stop)
    }

    fn finish(mut self) -> Result<Unit> {
        let (operand, position) = self.operands.pop().ok_or_else(|| Self::error(0, "Expected a unit"))?;
        Self::as_unit(operand, position)
    }
}

/// Parse `tokens`, returning the unit and the byte offset where parsing stopped.
pub(crate) fn parse_tokens(tokens: &[Token], resolver: Resolver<'_>) -> Result<(Unit, usize)> {
    let mut parser = Parser::new(tokens, resolver);
    let stop = parser.run()?;
    let unit = parser.finish()?;
    Ok((unit, stop))
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;
    use crate::registry::standard_registry;

    fn parse(reg: &UnitRegistry, input: &str) -> Result<(Unit, String)> {
        let tokens = tokenize(input)?;
        let (unit, stop) = parse_tokens(&tokens, Resolver::Lookup(reg))?;
        Ok((unit, input[stop..].trim_end().to_string()))
    }

    fn unit(reg: &UnitRegistry, name: &str) -> Unit {
        reg.lookup(name).unwrap()
    }

    #[test]
    fn test_precedence() {
        let reg = standard_registry(true).unwrap();
        let (u, rest) = parse(&reg, "kg*m/s^2").unwrap();
        assert_eq!(u, unit(&reg, "N"));
        assert!(rest.is_empty());

        let (u, _) = parse(&reg, "m/s*s").unwrap();
        assert_eq!(u, unit(&reg, "m"));

        let (u, _) = parse(&reg, "J/(mol*K)").unwrap();
        let expected = unit(&reg, "J").div(&unit(&reg, "mol")).div(&unit(&reg, "K"));
        assert_eq!(u, expected);
    }

    #[test]
    fn test_implicit_power_and_numbers() {
        let reg = standard_registry(true).unwrap();
        let (u, _) = parse(&reg, "in3").unwrap();
        assert_eq!(u, unit(&reg, "in").pow(3));
        let (u, _) = parse(&reg, "s-1").unwrap();
        assert_eq!(u, unit(&reg, "s").pow(-1));
        let (u, _) = parse(&reg, "1/s").unwrap();
        assert_eq!(u, unit(&reg, "s").pow(-1));
        let (u, _) = parse(&reg, "10^3*m").unwrap();
        assert_eq!(u, unit(&reg, "km"));
        assert!(matches!(parse(&reg, "3*m"), Err(Error::UnitSyntax { .. })));
    }

    #[test]
    fn test_trailing_text() {
        let reg = standard_registry(true).unwrap();
        let (u, rest) = parse(&reg, "mol H2O").unwrap();
        assert_eq!(u, unit(&reg, "mol"));
        assert_eq!(rest, "H2O");
        let (_, rest) = parse(&reg, "m) extra").unwrap();
        assert_eq!(rest, ") extra");
    }

    #[test]
    fn test_errors() {
        let reg = standard_registry(true).unwrap();
        assert!(matches!(parse(&reg, ""), Err(Error::UnitSyntax { position: 0, .. })));
        assert!(matches!(parse(&reg, "m/"), Err(Error::UnitSyntax { position: 2, .. })));
        assert!(matches!(parse(&reg, "(m"), Err(Error::UnitSyntax { .. })));
        assert!(matches!(parse(&reg, "m^s"), Err(Error::UnitSyntax { .. })));
        assert!(matches!(parse(&reg, "blargs"), Err(Error::UnknownUnit(_))));
    }

    #[test]
    fn test_create_unknown() {
        let mut reg = standard_registry(true).unwrap();
        let tokens = tokenize("widgets/s").unwrap();
        let (u, _) = parse_tokens(&tokens, Resolver::Create(&mut reg)).unwrap();
        let widgets = reg.lookup("widgets").unwrap();
        assert_eq!(u, widgets.div(&unit(&reg, "s")));
        assert!(reg.dimensionality(&widgets).unwrap().is_dimensionless());
    }
}
