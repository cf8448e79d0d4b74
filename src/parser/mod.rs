//! # Unit and Quantity Parsing
//!
//! Text → [`Unit`] and text → [`Quantity`]. Pure functions over a
//! [`UnitRegistry`]; the only mutation is [`parse_unit_creating`], which
//! registers names it has never seen.

pub mod lexer;
pub mod parser;

use crate::model::{Quantity, Unit};
use crate::numeric::Number;
use crate::registry::UnitRegistry;
use crate::{Error, Result};
use parser::Resolver;

/// Parse a unit expression, returning the unit and any trailing text.
///
/// ```rust
/// let reg = unit_graph::registry::standard_registry(true)?;
/// let (unit, rest) = unit_graph::parser::parse_unit(&reg, "kg*m/s^2 of thrust")?;
/// assert_eq!(reg.abbrev(&unit), "N");
/// assert_eq!(rest, "of thrust");
/// # Ok::<(), unit_graph::Error>(())
/// ```
pub fn parse_unit(registry: &UnitRegistry, text: &str) -> Result<(Unit, String)> {
    let tokens = lexer::tokenize(text)?;
    let (unit, stop) = parser::parse_tokens(&tokens, Resolver::Lookup(registry))?;
    Ok((unit, trailing(text, stop)))
}

fn trailing(text: &str, stop: usize) -> String {
    text.get(stop..).unwrap_or("").trim_end().to_string()
}

/// Like [`parse_unit`], but unknown names become new dimensionless units.
pub fn parse_unit_creating(registry: &mut UnitRegistry, text: &str) -> Result<(Unit, String)> {
    let tokens = lexer::tokenize(text)?;
    let (unit, stop) = parser::parse_tokens(&tokens, Resolver::Create(registry))?;
    Ok((unit, trailing(text, stop)))
}

/// Parse a unit expression that must span the whole input.
pub fn parse_unit_exact(registry: &UnitRegistry, text: &str) -> Result<Unit> {
    let tokens = lexer::tokenize(text)?;
    let (unit, stop) = parser::parse_tokens(&tokens, Resolver::Lookup(registry))?;
    let rest = trailing(text, stop);
    if rest.is_empty() {
        Ok(unit)
    } else {
        Err(Error::UnitSyntax { position: stop, message: format!("Unexpected trailing text: {rest}") })
    }
}

/// Parse `<number> [<unit>] [<name>]`, e.g. `2.54 cm`, `1.20s mol H2O`, `12`.
///
/// The number ends at the first whitespace. Whatever follows the unit
/// expression becomes the quantity's name.
pub fn parse_quantity(registry: &UnitRegistry, text: &str) -> Result<Quantity> {
    let text = text.trim();
    let (number, rest) = match text.split_once(char::is_whitespace) {
        Some((number, rest)) => (number, rest.trim()),
        None => (text, ""),
    };
    let value = Number::parse_literal(number)?;
    if rest.is_empty() {
        return Ok(Quantity::scalar(value));
    }
    let (unit, trailing) = parse_unit(registry, rest)?;
    let quantity = Quantity::new(value, unit.canonicalize());
    Ok(if trailing.is_empty() { quantity } else { quantity.with_name(trailing) })
}
