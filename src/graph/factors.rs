//! Factor table loading.
//!
//! ```text
//! # comment
//! 1 in = 2.54 cm
//! 1 yd3 = (3 ft)**3
//! ```
//!
//! Each line states that two quantities are equal. The registered factor
//! is `rhs / lhs`, and its weight comes from the numeric kind of that
//! quotient.

use super::ConversionGraph;
use crate::model::Quantity;
use crate::parser::parse_unit_exact;
use crate::numeric::Number;
use crate::registry::UnitRegistry;
use crate::{Error, Result};

/// The built-in factor table.
pub const STANDARD_FACTORS: &str = include_str!("standard_factors.txt");

/// One parsed line of a factor table.
#[derive(Debug, Clone)]
pub struct FactorLine {
    /// 1-based line number
    pub line: usize,
    pub lhs: Quantity,
    pub rhs: Quantity,
}

impl FactorLine {
    /// `rhs / lhs`: how many right-hand units make one left-hand unit.
    pub fn factor(&self) -> Result<Number> {
        Ok(self.rhs.value.checked_div(&self.lhs.value)?)
    }
}

fn table_error(line: usize, message: impl Into<String>) -> Error {
    Error::FactorTable { line, message: message.into() }
}

/// `<number> <unit>`, or `(<number> <unit>)**<power>`.
fn parse_side(registry: &UnitRegistry, text: &str, line: usize) -> Result<Quantity> {
    let text = text.trim();
    if let Some(inner) = text.strip_prefix('(') {
        let (body, power) = inner
            .split_once(")**")
            .ok_or_else(|| table_error(line, format!("Expected `(quantity)**power`, got `{text}`")))?;
        let power: i32 = power
            .trim()
            .parse()
            .map_err(|_| table_error(line, format!("Invalid power `{}`", power.trim())))?;
        return parse_side(registry, body, line)?.checked_pow(power);
    }

    let (number, unit) = text
        .split_once(char::is_whitespace)
        .ok_or_else(|| table_error(line, format!("Expected `<number> <unit>`, got `{text}`")))?;
    let value = Number::parse_literal(number).map_err(|e| table_error(line, e.to_string()))?;
    let unit = parse_unit_exact(registry, unit.trim()).map_err(|e| table_error(line, e.to_string()))?;
    Ok(Quantity::new(value, unit.canonicalize()))
}

/// Parse a factor table. Blank lines and `#` comments are skipped.
pub fn parse_factor_table(registry: &UnitRegistry, text: &str) -> Result<Vec<FactorLine>> {
    let mut lines = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let body = raw.split('#').next().unwrap_or("").trim();
        if body.is_empty() {
            continue;
        }
        let (lhs, rhs) = body
            .split_once('=')
            .ok_or_else(|| table_error(line, "Expected `lhs = rhs`"))?;
        let lhs = parse_side(registry, lhs, line)?;
        let rhs = parse_side(registry, rhs, line)?;
        if lhs.value.is_zero() {
            return Err(table_error(line, "Left-hand quantity is zero"));
        }
        if rhs.value.is_zero() {
            return Err(table_error(line, "Right-hand quantity is zero"));
        }
        lines.push(FactorLine { line, lhs, rhs });
    }
    Ok(lines)
}

/// Parse `text` and register every line in `graph`. Returns the number of
/// factors registered.
pub fn load_factor_table(graph: &ConversionGraph, registry: &UnitRegistry, text: &str) -> Result<usize> {
    let lines = parse_factor_table(registry, text)?;
    for entry in &lines {
        let factor = entry.factor()?;
        graph
            .register(registry, &entry.lhs.unit, &entry.rhs.unit, factor, None)
            .map_err(|e| table_error(entry.line, e.to_string()))?;
    }
    Ok(lines.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::NumberKind;
    use crate::registry::standard_registry;

    #[test]
    fn test_parse_lines() {
        let reg = standard_registry(false).unwrap();
        let lines = parse_factor_table(&reg, "# header\n\n1 in = 2.54 cm  # exact\n1 yd3 = (3 ft)**3\n").unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line, 3);
        assert_eq!(lines[0].factor().unwrap().kind(), NumberKind::Decimal);
        assert_eq!(lines[1].factor().unwrap(), Number::from(27));
        assert_eq!(lines[1].rhs.unit, reg.lookup("ft").unwrap().pow(3));
    }

    #[test]
    fn test_factor_divides_lhs() {
        let reg = standard_registry(false).unwrap();
        let lines = parse_factor_table(&reg, "4 qt = 1 gal").unwrap();
        let expected = Number::from(1).checked_div(&Number::from(4)).unwrap();
        assert_eq!(lines[0].factor().unwrap(), expected);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let reg = standard_registry(false).unwrap();
        let err = parse_factor_table(&reg, "1 in = 2.54 cm\n1 in 2.54 cm").unwrap_err();
        assert!(matches!(err, Error::FactorTable { line: 2, .. }));
        let err = parse_factor_table(&reg, "1 in = 2.54 blargs").unwrap_err();
        assert!(matches!(err, Error::FactorTable { line: 1, .. }));
        let err = parse_factor_table(&reg, "1 yd3 = (3 ft)**x").unwrap_err();
        assert!(matches!(err, Error::FactorTable { line: 1, .. }));
    }

    #[test]
    fn test_zero_sides_rejected() {
        let reg = standard_registry(false).unwrap();
        let err = parse_factor_table(&reg, "1 in = 2.54 cm\n1 ft = 0 in").unwrap_err();
        assert!(matches!(err, Error::FactorTable { line: 2, .. }));
        let err = parse_factor_table(&reg, "0 ft = 12 in").unwrap_err();
        assert!(matches!(err, Error::FactorTable { line: 1, .. }));
    }

    #[test]
    fn test_prefix_only_line_rejected() {
        let reg = standard_registry(false).unwrap();
        let graph = ConversionGraph::new();
        let err = load_factor_table(&graph, &reg, "1 km = 1000 m").unwrap_err();
        assert!(matches!(err, Error::FactorTable { line: 1, .. }));
    }

    #[test]
    fn test_standard_table_loads_with_and_without_namespaces() {
        for namespaces in [false, true] {
            let reg = standard_registry(namespaces).unwrap();
            let graph = ConversionGraph::new();
            let count = load_factor_table(&graph, &reg, STANDARD_FACTORS).unwrap();
            assert_eq!(count, 29);
            assert_eq!(graph.factor_count(), 29);
        }
    }
}
