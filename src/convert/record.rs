//! Rendered conversion records.
//!
//! Plain strings handed to whatever draws the conversion equation. The
//! layout itself lives elsewhere.

use serde::{Deserialize, Serialize};

use super::converter::{Conversion, Term};
use crate::model::Quantity;
use crate::registry::UnitRegistry;
use crate::Result;

/// A value with its unit abbreviation and optional name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedQuantity {
    pub value: String,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedTerm {
    pub numerator: RenderedQuantity,
    pub denominator: Option<RenderedQuantity>,
    pub exponent: i32,
}

/// A whole conversion: `terms... = result`, with `offset` added after the
/// first `offset_after` terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub terms: Vec<RenderedTerm>,
    pub offset: Option<RenderedQuantity>,
    #[serde(default)]
    pub offset_after: usize,
    pub result: RenderedQuantity,
    pub poisoned: bool,
}

impl ConversionRecord {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl RenderedQuantity {
    pub fn render(registry: &UnitRegistry, quantity: &Quantity) -> Self {
        Self {
            value: quantity.value.to_string(),
            unit: registry.abbrev(&quantity.unit),
            name: quantity.name.clone(),
        }
    }
}

impl RenderedTerm {
    pub fn render(registry: &UnitRegistry, term: &Term) -> Self {
        Self {
            numerator: RenderedQuantity::render(registry, &term.numerator),
            denominator: term.denominator.as_ref().map(|d| RenderedQuantity::render(registry, d)),
            exponent: term.power,
        }
    }
}

impl Conversion {
    pub fn render(&self, registry: &UnitRegistry) -> ConversionRecord {
        ConversionRecord {
            terms: self.terms.iter().map(|t| RenderedTerm::render(registry, t)).collect(),
            offset: self.offset.as_ref().map(|o| RenderedQuantity::render(registry, o)),
            offset_after: self.offset_after,
            result: RenderedQuantity::render(registry, &self.result),
            poisoned: self.poisoned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::Number;
    use crate::registry::standard_registry;

    #[test]
    fn test_render_quantity() {
        let reg = standard_registry(true).unwrap();
        let q = Quantity::new(Number::parse_literal("2.50").unwrap(), reg.lookup("mg").unwrap()).with_name("NaCl");
        let r = RenderedQuantity::render(&reg, &q);
        assert_eq!(r.unit, "mg");
        assert_eq!(r.name.as_deref(), Some("NaCl"));
    }

    #[test]
    fn test_dne_renders() {
        let reg = standard_registry(true).unwrap();
        let q = Quantity::new(Number::Dne, reg.lookup("in").unwrap());
        assert_eq!(RenderedQuantity::render(&reg, &q).value, "d.n.e.");
    }
}
