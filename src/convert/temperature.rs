//! Temperature scales.
//!
//! Kelvin, centigrade and fahrenheit are related by `to = from * mul / div + offset`,
//! which no single graph factor can express. Each pair is tabled once; the
//! reverse direction undoes it as `from = (to - offset) * div / mul`, taking
//! the offset off before scaling so decimal readings stay decimal.

use super::converter::Converter;
use crate::model::{Quantity, Unit};
use crate::numeric::Number;
use crate::{Error, Result};

struct Affine {
    from: &'static str,
    to: &'static str,
    mul: i64,
    div: i64,
    offset: &'static str,
}

const AFFINE: &[Affine] = &[
    Affine { from: "K", to: "C", mul: 1, div: 1, offset: "-273.15" },
    Affine { from: "K", to: "F", mul: 9, div: 5, offset: "-459.67" },
    Affine { from: "C", to: "F", mul: 9, div: 5, offset: "32" },
];

/// Convert the converter's current temperature to `target`.
pub(crate) fn convert_temperature(conv: &mut Converter<'_>, target: &Unit) -> Result<()> {
    let registry = conv.registry();
    let lookup = |abbrev: &str| registry.lookup(abbrev).ok_or_else(|| Error::UnknownUnit(abbrev.to_string()));
    let from = conv.current().unit.clone();

    for entry in AFFINE {
        let (a, b) = (lookup(entry.from)?, lookup(entry.to)?);
        let offset = Number::parse_literal(entry.offset)?;
        if from == a && *target == b {
            return apply(conv, entry.mul, entry.div, offset, &a, &b);
        }
        if from == b && *target == a {
            return unapply(conv, entry.mul, entry.div, offset, &a, &b);
        }
    }
    Err(Error::NoConversionPath { from: registry.abbrev(&from), to: registry.abbrev(target) })
}

/// `a -> b`: scale, then shift.
fn apply(conv: &mut Converter<'_>, mul: i64, div: i64, offset: Number, a: &Unit, b: &Unit) -> Result<()> {
    conv.apply_factor(&Quantity::new(mul, b.clone()), &Quantity::new(div, a.clone()), 1)?;
    conv.apply_offset(&Quantity::new(offset, b.clone()))?;
    Ok(())
}

/// `b -> a`: shift back, then scale back.
fn unapply(conv: &mut Converter<'_>, mul: i64, div: i64, offset: Number, a: &Unit, b: &Unit) -> Result<()> {
    conv.apply_offset(&Quantity::new(offset.neg(), b.clone()))?;
    conv.apply_factor(&Quantity::new(div, a.clone()), &Quantity::new(mul, b.clone()), 1)?;
    Ok(())
}
