//! # Conversion
//!
//! [`convert`] picks a strategy for a quantity and a target unit:
//!
//! 1. same unit: identity
//! 2. different dimensionality: [`Error::IncompatibleUnits`]
//! 3. same unit up to prefix: prefix shift
//! 4. temperatures: affine table
//! 5. volumes whose units both belong to a measuring system: recipe table
//! 6. anything else: best path through the conversion graph
//!
//! Every strategy drives a [`Converter`], so all results come back as a
//! [`Conversion`] with the full list of terms.

mod converter;
mod record;
mod temperature;
mod volume;

pub use converter::{Conversion, Converter, Term};
pub use record::{ConversionRecord, RenderedQuantity, RenderedTerm};
pub use volume::VolumeSystem;

use tracing::debug;

use crate::graph::ConversionGraph;
use crate::model::{Quantity, Unit};
use crate::registry::UnitRegistry;
use crate::{Error, Result};

/// Convert `quantity` to `target`, choosing the strategy by dimensionality.
pub fn convert(registry: &UnitRegistry, graph: &ConversionGraph, quantity: &Quantity, target: &Unit) -> Result<Conversion> {
    if quantity.unit == *target {
        return Ok(Conversion::identity(quantity));
    }
    let dimensionality = registry.dimensionality(&quantity.unit)?;
    if dimensionality != registry.dimensionality(target)? {
        return Err(Error::IncompatibleUnits {
            from: registry.abbrev(&quantity.unit),
            to: registry.abbrev(target),
        });
    }
    if quantity.unit.without_prefix() == target.without_prefix() {
        return convert_prefix(registry, graph, quantity, target);
    }

    let mut conv = Converter::new(registry, graph, quantity);
    if registry.dimensionality_named("temperature") == Some(&dimensionality) {
        debug!(from = %registry.abbrev(&quantity.unit), to = %registry.abbrev(target), "temperature conversion");
        temperature::convert_temperature(&mut conv, target)?;
        return Ok(conv.finish());
    }
    if registry.dimensionality_named("volume") == Some(&dimensionality) {
        let systems = (VolumeSystem::of(registry, &quantity.unit), VolumeSystem::of(registry, target));
        if let (Some(from), Some(to)) = systems {
            debug!(?from, ?to, "volume conversion");
            volume::convert_volume(&mut conv, from, to, target)?;
            return Ok(conv.finish());
        }
    }
    conv.apply_path(target, 1)?;
    Ok(conv.finish())
}

/// Multiply `quantity` by `(numerator / denominator) ^ power`.
pub fn convert_factor(
    registry: &UnitRegistry,
    graph: &ConversionGraph,
    quantity: &Quantity,
    numerator: &Quantity,
    denominator: &Quantity,
    power: i32,
) -> Result<Conversion> {
    let mut conv = Converter::new(registry, graph, quantity);
    conv.apply_factor(numerator, denominator, power)?;
    Ok(conv.finish())
}

/// Rescale `quantity` to `target`, a differently prefixed form of the same
/// unit. A single atom raised to a power steps through the atom's own
/// prefixes (`cm^3` → `m^3` as `cm` → `m`, cubed).
pub fn convert_prefix(registry: &UnitRegistry, graph: &ConversionGraph, quantity: &Quantity, target: &Unit) -> Result<Conversion> {
    if quantity.unit == *target {
        return Ok(Conversion::identity(quantity));
    }
    let mut conv = Converter::new(registry, graph, quantity);
    let power = natural_power(&quantity.unit, target);
    conv.apply_prefix(target, power)?;
    Ok(conv.finish())
}

/// Convert along the best graph path, with prefix shifts at either end.
pub fn convert_by_path(registry: &UnitRegistry, graph: &ConversionGraph, quantity: &Quantity, target: &Unit) -> Result<Conversion> {
    if quantity.unit == *target {
        return Ok(Conversion::identity(quantity));
    }
    let mut conv = Converter::new(registry, graph, quantity);
    conv.apply_path(target, 1)?;
    Ok(conv.finish())
}

/// The exponent of a single-atom unit when both prefixes are exact roots
/// for it, otherwise 1.
fn natural_power(from: &Unit, to: &Unit) -> i32 {
    match (from.single_atom(), to.single_atom()) {
        (Some((a, e)), Some((b, f)))
            if a == b && e == f && e > 1 && from.prefix().root(e).is_some() && to.prefix().root(e).is_some() =>
        {
            e
        }
        _ => 1,
    }
}
