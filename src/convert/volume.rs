//! Volumes across measuring systems.
//!
//! Liters, cubic meters, cubic inches/feet/yards and US liquid measure form
//! four systems that meet only at a few exact bridges (`1 mL = 1 cc`,
//! `1 in = 2.54 cm`, `1 floz = 1.8046875 in3`). Every pair of systems has a
//! fixed recipe of prefix, factor and path steps routed through those
//! bridges. The table is a closed heuristic, not a general search.

use super::converter::Converter;
use crate::model::Unit;
use crate::parser::{parse_quantity, parse_unit_exact};
use crate::registry::UnitRegistry;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeSystem {
    Liter,
    Metric,
    ImperialGas,
    ImperialLiquid,
}

const MEMBERS: &[(VolumeSystem, &[&str])] = &[
    (VolumeSystem::Liter, &["L"]),
    (VolumeSystem::Metric, &["m3"]),
    (VolumeSystem::ImperialGas, &["in3", "ft3", "yd3"]),
    (VolumeSystem::ImperialLiquid, &["floz", "pt", "qt", "gal"]),
];

impl VolumeSystem {
    /// System of `unit`, ignoring its prefix.
    pub fn of(registry: &UnitRegistry, unit: &Unit) -> Option<VolumeSystem> {
        let bare = unit.without_prefix();
        MEMBERS.iter().find_map(|(system, members)| {
            members
                .iter()
                .filter_map(|text| parse_unit_exact(registry, text).ok())
                .any(|member| member.without_prefix() == bare)
                .then_some(*system)
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Target {
    /// The unit being converted to
    Goal,
    To(&'static str),
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Prefix(Target, i32),
    /// `(numerator / denominator) ^ power`
    Factor(&'static str, &'static str, i32),
    Path(Target, i32),
}

use Step::{Factor, Path, Prefix};
use Target::{Goal, To};

const LITER_TO_CC: [Step; 2] = [Prefix(To("mL"), 1), Factor("1 cc", "1 mL", 1)];
const CC_TO_LITER: [Step; 2] = [Prefix(To("cm3"), 3), Factor("1 mL", "1 cc", 1)];
const CC_TO_IN3: [Step; 2] = [Prefix(To("cm3"), 3), Factor("1 in", "2.54 cm", 3)];
const IN3_TO_CC: [Step; 2] = [Prefix(To("in3"), 3), Factor("2.54 cm", "1 in", 3)];
const FLOZ_TO_IN3: [Step; 2] = [Path(To("floz"), 1), Factor("1.8046875 in3", "1 floz", 1)];
const ML_TO_LIQUID: [Step; 3] = [Prefix(To("mL"), 1), Factor("1 floz", "29.5735295625 mL", 1), Path(Goal, 1)];

fn chain(parts: &[&[Step]]) -> Vec<Step> {
    parts.iter().flat_map(|p| p.iter().copied()).collect()
}

fn recipe(from: VolumeSystem, to: VolumeSystem) -> Vec<Step> {
    use VolumeSystem::*;
    match (from, to) {
        (Liter, Liter) => chain(&[&[Prefix(Goal, 1)]]),
        (Liter, Metric) => chain(&[&LITER_TO_CC, &[Prefix(Goal, 3)]]),
        (Liter, ImperialGas) => chain(&[&LITER_TO_CC, &CC_TO_IN3, &[Path(Goal, 3)]]),
        (Liter, ImperialLiquid) => chain(&[&ML_TO_LIQUID]),

        (Metric, Metric) => chain(&[&[Prefix(Goal, 3)]]),
        (Metric, Liter) => chain(&[&CC_TO_LITER, &[Prefix(Goal, 1)]]),
        (Metric, ImperialGas) => chain(&[&CC_TO_IN3, &[Path(Goal, 3)]]),
        (Metric, ImperialLiquid) => chain(&[&CC_TO_LITER, &ML_TO_LIQUID]),

        (ImperialGas, ImperialGas) => chain(&[&[Path(Goal, 3)]]),
        (ImperialGas, Liter) => chain(&[&[Path(To("in3"), 3)], &IN3_TO_CC, &CC_TO_LITER, &[Prefix(Goal, 1)]]),
        (ImperialGas, Metric) => chain(&[&[Path(To("in3"), 3)], &IN3_TO_CC, &[Prefix(Goal, 3)]]),
        (ImperialGas, ImperialLiquid) => {
            chain(&[&[Path(To("in3"), 3), Factor("1 floz", "1.8046875 in3", 1), Path(Goal, 1)]])
        }

        (ImperialLiquid, ImperialLiquid) => chain(&[&[Path(Goal, 1)]]),
        (ImperialLiquid, Liter) => chain(&[&FLOZ_TO_IN3, &IN3_TO_CC, &CC_TO_LITER, &[Prefix(Goal, 1)]]),
        (ImperialLiquid, Metric) => chain(&[&FLOZ_TO_IN3, &IN3_TO_CC, &[Prefix(Goal, 3)]]),
        (ImperialLiquid, ImperialGas) => chain(&[&FLOZ_TO_IN3, &[Path(Goal, 3)]]),
    }
}

/// Convert the converter's current volume to `target` by the recipe for
/// the two units' systems.
pub(crate) fn convert_volume(conv: &mut Converter<'_>, from: VolumeSystem, to: VolumeSystem, target: &Unit) -> Result<()> {
    let registry = conv.registry();
    let resolve = |t: Target| -> Result<Unit> {
        match t {
            Goal => Ok(target.clone()),
            To(text) => parse_unit_exact(registry, text),
        }
    };

    for step in recipe(from, to) {
        if conv.is_poisoned() {
            break;
        }
        match step {
            Prefix(t, power) => {
                conv.apply_prefix(&resolve(t)?, power)?;
            }
            Factor(numerator, denominator, power) => {
                let numerator = parse_quantity(registry, numerator)?;
                let denominator = parse_quantity(registry, denominator)?;
                conv.apply_factor(&numerator, &denominator, power)?;
            }
            Path(t, power) => {
                conv.apply_path(&resolve(t)?, power)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{load_factor_table, ConversionGraph, STANDARD_FACTORS};
    use crate::model::Quantity;
    use crate::numeric::Number;
    use crate::registry::standard_registry;

    fn setup() -> (UnitRegistry, ConversionGraph) {
        let reg = standard_registry(true).unwrap();
        let graph = ConversionGraph::new();
        load_factor_table(&graph, &reg, STANDARD_FACTORS).unwrap();
        (reg, graph)
    }

    fn run(reg: &UnitRegistry, graph: &ConversionGraph, text: &str, to: &str) -> Quantity {
        let quantity = parse_quantity(reg, text).unwrap();
        let target = parse_unit_exact(reg, to).unwrap();
        let from = VolumeSystem::of(reg, &quantity.unit).unwrap();
        let to = VolumeSystem::of(reg, &target).unwrap();
        let mut conv = Converter::new(reg, graph, &quantity);
        convert_volume(&mut conv, from, to, &target).unwrap();
        conv.finish().result
    }

    #[test]
    fn test_systems() {
        let (reg, _) = setup();
        let of = |text: &str| VolumeSystem::of(&reg, &parse_unit_exact(&reg, text).unwrap());
        assert_eq!(of("mL"), Some(VolumeSystem::Liter));
        assert_eq!(of("cc"), Some(VolumeSystem::Metric));
        assert_eq!(of("ft3"), Some(VolumeSystem::ImperialGas));
        assert_eq!(of("gal"), Some(VolumeSystem::ImperialLiquid));
        assert_eq!(of("m"), None);
    }

    #[test]
    fn test_gallon_to_liters() {
        let (reg, graph) = setup();
        let result = run(&reg, &graph, "1 gal", "L");
        assert_eq!(result.value, Number::parse_literal("3.785411784").unwrap());
        assert_eq!(result.unit, reg.lookup("L").unwrap());
    }

    #[test]
    fn test_liters_to_cubic_meters() {
        let (reg, graph) = setup();
        let result = run(&reg, &graph, "2500 mL", "m3");
        assert_eq!(result.value, Number::parse_literal("0.0025").unwrap());
    }

    #[test]
    fn test_cubic_feet_to_cubic_inches() {
        let (reg, graph) = setup();
        let result = run(&reg, &graph, "1 ft3", "in3");
        assert_eq!(result.value, Number::from(1728));
    }

    #[test]
    fn test_gas_to_liquid() {
        let (reg, graph) = setup();
        let result = run(&reg, &graph, "231 in3", "gal");
        assert_eq!(result.value, Number::from(1));
    }

    #[test]
    fn test_liquid_to_liquid() {
        let (reg, graph) = setup();
        let result = run(&reg, &graph, "3 gal", "pt");
        assert_eq!(result.value, Number::from(24));
    }
}
