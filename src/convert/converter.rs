//! The conversion accumulator.
//!
//! A [`Converter`] holds a running quantity and the ordered list of terms
//! multiplied into it. It moves from accumulating to poisoned when a term
//! produces [`Number::Dne`]; once poisoned every further step is skipped.
//! [`Converter::finish`] consumes it.

use tracing::{trace, warn};

use crate::graph::ConversionGraph;
use crate::model::{Quantity, Unit};
use crate::numeric::Number;
use crate::registry::UnitRegistry;
use crate::{Error, Result};

/// One multiplicative term: `(numerator / denominator) ^ power`.
///
/// The first term of a conversion is the starting quantity itself, with no
/// denominator.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub numerator: Quantity,
    pub denominator: Option<Quantity>,
    pub power: i32,
}

/// Finished conversion, ready for rendering.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Converted quantity; its value is [`Number::Dne`] when poisoned
    pub result: Quantity,
    pub terms: Vec<Term>,
    /// Additive offset (temperature scales)
    pub offset: Option<Quantity>,
    /// Number of terms multiplied in before the offset was added
    pub offset_after: usize,
    pub poisoned: bool,
}

impl Conversion {
    /// A conversion that changes nothing.
    pub fn identity(quantity: &Quantity) -> Self {
        Self {
            result: quantity.clone(),
            terms: Vec::new(),
            offset: None,
            offset_after: 0,
            poisoned: quantity.is_dne(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Accumulating,
    Poisoned,
}

/// Stateful builder for one conversion request.
pub struct Converter<'a> {
    registry: &'a UnitRegistry,
    graph: &'a ConversionGraph,
    current: Quantity,
    terms: Vec<Term>,
    offset: Option<Quantity>,
    offset_after: usize,
    name: Option<String>,
    state: State,
}

impl<'a> Converter<'a> {
    /// Start from `quantity`, recorded as the first term.
    pub fn new(registry: &'a UnitRegistry, graph: &'a ConversionGraph, quantity: &Quantity) -> Self {
        let seed = Quantity::new(quantity.value.clone(), quantity.unit.canonicalize());
        let state = if seed.is_dne() { State::Poisoned } else { State::Accumulating };
        Self {
            registry,
            graph,
            current: seed.clone(),
            terms: vec![Term { numerator: seed, denominator: None, power: 1 }],
            offset: None,
            offset_after: 0,
            name: quantity.name.clone(),
            state,
        }
    }

    pub fn current(&self) -> &Quantity {
        &self.current
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn is_poisoned(&self) -> bool {
        self.state == State::Poisoned
    }

    pub(crate) fn registry(&self) -> &'a UnitRegistry {
        self.registry
    }

    fn poison(&mut self) {
        warn!(unit = %self.registry.abbrev(&self.current.unit), terms = self.terms.len(), "conversion poisoned by undefined result");
        self.state = State::Poisoned;
    }

    /// Multiply by `(numerator / denominator) ^ power`.
    pub fn apply_factor(&mut self, numerator: &Quantity, denominator: &Quantity, power: i32) -> Result<&mut Self> {
        if self.is_poisoned() {
            return Ok(self);
        }
        self.terms.push(Term {
            numerator: numerator.clone(),
            denominator: Some(denominator.clone()),
            power,
        });

        let mut factor = numerator.checked_div(denominator)?;
        if power != 1 {
            factor = factor.checked_pow(power)?;
        }
        let product = self.current.checked_mul(&factor)?;
        if product.is_dne() {
            self.current.value = Number::Dne;
            self.poison();
            return Ok(self);
        }
        self.current = product;
        trace!(
            factor = %factor.value,
            value = %self.current.value,
            unit = %self.registry.abbrev(&self.current.unit),
            "applied term"
        );
        Ok(self)
    }

    /// Rescale to `target`, which differs from the current unit only by
    /// prefix. With `power > 1` both units must be that power of a single
    /// atom (`cm^3` → `m^3` steps through `cm` → `m` cubed).
    ///
    /// The shift is recorded as ×1000 and ×10/×100 steps through the
    /// intermediate prefixes; the value itself is shifted exactly once.
    pub fn apply_prefix(&mut self, target: &Unit, power: i32) -> Result<&mut Self> {
        if self.is_poisoned() {
            return Ok(self);
        }
        let from = self.powered_unit(&self.current.unit, power)?;
        let to = self.powered_unit(target, power)?;
        if from.without_prefix() != to.without_prefix() {
            return Err(Error::IncompatibleUnits {
                from: self.registry.abbrev(&from),
                to: self.registry.abbrev(&to),
            });
        }

        let delta = to.prefix().power() - from.prefix().power();
        let value = self.current.value.scale_pow10(-delta * power)?;

        let sign = delta.signum();
        let small = delta.abs() % 3;
        let mut steps = [(3, delta.abs() / 3), (small, i32::from(small != 0))];
        if from.prefix().power().rem_euclid(3) != 0 {
            steps.reverse();
        }

        let mut unit = from;
        for (places, count) in steps {
            let factor = Number::from(10i64.pow(places as u32));
            for _ in 0..count {
                let next = unit.shift_prefix(places * sign);
                let (numerator, denominator) = if sign < 0 {
                    (Quantity::new(factor.clone(), next.clone()), Quantity::new(1, unit.clone()))
                } else {
                    (Quantity::new(1, next.clone()), Quantity::new(factor.clone(), unit.clone()))
                };
                self.terms.push(Term { numerator, denominator: Some(denominator), power });
                unit = next;
            }
        }

        self.current = Quantity::new(value, to.pow(power).canonicalize());
        trace!(delta, power, value = %self.current.value, "applied prefix shift");
        Ok(self)
    }

    /// Follow the best graph path to `target`, rescaling prefixes at either
    /// end of the path.
    pub fn apply_path(&mut self, target: &Unit, power: i32) -> Result<&mut Self> {
        if self.is_poisoned() {
            return Ok(self);
        }
        let from = self.powered_unit(&self.current.unit, power)?;
        let to = self.powered_unit(target, power)?;
        let path = self.graph.find_best_path(self.registry, &from, &to)?;

        if path.from_delta != 0 {
            self.apply_prefix(&path.origin.pow(power), power)?;
        }
        let mut unit = path.origin.clone();
        for step in &path.steps {
            let (numerator, denominator) = if step.inverted {
                (Quantity::new(1, step.unit.clone()), Quantity::new(step.factor.clone(), unit.clone()))
            } else {
                (Quantity::new(step.factor.clone(), step.unit.clone()), Quantity::new(1, unit.clone()))
            };
            self.apply_factor(&numerator, &denominator, power)?;
            if self.is_poisoned() {
                return Ok(self);
            }
            unit = step.unit.clone();
        }
        if path.to_delta != 0 {
            self.apply_prefix(&to.pow(power), power)?;
        }
        Ok(self)
    }

    /// Add a constant in the current unit (affine scales). The record keeps
    /// its place among the terms.
    pub fn apply_offset(&mut self, offset: &Quantity) -> Result<&mut Self> {
        if self.is_poisoned() {
            return Ok(self);
        }
        let value = self.current.value.checked_add(&offset.value)?;
        self.current = Quantity::new(value, self.current.unit.clone());
        self.offset = Some(offset.clone());
        self.offset_after = self.terms.len();
        trace!(offset = %offset.value, value = %self.current.value, "applied offset");
        if self.current.is_dne() {
            self.poison();
        }
        Ok(self)
    }

    /// The `power`-th root of a single-atom unit: `cm^3` with power 3 is `cm`.
    pub fn powered_unit(&self, unit: &Unit, power: i32) -> Result<Unit> {
        if power == 1 {
            return Ok(unit.canonicalize());
        }
        let not_a_power = || Error::NotAPower { unit: self.registry.abbrev(unit), power };
        let (id, exp) = unit.single_atom().ok_or_else(not_a_power)?;
        let prefix = unit.prefix().root(power).ok_or_else(not_a_power)?;
        if exp != power {
            return Err(not_a_power());
        }
        Ok(Unit::primitive(id).with_prefix(prefix))
    }

    pub fn finish(self) -> Conversion {
        let poisoned = self.is_poisoned();
        let mut result = self.current;
        if poisoned {
            result.value = Number::Dne;
        }
        result.name = self.name;
        Conversion {
            result,
            terms: self.terms,
            offset: self.offset,
            offset_after: self.offset_after,
            poisoned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{load_factor_table, STANDARD_FACTORS};
    use crate::registry::standard_registry;

    fn setup() -> (UnitRegistry, ConversionGraph) {
        let reg = standard_registry(true).unwrap();
        let graph = ConversionGraph::new();
        load_factor_table(&graph, &reg, STANDARD_FACTORS).unwrap();
        (reg, graph)
    }

    fn q(reg: &UnitRegistry, text: &str) -> Quantity {
        crate::parser::parse_quantity(reg, text).unwrap()
    }

    fn u(reg: &UnitRegistry, name: &str) -> Unit {
        reg.lookup(name).unwrap()
    }

    #[test]
    fn test_seed_term() {
        let (reg, graph) = setup();
        let conv = Converter::new(&reg, &graph, &q(&reg, "3 ft"));
        assert_eq!(conv.terms().len(), 1);
        assert!(conv.terms()[0].denominator.is_none());
        assert!(!conv.is_poisoned());
    }

    #[test]
    fn test_apply_factor() {
        let (reg, graph) = setup();
        let mut conv = Converter::new(&reg, &graph, &q(&reg, "3 ft"));
        conv.apply_factor(&q(&reg, "12 in"), &q(&reg, "1 ft"), 1).unwrap();
        let done = conv.finish();
        assert_eq!(done.result.value, Number::from(36));
        assert_eq!(done.result.unit, u(&reg, "in"));
        assert_eq!(done.terms.len(), 2);
    }

    #[test]
    fn test_prefix_steps() {
        let (reg, graph) = setup();
        let mut conv = Converter::new(&reg, &graph, &q(&reg, "5 km"));
        conv.apply_prefix(&u(&reg, "cm"), 1).unwrap();
        let done = conv.finish();
        assert_eq!(done.result.value, Number::from(500000));
        assert_eq!(done.result.unit, u(&reg, "cm"));
        // km -> m (x1000), m -> cm (x100)
        assert_eq!(done.terms.len(), 3);
        assert_eq!(done.terms[1].numerator.value, Number::from(1000));
        assert_eq!(done.terms[2].numerator.value, Number::from(100));
    }

    #[test]
    fn test_prefix_steps_start_off_grid() {
        let (reg, graph) = setup();
        let mut conv = Converter::new(&reg, &graph, &q(&reg, "7 cm"));
        conv.apply_prefix(&u(&reg, "km"), 1).unwrap();
        let done = conv.finish();
        assert_eq!(done.result.value, Number::parse_literal("0.00007").unwrap());
        // cm -> m first, then m -> km
        assert_eq!(done.terms[1].denominator.as_ref().unwrap().value, Number::from(100));
        assert_eq!(done.terms[2].denominator.as_ref().unwrap().value, Number::from(1000));
    }

    #[test]
    fn test_prefix_with_power() {
        let (reg, graph) = setup();
        let m3 = u(&reg, "m").pow(3);
        let mut conv = Converter::new(&reg, &graph, &q(&reg, "2 cc"));
        conv.apply_prefix(&m3, 3).unwrap();
        let done = conv.finish();
        assert_eq!(done.result.value, Number::parse_literal("0.000002").unwrap());
        assert_eq!(done.result.unit, m3);
        assert_eq!(done.terms[1].power, 3);
    }

    #[test]
    fn test_powered_unit() {
        let (reg, graph) = setup();
        let conv = Converter::new(&reg, &graph, &q(&reg, "1 m"));
        assert_eq!(conv.powered_unit(&u(&reg, "cc"), 3).unwrap(), u(&reg, "cm"));
        assert!(matches!(conv.powered_unit(&u(&reg, "N"), 3), Err(Error::NotAPower { .. })));
        assert!(matches!(conv.powered_unit(&u(&reg, "m").pow(2), 3), Err(Error::NotAPower { .. })));
    }

    #[test]
    fn test_apply_path_with_prefixes() {
        let (reg, graph) = setup();
        let mut conv = Converter::new(&reg, &graph, &q(&reg, "1 ft"));
        conv.apply_path(&u(&reg, "cm"), 1).unwrap();
        let done = conv.finish();
        assert_eq!(done.result.value, Number::parse_literal("30.48").unwrap());
        assert_eq!(done.result.unit, u(&reg, "cm"));
        // seed, ft->in, in->m, m->cm
        assert_eq!(done.terms.len(), 4);
    }

    #[test]
    fn test_poison_short_circuits() {
        let (reg, graph) = setup();
        let mut conv = Converter::new(&reg, &graph, &q(&reg, "3 ft"));
        conv.apply_factor(&q(&reg, "12 in"), &q(&reg, "0 ft"), 1).unwrap();
        assert!(conv.is_poisoned());
        conv.apply_factor(&q(&reg, "1 ft"), &q(&reg, "12 in"), 1).unwrap();
        conv.apply_path(&u(&reg, "cm"), 1).unwrap();
        let done = conv.finish();
        assert!(done.poisoned);
        assert!(done.result.is_dne());
        // the unit before the undefined step
        assert_eq!(done.result.unit, u(&reg, "ft"));
        assert_eq!(done.terms.len(), 2);
    }

    #[test]
    fn test_name_survives() {
        let (reg, graph) = setup();
        let mut conv = Converter::new(&reg, &graph, &q(&reg, "2 mol H2O"));
        conv.apply_prefix(&u(&reg, "mmol"), 1).unwrap();
        let done = conv.finish();
        assert_eq!(done.result.name.as_deref(), Some("H2O"));
        assert_eq!(done.result.value, Number::from(2000));
    }
}
