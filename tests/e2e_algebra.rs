//! Property tests for unit algebra, number arithmetic and conversions that
//! must undo each other.

use proptest::prelude::*;
use unit_graph::{Number, Prefix, Unit, UnitSystem};

const ATOMS: &[&str] = &["m", "g", "s", "ft", "lb", "min", "L", "mol", "K"];
const LENGTHS: &[&str] = &["mm", "cm", "m", "km", "in", "ft", "yd", "mi", "furlong"];
const MASSES: &[&str] = &["mg", "g", "kg", "oz", "lb", "st", "t"];
const VOLUMES: &[&str] = &["mL", "L", "cc", "m3", "in3", "ft3", "floz", "pt", "qt", "gal"];

fn system() -> &'static UnitSystem {
    unit_graph::standard()
}

/// A product of up to four atoms with small exponents and a random prefix.
fn arb_unit() -> impl Strategy<Value = Unit> {
    (prop::collection::vec((0..ATOMS.len(), -3i32..=3), 0..4), -9i32..=9).prop_map(|(parts, prefix)| {
        let s = system();
        parts
            .into_iter()
            .fold(Unit::dimensionless(), |acc, (i, e)| acc.mul(&s.unit(ATOMS[i]).unwrap().pow(e)))
            .with_prefix(Prefix::from_power(prefix))
    })
}

fn arb_exact() -> impl Strategy<Value = Number> {
    prop_oneof![
        (-100_000i64..100_000).prop_map(Number::from),
        (-100_000i64..100_000, 0u32..6).prop_map(|(m, scale)| {
            Number::from(rust_decimal::Decimal::new(m, scale))
        }),
    ]
}

fn pair(units: &'static [&'static str]) -> impl Strategy<Value = (&'static str, &'static str)> {
    (prop::sample::select(units), prop::sample::select(units))
}

proptest! {
    // ------------------------------------------------------------------------
    // Units
    // ------------------------------------------------------------------------

    #[test]
    fn canonicalize_is_idempotent(unit in arb_unit()) {
        let once = unit.canonicalize();
        let twice = once.canonicalize();
        prop_assert!(once.is_canonical());
        prop_assert_eq!(once.primitive_atoms(), twice.primitive_atoms());
        prop_assert_eq!(once.prefix(), twice.prefix());
        prop_assert_eq!(&once, &unit);
    }

    #[test]
    fn unit_over_itself_is_dimensionless(unit in arb_unit()) {
        prop_assert!(unit.div(&unit).has_no_atoms());
    }

    #[test]
    fn dimensionality_is_multiplicative(a in arb_unit(), b in arb_unit()) {
        let reg = system().registry();
        let product = reg.dimensionality(&a.mul(&b)).unwrap();
        let expected = reg.dimensionality(&a).unwrap().mul(&reg.dimensionality(&b).unwrap());
        prop_assert_eq!(product, expected);
    }

    // ------------------------------------------------------------------------
    // Numbers
    // ------------------------------------------------------------------------

    #[test]
    fn exact_division_undoes_multiplication(a in arb_exact(), b in arb_exact()) {
        prop_assume!(!b.is_zero());
        let back = a.checked_mul(&b).unwrap().checked_div(&b).unwrap();
        prop_assert_eq!(back, a);
    }

    #[test]
    fn scale_pow10_round_trips(a in arb_exact(), exp in -12i32..12) {
        let back = a.scale_pow10(exp).unwrap().scale_pow10(-exp).unwrap();
        prop_assert_eq!(back, a);
    }

    // ------------------------------------------------------------------------
    // Conversions
    // ------------------------------------------------------------------------

    #[test]
    fn length_conversions_round_trip((from, to) in pair(LENGTHS), value in arb_exact()) {
        let s = system();
        let q = unit_graph::Quantity::new(value.clone(), s.unit(from).unwrap());
        let there = s.convert(&q, &s.unit(to).unwrap()).unwrap().result;
        let back = s.convert(&there, &s.unit(from).unwrap()).unwrap().result;
        prop_assert_eq!(back.value, value);
    }

    #[test]
    fn mass_conversions_round_trip((from, to) in pair(MASSES), value in arb_exact()) {
        let s = system();
        let q = unit_graph::Quantity::new(value.clone(), s.unit(from).unwrap());
        let there = s.convert(&q, &s.unit(to).unwrap()).unwrap().result;
        let back = s.convert(&there, &s.unit(from).unwrap()).unwrap().result;
        prop_assert_eq!(back.value, value);
    }

    #[test]
    fn volume_conversions_round_trip((from, to) in pair(VOLUMES), value in arb_exact()) {
        let s = system();
        let q = unit_graph::Quantity::new(value.clone(), s.unit(from).unwrap());
        let there = s.convert(&q, &s.unit(to).unwrap()).unwrap().result;
        let back = s.convert(&there, &s.unit(from).unwrap()).unwrap().result;
        prop_assert_eq!(back.value, value);
    }

    #[test]
    fn best_path_factors_are_reciprocal((from, to) in pair(LENGTHS)) {
        let s = system();
        let (a, b) = (s.unit(from).unwrap(), s.unit(to).unwrap());
        let there = s.find_best_path(&a, &b).unwrap();
        let back = s.find_best_path(&b, &a).unwrap();
        prop_assert_eq!(there.len(), back.len());
        prop_assert!(there.factor().unwrap().checked_mul(&back.factor().unwrap()).unwrap().is_one());
    }
}
