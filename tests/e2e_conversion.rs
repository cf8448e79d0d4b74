//! End-to-end conversion tests against the standard unit system.
//!
//! Each test goes text -> quantity/unit -> convert -> result, through
//! `UnitSystem` only.

use pretty_assertions::assert_eq;
use unit_graph::{Error, Number, Quantity, UnitSystem};

fn system() -> &'static UnitSystem {
    unit_graph::standard()
}

fn n(text: &str) -> Number {
    Number::parse_literal(text).unwrap()
}

fn convert(text: &str, to: &str) -> Quantity {
    let s = system();
    let quantity = s.quantity(text).unwrap();
    s.convert(&quantity, &s.unit(to).unwrap()).unwrap().result
}

// ============================================================================
// 1. Path conversions
// ============================================================================

#[test]
fn test_feet_to_centimeters() {
    let result = convert("1 ft", "cm");
    assert_eq!(result.value, n("30.48"));
    assert_eq!(system().registry().abbrev(&result.unit), "cm");
}

#[test]
fn test_pounds_to_kilograms() {
    let result = convert("1 lb", "kg");
    assert_eq!(result.value, n("0.453592368"));
}

#[test]
fn test_hours_to_seconds() {
    assert_eq!(convert("2 hr", "s").value, Number::from(7200));
    assert_eq!(convert("1 week", "min").value, Number::from(10080));
}

#[test]
fn test_pressure() {
    assert_eq!(convert("1 atm", "kPa").value, n("101.325"));
    assert_eq!(convert("2 bar", "Pa").value, Number::from(200000));
}

#[test]
fn test_moles_to_quantity() {
    assert_eq!(convert("2 mol", "quantity").value, n("1.204e24"));
}

#[test]
fn test_path_then_back_is_identity() {
    let s = system();
    let start = s.quantity("7 mi").unwrap();
    let there = s.convert(&start, &s.unit("km").unwrap()).unwrap().result;
    let back = s.convert(&there, &s.unit("mi").unwrap()).unwrap().result;
    assert_eq!(back.value, Number::from(7));
}

// ============================================================================
// 2. Prefix conversions
// ============================================================================

#[test]
fn test_prefix_only() {
    assert_eq!(convert("2.5 km", "mm").value, Number::from(2500000));
    assert_eq!(convert("450 mg", "g").value, n("0.45"));
    assert_eq!(convert("3 kN", "N").value, Number::from(3000));
}

#[test]
fn test_prefix_on_cubed_units() {
    let s = system();
    let quantity = s.quantity("1 m3").unwrap();
    let done = s.convert(&quantity, &s.unit("cc").unwrap()).unwrap();
    assert_eq!(done.result.value, Number::from(1000000));
    // one step, m -> cm, cubed
    assert_eq!(done.terms.len(), 2);
    assert_eq!(done.terms[1].power, 3);
}

// ============================================================================
// 3. Temperatures
// ============================================================================

#[test]
fn test_celsius_to_kelvin_and_back() {
    let s = system();
    let hot = convert("100 C", "K");
    assert_eq!(hot.value, n("373.15"));
    let back = s.convert(&hot, &s.unit("C").unwrap()).unwrap().result;
    assert_eq!(back.value, Number::from(100));
}

#[test]
fn test_fahrenheit() {
    assert_eq!(convert("32 °F", "°C").value, Number::from(0));
    assert_eq!(convert("0 K", "F").value, n("-459.67"));
}

#[test]
fn test_fahrenheit_reading_stays_decimal() {
    let body = convert("98.6 F", "K");
    assert_eq!(body.value.kind(), unit_graph::NumberKind::Decimal);
    assert_eq!(body.value.to_string(), "310.15");
    assert_eq!(convert("-40 °F", "°C").value, Number::from(-40));
}

// ============================================================================
// 4. Volumes
// ============================================================================

#[test]
fn test_gallon_to_liters() {
    let result = convert("1 gal", "L");
    assert_eq!(result.value, n("3.785411784"));
}

#[test]
fn test_cubic_yard_to_cubic_feet() {
    assert_eq!(convert("2 yd3", "ft3").value, Number::from(54));
}

#[test]
fn test_liters_to_gallons_is_reciprocal() {
    let s = system();
    let liters = convert("1 gal", "mL");
    let gallons = s.convert(&liters, &s.unit("gal").unwrap()).unwrap().result;
    assert_eq!(gallons.value, Number::from(1));
}

// ============================================================================
// 5. Significant figures and d.n.e.
// ============================================================================

#[test]
fn test_sigfigs_survive_conversion() {
    let result = convert("1.20s ft", "in");
    assert_eq!(result.value.to_string(), "14.4");
}

#[test]
fn test_division_by_zero_poisons() {
    let s = system();
    let quantity = s.quantity("3 ft").unwrap();
    let done = s
        .convert_factor(&quantity, &s.quantity("12 in").unwrap(), &s.quantity("0 ft").unwrap(), 1)
        .unwrap();
    assert!(done.poisoned);
    assert!(done.result.is_dne());
    assert_eq!(s.registry().abbrev(&done.result.unit), "ft");
    assert!(done.render(s.registry()).poisoned);
}

#[test]
fn test_dne_input_stays_dne() {
    let s = system();
    let quantity = Quantity::new(Number::Dne, s.unit("ft").unwrap());
    let done = s.convert(&quantity, &s.unit("in").unwrap()).unwrap();
    assert!(done.poisoned);
    assert!(done.result.is_dne());
}

// ============================================================================
// 6. Failures
// ============================================================================

#[test]
fn test_incompatible_dimensions() {
    let s = system();
    let quantity = s.quantity("1 ft").unwrap();
    let err = s.convert(&quantity, &s.unit("s").unwrap()).unwrap_err();
    assert!(matches!(err, Error::IncompatibleUnits { .. }));
}

#[test]
fn test_no_path_for_unconnected_units() {
    let s = system();
    let quantity = s.quantity("1 m/s").unwrap();
    let err = s.convert(&quantity, &s.unit("mi/hr").unwrap()).unwrap_err();
    assert!(matches!(err, Error::NoConversionPath { .. }));
}

// ============================================================================
// 7. Names and identity
// ============================================================================

#[test]
fn test_same_unit_is_identity() {
    let s = system();
    let quantity = s.quantity("5 N").unwrap();
    let done = s.convert(&quantity, &s.unit("N").unwrap()).unwrap();
    assert!(done.terms.is_empty());
    assert_eq!(done.result, quantity);
}

#[test]
fn test_name_survives() {
    let result = convert("18 g H2O", "mg");
    assert_eq!(result.name.as_deref(), Some("H2O"));
    assert_eq!(result.value, Number::from(18000));
}

#[test]
fn test_custom_system_without_factors() {
    let config = unit_graph::SystemConfig::default().with_factors(unit_graph::FactorSource::Empty);
    let s = UnitSystem::from_config(&config).unwrap();
    assert_eq!(s.graph().node_count(), 0);
    let quantity = s.quantity("1 ft").unwrap();
    let err = s.convert(&quantity, &s.unit("in").unwrap()).unwrap_err();
    assert!(matches!(err, Error::NoConversionPath { .. }));
    // prefix conversions need no factors
    let quantity = s.quantity("1 km").unwrap();
    assert_eq!(s.convert(&quantity, &s.unit("m").unwrap()).unwrap().result.value, Number::from(1000));
}
