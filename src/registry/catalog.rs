//! The standard catalog: SI and US customary units, times, pressures,
//! amounts of substance and temperatures.

use super::UnitRegistry;
use crate::model::{Dimensionality, Prefix, Unit};
use crate::Result;

/// Dimensionalities the catalog hands out to its units.
struct Dims {
    length: Dimensionality,
    mass: Dimensionality,
    time: Dimensionality,
    quantity: Dimensionality,
    temperature: Dimensionality,
    volume: Dimensionality,
    pressure: Dimensionality,
}

fn install_dimensions(reg: &mut UnitRegistry) -> Result<Dims> {
    let length = Dimensionality::primitive(reg.add_dimension("length")?);
    let mass = Dimensionality::primitive(reg.add_dimension("mass")?);
    let time = Dimensionality::primitive(reg.add_dimension("time")?);
    let quantity = Dimensionality::primitive(reg.add_dimension("quantity")?);
    let temperature = Dimensionality::primitive(reg.add_dimension("temperature")?);

    let area = length.pow(2);
    let volume = length.pow(3);
    let force = mass.mul(&length).div(&time.pow(2));
    let energy = force.mul(&length);
    let pressure = force.div(&area);

    reg.name_dimensionality("dimensionless", Dimensionality::dimensionless())?;
    reg.name_dimensionality("area", area)?;
    reg.name_dimensionality("volume", volume.clone())?;
    reg.name_dimensionality("velocity", length.div(&time))?;
    reg.name_dimensionality("acceleration", length.div(&time.pow(2)))?;
    reg.name_dimensionality("force", force)?;
    reg.name_dimensionality("energy", energy.clone())?;
    reg.name_dimensionality("pressure", pressure.clone())?;
    reg.name_dimensionality("entropy", energy.div(&temperature))?;
    reg.name_dimensionality("concentration", quantity.div(&volume))?;
    reg.name_dimensionality("molar_mass", mass.div(&quantity))?;

    Ok(Dims { length, mass, time, quantity, temperature, volume, pressure })
}

fn prim(reg: &mut UnitRegistry, name: &str, abbrev: &str, dim: &Dimensionality) -> Result<Unit> {
    reg.add_primitive_unit(name, abbrev, dim.clone()).map(Unit::primitive)
}

/// Build the standard registry. With `namespaces` off only canonical names,
/// abbreviations and the generic fallbacks resolve.
pub fn standard_registry(namespaces: bool) -> Result<UnitRegistry> {
    let mut reg = UnitRegistry::new();
    let d = install_dimensions(&mut reg)?;

    // Metric
    let m = prim(&mut reg, "meters", "m", &d.length)?;
    let g = prim(&mut reg, "grams", "g", &d.mass)?;
    let s = prim(&mut reg, "seconds", "s", &d.time)?;
    let liter = prim(&mut reg, "liters", "L", &d.volume)?;

    let kg = g.with_prefix(Prefix::KILO);
    let newton = kg.mul(&m).div(&s.pow(2));
    reg.register_name(&newton, "newtons", Some("N"), false)?;
    let joule = Unit::nested(newton.clone(), 1).mul(&m);
    reg.register_name(&joule, "joules", Some("J"), false)?;
    let pascal = Unit::nested(newton.clone(), 1).div(&m.pow(2));
    reg.register_name(&pascal, "pascals", Some("Pa"), false)?;
    let cc = m.with_prefix(Prefix::CENTI).pow(3);
    reg.register_name(&cc, "cubic_centimeters", Some("cc"), true)?;

    // US customary
    let inch = prim(&mut reg, "inches", "in", &d.length)?;
    let foot = prim(&mut reg, "feet", "ft", &d.length)?;
    let yard = prim(&mut reg, "yards", "yd", &d.length)?;
    prim(&mut reg, "furlongs", "furlong", &d.length)?;
    let mile = prim(&mut reg, "miles", "mi", &d.length)?;
    let ounce = prim(&mut reg, "ounces", "oz", &d.mass)?;
    let pound = prim(&mut reg, "pounds", "lb", &d.mass)?;
    prim(&mut reg, "stone", "st", &d.mass)?;
    let ton = prim(&mut reg, "tons", "t", &d.mass)?;
    let floz = prim(&mut reg, "fluid_ounces", "floz", &d.volume)?;
    let pint = prim(&mut reg, "pints", "pt", &d.volume)?;
    let quart = prim(&mut reg, "quarts", "qt", &d.volume)?;
    let gallon = prim(&mut reg, "gallons", "gal", &d.volume)?;
    prim(&mut reg, "pounds_per_square_inch", "psi", &d.pressure)?;

    // Times
    let minute = prim(&mut reg, "minutes", "min", &d.time)?;
    let hour = prim(&mut reg, "hours", "hr", &d.time)?;
    let day = prim(&mut reg, "days", "day", &d.time)?;
    let week = prim(&mut reg, "weeks", "week", &d.time)?;
    let year = prim(&mut reg, "years", "year", &d.time)?;

    // Pressures
    let atm = prim(&mut reg, "atmospheres", "atm", &d.pressure)?;
    prim(&mut reg, "millimeters_of_mercury", "mmHg", &d.pressure)?;
    prim(&mut reg, "torr", "torr", &d.pressure)?;
    let bar = prim(&mut reg, "bars", "bar", &d.pressure)?;

    // Amounts of substance
    let quantity = prim(&mut reg, "quantity", "", &d.quantity)?;
    let mol = prim(&mut reg, "moles", "mol", &d.quantity)?;
    let molarity = mol.div(&liter);
    reg.register_name(&molarity, "molarity", Some("M"), false)?;

    // Gas volumes
    reg.register_name(&inch.pow(3), "cubic_inches", None, false)?;
    reg.register_name(&foot.pow(3), "cubic_feet", None, false)?;
    reg.register_name(&yard.pow(3), "cubic_yards", None, false)?;

    // Temperatures
    let kelvin = prim(&mut reg, "kelvin", "K", &d.temperature)?;
    let celsius = prim(&mut reg, "centigrade", "C", &d.temperature)?;
    let fahrenheit = prim(&mut reg, "fahrenheit", "F", &d.temperature)?;

    if !namespaces {
        return Ok(reg);
    }

    let prefixed = |unit: &Unit, prefix: Prefix| unit.with_prefix(unit.prefix() * prefix);
    for (alias, unit, prefix) in [
        ("km", &m, Prefix::KILO),
        ("cm", &m, Prefix::CENTI),
        ("mm", &m, Prefix::MILLI),
        ("mcm", &m, Prefix::MICRO),
        ("nm", &m, Prefix::NANO),
        ("kg", &g, Prefix::KILO),
        ("mg", &g, Prefix::MILLI),
        ("mcg", &g, Prefix::MICRO),
        ("ng", &g, Prefix::NANO),
        ("mL", &liter, Prefix::MILLI),
        ("mcL", &liter, Prefix::MICRO),
        ("nL", &liter, Prefix::NANO),
        ("kN", &newton, Prefix::KILO),
        ("mN", &newton, Prefix::MILLI),
        ("nN", &newton, Prefix::NANO),
        ("MJ", &joule, Prefix::MEGA),
        ("kJ", &joule, Prefix::KILO),
        ("mJ", &joule, Prefix::MILLI),
        ("mcJ", &joule, Prefix::MICRO),
        ("nJ", &joule, Prefix::NANO),
        ("GPa", &pascal, Prefix::from_power(9)),
        ("MPa", &pascal, Prefix::MEGA),
        ("kPa", &pascal, Prefix::KILO),
        ("mPa", &pascal, Prefix::MILLI),
        ("mcPa", &pascal, Prefix::MICRO),
        ("nPa", &pascal, Prefix::NANO),
    ] {
        reg.alias("metric", alias, &prefixed(unit, prefix));
    }
    reg.alias("metric", "cm3", &cc);
    reg.alias("metric", "m3", &m.pow(3));

    for (alias, unit) in [("meter", &m), ("metre", &m), ("inch", &inch), ("foot", &foot), ("yard", &yard), ("mile", &mile)] {
        reg.alias("lengths", alias, unit);
    }
    for (alias, unit) in [("oz", &ounce), ("ounce", &ounce), ("gram", &g), ("kilogram", &kg), ("pound", &pound), ("ton", &ton)] {
        reg.alias("masses", alias, unit);
    }
    for (alias, unit) in [("sec", &s), ("second", &s), ("minute", &minute), ("hour", &hour), ("day", &day), ("week", &week), ("year", &year)] {
        reg.alias("times", alias, unit);
    }
    for (alias, unit) in [("atmosphere", &atm), ("bar", &bar)] {
        reg.alias("pressures", alias, unit);
    }
    reg.alias("quantities", "quantity", &quantity);
    reg.alias("quantities", "mole", &mol);
    for (alias, prefix) in [("kmol", Prefix::KILO), ("mmol", Prefix::MILLI), ("mcmol", Prefix::MICRO), ("nmol", Prefix::NANO)] {
        reg.alias("quantities", alias, &prefixed(&mol, prefix));
    }
    reg.alias("concentrations", "molar", &molarity);
    for (alias, unit) in [
        ("oz", &floz),
        ("fluid_ounce", &floz),
        ("pint", &pint),
        ("quart", &quart),
        ("gallon", &gallon),
        ("liter", &liter),
        ("litre", &liter),
    ] {
        reg.alias("liquid_volumes", alias, unit);
    }
    reg.alias("gas_volumes", "in3", &inch.pow(3));
    reg.alias("gas_volumes", "ft3", &foot.pow(3));
    reg.alias("gas_volumes", "yd3", &yard.pow(3));
    for (alias, unit) in [("°C", &celsius), ("degC", &celsius), ("celsius", &celsius), ("°F", &fahrenheit), ("degF", &fahrenheit), ("kelvins", &kelvin)] {
        reg.alias("temperatures", alias, unit);
    }

    Ok(reg)
}
