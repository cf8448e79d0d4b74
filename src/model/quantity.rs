//! Quantity: a number tied to a unit, optionally labelled.

use super::Unit;
use crate::numeric::Number;
use crate::{Error, Result};

/// A magnitude with a unit and an optional free-text name
/// (e.g. `2 mol H2O`, where `H2O` is the name).
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub value: Number,
    pub unit: Unit,
    pub name: Option<String>,
}

impl Quantity {
    pub fn new(value: impl Into<Number>, unit: Unit) -> Self {
        Self { value: value.into(), unit, name: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// A pure number.
    pub fn scalar(value: impl Into<Number>) -> Self {
        Self::new(value, Unit::dimensionless())
    }

    pub fn is_dne(&self) -> bool {
        self.value.is_dne()
    }

    pub fn checked_mul(&self, rhs: &Quantity) -> Result<Quantity> {
        Ok(Quantity {
            value: self.value.checked_mul(&rhs.value)?,
            unit: self.unit.mul(&rhs.unit).canonicalize(),
            name: None,
        })
    }

    /// Quotient; a zero divisor gives a `Dne` value rather than an error.
    pub fn checked_div(&self, rhs: &Quantity) -> Result<Quantity> {
        Ok(Quantity {
            value: self.value.checked_div(&rhs.value)?,
            unit: self.unit.div(&rhs.unit).canonicalize(),
            name: None,
        })
    }

    /// Sum in a shared unit. A mismatch reports the units by atom id
    /// (`#3^2`) since no registry is at hand; [`crate::UnitSystem::add`]
    /// reports them by abbreviation.
    pub fn checked_add(&self, rhs: &Quantity) -> Result<Quantity> {
        self.ensure_same_unit(rhs)?;
        Ok(Quantity {
            value: self.value.checked_add(&rhs.value)?,
            unit: self.unit.canonicalize(),
            name: self.name.clone(),
        })
    }

    /// Difference in a shared unit; mismatches as for [`Quantity::checked_add`].
    pub fn checked_sub(&self, rhs: &Quantity) -> Result<Quantity> {
        self.ensure_same_unit(rhs)?;
        Ok(Quantity {
            value: self.value.checked_sub(&rhs.value)?,
            unit: self.unit.canonicalize(),
            name: self.name.clone(),
        })
    }

    pub fn checked_pow(&self, exp: i32) -> Result<Quantity> {
        Ok(Quantity {
            value: self.value.checked_pow(exp)?,
            unit: self.unit.pow(exp).canonicalize(),
            name: self.name.clone(),
        })
    }

    pub fn neg(&self) -> Quantity {
        Quantity {
            value: self.value.neg(),
            unit: self.unit.clone(),
            name: self.name.clone(),
        }
    }

    fn ensure_same_unit(&self, rhs: &Quantity) -> Result<()> {
        if self.unit == rhs.unit {
            Ok(())
        } else {
            Err(Error::IncompatibleUnits {
                from: self.unit.to_string(),
                to: rhs.unit.to_string(),
            })
        }
    }
}
