//! Dimensionalities: products of primitive dimensions raised to integer powers.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Handle to a primitive dimension in a [`UnitRegistry`](crate::registry::UnitRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DimensionId(pub u16);

/// Canonical product of primitive dimensions.
///
/// Atoms are kept sorted by id with no zero exponents, so structural
/// equality is dimensional equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimensionality {
    atoms: SmallVec<[(DimensionId, i32); 4]>,
}

impl Dimensionality {
    pub fn dimensionless() -> Self {
        Self::default()
    }

    pub fn primitive(id: DimensionId) -> Self {
        let mut atoms = SmallVec::new();
        atoms.push((id, 1));
        Self { atoms }
    }

    pub fn from_atoms(atoms: impl IntoIterator<Item = (DimensionId, i32)>) -> Self {
        let mut merged: SmallVec<[(DimensionId, i32); 4]> = SmallVec::new();
        for (id, exp) in atoms {
            match merged.iter_mut().find(|(d, _)| *d == id) {
                Some(slot) => slot.1 += exp,
                None => merged.push((id, exp)),
            }
        }
        merged.retain(|(_, e)| *e != 0);
        merged.sort_by_key(|(d, _)| *d);
        Self { atoms: merged }
    }

    pub fn atoms(&self) -> &[(DimensionId, i32)] {
        &self.atoms
    }

    pub fn is_dimensionless(&self) -> bool {
        self.atoms.is_empty()
    }

    /// The single dimension this is, if it is exactly one dimension to the first power.
    pub fn as_primitive(&self) -> Option<DimensionId> {
        match self.atoms.as_slice() {
            [(id, 1)] => Some(*id),
            _ => None,
        }
    }

    pub fn mul(&self, rhs: &Dimensionality) -> Dimensionality {
        Self::from_atoms(self.atoms.iter().chain(rhs.atoms.iter()).copied())
    }

    pub fn div(&self, rhs: &Dimensionality) -> Dimensionality {
        Self::from_atoms(
            self.atoms
                .iter()
                .copied()
                .chain(rhs.atoms.iter().map(|(d, e)| (*d, -e))),
        )
    }

    pub fn pow(&self, exp: i32) -> Dimensionality {
        Self::from_atoms(self.atoms.iter().map(|(d, e)| (*d, e * exp)))
    }
}
