//! Units: primitive handles and compound products with a prefix.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::Prefix;
use crate::numeric::Number;
use crate::{Error, Result};

/// Handle to a primitive unit in a [`UnitRegistry`](crate::registry::UnitRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// One factor of a compound unit.
#[derive(Debug, Clone)]
pub enum UnitAtom {
    Primitive(UnitId),
    /// A nested compound (e.g. `N` inside `N*m`), flattened on canonicalization.
    Compound(Box<Unit>),
}

type Atoms = SmallVec<[(UnitAtom, i32); 4]>;
type CanonicalAtoms = SmallVec<[(UnitId, i32); 4]>;

/// A product of unit atoms raised to integer powers, times a [`Prefix`].
///
/// Units compare and hash by canonical form: `N*m` built from nested
/// compounds equals `kg*m^2/s^2` built directly, and `1000 g` equals `kg`.
#[derive(Debug, Clone)]
pub struct Unit {
    atoms: Atoms,
    prefix: Prefix,
    canonical: bool,
}

impl Unit {
    // ========================================================================
    // Construction
    // ========================================================================

    pub fn primitive(id: UnitId) -> Self {
        let mut atoms = Atoms::new();
        atoms.push((UnitAtom::Primitive(id), 1));
        Self { atoms, prefix: Prefix::NONE, canonical: true }
    }

    /// The unit with no atoms and no prefix.
    pub fn dimensionless() -> Self {
        Self { atoms: Atoms::new(), prefix: Prefix::NONE, canonical: true }
    }

    pub fn from_atoms(atoms: impl IntoIterator<Item = (UnitAtom, i32)>, prefix: Prefix) -> Self {
        Self { atoms: atoms.into_iter().collect(), prefix, canonical: false }
    }

    /// Wrap a compound unit as a single atom raised to `exp`.
    pub fn nested(unit: Unit, exp: i32) -> Self {
        Self::from_atoms([(UnitAtom::Compound(Box::new(unit)), exp)], Prefix::NONE)
    }

    // ========================================================================
    // Canonical form
    // ========================================================================

    fn flatten_into(&self, exp: i32, out: &mut CanonicalAtoms, prefix: &mut Prefix) {
        for (atom, e) in &self.atoms {
            let effective = e * exp;
            match atom {
                UnitAtom::Primitive(id) => out.push((*id, effective)),
                UnitAtom::Compound(inner) => {
                    *prefix = *prefix * inner.prefix.pow(effective);
                    inner.flatten_into(effective, out, prefix);
                }
            }
        }
    }

    fn canonical_parts(&self) -> (CanonicalAtoms, Prefix) {
        let mut flat = CanonicalAtoms::new();
        let mut prefix = self.prefix;
        self.flatten_into(1, &mut flat, &mut prefix);

        let mut merged = CanonicalAtoms::new();
        for (id, exp) in flat {
            match merged.iter_mut().find(|(u, _)| *u == id) {
                Some(slot) => slot.1 += exp,
                None => merged.push((id, exp)),
            }
        }
        merged.retain(|(_, e)| *e != 0);
        merged.sort_by_key(|(u, _)| *u);
        (merged, prefix)
    }

    /// Flatten nested compounds, fold all prefixes into one, merge repeated
    /// atoms and drop zero exponents.
    pub fn canonicalize(&self) -> Unit {
        if self.canonical {
            return self.clone();
        }
        let (atoms, prefix) = self.canonical_parts();
        Unit {
            atoms: atoms.into_iter().map(|(id, e)| (UnitAtom::Primitive(id), e)).collect(),
            prefix,
            canonical: true,
        }
    }

    pub fn is_canonical(&self) -> bool {
        self.canonical
    }

    /// Primitive atoms of the canonical form, sorted by id.
    pub fn primitive_atoms(&self) -> CanonicalAtoms {
        if self.canonical {
            return self
                .atoms
                .iter()
                .filter_map(|(atom, e)| match atom {
                    UnitAtom::Primitive(id) => Some((*id, *e)),
                    UnitAtom::Compound(_) => None,
                })
                .collect();
        }
        self.canonical_parts().0
    }

    /// Aggregate prefix of the canonical form.
    pub fn prefix(&self) -> Prefix {
        if self.canonical {
            self.prefix
        } else {
            self.canonical_parts().1
        }
    }

    pub fn without_prefix(&self) -> Unit {
        self.with_prefix(Prefix::NONE)
    }

    /// Canonical form with its aggregate prefix replaced.
    pub fn with_prefix(&self, prefix: Prefix) -> Unit {
        let mut unit = self.canonicalize();
        unit.prefix = prefix;
        unit
    }

    /// Canonical form with its prefix moved by `places` powers of ten.
    pub fn shift_prefix(&self, places: i32) -> Unit {
        let prefix = self.prefix().shift(places);
        self.with_prefix(prefix)
    }

    /// The `(id, exponent)` of a canonical unit with exactly one atom.
    pub fn single_atom(&self) -> Option<(UnitId, i32)> {
        match self.primitive_atoms().as_slice() {
            [(id, exp)] => Some((*id, *exp)),
            _ => None,
        }
    }

    /// True when the canonical form has no atoms (prefix may be non-zero).
    pub fn has_no_atoms(&self) -> bool {
        self.primitive_atoms().is_empty()
    }

    // ========================================================================
    // Algebra
    // ========================================================================

    pub fn mul(&self, rhs: &Unit) -> Unit {
        Unit {
            atoms: self.atoms.iter().chain(rhs.atoms.iter()).cloned().collect(),
            prefix: self.prefix * rhs.prefix,
            canonical: false,
        }
    }

    pub fn div(&self, rhs: &Unit) -> Unit {
        let inverted = rhs.atoms.iter().map(|(a, e)| (a.clone(), -e));
        Unit {
            atoms: self.atoms.iter().cloned().chain(inverted).collect(),
            prefix: self.prefix / rhs.prefix,
            canonical: false,
        }
    }

    pub fn pow(&self, exp: i32) -> Unit {
        Unit {
            atoms: self.atoms.iter().map(|(a, e)| (a.clone(), e * exp)).collect(),
            prefix: self.prefix.pow(exp),
            canonical: false,
        }
    }

    /// Raise to an arbitrary numeric power. Only whole exponents are
    /// meaningful, except for the dimensionless unit which is returned as is.
    pub fn pow_number(&self, exp: &Number) -> Result<Unit> {
        if let Some(n) = exp.to_i32() {
            return Ok(self.pow(n));
        }
        if self.has_no_atoms() && self.prefix().is_none() {
            return Ok(self.clone());
        }
        Err(Error::InvalidPower {
            unit: self.to_string(),
            exponent: exp.to_string(),
        })
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_parts() == other.canonical_parts()
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let (atoms, prefix) = self.canonical_parts();
        atoms.hash(state);
        prefix.hash(state);
    }
}

/// Registry-free rendering (`#3*#5^-2`), for diagnostics. Use the
/// registry's formatters for names.
impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (atoms, prefix) = self.canonical_parts();
        if !prefix.is_none() {
            write!(f, "{}*", prefix.abbrev())?;
        }
        if atoms.is_empty() {
            return write!(f, "1");
        }
        for (i, (id, exp)) in atoms.iter().enumerate() {
            if i > 0 {
                write!(f, "*")?;
            }
            write!(f, "#{}", id.0)?;
            if *exp != 1 {
                write!(f, "^{exp}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const M: UnitId = UnitId(0);
    const G: UnitId = UnitId(1);
    const S: UnitId = UnitId(2);

    fn m() -> Unit {
        Unit::primitive(M)
    }

    fn newton() -> Unit {
        Unit::primitive(G)
            .with_prefix(Prefix::KILO)
            .mul(&m())
            .div(&Unit::primitive(S).pow(2))
    }

    #[test]
    fn test_canonicalize_flattens_nested() {
        let joule = Unit::nested(newton(), 1).mul(&m());
        let canon = joule.canonicalize();
        assert!(canon.is_canonical());
        assert_eq!(canon.primitive_atoms().as_slice(), &[(M, 2), (G, 1), (S, -2)]);
        assert_eq!(canon.prefix(), Prefix::KILO);
    }

    #[test]
    fn test_nested_prefix_raised_to_atom_power() {
        let cm = m().with_prefix(Prefix::CENTI);
        let cubic = Unit::nested(cm, 3);
        assert_eq!(cubic.prefix(), Prefix::from_power(-6));
        assert_eq!(cubic.single_atom(), Some((M, 3)));
    }

    #[test]
    fn test_equality_is_canonical() {
        let a = m().mul(&Unit::primitive(S)).div(&Unit::primitive(S));
        assert_eq!(a, m());
        assert_ne!(m().with_prefix(Prefix::KILO), m());
        assert!(m().div(&m()).has_no_atoms());
    }

    #[test]
    fn test_without_prefix() {
        let km = m().with_prefix(Prefix::KILO);
        assert_eq!(km.without_prefix(), m());
        assert_eq!(km.shift_prefix(-3), m());
    }

    #[test]
    fn test_non_integer_power() {
        let half = Number::parse_literal("0.5").unwrap();
        assert!(matches!(m().pow_number(&half), Err(Error::InvalidPower { .. })));
        assert_eq!(Unit::dimensionless().pow_number(&half).unwrap(), Unit::dimensionless());
        assert_eq!(m().pow_number(&Number::from(2)).unwrap(), m().pow(2));
    }
}
