//! # Unit Registry
//!
//! Arenas for primitive dimensions, primitive units and named compound
//! units, with the lookup and formatting rules that turn text into units
//! and units back into text.
//!
//! A registry is built with `&mut self` and then shared read-only. Handles
//! ([`DimensionId`], [`UnitId`]) are indexes into its arenas, so two
//! primitive units are the same unit exactly when their handles match.
//!
//! ## Name lookup
//!
//! [`UnitRegistry::lookup`] tries, in order:
//!
//! 1. `namespace.name` qualified names
//! 2. namespaces, by precedence
//! 3. primitive and named-compound names and abbreviations
//! 4. the singular of a plural (`hours` → `hour`), when the stem is longer than one character
//! 5. the lowercase spelling
//! 6. a known prefix followed by a known name (`kilometers`, `mcg`), longest prefix first

pub mod catalog;

use hashbrown::HashMap;

use crate::model::{DimensionId, Dimensionality, Prefix, Unit, UnitId};
use crate::{Error, Result};

pub use catalog::standard_registry;

/// A primitive unit: a name, an abbreviation and the dimensionality it measures.
#[derive(Debug, Clone)]
pub struct PrimitiveUnit {
    pub name: String,
    pub abbrev: String,
    pub dimensionality: Dimensionality,
}

/// A unit registered under a name.
///
/// `unit` is canonical and carries the registered prefix (`cc` is `m^3`
/// with prefix 10^-6).
#[derive(Debug, Clone)]
pub struct NamedUnit {
    pub unit: Unit,
    pub name: String,
    pub abbrev: Option<String>,
    /// The name only applies without a residual prefix (no "kilo-cc").
    pub no_prefix: bool,
}

impl NamedUnit {
    /// Abbreviation, or the name for units registered without one.
    pub fn key(&self) -> &str {
        self.abbrev.as_deref().unwrap_or(&self.name)
    }
}

/// A group of aliases searched by precedence and addressable as `ns.name`.
#[derive(Debug, Clone, Default)]
struct Namespace {
    name: String,
    entries: HashMap<String, Unit>,
}

/// Registry of dimensions, units and names.
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    dimensions: Vec<String>,
    dimension_index: HashMap<String, DimensionId>,
    /// Display names for derived and primitive dimensionalities
    dimensionality_names: HashMap<Dimensionality, String>,
    dimensionality_index: HashMap<String, Dimensionality>,
    units: Vec<PrimitiveUnit>,
    /// Canonical unit without prefix → its registered name
    named: HashMap<Unit, NamedUnit>,
    /// Every registered name and abbreviation → the unit it spells
    name_index: HashMap<String, Unit>,
    /// Searched in order
    namespaces: Vec<Namespace>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Dimensions
    // ========================================================================

    pub fn add_dimension(&mut self, name: &str) -> Result<DimensionId> {
        if self.dimension_index.contains_key(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }
        let id = DimensionId(self.dimensions.len() as u16);
        self.dimensions.push(name.to_string());
        self.dimension_index.insert(name.to_string(), id);
        self.name_dimensionality(name, Dimensionality::primitive(id))?;
        Ok(id)
    }

    /// Give a display name to a (usually derived) dimensionality.
    pub fn name_dimensionality(&mut self, name: &str, dimensionality: Dimensionality) -> Result<()> {
        if self.dimensionality_index.contains_key(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }
        self.dimensionality_names.insert(dimensionality.clone(), name.to_string());
        self.dimensionality_index.insert(name.to_string(), dimensionality);
        Ok(())
    }

    pub fn dimension(&self, name: &str) -> Option<DimensionId> {
        self.dimension_index.get(name).copied()
    }

    pub fn dimension_name(&self, id: DimensionId) -> Option<&str> {
        self.dimensions.get(id.0 as usize).map(String::as_str)
    }

    /// A primitive or derived dimensionality by its display name.
    pub fn dimensionality_named(&self, name: &str) -> Option<&Dimensionality> {
        self.dimensionality_index.get(name)
    }

    /// Display name of a dimensionality, falling back to `length^2/time`-style text.
    pub fn dimensionality_name(&self, dimensionality: &Dimensionality) -> String {
        if let Some(name) = self.dimensionality_names.get(dimensionality) {
            return name.clone();
        }
        let atoms = dimensionality.atoms().iter().map(|(id, exp)| {
            let name = self.dimension_name(*id).unwrap_or("?").to_string();
            (name, *exp)
        });
        join_atoms(atoms.collect())
    }

    // ========================================================================
    // Units
    // ========================================================================

    pub fn add_primitive_unit(&mut self, name: &str, abbrev: &str, dimensionality: Dimensionality) -> Result<UnitId> {
        self.ensure_unused(name)?;
        if !abbrev.is_empty() && abbrev != name {
            self.ensure_unused(abbrev)?;
        }
        let id = UnitId(self.units.len() as u32);
        self.units.push(PrimitiveUnit {
            name: name.to_string(),
            abbrev: abbrev.to_string(),
            dimensionality,
        });
        let abbrev = (!abbrev.is_empty()).then_some(abbrev);
        self.register_name(&Unit::primitive(id), name, abbrev, false)?;
        Ok(id)
    }

    /// A new dimensionless primitive named `name`, for units met while
    /// parsing that nothing else defines.
    pub fn create_unit(&mut self, name: &str) -> Result<Unit> {
        let id = self.add_primitive_unit(name, name, Dimensionality::dimensionless())?;
        tracing::debug!(name, id = id.0, "created unit");
        Ok(Unit::primitive(id))
    }

    pub fn primitive(&self, id: UnitId) -> Option<&PrimitiveUnit> {
        self.units.get(id.0 as usize)
    }

    /// Register `unit` (with whatever prefix it carries) under a name.
    ///
    /// Each prefix-free unit can be named once; a second name for `m^3`
    /// fails even if the prefixes differ.
    pub fn register_name(&mut self, unit: &Unit, name: &str, abbrev: Option<&str>, no_prefix: bool) -> Result<()> {
        let canon = unit.canonicalize();
        let key = canon.without_prefix();
        if self.named.contains_key(&key) {
            return Err(Error::DuplicateName(name.to_string()));
        }
        self.ensure_unused(name)?;
        if let Some(a) = abbrev.filter(|a| *a != name) {
            self.ensure_unused(a)?;
        }

        self.name_index.insert(name.to_string(), canon.clone());
        if let Some(a) = abbrev {
            self.name_index.insert(a.to_string(), canon.clone());
        }
        self.named.insert(
            key,
            NamedUnit {
                unit: canon,
                name: name.to_string(),
                abbrev: abbrev.map(str::to_string),
                no_prefix,
            },
        );
        Ok(())
    }

    fn ensure_unused(&self, name: &str) -> Result<()> {
        if self.name_index.contains_key(name) {
            Err(Error::DuplicateName(name.to_string()))
        } else {
            Ok(())
        }
    }

    /// Add (or create) namespace `namespace` with `alias` for `unit`.
    pub fn alias(&mut self, namespace: &str, alias: &str, unit: &Unit) {
        let ns = match self.namespaces.iter().position(|n| n.name == namespace) {
            Some(i) => &mut self.namespaces[i],
            None => {
                self.namespaces.push(Namespace { name: namespace.to_string(), entries: HashMap::new() });
                let last = self.namespaces.len() - 1;
                &mut self.namespaces[last]
            }
        };
        ns.entries.insert(alias.to_string(), unit.canonicalize());
    }

    pub fn namespace_names(&self) -> impl Iterator<Item = &str> {
        self.namespaces.iter().map(|n| n.name.as_str())
    }

    /// Name under which `unit` is registered, with the prefix left over.
    ///
    /// `mg` resolves to `(milli, grams)`, `kg*m/s^2` to `(none, newtons)`.
    /// A `no_prefix` name only resolves with no residual prefix.
    pub fn resolve_name(&self, unit: &Unit) -> Option<(Prefix, &NamedUnit)> {
        let canon = unit.canonicalize();
        let named = self.named.get(&canon.without_prefix())?;
        let residual = canon.prefix() / named.unit.prefix();
        if named.no_prefix && !residual.is_none() {
            return None;
        }
        Some((residual, named))
    }

    pub fn dimensionality(&self, unit: &Unit) -> Result<Dimensionality> {
        let mut acc = Dimensionality::dimensionless();
        for (id, exp) in unit.primitive_atoms() {
            let primitive = self
                .primitive(id)
                .ok_or_else(|| Error::UnknownUnit(format!("#{}", id.0)))?;
            acc = acc.mul(&primitive.dimensionality.pow(exp));
        }
        Ok(acc)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Unit spelled by `name`, following the fallback order in the module docs.
    pub fn lookup(&self, name: &str) -> Option<Unit> {
        if let Some((namespace, rest)) = name.split_once('.') {
            return self
                .namespaces
                .iter()
                .find(|n| n.name == namespace)
                .and_then(|n| n.entries.get(rest))
                .cloned();
        }
        self.lookup_inner(name, true)
    }

    fn lookup_inner(&self, name: &str, allow_prefix: bool) -> Option<Unit> {
        if name.is_empty() {
            return None;
        }
        if let Some(unit) = self.namespaces.iter().find_map(|n| n.entries.get(name)) {
            return Some(unit.clone());
        }
        if let Some(unit) = self.name_index.get(name) {
            return Some(unit.clone());
        }
        if let Some(stem) = name.strip_suffix('s') {
            if stem.chars().count() > 1 {
                if let Some(unit) = self.lookup_inner(stem, allow_prefix) {
                    return Some(unit);
                }
            }
        }
        let lower = name.to_lowercase();
        if lower != name {
            if let Some(unit) = self.lookup_inner(&lower, allow_prefix) {
                return Some(unit);
            }
        }
        if allow_prefix {
            for (spelling, prefix) in Prefix::spellings() {
                let Some(rest) = name.strip_prefix(spelling) else { continue };
                let Some(unit) = self.lookup_inner(rest, false) else { continue };
                let prefixed = unit.with_prefix(unit.prefix() * prefix);
                if self.resolve_name(&unit).is_some_and(|(_, n)| n.no_prefix) {
                    continue;
                }
                return Some(prefixed);
            }
        }
        None
    }

    // ========================================================================
    // Formatting
    // ========================================================================

    /// Abbreviated text: `mg`, `N`, `kg*m/s^3`.
    pub fn abbrev(&self, unit: &Unit) -> String {
        self.format(unit, true)
    }

    /// Full name: `milligrams`, `newtons`, `kilograms*meters/seconds^3`.
    pub fn name(&self, unit: &Unit) -> String {
        self.format(unit, false)
    }

    /// Name for prose: underscores become spaces, `^3`/`^2` become cubic/square.
    pub fn display_name(&self, unit: &Unit) -> String {
        let name = self.name(unit);
        let text = if let Some(base) = name.strip_suffix("^3").filter(|b| !b.contains(['*', '/'])) {
            format!("cubic {base}")
        } else if let Some(base) = name.strip_suffix("^2").filter(|b| !b.contains(['*', '/'])) {
            format!("square {base}")
        } else {
            name
        };
        text.replace('_', " ")
    }

    fn format(&self, unit: &Unit, abbrev: bool) -> String {
        let canon = unit.canonicalize();
        if let Some((residual, named)) = self.resolve_name(&canon) {
            let base = if abbrev { named.key() } else { named.name.as_str() };
            let prefix = if abbrev { residual.abbrev() } else { residual.name() };
            return format!("{prefix}{base}");
        }
        self.format_structural(&canon, abbrev)
    }

    /// Product-of-powers text built from primitive atoms, ignoring compound names.
    pub fn format_structural(&self, unit: &Unit, abbrev: bool) -> String {
        let atoms = unit.primitive_atoms();
        let prefix = unit.prefix();
        let spell = |id: UnitId| -> String {
            match self.primitive(id) {
                Some(p) if abbrev && !p.abbrev.is_empty() => p.abbrev.clone(),
                Some(p) => p.name.clone(),
                None => format!("#{}", id.0),
            }
        };
        let spell_prefix = |p: Prefix| if abbrev { p.abbrev() } else { p.name() };

        let mut spelled: Vec<(String, i32)> = atoms.iter().map(|(id, e)| (spell(*id), *e)).collect();
        spelled.sort_by(|a, b| (a.1 < 0).cmp(&(b.1 < 0)).then_with(|| a.0.cmp(&b.0)));

        if prefix.is_none() {
            return join_atoms(spelled);
        }
        // Attach the prefix to the leading atom when it survives the atom's power.
        if let Some(first) = spelled.first_mut() {
            if let Some(root) = prefix.root(first.1) {
                first.0 = format!("{}{}", spell_prefix(root), first.0);
                return join_atoms(spelled);
            }
        }
        let body = join_atoms(spelled);
        if body == "1" {
            format!("10^{}", prefix.power())
        } else {
            format!("10^{}*{body}", prefix.power())
        }
    }
}

/// `a*b^2/(c*d^3)` from `(text, exponent)` pairs, numerators first.
fn join_atoms(atoms: Vec<(String, i32)>) -> String {
    let power = |text: &str, e: i32| if e == 1 { text.to_string() } else { format!("{text}^{e}") };
    let numerator: Vec<String> = atoms.iter().filter(|(_, e)| *e > 0).map(|(t, e)| power(t, *e)).collect();
    let denominator: Vec<String> = atoms.iter().filter(|(_, e)| *e < 0).map(|(t, e)| power(t, -e)).collect();

    let top = if numerator.is_empty() { "1".to_string() } else { numerator.join("*") };
    match denominator.len() {
        0 => top,
        1 => format!("{top}/{}", denominator[0]),
        _ => format!("{top}/({})", denominator.join("*")),
    }
}
