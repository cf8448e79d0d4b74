//! Decimal prefixes (kilo, milli, ...) as powers of ten.

use serde::{Deserialize, Serialize};

/// A power-of-ten scale factor. `Prefix::NONE` (power 0) is the identity.
///
/// Prefixes are plain values: two prefixes are the same prefix exactly when
/// their powers match, so there is one prefix per power without any
/// registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Prefix {
    power: i32,
}

/// `(name, abbreviation, power)` for every named prefix.
const NAMED: &[(&str, &str, i32)] = &[
    ("Yotta", "Y", 24),
    ("Zetta", "Z", 21),
    ("Exa", "E", 18),
    ("Peta", "P", 15),
    ("Tera", "T", 12),
    ("Giga", "G", 9),
    ("Mega", "M", 6),
    ("myria", "my", 4),
    ("kilo", "k", 3),
    ("hecto", "h", 2),
    ("deka", "da", 1),
    ("deci", "d", -1),
    ("centi", "c", -2),
    ("milli", "m", -3),
    ("micro", "mu", -6),
    ("nano", "n", -9),
    ("pico", "p", -12),
    ("femto", "f", -15),
    ("atto", "a", -18),
    ("zepto", "z", -21),
    ("yocto", "y", -24),
];

/// Extra abbreviations accepted on input only.
const ALIASES: &[(&str, i32)] = &[("mc", -6), ("μ", -6)];

impl Prefix {
    pub const NONE: Prefix = Prefix { power: 0 };
    pub const MEGA: Prefix = Prefix { power: 6 };
    pub const KILO: Prefix = Prefix { power: 3 };
    pub const CENTI: Prefix = Prefix { power: -2 };
    pub const MILLI: Prefix = Prefix { power: -3 };
    pub const MICRO: Prefix = Prefix { power: -6 };
    pub const NANO: Prefix = Prefix { power: -9 };

    pub const fn from_power(power: i32) -> Self {
        Self { power }
    }

    pub const fn power(self) -> i32 {
        self.power
    }

    pub const fn is_none(self) -> bool {
        self.power == 0
    }

    fn entry(self) -> Option<&'static (&'static str, &'static str, i32)> {
        NAMED.iter().find(|(_, _, p)| *p == self.power)
    }

    /// Full name; powers without a standard name read `tothe<power>`.
    pub fn name(self) -> String {
        match self.entry() {
            Some((name, _, _)) => (*name).to_string(),
            None if self.is_none() => String::new(),
            None => format!("tothe{}", self.power),
        }
    }

    /// Abbreviation; powers without a standard symbol read `10^<power>`.
    pub fn abbrev(self) -> String {
        match self.entry() {
            Some((_, abbrev, _)) => (*abbrev).to_string(),
            None if self.is_none() => String::new(),
            None => format!("10^{}", self.power),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        NAMED
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|(_, _, p)| Self::from_power(*p))
    }

    pub fn from_abbrev(abbrev: &str) -> Option<Self> {
        NAMED
            .iter()
            .find(|(_, a, _)| *a == abbrev)
            .map(|(_, _, p)| *p)
            .or_else(|| ALIASES.iter().find(|(a, _)| *a == abbrev).map(|(_, p)| *p))
            .map(Self::from_power)
    }

    /// Every accepted prefix spelling, longest first, for prefix stripping.
    pub fn spellings() -> Vec<(&'static str, Prefix)> {
        let mut all: Vec<(&'static str, Prefix)> = NAMED
            .iter()
            .flat_map(|(n, a, p)| [(*n, Self::from_power(*p)), (*a, Self::from_power(*p))])
            .chain(ALIASES.iter().map(|(a, p)| (*a, Self::from_power(*p))))
            .collect();
        all.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()).then(a.0.cmp(b.0)));
        all
    }

    pub const fn pow(self, exp: i32) -> Self {
        Self::from_power(self.power.saturating_mul(exp))
    }

    /// Same prefix moved `places` powers of ten.
    pub const fn shift(self, places: i32) -> Self {
        Self::from_power(self.power.saturating_add(places))
    }

    /// `Some(p)` with `p^exp == self`, when `exp` divides the power.
    pub fn root(self, exp: i32) -> Option<Self> {
        if exp == 0 || self.power % exp != 0 {
            return None;
        }
        Some(Self::from_power(self.power / exp))
    }
}

impl std::ops::Mul for Prefix {
    type Output = Prefix;

    fn mul(self, rhs: Prefix) -> Prefix {
        self.shift(rhs.power)
    }
}

impl std::ops::Div for Prefix {
    type Output = Prefix;

    fn div(self, rhs: Prefix) -> Prefix {
        self.shift(-rhs.power)
    }
}

impl std::fmt::Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.abbrev())
    }
}
