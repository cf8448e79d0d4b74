//! Unit system configuration.

use std::path::PathBuf;

use crate::graph::STANDARD_FACTORS;
use crate::Result;

// ============================================================================
// Factor sources
// ============================================================================

/// Where the conversion factors come from.
#[derive(Debug, Clone, Default)]
pub enum FactorSource {
    /// The built-in table
    #[default]
    Standard,

    /// Table text supplied by the caller
    Inline(String),

    /// Table read from disk at build time
    File(PathBuf),

    /// No factors; only prefix, temperature and identity conversions work
    Empty,
}

impl FactorSource {
    /// The table text for this source.
    pub fn load(&self) -> Result<String> {
        match self {
            FactorSource::Standard => Ok(STANDARD_FACTORS.to_string()),
            FactorSource::Inline(text) => Ok(text.clone()),
            FactorSource::File(path) => Ok(std::fs::read_to_string(path)?),
            FactorSource::Empty => Ok(String::new()),
        }
    }
}

// ============================================================================
// System configuration
// ============================================================================

/// Configuration for building a [`UnitSystem`](crate::UnitSystem).
#[derive(Debug, Clone)]
pub struct SystemConfig {
    pub factors: FactorSource,
    /// Install the alias namespaces (`metric`, `lengths`, `liquid_volumes`, ...)
    pub namespaces: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self { factors: FactorSource::Standard, namespaces: true }
    }
}

impl SystemConfig {
    pub fn with_factors(mut self, factors: FactorSource) -> Self {
        self.factors = factors;
        self
    }

    pub fn without_namespaces(mut self) -> Self {
        self.namespaces = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_default_is_standard() {
        let config = SystemConfig::default();
        assert!(matches!(config.factors, FactorSource::Standard));
        assert!(config.namespaces);
        assert_eq!(config.factors.load().unwrap(), STANDARD_FACTORS);
    }

    #[test]
    fn test_missing_file() {
        let source = FactorSource::File(PathBuf::from("/nonexistent/factors.txt"));
        assert!(matches!(source.load(), Err(Error::Io(_))));
    }
}
