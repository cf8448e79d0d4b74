//! # unit-graph: Exact Unit Conversion over a Weighted Factor Graph
//!
//! Physical quantities (a number tied to a unit) converted between units
//! exactly and traceably.
//!
//! ## Design Principles
//!
//! 1. **Exact by default**: integers, rationals and decimals combine without
//!    rounding; significant-figure numbers carry their own precision
//! 2. **Handles, not singletons**: primitive units and dimensions live in a
//!    [`UnitRegistry`] arena and are referred to by index
//! 3. **Trust over length**: the conversion graph prefers the path whose
//!    factors are most exact, not the shortest one
//! 4. **Every step on record**: a conversion returns the ordered terms it
//!    multiplied, ready to be drawn as an equation
//!
//! ## Quick Start
//!
//! ```rust
//! let system = unit_graph::standard();
//!
//! let length = system.quantity("1 ft")?;
//! let done = system.convert(&length, &system.unit("cm")?)?;
//! assert_eq!(done.result.value.to_string(), "30.48");
//!
//! let record = done.render(system.registry());
//! assert_eq!(record.result.unit, "cm");
//! # Ok::<(), unit_graph::Error>(())
//! ```
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`numeric`] | `Number`: integer, rational, decimal, significant figures, d.n.e. |
//! | [`model`] | `Prefix`, `Dimensionality`, `Unit`, `Quantity` |
//! | [`registry`] | unit arenas, names, namespaces, the standard catalog |
//! | [`parser`] | unit expressions and quantity literals |
//! | [`graph`] | conversion factors and best-path search |
//! | [`convert`] | the converter and its strategies |

// ============================================================================
// Modules
// ============================================================================

pub mod numeric;
pub mod model;
pub mod registry;
pub mod parser;
pub mod graph;
pub mod convert;
pub mod config;

// ============================================================================
// Re-exports
// ============================================================================

pub use numeric::{Number, NumberKind, NumericError, SigFig};
pub use model::{Dimensionality, DimensionId, Prefix, Quantity, Unit, UnitId};
pub use registry::{standard_registry, UnitRegistry};
pub use graph::{ConversionGraph, ConversionPath, NodeId, NodeKey};
pub use convert::{Conversion, ConversionRecord, Converter, RenderedQuantity, RenderedTerm, Term};
pub use config::{FactorSource, SystemConfig};

use once_cell::sync::Lazy;

// ============================================================================
// Top-level UnitSystem handle
// ============================================================================

/// A unit registry paired with the conversion graph built over it.
///
/// Registry changes need `&mut self`; factors can be added through `&self`
/// since the graph guards its own adjacency store.
#[derive(Debug)]
pub struct UnitSystem {
    registry: UnitRegistry,
    graph: ConversionGraph,
}

impl UnitSystem {
    /// Wrap an existing registry with an empty graph.
    pub fn new(registry: UnitRegistry) -> Self {
        Self { registry, graph: ConversionGraph::new() }
    }

    pub fn from_config(config: &SystemConfig) -> Result<Self> {
        let registry = standard_registry(config.namespaces)?;
        let system = Self::new(registry);
        let table = config.factors.load()?;
        let count = graph::load_factor_table(&system.graph, &system.registry, &table)?;
        tracing::debug!(factors = count, nodes = system.graph.node_count(), "unit system ready");
        Ok(system)
    }

    /// Standard catalog, namespaces and factor table.
    pub fn standard() -> Result<Self> {
        Self::from_config(&SystemConfig::default())
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut UnitRegistry {
        &mut self.registry
    }

    pub fn graph(&self) -> &ConversionGraph {
        &self.graph
    }

    /// Parse a unit expression spanning the whole of `text`.
    pub fn unit(&self, text: &str) -> Result<Unit> {
        parser::parse_unit_exact(&self.registry, text)
    }

    /// Parse `<number> [<unit>] [<name>]`.
    pub fn quantity(&self, text: &str) -> Result<Quantity> {
        parser::parse_quantity(&self.registry, text)
    }

    /// Record `1 a = factor b`.
    pub fn register_factor(&self, a: &Unit, b: &Unit, factor: Number, weight: Option<f64>) -> Result<()> {
        self.graph.register(&self.registry, a, b, factor, weight)
    }

    /// Load more factor-table lines. Returns the number registered.
    pub fn load_factors(&self, table: &str) -> Result<usize> {
        graph::load_factor_table(&self.graph, &self.registry, table)
    }

    pub fn find_best_path(&self, from: &Unit, to: &Unit) -> Result<ConversionPath> {
        self.graph.find_best_path(&self.registry, from, to)
    }

    pub fn convert(&self, quantity: &Quantity, target: &Unit) -> Result<Conversion> {
        convert::convert(&self.registry, &self.graph, quantity, target)
    }

    pub fn convert_factor(&self, quantity: &Quantity, numerator: &Quantity, denominator: &Quantity, power: i32) -> Result<Conversion> {
        convert::convert_factor(&self.registry, &self.graph, quantity, numerator, denominator, power)
    }

    pub fn convert_prefix(&self, quantity: &Quantity, target: &Unit) -> Result<Conversion> {
        convert::convert_prefix(&self.registry, &self.graph, quantity, target)
    }

    pub fn convert_by_path(&self, quantity: &Quantity, target: &Unit) -> Result<Conversion> {
        convert::convert_by_path(&self.registry, &self.graph, quantity, target)
    }

    /// Sum of two quantities in the same unit.
    pub fn add(&self, a: &Quantity, b: &Quantity) -> Result<Quantity> {
        a.checked_add(b).map_err(|e| self.name_units(e, a, b))
    }

    /// Difference of two quantities in the same unit.
    pub fn sub(&self, a: &Quantity, b: &Quantity) -> Result<Quantity> {
        a.checked_sub(b).map_err(|e| self.name_units(e, a, b))
    }

    fn name_units(&self, err: Error, a: &Quantity, b: &Quantity) -> Error {
        match err {
            Error::IncompatibleUnits { .. } => Error::IncompatibleUnits {
                from: self.registry.abbrev(&a.unit),
                to: self.registry.abbrev(&b.unit),
            },
            other => other,
        }
    }

    /// A fresh converter for building a conversion step by step.
    pub fn converter(&self, quantity: &Quantity) -> Converter<'_> {
        Converter::new(&self.registry, &self.graph, quantity)
    }
}

static STANDARD: Lazy<Option<UnitSystem>> = Lazy::new(|| match UnitSystem::standard() {
    Ok(system) => Some(system),
    Err(e) => {
        tracing::error!(error = %e, "standard unit system failed to build");
        None
    }
});

static EMPTY: Lazy<UnitSystem> = Lazy::new(|| UnitSystem::new(UnitRegistry::new()));

/// The process-wide standard unit system, built on first use.
///
/// Falls back to an empty system (logging the error) if the built-in
/// catalog fails to load.
pub fn standard() -> &'static UnitSystem {
    STANDARD.as_ref().unwrap_or(&EMPTY)
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid power: {unit} raised to {exponent}")]
    InvalidPower { unit: String, exponent: String },

    #[error("Incompatible units: {from} and {to}")]
    IncompatibleUnits { from: String, to: String },

    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("No conversion path from {from} to {to}")]
    NoConversionPath { from: String, to: String },

    #[error("Conversion factor {factor} between {from} and {to} has no reciprocal")]
    InvalidFactor { from: String, to: String, factor: String },

    #[error("Prefix-only conversion between {from} and {to} cannot be registered")]
    PrefixOnlyConversion { from: String, to: String },

    #[error("{unit} is not a unit of power {power}")]
    NotAPower { unit: String, power: i32 },

    #[error("Unit syntax error at position {position}: {message}")]
    UnitSyntax { position: usize, message: String },

    #[error("Factor table error on line {line}: {message}")]
    FactorTable { line: usize, message: String },

    #[error("Name already registered: {0}")]
    DuplicateName(String),

    #[error("Numeric error: {0}")]
    Numeric(#[from] NumericError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
