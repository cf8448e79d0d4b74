//! # Unit Model
//!
//! Plain values for the unit algebra: prefixes, dimensionalities, units and
//! quantities. Primitive units and dimensions are small handles into a
//! [`UnitRegistry`](crate::registry::UnitRegistry); everything here is
//! pure data with no shared state.

pub mod prefix;
pub mod dimension;
pub mod unit;
pub mod quantity;

pub use prefix::Prefix;
pub use dimension::{DimensionId, Dimensionality};
pub use unit::{Unit, UnitAtom, UnitId};
pub use quantity::Quantity;
