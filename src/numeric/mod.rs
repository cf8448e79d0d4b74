//! Numbers: exact integers, rationals and decimals, significant-figure
//! values, and the "does not exist" result of dividing by zero.

mod errors;
mod number;
mod sigfig;

pub use errors::{NumericError, NumericResult};
pub use number::{Number, NumberKind};
pub use sigfig::SigFig;
