//! sg-core: shared foundation for the steam-generator workspace.
//!
//! Contains:
//! - units (uom SI types, constructors, plant-unit conversions)
//! - numeric (Real, finite checks, bounded float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
