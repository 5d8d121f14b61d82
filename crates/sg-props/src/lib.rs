//! sg-props: water/steam property provider for the steam-generator model.
//!
//! Provides:
//! - `WaterProperties` trait (saturation curve, latent heat, phase densities, cp)
//! - `SteamTableFit`, a closed-form backend calibrated against steam-table data
//! - Ideal-gas helpers for the trapped nitrogen blanket and steam inventory
//!
//! # Architecture
//!
//! The trait isolates the secondary-side engine from the property backend. The
//! engine calls the provider every tick for every node, so implementations must
//! be pure, bounded-time functions (no iterative root finding) and must clamp
//! out-of-range inputs to their valid range instead of failing.
//!
//! # Example
//!
//! ```
//! use sg_props::{SteamTableFit, WaterProperties};
//!
//! let water = SteamTableFit::default();
//! let t_sat = water.saturation_temperature_f(14.696);
//! assert!((t_sat - 212.0).abs() < 1.0);
//! ```

pub mod error;
pub mod ideal_gas;
pub mod model;
pub mod steam_table;

pub use error::{PropsError, PropsResult};
pub use ideal_gas::GasSpecies;
pub use model::{SaturationPack, WaterProperties};
pub use steam_table::{AntoineCoefficients, SteamTableFit};
