//! sg-secondary: steam generator secondary side during plant heatup.
//!
//! The model tracks a stack of vertical nodes through wet-layup heating,
//! the onset of boiling and pressurization up to the steam-dump setpoint.
//! Heat enters from the primary side through the tube bundle; the model
//! reports heat removal back to the primary side each step.
//!
//! ```
//! use sg_secondary::{ClampContext, Regime, SecondaryModel, StepInputs};
//!
//! let model = SecondaryModel::with_defaults();
//! let mut clamp = ClampContext::new();
//! let mut state = model.initialize(100.0, &mut clamp);
//!
//! let snap = model.advance(&mut state, &mut clamp, &StepInputs::new(150.0, 4, 2_250.0, 10.0));
//! assert_eq!(snap.regime, Regime::Subcooled);
//! assert!(snap.heat_removal_btu_hr > 0.0);
//! ```

pub mod clamp;
pub mod conduction;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod heat_transfer;
pub mod inventory;
pub mod pressure;
pub mod regime;
pub mod scenario;
pub mod state;
pub mod temperature;
pub mod thermocline;

pub use clamp::{BypassReason, ClampContext, ClampOutcome, ClampStatus};
pub use config::{
    GeometryConfig, HeatTransferConfig, InventoryConfig, PressureConfig, SecondaryConfig,
    StabilityConfig,
};
pub use engine::{SecondaryModel, StepInputs, StepSnapshot};
pub use error::{SecondaryError, SecondaryResult};
pub use geometry::NodeGeometry;
pub use scenario::{
    DrainTrigger, HeatupRecord, HeatupScenario, HeatupSummary, RegimeTransition, run_ensemble,
    run_heatup,
};
pub use state::{PressureMode, Regime, SecondaryState};
