//! Thermocline descent during forced primary circulation.
//!
//! With pumps running, warm water from the U-bend region diffuses downward;
//! the boundary between active and stagnant water sits at
//! `H - sqrt(4 * alpha * t)` above the tubesheet, where `t` counts only
//! powered time.

use crate::config::GeometryConfig;
use crate::state::SecondaryState;

/// Thermocline height [ft] after `powered_time_hr` of forced circulation.
pub fn height_ft(bundle_height_ft: f64, diffusivity_ft2_hr: f64, powered_time_hr: f64) -> f64 {
    let depth = (4.0 * diffusivity_ft2_hr * powered_time_hr.max(0.0)).sqrt();
    (bundle_height_ft - depth).max(0.0)
}

/// Advance powered time (only while pumps run) and refresh the thermocline.
pub fn advance(state: &mut SecondaryState, geometry: &GeometryConfig, pumps_running: u32, dt_hr: f64) {
    if pumps_running > 0 {
        state.powered_time_hr += dt_hr.max(0.0);
    }
    state.thermocline_height_ft = height_ft(
        geometry.bundle_height_ft,
        geometry.thermocline_diffusivity_ft2_hr,
        state.powered_time_hr,
    );
}
