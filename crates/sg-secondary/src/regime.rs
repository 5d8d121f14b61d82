//! Regime classification.

use crate::config::SecondaryConfig;
use crate::state::Regime;

/// Pressure margin treated as being at the dump setpoint.
pub const SETPOINT_MARGIN_PSI: f64 = 1e-6;

/// Classify the secondary regime from node temperatures and the resolved
/// pressure. Pure: identical inputs always give the same regime.
///
/// `SteamDump` takes precedence whenever pressure sits at the dump setpoint.
/// Otherwise any node at or above saturation (within the configured
/// tolerance) makes the generator `Boiling`.
pub fn classify(
    temps_f: &[f64],
    pressure_psia: f64,
    saturation_temp_f: f64,
    config: &SecondaryConfig,
) -> Regime {
    if pressure_psia >= config.pressure.steam_dump_setpoint_psia - SETPOINT_MARGIN_PSI {
        return Regime::SteamDump;
    }
    let hottest = temps_f.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if hottest - saturation_temp_f >= -config.heat_transfer.saturation_tolerance_f {
        Regime::Boiling
    } else {
        Regime::Subcooled
    }
}
