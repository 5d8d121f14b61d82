//! Water inventory: steam production, steam-line condensation, draining and
//! level indication.

use sg_core::conv;
use sg_props::{SaturationPack, WaterProperties};
use tracing::debug;

use crate::config::SecondaryConfig;
use crate::state::{PressureMode, Regime, SecondaryState};

/// Latent heat floor used when converting energy to steam mass.
const MIN_LATENT_HEAT_BTU_LB: f64 = 1.0;

/// Mass within this margin of the drain target counts as reached.
const DRAIN_TARGET_MARGIN_LB: f64 = 1e-6;

/// Per-step inputs for the inventory update.
#[derive(Debug, Clone, Copy)]
pub struct InventoryInputs {
    /// Reported (post-clamp) boiling share of heat removal.
    pub boiling_heat_btu_hr: f64,
    pub regime: Regime,
    pub isolated: bool,
    pub dt_s: f64,
    /// Saturation properties at this step's resolved pressure.
    pub saturation: SaturationPack,
}

/// Steam-line warming and condensation.
///
/// The line condenses steam at `UA * (T_sat - T_line)`, never more than the
/// configured share of the boiling heat, and warms toward saturation.
pub fn update_steam_line(
    state: &mut SecondaryState,
    boiling_heat_btu_hr: f64,
    regime: Regime,
    dt_hr: f64,
    config: &SecondaryConfig,
) -> f64 {
    let inv = &config.inventory;
    let t_sat = state.pressure.saturation_temp_f;
    let line = &mut state.steam_line;

    let sink = if regime != Regime::Subcooled && boiling_heat_btu_hr > 0.0 {
        (inv.steam_line_conductance_btu_hr_f * (t_sat - line.temp_f))
            .max(0.0)
            .min(inv.condensation_cap_fraction * boiling_heat_btu_hr)
    } else {
        0.0
    };

    line.temp_f = (line.temp_f + sink * dt_hr / inv.steam_line_heat_capacity_btu_f).min(t_sat);
    line.condensation_btu_hr = sink;
    sink
}

/// Convert the boiling share into steam, debit the water mass and route the
/// steam to the outlet, the closed gas space or the retained-energy pool.
pub fn update_steam(
    state: &mut SecondaryState,
    inputs: &InventoryInputs,
    config: &SecondaryConfig,
) {
    let dt_hr = conv::seconds_to_hours(inputs.dt_s.max(0.0));
    let h_fg = inputs.saturation.h_fg_btu_lb.max(MIN_LATENT_HEAT_BTU_LB);
    let boiling = inputs.boiling_heat_btu_hr.max(0.0);

    let sink = update_steam_line(state, boiling, inputs.regime, dt_hr, config);
    state.steam_line.condensation_lb_hr = sink / h_fg;
    let net = (boiling - sink).max(0.0);

    let has_pool = state.nodes.blend.iter().any(|b| *b >= 1.0);
    let restricted = !inputs.isolated
        && inputs.regime == Regime::Boiling
        && state.pressure.mode == PressureMode::Saturation
        && has_pool;

    let raw_lb_hr = net / h_fg;
    let capacity = config.inventory.steam_outlet_capacity_lb_hr;
    let (produced_lb_hr, retained_btu_hr) = if restricted && raw_lb_hr > capacity {
        (capacity, net - capacity * h_fg)
    } else {
        (raw_lb_hr, 0.0)
    };
    state.steam.retained_energy_btu += retained_btu_hr * dt_hr;

    let produced_lb = (produced_lb_hr * dt_hr).min(state.water_mass_lb.max(0.0));
    state.water_mass_lb -= produced_lb;
    state.steam.step_lb = produced_lb;
    state.steam.cumulative_lb += produced_lb;
    state.steam.production_lb_hr = produced_lb_hr;
    state.steam.production_mw = conv::btu_hr_to_mw(produced_lb_hr * h_fg);

    if inputs.isolated {
        state.steam.inventory_lb += produced_lb;
        state.steam.outflow_lb_hr = 0.0;
    } else {
        state.steam.outflow_lb_hr = produced_lb_hr;
    }
}

/// Drain toward the target mass while draining is active.
pub fn update_draining(
    state: &mut SecondaryState,
    dt_s: f64,
    config: &SecondaryConfig,
    props: &dyn WaterProperties,
) {
    let inv = &config.inventory;
    let drain = &mut state.draining;
    drain.step_lb = 0.0;
    if !drain.active || drain.complete {
        drain.rate_gpm = 0.0;
        drain.rate_lb_hr = 0.0;
        return;
    }

    let dt_hr = conv::seconds_to_hours(dt_s.max(0.0));
    let target = state.initial_mass_lb * inv.drain_target_fraction;
    let rho = props.liquid_density_lb_ft3(state.bulk_temp_f, state.pressure.pressure_psia);
    let rate_lb_hr = conv::gpm_to_ft3_hr(inv.drain_rate_gpm) * rho;
    let removed = (rate_lb_hr * dt_hr).min((state.water_mass_lb - target).max(0.0));

    state.water_mass_lb -= removed;
    drain.step_lb = removed;
    drain.drained_lb += removed;

    if state.water_mass_lb <= target + DRAIN_TARGET_MARGIN_LB {
        drain.active = false;
        drain.complete = true;
        drain.rate_gpm = 0.0;
        drain.rate_lb_hr = 0.0;
        debug!(
            water_mass_lb = state.water_mass_lb,
            drained_lb = drain.drained_lb,
            "draining complete"
        );
    } else {
        drain.rate_gpm = inv.drain_rate_gpm;
        drain.rate_lb_hr = rate_lb_hr;
    }
}

/// Refresh wide- and narrow-range levels from the water mass.
pub fn update_levels(state: &mut SecondaryState, config: &SecondaryConfig) {
    let fraction = if state.initial_mass_lb > 0.0 {
        state.water_mass_lb.max(0.0) / state.initial_mass_lb
    } else {
        0.0
    };
    state.wide_range_level_pct = fraction * 100.0;
    state.narrow_range_level_pct = fraction / config.inventory.drain_target_fraction * 100.0;
}
