//! Primary-to-secondary heat transfer per node.
//!
//! Each node runs two correlations and blends them by its boiling blend:
//!
//! - **Subcooled**: stagnant natural convection scaled by a temperature
//!   efficiency, acting over the thermocline-limited area and driven by
//!   `T_primary - T_node`.
//! - **Boiling**: nucleate boiling scaled by pressure and primary flow, acting
//!   over the full node area and driven by `T_wall - T_sat`, where the wall
//!   temperature follows from the previous step's heat rate through the
//!   tube-side film.
//!
//! Coefficient, area and driving difference are interpolated separately so a
//! node entering boiling ramps in rather than stepping.

use sg_core::{bound, lerp, unit_clamp};

use crate::config::{HeatTransferConfig, SecondaryConfig};
use crate::geometry::effective_area_fraction;
use crate::state::{NodeStates, Regime};

/// Reference pressure for the nucleate boiling correlation.
const ATMOSPHERIC_PSIA: f64 = 14.696;

/// Inputs shared by every node for one step.
#[derive(Debug, Clone, Copy)]
pub struct HeatInputs {
    /// Primary temperature after the saturation guard.
    pub primary_temp_f: f64,
    pub pressure_psia: f64,
    pub saturation_temp_f: f64,
    pub pumps_running: u32,
    pub thermocline_ft: f64,
}

/// Raw (pre-clamp) heat totals for one step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeatTotals {
    pub total_btu_hr: f64,
    pub boiling_btu_hr: f64,
    pub sensible_btu_hr: f64,
    /// Sum of node area fractions carrying heat this step.
    pub active_area_fraction: f64,
}

/// Primary flow availability in `[natural_circulation_fraction, 1]`.
pub fn primary_availability(pumps_running: u32, cfg: &HeatTransferConfig) -> f64 {
    if pumps_running == 0 {
        return cfg.natural_circulation_fraction;
    }
    let fraction = pumps_running as f64 / cfg.rated_pumps.max(1) as f64;
    fraction.min(1.0).max(cfg.natural_circulation_fraction)
}

/// Natural-convection efficiency, rising linearly from `efficiency_min` at the
/// low reference temperature to 1.0 at the high one.
pub fn temperature_efficiency(node_temp_f: f64, cfg: &HeatTransferConfig) -> f64 {
    let span = cfg.efficiency_high_f - cfg.efficiency_low_f;
    let w = unit_clamp((node_temp_f - cfg.efficiency_low_f) / span);
    lerp(cfg.efficiency_min, 1.0, w)
}

/// Nucleate boiling coefficient [BTU/hr-ft2-F].
pub fn boiling_htc(pressure_psia: f64, pumps_running: u32, cfg: &HeatTransferConfig) -> f64 {
    let ratio = (pressure_psia / ATMOSPHERIC_PSIA).max(0.0);
    let h = (cfg.boiling_htc_ref_btu_hr_ft2_f * ratio.powf(cfg.boiling_pressure_exponent))
        .min(cfg.boiling_htc_max_btu_hr_ft2_f);
    h * primary_availability(pumps_running, cfg)
}

/// Tube-side film coefficient used for the wall estimate.
pub fn primary_film_htc(pumps_running: u32, cfg: &HeatTransferConfig) -> f64 {
    cfg.primary_htc_btu_hr_ft2_f * primary_availability(pumps_running, cfg).powf(0.8)
}

/// Advance each node's boiling blend.
///
/// A node at saturation while the generator is not subcooled ramps toward 1
/// over `blend_ramp_s`; any other node drops to 0 at once.
pub fn update_blend(
    nodes: &mut NodeStates,
    saturation_temp_f: f64,
    regime: Regime,
    dt_s: f64,
    cfg: &HeatTransferConfig,
) {
    let step = dt_s.max(0.0) / cfg.blend_ramp_s;
    for i in 0..nodes.len() {
        let at_saturation = nodes.temp_f[i] >= saturation_temp_f - cfg.saturation_tolerance_f;
        if regime != Regime::Subcooled && at_saturation {
            nodes.blend[i] = (nodes.blend[i] + step).min(1.0);
        } else {
            nodes.blend[i] = 0.0;
        }
        nodes.boiling[i] = nodes.blend[i] > 0.0;
    }
}

/// Compute per-node heat rates and the raw totals.
///
/// Writes `heat_rate_btu_hr`, `htc_btu_hr_ft2_f` and
/// `effective_area_fraction` for every node. The previous heat rate is read
/// before it is overwritten to estimate the boiling wall temperature.
pub fn compute(nodes: &mut NodeStates, inputs: &HeatInputs, config: &SecondaryConfig) -> HeatTotals {
    let geo = &config.geometry;
    let cfg = &config.heat_transfer;
    let n = nodes.len();
    let h_boil = boiling_htc(inputs.pressure_psia, inputs.pumps_running, cfg);
    let h_film = primary_film_htc(inputs.pumps_running, cfg);
    let t_p = inputs.primary_temp_f;
    let t_sat = inputs.saturation_temp_f;

    let mut totals = HeatTotals::default();
    for (i, node) in geo.nodes.iter().enumerate().take(n) {
        let t = nodes.temp_f[i];
        let b = nodes.blend[i];

        let h_sub = cfg.stagnant_htc_btu_hr_ft2_f * temperature_efficiency(t, cfg);
        let a_sub = effective_area_fraction(node, i, n, geo.bundle_height_ft, inputs.thermocline_ft);
        let dt_sub = t_p - t;

        let (h, a, dt) = if b > 0.0 {
            let node_area = node.area_fraction * geo.tube_area_ft2;
            let film = h_film * node_area;
            let drop = if film > 0.0 {
                nodes.heat_rate_btu_hr[i].max(0.0) / film
            } else {
                0.0
            };
            // lower bound wins when the primary sits below saturation
            let t_wall = bound(t_p - drop, t_sat, t_p);
            let dt_boil = t_wall - t_sat;
            (
                lerp(h_sub, h_boil, b),
                lerp(a_sub, node.area_fraction, b),
                lerp(dt_sub, dt_boil, b),
            )
        } else {
            (h_sub, a_sub, dt_sub)
        };

        if dt < cfg.min_driving_dt_f || a <= 0.0 {
            nodes.heat_rate_btu_hr[i] = 0.0;
            nodes.htc_btu_hr_ft2_f[i] = 0.0;
            nodes.effective_area_fraction[i] = 0.0;
            continue;
        }

        let q = h * a * geo.tube_area_ft2 * dt;
        nodes.heat_rate_btu_hr[i] = q;
        nodes.htc_btu_hr_ft2_f[i] = h;
        nodes.effective_area_fraction[i] = a;

        totals.total_btu_hr += q;
        totals.boiling_btu_hr += b * q;
        totals.sensible_btu_hr += (1.0 - b) * q;
        totals.active_area_fraction += a;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::NodeStates;

    fn inputs(t_p: f64) -> HeatInputs {
        HeatInputs {
            primary_temp_f: t_p,
            pressure_psia: 17.0,
            saturation_temp_f: 219.6,
            pumps_running: 4,
            thermocline_ft: 24.0,
        }
    }

    #[test]
    fn availability_has_natural_circulation_floor() {
        let cfg = HeatTransferConfig::default();
        assert_eq!(primary_availability(0, &cfg), 0.05);
        assert_eq!(primary_availability(2, &cfg), 0.5);
        assert_eq!(primary_availability(6, &cfg), 1.0);
    }

    #[test]
    fn efficiency_spans_configured_range() {
        let cfg = HeatTransferConfig::default();
        assert_eq!(temperature_efficiency(50.0, &cfg), 0.5);
        assert!((temperature_efficiency(250.0, &cfg) - 0.75).abs() < 1e-12);
        assert_eq!(temperature_efficiency(500.0, &cfg), 1.0);
    }

    #[test]
    fn boiling_htc_grows_with_pressure_and_caps() {
        let cfg = HeatTransferConfig::default();
        let low = boiling_htc(17.0, 4, &cfg);
        let mid = boiling_htc(100.0, 4, &cfg);
        let high = boiling_htc(1_100.0, 4, &cfg);
        assert!(low < mid);
        assert_eq!(high, cfg.boiling_htc_max_btu_hr_ft2_f);
    }

    #[test]
    fn isothermal_bundle_transfers_nothing() {
        let cfg = SecondaryConfig::default();
        let mut nodes = NodeStates::uniform(5, 100.0);
        let totals = compute(&mut nodes, &inputs(100.0), &cfg);
        assert_eq!(totals.total_btu_hr, 0.0);
        assert!(nodes.heat_rate_btu_hr.iter().all(|q| *q == 0.0));
    }

    #[test]
    fn subcooled_heat_is_all_sensible_and_favors_top() {
        let cfg = SecondaryConfig::default();
        let mut nodes = NodeStates::uniform(5, 100.0);
        let totals = compute(&mut nodes, &inputs(150.0), &cfg);
        assert!(totals.total_btu_hr > 0.0);
        assert_eq!(totals.boiling_btu_hr, 0.0);
        assert!((totals.sensible_btu_hr - totals.total_btu_hr).abs() < 1e-6);
        assert!(nodes.heat_rate_btu_hr[0] > nodes.heat_rate_btu_hr[4]);
    }

    #[test]
    fn fully_boiling_node_uses_wall_superheat() {
        let cfg = SecondaryConfig::default();
        let mut nodes = NodeStates::uniform(5, 100.0);
        nodes.temp_f[0] = 219.6;
        nodes.blend[0] = 1.0;
        nodes.boiling[0] = true;
        let totals = compute(&mut nodes, &inputs(240.0), &cfg);
        assert!(totals.boiling_btu_hr > 0.0);
        let expected = boiling_htc(17.0, 4, &cfg.heat_transfer)
            * 0.25
            * cfg.geometry.tube_area_ft2
            * (240.0 - 219.6);
        assert!((nodes.heat_rate_btu_hr[0] - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn blend_ramps_at_saturation_and_resets_below() {
        let cfg = HeatTransferConfig::default();
        let mut nodes = NodeStates::uniform(2, 219.6);
        nodes.temp_f[1] = 150.0;
        update_blend(&mut nodes, 219.6, Regime::Boiling, 10.0, &cfg);
        assert!((nodes.blend[0] - 10.0 / 60.0).abs() < 1e-12);
        assert!(nodes.boiling[0]);
        assert_eq!(nodes.blend[1], 0.0);

        update_blend(&mut nodes, 219.6, Regime::Subcooled, 10.0, &cfg);
        assert_eq!(nodes.blend[0], 0.0);
        assert!(!nodes.boiling[0]);
    }

    #[test]
    fn blend_saturates_at_one() {
        let cfg = HeatTransferConfig::default();
        let mut nodes = NodeStates::uniform(1, 300.0);
        for _ in 0..20 {
            update_blend(&mut nodes, 300.0, Regime::Boiling, 10.0, &cfg);
        }
        assert_eq!(nodes.blend[0], 1.0);
    }
}
