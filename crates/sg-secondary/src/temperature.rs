//! Node temperature integration.

use sg_core::bound;
use sg_props::WaterProperties;

use crate::config::SecondaryConfig;
use crate::state::NodeStates;

/// Floor on node heat capacity so a drained node cannot blow up.
pub const MIN_HEAT_CAPACITY_BTU_F: f64 = 1_000.0;

/// Water plus tube-metal heat capacity of node `i` [BTU/F].
///
/// Water follows the node mass fraction; tube metal follows the area
/// fraction.
pub fn node_heat_capacity(
    i: usize,
    temp_f: f64,
    water_mass_lb: f64,
    pressure_psia: f64,
    config: &SecondaryConfig,
    props: &dyn WaterProperties,
) -> f64 {
    let geo = &config.geometry;
    let node = &geo.nodes[i];
    let cp = props.liquid_cp_btu_lb_f(temp_f, pressure_psia);
    let water = water_mass_lb.max(0.0) * node.mass_fraction * cp;
    let metal = geo.metal_mass_lb * node.area_fraction * geo.metal_cp_btu_lb_f;
    (water + metal).max(MIN_HEAT_CAPACITY_BTU_F)
}

/// Integrate node temperatures over one step.
///
/// Fully boiling nodes are pinned to saturation. Other nodes take the
/// sensible share of their primary heat plus conduction, then relax toward
/// saturation in proportion to their blend.
///
/// The sensible step never leaves the envelope spanned by the primary
/// temperature and the node temperatures at the start of the step, so long
/// steps settle at the driving temperature instead of overshooting it.
#[allow(clippy::too_many_arguments)]
pub fn integrate(
    nodes: &mut NodeStates,
    water_mass_lb: f64,
    primary_temp_f: f64,
    pressure_psia: f64,
    saturation_temp_f: f64,
    dt_s: f64,
    config: &SecondaryConfig,
    props: &dyn WaterProperties,
) {
    let dt_hr = dt_s / sg_core::conv::S_PER_HR;
    let ramp_s = config.heat_transfer.blend_ramp_s;
    let (lo, hi) = nodes
        .temp_f
        .iter()
        .fold((primary_temp_f, primary_temp_f), |(lo, hi), t| (lo.min(*t), hi.max(*t)));
    for i in 0..nodes.len() {
        let c = node_heat_capacity(
            i,
            nodes.temp_f[i],
            water_mass_lb,
            pressure_psia,
            config,
            props,
        );
        nodes.heat_capacity_btu_f[i] = c;

        let b = nodes.blend[i];
        if b >= 1.0 {
            nodes.temp_f[i] = saturation_temp_f;
            continue;
        }

        let q_sensible = (1.0 - b) * (nodes.heat_rate_btu_hr[i] + nodes.conduction_btu_hr[i]);
        let mut t = bound(nodes.temp_f[i] + q_sensible * dt_hr / c, lo, hi);
        if b > 0.0 {
            let w = (b * dt_s / ramp_s).min(1.0);
            t += (saturation_temp_f - t) * w;
        }
        nodes.temp_f[i] = t;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_props::SteamTableFit;

    #[test]
    fn pinned_node_sits_at_saturation() {
        let cfg = SecondaryConfig::default();
        let props = SteamTableFit::default();
        let mut nodes = NodeStates::uniform(5, 300.0);
        nodes.blend[0] = 1.0;
        nodes.heat_rate_btu_hr[0] = 1.0e8;
        integrate(&mut nodes, 1.44e6, 320.0, 67.0, 299.5, 10.0, &cfg, &props);
        assert_eq!(nodes.temp_f[0], 299.5);
    }

    #[test]
    fn sensible_heat_raises_temperature_by_q_dt_over_c() {
        let cfg = SecondaryConfig::default();
        let props = SteamTableFit::default();
        let mut nodes = NodeStates::uniform(5, 100.0);
        nodes.heat_rate_btu_hr[2] = 3.6e6;
        integrate(&mut nodes, 1.44e6, 200.0, 17.0, 219.6, 3600.0, &cfg, &props);
        let c = nodes.heat_capacity_btu_f[2];
        assert!((nodes.temp_f[2] - (100.0 + 3.6e6 / c)).abs() < 1e-9);
        assert_eq!(nodes.temp_f[0], 100.0);
    }

    #[test]
    fn partial_blend_relaxes_toward_saturation() {
        let cfg = SecondaryConfig::default();
        let props = SteamTableFit::default();
        let mut nodes = NodeStates::uniform(1, 0.0);
        let mut one_node = cfg.clone();
        one_node.geometry.nodes.truncate(1);
        nodes.temp_f[0] = 225.0;
        nodes.blend[0] = 0.5;
        integrate(&mut nodes, 1.44e6, 240.0, 17.0, 219.6, 10.0, &one_node, &props);
        assert!(nodes.temp_f[0] < 225.0);
        assert!(nodes.temp_f[0] > 219.6);
    }

    #[test]
    fn capacity_has_floor_when_dry() {
        let mut cfg = SecondaryConfig::default();
        cfg.geometry.metal_mass_lb = 0.0;
        let props = SteamTableFit::default();
        let c = node_heat_capacity(0, 100.0, 0.0, 17.0, &cfg, &props);
        assert_eq!(c, MIN_HEAT_CAPACITY_BTU_F);
    }

    #[test]
    fn long_step_settles_at_primary_temperature() {
        let cfg = SecondaryConfig::default();
        let props = SteamTableFit::default();
        let mut nodes = NodeStates::uniform(5, 100.0);
        nodes.heat_rate_btu_hr[0] = 5.0e8;
        nodes.conduction_btu_hr[1] = -2.0e8;
        integrate(&mut nodes, 1.44e6, 400.0, 17.0, 219.6, 36_000.0, &cfg, &props);
        assert_eq!(nodes.temp_f[0], 400.0);
        // losses cannot cool a node below the coldest starting temperature
        assert_eq!(nodes.temp_f[1], 100.0);
    }
}
