//! Secondary pressure resolution.
//!
//! Pressure is chosen from one of three bases each step:
//!
//! 1. **Floor**: the nitrogen blanket, held until some node reaches the
//!    saturation temperature of the current pressure.
//! 2. **Saturation**: the saturation pressure of the hottest water. Energy
//!    the steam outlet could not pass warms the fully boiling pool along the
//!    saturation line, so pressure keeps rising while nodes stay pinned.
//! 3. **Inventory**: with the gas space closed, the partial pressures of the
//!    trapped gas and the steam produced into it. Reopening the gas space
//!    releases the held steam.
//!
//! Every basis is bounded to `[floor, safety ceiling]` and finally capped at
//! the steam-dump setpoint.

use sg_core::bound;
use sg_props::{GasSpecies, WaterProperties};
use tracing::{debug, trace};

use crate::config::SecondaryConfig;
use crate::state::{PressureMode, SecondaryState};

/// Inputs for one resolution.
#[derive(Debug, Clone, Copy)]
pub struct PressureInputs {
    /// Primary temperature after the saturation guard; the pool never warms
    /// past it.
    pub primary_temp_f: f64,
    /// Gas space closed (explicitly isolated or no heat sink).
    pub isolated: bool,
}

/// Gas-space volume left above the water [ft3], never below the cushion.
pub fn gas_space_volume_ft3(
    water_mass_lb: f64,
    bulk_temp_f: f64,
    pressure_psia: f64,
    config: &SecondaryConfig,
    props: &dyn WaterProperties,
) -> f64 {
    let rho = props.liquid_density_lb_ft3(bulk_temp_f, pressure_psia).max(1.0);
    let water_volume = water_mass_lb.max(0.0) / rho;
    (config.geometry.total_volume_ft3 - water_volume).max(config.pressure.min_gas_cushion_ft3)
}

/// Trapped gas plus steam inventory pressure [psia].
pub fn inventory_pressure_psia(
    trapped_gas_lb: f64,
    steam_inventory_lb: f64,
    gas_volume_ft3: f64,
    gas_temp_f: f64,
) -> f64 {
    GasSpecies::Nitrogen.partial_pressure_psia(trapped_gas_lb, gas_volume_ft3, gas_temp_f)
        + GasSpecies::Steam.partial_pressure_psia(steam_inventory_lb, gas_volume_ft3, gas_temp_f)
}

/// Heat capacity of the fully boiling pool [BTU/F].
pub fn pool_heat_capacity(state: &SecondaryState) -> f64 {
    let nodes = &state.nodes;
    nodes
        .blend
        .iter()
        .zip(&nodes.heat_capacity_btu_f)
        .filter(|(b, _)| **b >= 1.0)
        .map(|(_, c)| *c)
        .sum()
}

/// Resolve pressure for this step and update the pressure and gas-space
/// state. Returns the new mode when it changed.
pub fn resolve(
    state: &mut SecondaryState,
    inputs: &PressureInputs,
    config: &SecondaryConfig,
    props: &dyn WaterProperties,
) -> Option<PressureMode> {
    let pc = &config.pressure;
    let tol = config.heat_transfer.saturation_tolerance_f;
    let previous_mode = state.pressure.mode;
    let previous_psia = state.pressure.pressure_psia;
    let previous_t_sat = state.pressure.saturation_temp_f;

    let volume = gas_space_volume_ft3(
        state.water_mass_lb,
        state.bulk_temp_f,
        previous_psia,
        config,
        props,
    );
    state.steam.gas_volume_ft3 = volume;
    if !inputs.isolated && state.steam.inventory_lb > 0.0 {
        // an open gas space passes its held steam out through the steam line
        debug!(released_lb = state.steam.inventory_lb, "gas space reopened");
        state.steam.inventory_lb = 0.0;
    }
    let t_gas = state.top_temp_f;
    let mut inventory_psia = inventory_pressure_psia(
        state.steam.trapped_gas_lb,
        state.steam.inventory_lb,
        volume,
        t_gas,
    );

    let t_hot = state.nodes.hottest_f();
    let reached = t_hot >= previous_t_sat - tol;

    let (mode, basis) = if !reached {
        match previous_mode {
            PressureMode::Floor => (PressureMode::Floor, pc.floor_psia),
            _ if inputs.isolated => (PressureMode::Inventory, inventory_psia),
            _ if previous_psia <= inventory_psia.max(pc.floor_psia) + pc.reversion_guard_psi => {
                (PressureMode::Floor, pc.floor_psia)
            }
            _ => (PressureMode::Saturation, props.saturation_pressure_psia(t_hot)),
        }
    } else if inputs.isolated {
        if previous_mode != PressureMode::Inventory {
            let steam_psia =
                GasSpecies::Steam.partial_pressure_psia(state.steam.inventory_lb, volume, t_gas);
            let gas_psia = (previous_psia - steam_psia).max(0.0);
            state.steam.trapped_gas_lb =
                GasSpecies::Nitrogen.mass_for_pressure_lb(gas_psia, volume, t_gas);
            inventory_psia = inventory_pressure_psia(
                state.steam.trapped_gas_lb,
                state.steam.inventory_lb,
                volume,
                t_gas,
            );
            debug!(
                trapped_gas_lb = state.steam.trapped_gas_lb,
                gas_volume_ft3 = volume,
                "gas space closed"
            );
        }
        (PressureMode::Inventory, inventory_psia)
    } else {
        let pool_c = pool_heat_capacity(state);
        let retained = state.steam.retained_energy_btu;
        let pool_t = if retained > 0.0 && pool_c > 0.0 {
            (previous_t_sat + retained / pool_c).min(inputs.primary_temp_f.max(previous_t_sat))
        } else {
            f64::NEG_INFINITY
        };
        (
            PressureMode::Saturation,
            props.saturation_pressure_psia(t_hot.max(pool_t)),
        )
    };
    state.steam.retained_energy_btu = 0.0;

    let pressure = bound(basis, pc.floor_psia, pc.safety_ceiling_psia).min(pc.steam_dump_setpoint_psia);

    if mode == PressureMode::Inventory && inventory_psia > pressure {
        let gas_psia =
            GasSpecies::Nitrogen.partial_pressure_psia(state.steam.trapped_gas_lb, volume, t_gas);
        let kept = GasSpecies::Steam
            .mass_for_pressure_lb((pressure - gas_psia).max(0.0), volume, t_gas)
            .min(state.steam.inventory_lb);
        trace!(
            vented_lb = state.steam.inventory_lb - kept,
            "venting gas space to hold pressure cap"
        );
        state.steam.inventory_lb = kept;
        inventory_psia = inventory_pressure_psia(state.steam.trapped_gas_lb, kept, volume, t_gas);
    }
    state.steam.inventory_pressure_psia = inventory_psia;

    let t_sat = props.saturation_temperature_f(pressure);
    if mode == PressureMode::Saturation {
        for (t, b) in state.nodes.temp_f.iter_mut().zip(&state.nodes.blend) {
            if *b >= 1.0 {
                *t = t_sat;
            }
        }
    }

    state.pressure.pressure_psia = pressure;
    state.pressure.saturation_temp_f = t_sat;
    state.pressure.mode = mode;
    state.pressure.max_superheat_f = state.nodes.hottest_f() - t_sat;

    trace!(
        pressure_psia = pressure,
        t_sat_f = t_sat,
        mode = mode.as_str(),
        "pressure resolved"
    );

    if mode != previous_mode {
        debug!(
            from = previous_mode.as_str(),
            to = mode.as_str(),
            pressure_psia = pressure,
            "pressure basis changed"
        );
        Some(mode)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clamp::ClampContext;
    use crate::engine::SecondaryModel;

    fn model() -> SecondaryModel {
        SecondaryModel::with_defaults()
    }

    fn inputs(isolated: bool) -> PressureInputs {
        PressureInputs {
            primary_temp_f: 600.0,
            isolated,
        }
    }

    #[test]
    fn cold_generator_holds_floor() {
        let m = model();
        let mut state = m.initialize(100.0, &mut ClampContext::new());
        let change = resolve(&mut state, &inputs(false), m.config(), m.props());
        assert!(change.is_none());
        assert_eq!(state.pressure.pressure_psia, 17.0);
        assert_eq!(state.pressure.mode, PressureMode::Floor);
    }

    #[test]
    fn saturated_node_switches_to_saturation_basis() {
        let m = model();
        let mut state = m.initialize(100.0, &mut ClampContext::new());
        state.nodes.temp_f[0] = 250.0;
        let change = resolve(&mut state, &inputs(false), m.config(), m.props());
        assert_eq!(change, Some(PressureMode::Saturation));
        let expected = m.props().saturation_pressure_psia(250.0);
        assert!((state.pressure.pressure_psia - expected).abs() < 1e-9);
        assert!(state.pressure.max_superheat_f.abs() < 1e-6);
    }

    #[test]
    fn saturation_basis_caps_at_setpoint() {
        let m = model();
        let mut state = m.initialize(100.0, &mut ClampContext::new());
        state.nodes.temp_f[0] = 620.0;
        resolve(&mut state, &inputs(false), m.config(), m.props());
        assert_eq!(
            state.pressure.pressure_psia,
            m.config().pressure.steam_dump_setpoint_psia
        );
    }

    #[test]
    fn isolated_entry_is_continuous_and_grows_with_steam() {
        let m = model();
        let mut state = m.initialize(100.0, &mut ClampContext::new());
        state.nodes.temp_f[0] = 220.0;
        state.top_temp_f = 220.0;
        let change = resolve(&mut state, &inputs(true), m.config(), m.props());
        assert_eq!(change, Some(PressureMode::Inventory));
        assert!((state.pressure.pressure_psia - 17.0).abs() < 1e-9);

        state.steam.inventory_lb += 50.0;
        resolve(&mut state, &inputs(true), m.config(), m.props());
        assert!(state.pressure.pressure_psia > 17.0);
        assert_eq!(state.pressure.mode, PressureMode::Inventory);
    }

    #[test]
    fn inventory_vents_to_hold_setpoint() {
        let m = model();
        let mut state = m.initialize(100.0, &mut ClampContext::new());
        state.nodes.temp_f[0] = 300.0;
        state.top_temp_f = 300.0;
        resolve(&mut state, &inputs(true), m.config(), m.props());
        state.steam.inventory_lb = 1.0e6;
        resolve(&mut state, &inputs(true), m.config(), m.props());
        let setpoint = m.config().pressure.steam_dump_setpoint_psia;
        assert_eq!(state.pressure.pressure_psia, setpoint);
        assert!(state.steam.inventory_lb < 1.0e6);
        assert!((state.steam.inventory_pressure_psia - setpoint).abs() < 1e-6);
    }

    #[test]
    fn retained_energy_warms_pinned_pool() {
        let m = model();
        let mut state = m.initialize(100.0, &mut ClampContext::new());
        state.nodes.temp_f[0] = 250.0;
        resolve(&mut state, &inputs(false), m.config(), m.props());
        let t_sat = state.pressure.saturation_temp_f;
        state.nodes.blend[0] = 1.0;
        let c = state.nodes.heat_capacity_btu_f[0];
        state.steam.retained_energy_btu = 2.0 * c;
        resolve(&mut state, &inputs(false), m.config(), m.props());
        assert!((state.pressure.saturation_temp_f - (t_sat + 2.0)).abs() < 1e-6);
        assert_eq!(state.nodes.temp_f[0], state.pressure.saturation_temp_f);
        assert_eq!(state.steam.retained_energy_btu, 0.0);
    }

    #[test]
    fn pool_never_warms_past_primary() {
        let m = model();
        let mut state = m.initialize(100.0, &mut ClampContext::new());
        state.nodes.temp_f[0] = 250.0;
        resolve(&mut state, &inputs(false), m.config(), m.props());
        state.nodes.blend[0] = 1.0;
        state.steam.retained_energy_btu = 1.0e12;
        let limited = PressureInputs {
            primary_temp_f: 260.0,
            isolated: false,
        };
        resolve(&mut state, &limited, m.config(), m.props());
        assert!((state.pressure.saturation_temp_f - 260.0).abs() < 1e-6);
    }

    #[test]
    fn small_dip_near_floor_reverts_to_floor() {
        let m = model();
        let mut state = m.initialize(100.0, &mut ClampContext::new());
        state.nodes.temp_f[0] = 219.7;
        resolve(&mut state, &inputs(false), m.config(), m.props());
        assert_eq!(state.pressure.mode, PressureMode::Saturation);
        state.nodes.temp_f[0] = 200.0;
        let change = resolve(&mut state, &inputs(false), m.config(), m.props());
        assert_eq!(change, Some(PressureMode::Floor));
        assert_eq!(state.pressure.pressure_psia, 17.0);
    }

    #[test]
    fn dip_from_high_pressure_keeps_saturation_basis() {
        let m = model();
        let mut state = m.initialize(100.0, &mut ClampContext::new());
        state.nodes.temp_f[0] = 400.0;
        resolve(&mut state, &inputs(false), m.config(), m.props());
        state.nodes.temp_f[0] = 390.0;
        let change = resolve(&mut state, &inputs(false), m.config(), m.props());
        assert!(change.is_none());
        let expected = m.props().saturation_pressure_psia(390.0);
        assert!((state.pressure.pressure_psia - expected).abs() < 1e-9);
    }

    #[test]
    fn reopening_releases_held_steam() {
        let m = model();
        let mut state = m.initialize(100.0, &mut ClampContext::new());
        state.nodes.temp_f[0] = 220.0;
        state.top_temp_f = 220.0;
        resolve(&mut state, &inputs(true), m.config(), m.props());
        state.steam.inventory_lb = 35.0;
        resolve(&mut state, &inputs(true), m.config(), m.props());

        resolve(&mut state, &inputs(false), m.config(), m.props());
        assert_eq!(state.steam.inventory_lb, 0.0);
        assert_eq!(state.pressure.mode, PressureMode::Saturation);

        // closing again re-bases the blanket on gas alone
        let before = state.pressure.pressure_psia;
        resolve(&mut state, &inputs(true), m.config(), m.props());
        assert_eq!(state.steam.inventory_lb, 0.0);
        assert_eq!(state.pressure.mode, PressureMode::Inventory);
        assert!((state.pressure.pressure_psia - before).abs() < 1e-9);
    }
}
