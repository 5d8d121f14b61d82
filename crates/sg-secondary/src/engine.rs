//! Secondary-side model: initialization and the per-step update.
//!
//! One call to [`SecondaryModel::advance`] runs, in order:
//!
//! 1. thermocline growth
//! 2. pressure resolution
//! 3. regime classification and boiling blend
//! 4. per-node heat transfer and inter-node conduction
//! 5. temperature integration
//! 6. the heat-removal delta clamp
//! 7. steam production, steam line, draining and levels
//!
//! Stepping never fails; degenerate inputs are sanitized instead.

use serde::{Deserialize, Serialize};
use sg_core::{Length, Mass, MassRate, Power, Pressure, Temperature, bound, conv};
use sg_props::{AntoineCoefficients, GasSpecies, SteamTableFit, WaterProperties};
use tracing::{debug, trace};

use crate::clamp::{ClampContext, ClampStatus};
use crate::conduction;
use crate::config::SecondaryConfig;
use crate::error::SecondaryResult;
use crate::heat_transfer::{self, HeatInputs};
use crate::inventory::{self, InventoryInputs};
use crate::pressure::{self, PressureInputs};
use crate::regime;
use crate::state::{
    DrainingState, NodeStates, PressureMode, PressureState, Regime, SecondaryState,
    SteamLineState, SteamState,
};
use crate::temperature;
use crate::thermocline;

/// Range accepted for the initial water temperature.
const INITIAL_TEMP_RANGE_F: (f64, f64) = (32.0, 700.0);

/// Inputs supplied by the primary side each step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepInputs {
    pub primary_temp_f: f64,
    pub pumps_running: u32,
    /// Primary system pressure; the primary temperature seen by the tubes is
    /// capped at its saturation temperature.
    pub system_pressure_psia: f64,
    pub dt_s: f64,
    /// Steam line open to a condenser or dump path.
    pub heat_sink_available: bool,
    /// Gas space explicitly closed regardless of heat sink.
    #[serde(default)]
    pub isolated: bool,
}

impl StepInputs {
    pub fn new(primary_temp_f: f64, pumps_running: u32, system_pressure_psia: f64, dt_s: f64) -> Self {
        Self {
            primary_temp_f,
            pumps_running,
            system_pressure_psia,
            dt_s,
            heat_sink_available: true,
            isolated: false,
        }
    }

    pub fn gas_space_closed(&self) -> bool {
        self.isolated || !self.heat_sink_available
    }
}

/// Everything a caller needs from one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSnapshot {
    pub time_s: f64,
    pub regime: Regime,
    pub pressure_mode: PressureMode,
    pub primary_temp_f: f64,
    /// Effective primary temperature minus secondary bulk temperature.
    pub primary_to_secondary_dt_f: f64,

    pub pressure_psia: f64,
    pub saturation_temp_f: f64,
    pub max_superheat_f: f64,

    pub node_temps_f: Vec<f64>,
    pub node_blend: Vec<f64>,
    pub bulk_temp_f: f64,
    pub top_temp_f: f64,
    pub bottom_temp_f: f64,
    pub stratification_f: f64,

    /// Reported heat removal after the delta clamp.
    pub heat_removal_btu_hr: f64,
    pub heat_removal_mw: f64,
    /// Heat removal before the delta clamp.
    pub raw_heat_btu_hr: f64,
    pub boiling_heat_btu_hr: f64,
    pub sensible_heat_btu_hr: f64,
    pub clamp_status: ClampStatus,
    pub active_area_fraction: f64,

    pub steam_production_lb_hr: f64,
    pub steam_production_mw: f64,
    pub cumulative_steam_lb: f64,
    pub steam_outflow_lb_hr: f64,
    pub steam_inventory_lb: f64,
    pub gas_volume_ft3: f64,
    pub steam_line_temp_f: f64,
    pub condensation_lb_hr: f64,

    pub water_mass_lb: f64,
    pub wide_range_level_pct: f64,
    pub narrow_range_level_pct: f64,
    pub thermocline_height_ft: f64,

    pub draining_active: bool,
    pub draining_complete: bool,
    pub drain_rate_gpm: f64,
}

impl StepSnapshot {
    pub fn pressure(&self) -> Pressure {
        sg_core::psia(self.pressure_psia)
    }

    pub fn saturation_temperature(&self) -> Temperature {
        sg_core::degf(self.saturation_temp_f)
    }

    pub fn heat_removal(&self) -> Power {
        sg_core::btu_per_hr(self.heat_removal_btu_hr)
    }

    pub fn steam_production(&self) -> MassRate {
        sg_core::lbm_per_hr(self.steam_production_lb_hr)
    }

    pub fn water_mass(&self) -> Mass {
        sg_core::lbm(self.water_mass_lb)
    }

    pub fn thermocline_height(&self) -> Length {
        sg_core::ft(self.thermocline_height_ft)
    }
}

/// Secondary-side model: configuration plus water properties.
///
/// The model itself is immutable; all evolving quantities live in
/// [`SecondaryState`] and the caller-owned [`ClampContext`], so one model can
/// drive many independent runs.
pub struct SecondaryModel {
    config: SecondaryConfig,
    props: Box<dyn WaterProperties>,
}

impl std::fmt::Debug for SecondaryModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecondaryModel")
            .field("config", &self.config)
            .field("props", &self.props.name())
            .finish()
    }
}

impl SecondaryModel {
    pub fn new(config: SecondaryConfig, props: Box<dyn WaterProperties>) -> SecondaryResult<Self> {
        config.validate()?;
        Ok(Self { config, props })
    }

    /// Model with the given configuration and the default steam-table fit.
    pub fn from_config(config: SecondaryConfig) -> SecondaryResult<Self> {
        Self::new(config, Box::new(SteamTableFit::default()))
    }

    /// Model with a steam-table fit built on a custom saturation curve.
    pub fn with_saturation_curve(
        config: SecondaryConfig,
        antoine: AntoineCoefficients,
    ) -> SecondaryResult<Self> {
        let props = SteamTableFit::with_antoine(antoine)?;
        Self::new(config, Box::new(props))
    }

    pub fn with_defaults() -> Self {
        Self {
            config: SecondaryConfig::default(),
            props: Box::new(SteamTableFit::default()),
        }
    }

    pub fn config(&self) -> &SecondaryConfig {
        &self.config
    }

    pub fn props(&self) -> &dyn WaterProperties {
        self.props.as_ref()
    }

    /// Wet-layup state: uniform temperature, full inventory, blanket pressure.
    ///
    /// The clamp context is reset so the first step of the new run is never
    /// limited against the previous one. Non-finite or out-of-range
    /// temperatures are bounded to the property range.
    pub fn initialize(&self, initial_temp_f: f64, clamp: &mut ClampContext) -> SecondaryState {
        clamp.reset();
        let cfg = &self.config;
        let props = self.props();
        let t0 = bound(initial_temp_f, INITIAL_TEMP_RANGE_F.0, INITIAL_TEMP_RANGE_F.1);
        let n = cfg.node_count();
        let floor = cfg.pressure.floor_psia;
        let t_sat = props.saturation_temperature_f(floor);
        let mass = cfg.inventory.wet_layup_mass_lb;

        let mut state = SecondaryState {
            nodes: NodeStates::uniform(n, t0),
            pressure: PressureState {
                pressure_psia: floor,
                saturation_temp_f: t_sat,
                mode: PressureMode::Floor,
                max_superheat_f: t0 - t_sat,
                gas_isolated: false,
            },
            steam: SteamState::default(),
            steam_line: SteamLineState {
                temp_f: t0,
                condensation_btu_hr: 0.0,
                condensation_lb_hr: 0.0,
            },
            draining: DrainingState::default(),
            regime: Regime::Subcooled,
            boiling_active: false,
            water_mass_lb: mass,
            initial_mass_lb: mass,
            wide_range_level_pct: 100.0,
            narrow_range_level_pct: 0.0,
            thermocline_height_ft: cfg.geometry.bundle_height_ft,
            active_area_fraction: 0.0,
            powered_time_hr: 0.0,
            elapsed_s: 0.0,
            bulk_temp_f: t0,
            top_temp_f: t0,
            bottom_temp_f: t0,
            stratification_f: 0.0,
            heat_removal_btu_hr: 0.0,
            boiling_heat_btu_hr: 0.0,
            sensible_heat_btu_hr: 0.0,
        };

        for i in 0..n {
            state.nodes.heat_capacity_btu_f[i] =
                temperature::node_heat_capacity(i, t0, mass, floor, cfg, props);
        }

        let volume = pressure::gas_space_volume_ft3(mass, t0, floor, cfg, props);
        state.steam.gas_volume_ft3 = volume;
        state.steam.trapped_gas_lb = GasSpecies::Nitrogen.mass_for_pressure_lb(floor, volume, t0);
        state.steam.inventory_pressure_psia = floor;

        state.regime = regime::classify(&state.nodes.temp_f, floor, t_sat, cfg);
        state.boiling_active = state.regime != Regime::Subcooled;
        inventory::update_levels(&mut state, cfg);
        state
    }

    /// Primary temperature seen by the tubes: never above the saturation
    /// temperature of the primary system pressure.
    pub fn effective_primary_temp_f(&self, inputs: &StepInputs, fallback_f: f64) -> f64 {
        let t = if inputs.primary_temp_f.is_finite() {
            inputs.primary_temp_f
        } else {
            fallback_f
        };
        if inputs.system_pressure_psia.is_finite() && inputs.system_pressure_psia > 0.0 {
            t.min(self.props.saturation_temperature_f(inputs.system_pressure_psia))
        } else {
            t
        }
    }

    /// Advance the secondary side by one step.
    pub fn advance(
        &self,
        state: &mut SecondaryState,
        clamp: &mut ClampContext,
        inputs: &StepInputs,
    ) -> StepSnapshot {
        let cfg = &self.config;
        let props = self.props();
        let dt_s = if inputs.dt_s.is_finite() {
            inputs.dt_s.max(0.0)
        } else {
            0.0
        };
        let dt_hr = conv::seconds_to_hours(dt_s);
        let t_primary = self.effective_primary_temp_f(inputs, state.bulk_temp_f);
        let isolated = inputs.gas_space_closed();
        state.pressure.gas_isolated = isolated;
        state.steam.isolated = isolated;

        thermocline::advance(state, &cfg.geometry, inputs.pumps_running, dt_hr);

        pressure::resolve(
            state,
            &PressureInputs {
                primary_temp_f: t_primary,
                isolated,
            },
            cfg,
            props,
        );
        let p = state.pressure.pressure_psia;
        let t_sat = state.pressure.saturation_temp_f;

        let regime = regime::classify(&state.nodes.temp_f, p, t_sat, cfg);
        if regime != state.regime {
            debug!(
                from = state.regime.as_str(),
                to = regime.as_str(),
                time_s = state.elapsed_s,
                pressure_psia = p,
                top_temp_f = state.top_temp_f,
                "secondary regime changed"
            );
        }
        state.regime = regime;
        state.boiling_active = regime != Regime::Subcooled;

        heat_transfer::update_blend(&mut state.nodes, t_sat, regime, dt_s, &cfg.heat_transfer);
        let totals = heat_transfer::compute(
            &mut state.nodes,
            &HeatInputs {
                primary_temp_f: t_primary,
                pressure_psia: p,
                saturation_temp_f: t_sat,
                pumps_running: inputs.pumps_running,
                thermocline_ft: state.thermocline_height_ft,
            },
            cfg,
        );
        state.active_area_fraction = totals.active_area_fraction;

        let nodes = &mut state.nodes;
        conduction::exchange(
            &nodes.temp_f,
            &nodes.boiling,
            &cfg.heat_transfer,
            &mut nodes.conduction_btu_hr,
        );
        temperature::integrate(
            nodes,
            state.water_mass_lb,
            t_primary,
            p,
            t_sat,
            dt_s,
            cfg,
            props,
        );
        state.refresh_aggregates(cfg.geometry.nodes.iter().map(|n| n.mass_fraction));

        let outcome = clamp.apply(
            totals.total_btu_hr,
            totals.boiling_btu_hr,
            totals.sensible_btu_hr,
            regime,
            inputs.pumps_running,
            cfg.stability.delta_clamp_mw,
        );
        state.heat_removal_btu_hr = outcome.heat_btu_hr;
        state.boiling_heat_btu_hr = outcome.boiling_btu_hr;
        state.sensible_heat_btu_hr = outcome.sensible_btu_hr;

        let saturation = props.saturation_pack(p);
        inventory::update_steam(
            state,
            &InventoryInputs {
                boiling_heat_btu_hr: outcome.boiling_btu_hr,
                regime,
                isolated,
                dt_s,
                saturation,
            },
            cfg,
        );
        inventory::update_draining(state, dt_s, cfg, props);
        inventory::update_levels(state, cfg);
        state.elapsed_s += dt_s;

        trace!(
            time_s = state.elapsed_s,
            heat_btu_hr = outcome.heat_btu_hr,
            steam_lb_hr = state.steam.production_lb_hr,
            mass_lb = state.water_mass_lb,
            saturation = %saturation.summary(),
            "secondary step"
        );

        StepSnapshot {
            time_s: state.elapsed_s,
            regime,
            pressure_mode: state.pressure.mode,
            primary_temp_f: t_primary,
            primary_to_secondary_dt_f: t_primary - state.bulk_temp_f,
            pressure_psia: p,
            saturation_temp_f: t_sat,
            max_superheat_f: state.pressure.max_superheat_f,
            node_temps_f: state.nodes.temp_f.clone(),
            node_blend: state.nodes.blend.clone(),
            bulk_temp_f: state.bulk_temp_f,
            top_temp_f: state.top_temp_f,
            bottom_temp_f: state.bottom_temp_f,
            stratification_f: state.stratification_f,
            heat_removal_btu_hr: outcome.heat_btu_hr,
            heat_removal_mw: conv::btu_hr_to_mw(outcome.heat_btu_hr),
            raw_heat_btu_hr: totals.total_btu_hr,
            boiling_heat_btu_hr: outcome.boiling_btu_hr,
            sensible_heat_btu_hr: outcome.sensible_btu_hr,
            clamp_status: outcome.status,
            active_area_fraction: totals.active_area_fraction,
            steam_production_lb_hr: state.steam.production_lb_hr,
            steam_production_mw: state.steam.production_mw,
            cumulative_steam_lb: state.steam.cumulative_lb,
            steam_outflow_lb_hr: state.steam.outflow_lb_hr,
            steam_inventory_lb: state.steam.inventory_lb,
            gas_volume_ft3: state.steam.gas_volume_ft3,
            steam_line_temp_f: state.steam_line.temp_f,
            condensation_lb_hr: state.steam_line.condensation_lb_hr,
            water_mass_lb: state.water_mass_lb,
            wide_range_level_pct: state.wide_range_level_pct,
            narrow_range_level_pct: state.narrow_range_level_pct,
            thermocline_height_ft: state.thermocline_height_ft,
            draining_active: state.draining.active,
            draining_complete: state.draining.complete,
            drain_rate_gpm: state.draining.rate_gpm,
        }
    }
}
