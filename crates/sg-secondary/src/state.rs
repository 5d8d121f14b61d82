//! Mutable secondary-side state carried between steps.
//!
//! Per-node quantities are stored as parallel vectors indexed top to bottom.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Secondary-side operating regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    Subcooled,
    Boiling,
    SteamDump,
}

impl Regime {
    pub fn as_str(self) -> &'static str {
        match self {
            Regime::Subcooled => "subcooled",
            Regime::Boiling => "boiling",
            Regime::SteamDump => "steam_dump",
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Basis the pressure resolver used on the last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PressureMode {
    /// Nitrogen blanket floor.
    Floor,
    /// Saturation pressure of the hottest water.
    Saturation,
    /// Trapped gas plus retained steam in a closed gas space.
    Inventory,
}

impl PressureMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PressureMode::Floor => "floor",
            PressureMode::Saturation => "saturation",
            PressureMode::Inventory => "inventory",
        }
    }
}

impl std::fmt::Display for PressureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStates {
    pub temp_f: Vec<f64>,
    /// Primary-to-node heat rate from the last step (pre-clamp).
    pub heat_rate_btu_hr: Vec<f64>,
    pub htc_btu_hr_ft2_f: Vec<f64>,
    pub effective_area_fraction: Vec<f64>,
    pub boiling: Vec<bool>,
    /// Subcooled-to-boiling blend, 0 fully subcooled and 1 fully boiling.
    pub blend: Vec<f64>,
    /// Net inter-node conduction into each node.
    pub conduction_btu_hr: Vec<f64>,
    /// Water plus metal heat capacity from the last integration.
    pub heat_capacity_btu_f: Vec<f64>,
}

impl NodeStates {
    pub fn uniform(count: usize, temp_f: f64) -> Self {
        Self {
            temp_f: vec![temp_f; count],
            heat_rate_btu_hr: vec![0.0; count],
            htc_btu_hr_ft2_f: vec![0.0; count],
            effective_area_fraction: vec![0.0; count],
            boiling: vec![false; count],
            blend: vec![0.0; count],
            conduction_btu_hr: vec![0.0; count],
            heat_capacity_btu_f: vec![0.0; count],
        }
    }

    pub fn len(&self) -> usize {
        self.temp_f.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temp_f.is_empty()
    }

    pub fn hottest_f(&self) -> f64 {
        self.temp_f.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureState {
    pub pressure_psia: f64,
    pub saturation_temp_f: f64,
    pub mode: PressureMode,
    /// Hottest node temperature minus saturation temperature.
    pub max_superheat_f: f64,
    /// Gas blanket closed off from the steam outlet.
    pub gas_isolated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SteamState {
    /// Steam outlet closed; production accumulates as inventory.
    pub isolated: bool,
    pub production_lb_hr: f64,
    pub production_mw: f64,
    pub cumulative_lb: f64,
    /// Steam produced during the last step.
    pub step_lb: f64,
    /// Steam held in a closed gas space.
    pub inventory_lb: f64,
    pub outflow_lb_hr: f64,
    pub gas_volume_ft3: f64,
    /// Non-condensable gas captured when the gas space last closed.
    pub trapped_gas_lb: f64,
    pub inventory_pressure_psia: f64,
    /// Boiling energy the outlet could not pass, awaiting the saturated pool.
    pub retained_energy_btu: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteamLineState {
    pub temp_f: f64,
    pub condensation_btu_hr: f64,
    pub condensation_lb_hr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DrainingState {
    pub active: bool,
    pub complete: bool,
    pub rate_gpm: f64,
    pub rate_lb_hr: f64,
    pub drained_lb: f64,
    /// Mass removed during the last step.
    pub step_lb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryState {
    pub nodes: NodeStates,
    pub pressure: PressureState,
    pub steam: SteamState,
    pub steam_line: SteamLineState,
    pub draining: DrainingState,
    pub regime: Regime,
    pub boiling_active: bool,

    pub water_mass_lb: f64,
    pub initial_mass_lb: f64,
    pub wide_range_level_pct: f64,
    pub narrow_range_level_pct: f64,

    pub thermocline_height_ft: f64,
    /// Sum of node area fractions carrying heat on the last step.
    pub active_area_fraction: f64,
    /// Time with at least one primary pump running.
    pub powered_time_hr: f64,
    pub elapsed_s: f64,

    pub bulk_temp_f: f64,
    pub top_temp_f: f64,
    pub bottom_temp_f: f64,
    pub stratification_f: f64,

    /// Reported (post-clamp) heat removal from the last step.
    pub heat_removal_btu_hr: f64,
    pub boiling_heat_btu_hr: f64,
    pub sensible_heat_btu_hr: f64,
}

impl SecondaryState {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Begin draining toward the target mass. Ignored once draining has
    /// completed.
    pub fn start_draining(&mut self) {
        if !self.draining.complete && !self.draining.active {
            self.draining.active = true;
            debug!(
                water_mass_lb = self.water_mass_lb,
                time_s = self.elapsed_s,
                "draining started"
            );
        }
    }

    /// Recompute bulk, top, bottom and stratification from node temperatures.
    pub fn refresh_aggregates(&mut self, mass_fractions: impl Iterator<Item = f64>) {
        let temps = &self.nodes.temp_f;
        if temps.is_empty() {
            return;
        }
        let mut weighted = 0.0;
        let mut weight = 0.0;
        for (t, w) in temps.iter().zip(mass_fractions) {
            weighted += t * w;
            weight += w;
        }
        self.bulk_temp_f = if weight > 0.0 {
            weighted / weight
        } else {
            temps.iter().sum::<f64>() / temps.len() as f64
        };
        self.top_temp_f = temps[0];
        self.bottom_temp_f = temps[temps.len() - 1];
        self.stratification_f = self.top_temp_f - self.bottom_temp_f;
    }
}
