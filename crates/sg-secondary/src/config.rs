//! Tunable parameters for the secondary-side model.
//!
//! Every section has defaults for a four-loop PWR steam generator, so a YAML
//! file only needs to name the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SecondaryError, SecondaryResult};
use crate::geometry::{NodeGeometry, default_nodes};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SecondaryConfig {
    pub geometry: GeometryConfig,
    pub heat_transfer: HeatTransferConfig,
    pub pressure: PressureConfig,
    pub inventory: InventoryConfig,
    pub stability: StabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Vertical nodes, top to bottom.
    pub nodes: Vec<NodeGeometry>,
    pub bundle_height_ft: f64,
    pub tube_area_ft2: f64,
    /// Secondary shell volume (liquid plus gas space).
    pub total_volume_ft3: f64,
    pub metal_mass_lb: f64,
    pub metal_cp_btu_lb_f: f64,
    /// Effective diffusivity used for thermocline growth while pumps run.
    pub thermocline_diffusivity_ft2_hr: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            nodes: default_nodes(),
            bundle_height_ft: 24.0,
            tube_area_ft2: 220_000.0,
            total_volume_ft3: 23_600.0,
            metal_mass_lb: 800_000.0,
            metal_cp_btu_lb_f: 0.12,
            thermocline_diffusivity_ft2_hr: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatTransferConfig {
    /// Natural-convection coefficient for stagnant wet-layup water.
    pub stagnant_htc_btu_hr_ft2_f: f64,
    /// Temperature efficiency at and below `efficiency_low_f`.
    pub efficiency_min: f64,
    pub efficiency_low_f: f64,
    /// Temperature at which the efficiency reaches 1.0.
    pub efficiency_high_f: f64,
    /// Nucleate boiling coefficient at atmospheric pressure.
    pub boiling_htc_ref_btu_hr_ft2_f: f64,
    pub boiling_pressure_exponent: f64,
    pub boiling_htc_max_btu_hr_ft2_f: f64,
    /// Tube-side forced-convection coefficient with all pumps running.
    pub primary_htc_btu_hr_ft2_f: f64,
    pub rated_pumps: u32,
    /// Primary flow fraction with no pumps running.
    pub natural_circulation_fraction: f64,
    /// Time for a node to blend fully from subcooled to boiling.
    pub blend_ramp_s: f64,
    /// Driving temperature differences below this contribute no heat.
    pub min_driving_dt_f: f64,
    /// A node within this margin of saturation counts as saturated.
    pub saturation_tolerance_f: f64,
    /// Inter-node conductance between like nodes.
    pub conductance_btu_hr_f: f64,
    /// Inter-node conductance across a boiling/subcooled interface.
    pub interface_conductance_btu_hr_f: f64,
}

impl Default for HeatTransferConfig {
    fn default() -> Self {
        Self {
            stagnant_htc_btu_hr_ft2_f: 30.0,
            efficiency_min: 0.5,
            efficiency_low_f: 100.0,
            efficiency_high_f: 400.0,
            boiling_htc_ref_btu_hr_ft2_f: 1_000.0,
            boiling_pressure_exponent: 0.35,
            boiling_htc_max_btu_hr_ft2_f: 2_500.0,
            primary_htc_btu_hr_ft2_f: 6_000.0,
            rated_pumps: 4,
            natural_circulation_fraction: 0.05,
            blend_ramp_s: 60.0,
            min_driving_dt_f: 0.01,
            saturation_tolerance_f: 0.05,
            conductance_btu_hr_f: 5_000.0,
            interface_conductance_btu_hr_f: 50_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureConfig {
    /// Nitrogen blanket pressure held before any node saturates.
    pub floor_psia: f64,
    pub steam_dump_setpoint_psia: f64,
    /// Safety valve lift pressure; no basis may exceed it.
    pub safety_ceiling_psia: f64,
    /// Smallest gas space used for inventory pressure.
    pub min_gas_cushion_ft3: f64,
    /// Margin above the sustained pressure inside which a sub-saturation dip
    /// may return the resolver to the floor basis.
    pub reversion_guard_psi: f64,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            floor_psia: 17.0,
            steam_dump_setpoint_psia: 1_106.7,
            safety_ceiling_psia: 1_199.7,
            min_gas_cushion_ft3: 200.0,
            reversion_guard_psi: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Water mass at wet layup (the 100 % wide-range reference).
    pub wet_layup_mass_lb: f64,
    pub drain_rate_gpm: f64,
    /// Drain stops at this fraction of the wet-layup mass.
    pub drain_target_fraction: f64,
    pub steam_line_heat_capacity_btu_f: f64,
    pub steam_line_conductance_btu_hr_f: f64,
    /// Largest share of the boiling heat the steam line may condense.
    pub condensation_cap_fraction: f64,
    /// Steam the outlet passes below the dump setpoint.
    pub steam_outlet_capacity_lb_hr: f64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            wet_layup_mass_lb: 1_440_000.0,
            drain_rate_gpm: 600.0,
            drain_target_fraction: 0.55,
            steam_line_heat_capacity_btu_f: 60_000.0,
            steam_line_conductance_btu_hr_f: 60_000.0,
            condensation_cap_fraction: 0.95,
            steam_outlet_capacity_lb_hr: 20_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Largest per-step change in reported heat removal.
    pub delta_clamp_mw: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            delta_clamp_mw: 5.0,
        }
    }
}

impl SecondaryConfig {
    pub fn from_yaml_str(text: &str) -> SecondaryResult<Self> {
        let config: SecondaryConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> SecondaryResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml_string(&self) -> SecondaryResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn node_count(&self) -> usize {
        self.geometry.nodes.len()
    }

    pub fn validate(&self) -> SecondaryResult<()> {
        let g = &self.geometry;
        if g.nodes.is_empty() {
            return Err(SecondaryError::InvalidArg {
                what: "geometry.nodes must not be empty",
            });
        }
        for (i, node) in g.nodes.iter().enumerate() {
            non_negative(&format!("geometry.nodes[{i}].area_fraction"), node.area_fraction)?;
            non_negative(&format!("geometry.nodes[{i}].mass_fraction"), node.mass_fraction)?;
            fraction(
                &format!("geometry.nodes[{i}].stagnant_effectiveness"),
                node.stagnant_effectiveness,
            )?;
        }
        let area: f64 = g.nodes.iter().map(|n| n.area_fraction).sum();
        let mass: f64 = g.nodes.iter().map(|n| n.mass_fraction).sum();
        sums_to_one("geometry.nodes area_fraction sum", area)?;
        sums_to_one("geometry.nodes mass_fraction sum", mass)?;
        positive("geometry.bundle_height_ft", g.bundle_height_ft)?;
        positive("geometry.tube_area_ft2", g.tube_area_ft2)?;
        positive("geometry.total_volume_ft3", g.total_volume_ft3)?;
        non_negative("geometry.metal_mass_lb", g.metal_mass_lb)?;
        non_negative("geometry.metal_cp_btu_lb_f", g.metal_cp_btu_lb_f)?;
        non_negative(
            "geometry.thermocline_diffusivity_ft2_hr",
            g.thermocline_diffusivity_ft2_hr,
        )?;

        let h = &self.heat_transfer;
        non_negative("heat_transfer.stagnant_htc_btu_hr_ft2_f", h.stagnant_htc_btu_hr_ft2_f)?;
        fraction("heat_transfer.efficiency_min", h.efficiency_min)?;
        if !(h.efficiency_high_f > h.efficiency_low_f) {
            return Err(SecondaryError::invalid(
                "heat_transfer.efficiency_high_f",
                h.efficiency_high_f,
                "must exceed efficiency_low_f",
            ));
        }
        positive(
            "heat_transfer.boiling_htc_ref_btu_hr_ft2_f",
            h.boiling_htc_ref_btu_hr_ft2_f,
        )?;
        non_negative(
            "heat_transfer.boiling_pressure_exponent",
            h.boiling_pressure_exponent,
        )?;
        positive(
            "heat_transfer.boiling_htc_max_btu_hr_ft2_f",
            h.boiling_htc_max_btu_hr_ft2_f,
        )?;
        positive("heat_transfer.primary_htc_btu_hr_ft2_f", h.primary_htc_btu_hr_ft2_f)?;
        if h.rated_pumps == 0 {
            return Err(SecondaryError::InvalidArg {
                what: "heat_transfer.rated_pumps must be at least 1",
            });
        }
        fraction(
            "heat_transfer.natural_circulation_fraction",
            h.natural_circulation_fraction,
        )?;
        positive("heat_transfer.blend_ramp_s", h.blend_ramp_s)?;
        non_negative("heat_transfer.min_driving_dt_f", h.min_driving_dt_f)?;
        non_negative("heat_transfer.saturation_tolerance_f", h.saturation_tolerance_f)?;
        non_negative("heat_transfer.conductance_btu_hr_f", h.conductance_btu_hr_f)?;
        non_negative(
            "heat_transfer.interface_conductance_btu_hr_f",
            h.interface_conductance_btu_hr_f,
        )?;

        let p = &self.pressure;
        positive("pressure.floor_psia", p.floor_psia)?;
        if !(p.steam_dump_setpoint_psia > p.floor_psia) {
            return Err(SecondaryError::invalid(
                "pressure.steam_dump_setpoint_psia",
                p.steam_dump_setpoint_psia,
                "must exceed floor_psia",
            ));
        }
        if !(p.safety_ceiling_psia >= p.steam_dump_setpoint_psia) {
            return Err(SecondaryError::invalid(
                "pressure.safety_ceiling_psia",
                p.safety_ceiling_psia,
                "must be at least steam_dump_setpoint_psia",
            ));
        }
        positive("pressure.min_gas_cushion_ft3", p.min_gas_cushion_ft3)?;
        non_negative("pressure.reversion_guard_psi", p.reversion_guard_psi)?;

        let inv = &self.inventory;
        positive("inventory.wet_layup_mass_lb", inv.wet_layup_mass_lb)?;
        non_negative("inventory.drain_rate_gpm", inv.drain_rate_gpm)?;
        if !(inv.drain_target_fraction > 0.0 && inv.drain_target_fraction <= 1.0) {
            return Err(SecondaryError::invalid(
                "inventory.drain_target_fraction",
                inv.drain_target_fraction,
                "must be in (0, 1]",
            ));
        }
        positive(
            "inventory.steam_line_heat_capacity_btu_f",
            inv.steam_line_heat_capacity_btu_f,
        )?;
        non_negative(
            "inventory.steam_line_conductance_btu_hr_f",
            inv.steam_line_conductance_btu_hr_f,
        )?;
        fraction(
            "inventory.condensation_cap_fraction",
            inv.condensation_cap_fraction,
        )?;
        non_negative(
            "inventory.steam_outlet_capacity_lb_hr",
            inv.steam_outlet_capacity_lb_hr,
        )?;

        positive("stability.delta_clamp_mw", self.stability.delta_clamp_mw)?;
        Ok(())
    }
}

fn positive(field: &str, v: f64) -> SecondaryResult<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(SecondaryError::invalid(field, v, "must be positive and finite"));
    }
    Ok(())
}

fn non_negative(field: &str, v: f64) -> SecondaryResult<()> {
    if !v.is_finite() || v < 0.0 {
        return Err(SecondaryError::invalid(
            field,
            v,
            "must be non-negative and finite",
        ));
    }
    Ok(())
}

fn fraction(field: &str, v: f64) -> SecondaryResult<()> {
    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
        return Err(SecondaryError::invalid(field, v, "must be in [0, 1]"));
    }
    Ok(())
}

fn sums_to_one(field: &str, v: f64) -> SecondaryResult<()> {
    if (v - 1.0).abs() > 1e-6 {
        return Err(SecondaryError::invalid(field, v, "must sum to 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        SecondaryConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let text = "pressure:\n  floor_psia: 20.0\nstability:\n  delta_clamp_mw: 2.5\n";
        let cfg = SecondaryConfig::from_yaml_str(text).unwrap();
        assert_eq!(cfg.pressure.floor_psia, 20.0);
        assert_eq!(cfg.stability.delta_clamp_mw, 2.5);
        assert_eq!(cfg.pressure.steam_dump_setpoint_psia, 1_106.7);
        assert_eq!(cfg.node_count(), 5);
    }

    #[test]
    fn yaml_round_trip_preserves_config() {
        let cfg = SecondaryConfig::default();
        let text = cfg.to_yaml_string().unwrap();
        let back = SecondaryConfig::from_yaml_str(&text).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn rejects_mass_fractions_not_summing_to_one() {
        let mut cfg = SecondaryConfig::default();
        cfg.geometry.nodes[0].mass_fraction = 0.5;
        assert!(matches!(
            cfg.validate(),
            Err(SecondaryError::InvalidValue { .. })
        ));
    }

    #[test]
    fn rejects_setpoint_below_floor() {
        let mut cfg = SecondaryConfig::default();
        cfg.pressure.steam_dump_setpoint_psia = 10.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_empty_node_table() {
        let mut cfg = SecondaryConfig::default();
        cfg.geometry.nodes.clear();
        assert!(matches!(
            cfg.validate(),
            Err(SecondaryError::InvalidArg { .. })
        ));
    }

    #[test]
    fn rejects_malformed_yaml() {
        assert!(matches!(
            SecondaryConfig::from_yaml_str("pressure: [1, 2"),
            Err(SecondaryError::Yaml(_))
        ));
    }
}
