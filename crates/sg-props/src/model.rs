//! Water property model trait.

/// Saturation properties evaluated once at a single pressure.
///
/// The engine needs several saturation properties at the same secondary
/// pressure each tick; batching them avoids repeating the saturation curve
/// evaluation per node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SaturationPack {
    /// Pressure [psia]
    pub p_psia: f64,
    /// Saturation temperature [°F]
    pub t_sat_f: f64,
    /// Latent heat of vaporization [BTU/lbm]
    pub h_fg_btu_lb: f64,
    /// Saturated liquid density [lbm/ft³]
    pub rho_f_lb_ft3: f64,
    /// Saturated vapor density [lbm/ft³]
    pub rho_g_lb_ft3: f64,
}

impl SaturationPack {
    /// Return a summary string of all contained properties (for debugging).
    pub fn summary(&self) -> String {
        format!(
            "Sat(P={:.2}psia,T={:.2}F,hfg={:.1}BTU/lb,ρf={:.2},ρg={:.4}lb/ft³)",
            self.p_psia, self.t_sat_f, self.h_fg_btu_lb, self.rho_f_lb_ft3, self.rho_g_lb_ft3
        )
    }
}

/// Trait for water/steam property providers.
///
/// Implementations must be thread-safe (Send + Sync) so independent plant
/// simulations can share one provider across threads. Every method is total:
/// out-of-range inputs are clamped, never rejected.
pub trait WaterProperties: Send + Sync {
    /// Get the model name (for debugging/logging).
    fn name(&self) -> &str;

    /// Saturation temperature [°F] at pressure [psia].
    fn saturation_temperature_f(&self, p_psia: f64) -> f64;

    /// Saturation pressure [psia] at temperature [°F].
    fn saturation_pressure_psia(&self, t_f: f64) -> f64;

    /// Latent heat of vaporization [BTU/lbm] at pressure [psia].
    fn latent_heat_btu_lb(&self, p_psia: f64) -> f64;

    /// Liquid density [lbm/ft³] at temperature [°F] and pressure [psia].
    fn liquid_density_lb_ft3(&self, t_f: f64, p_psia: f64) -> f64;

    /// Saturated vapor density [lbm/ft³] at pressure [psia].
    fn vapor_density_lb_ft3(&self, p_psia: f64) -> f64;

    /// Liquid specific heat [BTU/(lbm·°F)] at temperature [°F] and pressure [psia].
    fn liquid_cp_btu_lb_f(&self, t_f: f64, p_psia: f64) -> f64;

    /// Compute all saturation properties at one pressure.
    fn saturation_pack(&self, p_psia: f64) -> SaturationPack {
        let t_sat_f = self.saturation_temperature_f(p_psia);
        SaturationPack {
            p_psia,
            t_sat_f,
            h_fg_btu_lb: self.latent_heat_btu_lb(p_psia),
            rho_f_lb_ft3: self.liquid_density_lb_ft3(t_sat_f, p_psia),
            rho_g_lb_ft3: self.vapor_density_lb_ft3(p_psia),
        }
    }
}
