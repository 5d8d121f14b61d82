//! Closed-form water/steam property fit.
//!
//! The saturation curve is an Antoine equation in °F/psia fitted to steam-table
//! data between 100 °F and 600 °F (within ~0.6 % in pressure, ~0.7 °F in
//! temperature). Its algebraic inverse gives the saturation temperature, so
//! `T_sat(P_sat(T)) == T` to rounding, which the saturation-tracking pressure
//! basis depends on.
//!
//! ```text
//! log10(P) = A - B / (C + T)        T = B / (A - log10(P)) - C
//! ```
//!
//! Liquid density and cp are cubic polynomials in `T/100`; latent heat follows
//! the Watson relation anchored at the normal boiling point.

use crate::error::{PropsError, PropsResult};
use crate::ideal_gas::GasSpecies;
use crate::model::WaterProperties;
use sg_core::conv;

/// Critical temperature of water [°F].
const T_CRITICAL_F: f64 = 705.1;
/// Latent heat at the normal boiling point [BTU/lbm].
const H_FG_NBP_BTU_LB: f64 = 970.1;
/// Normal boiling point [°F].
const T_NBP_F: f64 = 212.0;
/// Watson exponent.
const WATSON_EXPONENT: f64 = 0.38;
/// Smallest latent heat returned [BTU/lbm].
const MIN_LATENT_BTU_LB: f64 = 1.0;
/// Vapor compressibility slope [1/psia].
const VAPOR_Z_SLOPE: f64 = 2.2e-4;
const VAPOR_Z_MIN: f64 = 0.5;

/// Antoine coefficients for `log10(P[psia]) = a - b / (c + T[°F])`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AntoineCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl AntoineCoefficients {
    /// Create a validated coefficient set.
    pub fn new(a: f64, b: f64, c: f64) -> PropsResult<Self> {
        sg_core::ensure_finite(a, "antoine a")?;
        sg_core::ensure_finite(b, "antoine b")?;
        sg_core::ensure_finite(c, "antoine c")?;
        if b <= 0.0 {
            return Err(PropsError::InvalidArg {
                what: "antoine b must be positive",
            });
        }
        Ok(Self { a, b, c })
    }

    #[inline]
    fn pressure(&self, t_f: f64) -> f64 {
        10f64.powf(self.a - self.b / (self.c + t_f))
    }

    #[inline]
    fn temperature(&self, p_psia: f64) -> f64 {
        self.b / (self.a - p_psia.log10()) - self.c
    }
}

impl Default for AntoineCoefficients {
    fn default() -> Self {
        Self {
            a: 6.282_230_46,
            b: 3_042.665_79,
            c: 382.7,
        }
    }
}

/// Steam-table fit backend.
#[derive(Clone, Debug)]
pub struct SteamTableFit {
    antoine: AntoineCoefficients,
    /// Liquid density polynomial in x = T/100 [lbm/ft³]
    rho_coeffs: [f64; 4],
    /// Liquid cp polynomial in x = T/100 [BTU/(lbm·°F)]
    cp_coeffs: [f64; 4],
    /// Saturation curve validity [°F]
    t_min_f: f64,
    t_max_f: f64,
    /// Liquid polynomial validity [°F]
    liquid_t_min_f: f64,
    liquid_t_max_f: f64,
}

impl Default for SteamTableFit {
    fn default() -> Self {
        Self {
            antoine: AntoineCoefficients::default(),
            rho_coeffs: [63.826_225, -1.707_406, 0.010_874, -0.053_377],
            cp_coeffs: [0.901_203, 0.135_207, -0.055_122, 0.008_045],
            t_min_f: 32.0,
            t_max_f: 700.0,
            liquid_t_min_f: 50.0,
            liquid_t_max_f: 620.0,
        }
    }
}

impl SteamTableFit {
    /// Use a different saturation curve with the default liquid fits.
    pub fn with_antoine(antoine: AntoineCoefficients) -> PropsResult<Self> {
        let fit = Self {
            antoine,
            ..Self::default()
        };
        // The curve must be increasing and positive over the validity range.
        let p_lo = fit.antoine.pressure(fit.t_min_f);
        let p_hi = fit.antoine.pressure(fit.t_max_f);
        if !(p_lo.is_finite() && p_hi.is_finite()) || p_lo <= 0.0 || p_hi <= p_lo {
            return Err(PropsError::NonPhysical {
                what: "saturation curve must increase over 32..700 F",
            });
        }
        Ok(fit)
    }

    /// Pressure range covered by the saturation curve [psia].
    pub fn pressure_range_psia(&self) -> (f64, f64) {
        (
            self.antoine.pressure(self.t_min_f),
            self.antoine.pressure(self.t_max_f),
        )
    }

    fn clamp_pressure(&self, p_psia: f64) -> f64 {
        let (lo, hi) = self.pressure_range_psia();
        sg_core::bound(p_psia, lo, hi)
    }

    fn liquid_temperature(&self, t_f: f64, p_psia: f64) -> f64 {
        // Liquid above saturation is evaluated on the saturation line.
        let t = t_f.min(self.saturation_temperature_f(p_psia));
        sg_core::bound(t, self.liquid_t_min_f, self.liquid_t_max_f)
    }

    #[inline]
    fn cubic(c: &[f64; 4], t_f: f64) -> f64 {
        let x = t_f / 100.0;
        c[0] + x * (c[1] + x * (c[2] + x * c[3]))
    }
}

impl WaterProperties for SteamTableFit {
    fn name(&self) -> &str {
        "steam-table-fit"
    }

    fn saturation_temperature_f(&self, p_psia: f64) -> f64 {
        self.antoine.temperature(self.clamp_pressure(p_psia))
    }

    fn saturation_pressure_psia(&self, t_f: f64) -> f64 {
        self.antoine
            .pressure(sg_core::bound(t_f, self.t_min_f, self.t_max_f))
    }

    fn latent_heat_btu_lb(&self, p_psia: f64) -> f64 {
        let t_sat = self.saturation_temperature_f(p_psia);
        let ratio = ((T_CRITICAL_F - t_sat) / (T_CRITICAL_F - T_NBP_F)).max(0.0);
        (H_FG_NBP_BTU_LB * ratio.powf(WATSON_EXPONENT)).max(MIN_LATENT_BTU_LB)
    }

    fn liquid_density_lb_ft3(&self, t_f: f64, p_psia: f64) -> f64 {
        Self::cubic(&self.rho_coeffs, self.liquid_temperature(t_f, p_psia))
    }

    fn vapor_density_lb_ft3(&self, p_psia: f64) -> f64 {
        let p = self.clamp_pressure(p_psia);
        let t_r = conv::f_to_r(self.saturation_temperature_f(p));
        let z = (1.0 - VAPOR_Z_SLOPE * p).max(VAPOR_Z_MIN);
        p / (z * GasSpecies::Steam.gas_constant() * t_r)
    }

    fn liquid_cp_btu_lb_f(&self, t_f: f64, p_psia: f64) -> f64 {
        Self::cubic(&self.cp_coeffs, self.liquid_temperature(t_f, p_psia))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit() -> SteamTableFit {
        SteamTableFit::default()
    }

    #[test]
    fn saturation_reference_points() {
        let w = fit();
        assert!((w.saturation_temperature_f(14.696) - 212.0).abs() < 0.5);
        assert!((w.saturation_temperature_f(247.3) - 400.0).abs() < 0.5);
        assert!((w.saturation_temperature_f(1106.7) - 556.3).abs() < 1.0);
        assert!((w.saturation_pressure_psia(500.0) - 680.9).abs() / 680.9 < 0.01);
    }

    #[test]
    fn saturation_curve_is_self_inverse() {
        let w = fit();
        for t in [120.0, 219.6, 350.0, 480.0, 556.9] {
            let p = w.saturation_pressure_psia(t);
            assert!((w.saturation_temperature_f(p) - t).abs() < 1e-9);
        }
    }

    #[test]
    fn latent_heat_reference_points() {
        let w = fit();
        assert!((w.latent_heat_btu_lb(14.696) - 970.0).abs() < 2.0);
        let h_1000 = w.latent_heat_btu_lb(1000.0);
        assert!((h_1000 - 650.0).abs() < 30.0, "h_fg(1000 psia) = {h_1000}");
    }

    #[test]
    fn liquid_density_reference_points() {
        let w = fit();
        assert!((w.liquid_density_lb_ft3(100.0, 2000.0) - 61.99).abs() < 0.2);
        assert!((w.liquid_density_lb_ft3(500.0, 2000.0) - 49.02).abs() < 0.2);
    }

    #[test]
    fn liquid_above_saturation_uses_saturation_line() {
        let w = fit();
        let at_sat = w.liquid_density_lb_ft3(212.0, 14.696);
        let above = w.liquid_density_lb_ft3(300.0, 14.696);
        assert!((at_sat - above).abs() < 0.05);
    }

    #[test]
    fn cp_rises_with_temperature() {
        let w = fit();
        let cold = w.liquid_cp_btu_lb_f(100.0, 2000.0);
        let hot = w.liquid_cp_btu_lb_f(550.0, 2000.0);
        assert!((cold - 1.0).abs() < 0.02);
        assert!(hot > 1.2);
    }

    #[test]
    fn vapor_density_near_steam_tables() {
        let w = fit();
        let rho = w.vapor_density_lb_ft3(14.696);
        assert!((rho - 0.0373).abs() < 0.002, "rho_g(1 atm) = {rho}");
        let rho_hi = w.vapor_density_lb_ft3(1100.0);
        assert!((rho_hi - 2.43).abs() < 0.2, "rho_g(1100 psia) = {rho_hi}");
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        let w = fit();
        assert!(w.saturation_temperature_f(-5.0).is_finite());
        assert!(w.saturation_temperature_f(1.0e9) <= 700.0 + 1e-6);
        assert!(w.saturation_pressure_psia(f64::NAN).is_finite());
        assert!(w.latent_heat_btu_lb(1.0e9) >= MIN_LATENT_BTU_LB);
    }

    #[test]
    fn invalid_antoine_rejected() {
        assert!(AntoineCoefficients::new(6.0, -10.0, 380.0).is_err());
        assert!(AntoineCoefficients::new(f64::NAN, 3000.0, 380.0).is_err());
        // pole inside the range makes the curve fall with temperature
        let falling = AntoineCoefficients {
            a: 6.0,
            b: 3000.0,
            c: -100.0,
        };
        assert!(SteamTableFit::with_antoine(falling).is_err());
    }

    #[test]
    fn saturation_pack_is_consistent() {
        let w = fit();
        let pack = w.saturation_pack(1000.0);
        assert_eq!(pack.t_sat_f, w.saturation_temperature_f(1000.0));
        assert!(pack.rho_f_lb_ft3 > pack.rho_g_lb_ft3);
        assert!(pack.summary().contains("psia"));
    }
}
