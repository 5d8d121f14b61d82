//! Ideal-gas relations for the secondary gas space.
//!
//! The gas space above the secondary water holds the nitrogen blanket and any
//! steam that cannot leave through the steam outlet. When the space is
//! isolated, its pressure is the sum of the ideal-gas partial pressures:
//!
//! ```text
//! P = (m_N2 * R_N2 + m_steam * R_steam) * T / V
//! ```
//!
//! Gas constants are in psia·ft³/(lbm·°R), temperatures in °F.

use sg_core::conv;

/// Universal gas constant [ft·lbf/(lbmol·°R)].
const R_UNIVERSAL_FT_LBF: f64 = 1_545.349;
/// in² per ft².
const IN2_PER_FT2: f64 = 144.0;
/// Smallest gas volume used in any division [ft³].
const MIN_VOLUME_FT3: f64 = 1.0e-6;

/// Species present in the secondary gas space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GasSpecies {
    Nitrogen,
    Steam,
}

impl GasSpecies {
    /// Molar mass [lbm/lbmol].
    pub fn molar_mass(self) -> f64 {
        match self {
            GasSpecies::Nitrogen => 28.013,
            GasSpecies::Steam => 18.015,
        }
    }

    /// Specific gas constant [psia·ft³/(lbm·°R)].
    pub fn gas_constant(self) -> f64 {
        R_UNIVERSAL_FT_LBF / self.molar_mass() / IN2_PER_FT2
    }

    /// Partial pressure [psia] of `mass_lb` of this gas in `volume_ft3` at `t_f`.
    pub fn partial_pressure_psia(self, mass_lb: f64, volume_ft3: f64, t_f: f64) -> f64 {
        let v = volume_ft3.max(MIN_VOLUME_FT3);
        let t_r = conv::f_to_r(t_f).max(0.0);
        mass_lb.max(0.0) * self.gas_constant() * t_r / v
    }

    /// Mass [lbm] of this gas that exerts `p_psia` in `volume_ft3` at `t_f`.
    pub fn mass_for_pressure_lb(self, p_psia: f64, volume_ft3: f64, t_f: f64) -> f64 {
        let t_r = conv::f_to_r(t_f);
        if t_r <= 0.0 {
            return 0.0;
        }
        p_psia.max(0.0) * volume_ft3.max(0.0) / (self.gas_constant() * t_r)
    }
}
