// sg-core/src/units.rs
//
// The secondary-side engine computes in plant units (°F, psia, BTU/hr, lbm, ft)
// carried as plain f64 with a unit suffix on the field name. Values leave the
// engine as uom SI quantities through the constructors below.

use uom::si::f64::{
    Length as UomLength, Mass as UomMass, MassRate as UomMassRate, Power as UomPower,
    Pressure as UomPressure, ThermodynamicTemperature as UomThermodynamicTemperature,
};

// Public canonical unit types (SI, f64)
pub type Length = UomLength;
pub type Mass = UomMass;
pub type MassRate = UomMassRate;
pub type Power = UomPower;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;

pub mod conv {
    /// BTU/hr in one megawatt.
    pub const BTU_HR_PER_MW: f64 = 3_412_141.633;
    /// Watts in one BTU/hr.
    pub const W_PER_BTU_HR: f64 = 0.293_071_07;
    /// Pascals in one psi.
    pub const PA_PER_PSI: f64 = 6_894.757_293_168;
    /// Kilograms in one pound-mass.
    pub const KG_PER_LBM: f64 = 0.453_592_37;
    /// Meters in one foot.
    pub const M_PER_FT: f64 = 0.3048;
    /// Cubic feet per hour in one US gallon per minute.
    pub const FT3_HR_PER_GPM: f64 = 8.020_833;
    /// Offset between °F and °R.
    pub const RANKINE_OFFSET: f64 = 459.67;
    /// Seconds per hour.
    pub const S_PER_HR: f64 = 3600.0;

    #[inline]
    pub fn btu_hr_to_mw(q: f64) -> f64 {
        q / BTU_HR_PER_MW
    }

    #[inline]
    pub fn mw_to_btu_hr(q: f64) -> f64 {
        q * BTU_HR_PER_MW
    }

    #[inline]
    pub fn f_to_k(t_f: f64) -> f64 {
        (t_f - 32.0) * 5.0 / 9.0 + 273.15
    }

    #[inline]
    pub fn k_to_f(t_k: f64) -> f64 {
        (t_k - 273.15) * 9.0 / 5.0 + 32.0
    }

    #[inline]
    pub fn f_to_r(t_f: f64) -> f64 {
        t_f + RANKINE_OFFSET
    }

    #[inline]
    pub fn psia_to_pa(p: f64) -> f64 {
        p * PA_PER_PSI
    }

    #[inline]
    pub fn gpm_to_ft3_hr(gpm: f64) -> f64 {
        gpm * FT3_HR_PER_GPM
    }

    #[inline]
    pub fn seconds_to_hours(dt_s: f64) -> f64 {
        dt_s / S_PER_HR
    }
}

#[inline]
pub fn degf(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(conv::f_to_k(v))
}

#[inline]
pub fn psia(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(conv::psia_to_pa(v))
}

#[inline]
pub fn btu_per_hr(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v * conv::W_PER_BTU_HR)
}

#[inline]
pub fn lbm(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v * conv::KG_PER_LBM)
}

#[inline]
pub fn lbm_per_hr(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v * conv::KG_PER_LBM / conv::S_PER_HR)
}

#[inline]
pub fn ft(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v * conv::M_PER_FT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _t = degf(212.0);
        let _p = psia(14.696);
        let _q = btu_per_hr(1.0e6);
        let _m = lbm(1.0);
        let _mdot = lbm_per_hr(3600.0);
        let _l = ft(24.0);
    }

    #[test]
    fn fahrenheit_round_trip() {
        assert!((conv::f_to_k(212.0) - 373.15).abs() < 1e-9);
        assert!((conv::k_to_f(conv::f_to_k(557.0)) - 557.0).abs() < 1e-9);
        assert!((degf(32.0).value - 273.15).abs() < 1e-9);
    }

    #[test]
    fn power_conversions_agree() {
        let q_btu = conv::mw_to_btu_hr(5.0);
        assert!((conv::btu_hr_to_mw(q_btu) - 5.0).abs() < 1e-12);
        // uom watt value of 1 MW expressed in BTU/hr
        let p = btu_per_hr(conv::BTU_HR_PER_MW);
        assert!((p.value - 1.0e6).abs() < 5.0);
    }

    #[test]
    fn atmospheric_pressure_in_pascal() {
        assert!((psia(14.696).value - 101_325.0).abs() < 5.0);
    }
}
