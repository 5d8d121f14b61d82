//! Property-provider checks across the heatup range.

use proptest::prelude::*;
use sg_props::{GasSpecies, SteamTableFit, WaterProperties};

#[test]
fn steam_dump_setpoint_saturation() {
    // 1092 psig steam dump setpoint sits just below 557 F no-load temperature.
    let water = SteamTableFit::default();
    let t_sat = water.saturation_temperature_f(1106.7);
    assert!(t_sat > 550.0 && t_sat < 560.0, "T_sat = {t_sat}");
}

#[test]
fn nitrogen_blanket_saturation_is_low_200s() {
    let water = SteamTableFit::default();
    let t_sat = water.saturation_temperature_f(17.0);
    assert!(t_sat > 210.0 && t_sat < 230.0, "T_sat = {t_sat}");
}

#[test]
fn provider_is_object_safe() {
    let water: Box<dyn WaterProperties> = Box::new(SteamTableFit::default());
    assert_eq!(water.name(), "steam-table-fit");
    assert!(water.latent_heat_btu_lb(100.0) > 800.0);
}

#[test]
fn steam_is_lighter_than_liquid_everywhere() {
    let water = SteamTableFit::default();
    for p in [1.0, 14.7, 100.0, 500.0, 1000.0, 1200.0, 2000.0] {
        let pack = water.saturation_pack(p);
        assert!(pack.rho_g_lb_ft3 < pack.rho_f_lb_ft3, "{}", pack.summary());
        assert!(GasSpecies::Steam.partial_pressure_psia(pack.rho_g_lb_ft3, 1.0, pack.t_sat_f) > 0.0);
    }
}

proptest! {
    #[test]
    fn saturation_pressure_increases(t in 40.0f64..690.0, dt in 0.5f64..10.0) {
        let water = SteamTableFit::default();
        prop_assert!(water.saturation_pressure_psia(t + dt) > water.saturation_pressure_psia(t));
    }

    #[test]
    fn saturation_round_trip(t in 40.0f64..690.0) {
        let water = SteamTableFit::default();
        let p = water.saturation_pressure_psia(t);
        prop_assert!((water.saturation_temperature_f(p) - t).abs() < 1e-6);
    }

    #[test]
    fn latent_heat_decreases_with_pressure(p in 1.0f64..2500.0, dp in 1.0f64..100.0) {
        let water = SteamTableFit::default();
        prop_assert!(water.latent_heat_btu_lb(p + dp) <= water.latent_heat_btu_lb(p));
    }

    #[test]
    fn liquid_properties_positive(t in -100.0f64..1000.0, p in 0.0f64..5000.0) {
        let water = SteamTableFit::default();
        prop_assert!(water.liquid_density_lb_ft3(t, p) > 35.0);
        prop_assert!(water.liquid_cp_btu_lb_f(t, p) > 0.9);
    }
}
