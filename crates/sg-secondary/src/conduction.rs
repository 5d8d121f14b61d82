//! Inter-node conduction between vertically adjacent nodes.

use crate::config::HeatTransferConfig;

/// Conductance between two adjacent nodes given their boiling flags.
///
/// Two boiling nodes share a saturated pool and exchange nothing; a
/// boiling/subcooled interface conducts more strongly than two stagnant
/// subcooled nodes.
pub fn pair_conductance(upper_boiling: bool, lower_boiling: bool, cfg: &HeatTransferConfig) -> f64 {
    match (upper_boiling, lower_boiling) {
        (true, true) => 0.0,
        (false, false) => cfg.conductance_btu_hr_f,
        _ => cfg.interface_conductance_btu_hr_f,
    }
}

/// Fill `out` with the net conduction into each node [BTU/hr].
///
/// The exchange is antisymmetric, so the entries always sum to zero.
pub fn exchange(temps_f: &[f64], boiling: &[bool], cfg: &HeatTransferConfig, out: &mut [f64]) {
    out.iter_mut().for_each(|q| *q = 0.0);
    for i in 1..temps_f.len() {
        let g = pair_conductance(boiling[i - 1], boiling[i], cfg);
        let q = g * (temps_f[i - 1] - temps_f[i]);
        out[i - 1] -= q;
        out[i] += q;
    }
}
