//! Per-step limit on reported heat removal.
//!
//! The primary side sees the secondary only through the heat removal figure,
//! so a step change there shows up as a primary temperature kick. The clamp
//! bounds successive reported values to `delta_clamp_mw` unless a physical
//! discontinuity justifies the jump.

use serde::{Deserialize, Serialize};
use sg_core::{bound, conv, safe_div};
use tracing::debug;

use crate::state::Regime;

/// Raw totals smaller than this are not rescaled.
const MIN_RESCALE_BTU_HR: f64 = 1.0;

/// Why the limit was not applied on a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BypassReason {
    PumpChange,
    SteamDumpEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClampStatus {
    /// Reported value equals the raw value.
    Inactive,
    /// Reported value was limited.
    Engaged,
    Bypassed(BypassReason),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampOutcome {
    pub heat_btu_hr: f64,
    pub boiling_btu_hr: f64,
    pub sensible_btu_hr: f64,
    pub status: ClampStatus,
}

/// Caller-owned memory of the last reported step.
///
/// Each simulation run owns its own context; a fresh (default) context never
/// clamps its first step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClampContext {
    previous_heat_btu_hr: Option<f64>,
    previous_regime: Option<Regime>,
    previous_pumps: Option<u32>,
}

impl ClampContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn previous_heat_btu_hr(&self) -> Option<f64> {
        self.previous_heat_btu_hr
    }

    /// Limit the raw totals and remember the reported result.
    pub fn apply(
        &mut self,
        raw_total_btu_hr: f64,
        raw_boiling_btu_hr: f64,
        raw_sensible_btu_hr: f64,
        regime: Regime,
        pumps_running: u32,
        limit_mw: f64,
    ) -> ClampOutcome {
        let bypass = match (self.previous_pumps, self.previous_regime) {
            (Some(p), _) if p != pumps_running => Some(BypassReason::PumpChange),
            (_, Some(r)) if regime == Regime::SteamDump && r != Regime::SteamDump => {
                Some(BypassReason::SteamDumpEntry)
            }
            _ => None,
        };

        let limit = conv::mw_to_btu_hr(limit_mw);
        let reported = match (bypass, self.previous_heat_btu_hr) {
            (None, Some(prev)) => bound(raw_total_btu_hr, prev - limit, prev + limit),
            _ => raw_total_btu_hr,
        };

        let status = match bypass {
            Some(reason) => {
                debug!(reason = ?reason, raw_btu_hr = raw_total_btu_hr, "heat clamp bypassed");
                ClampStatus::Bypassed(reason)
            }
            None if reported != raw_total_btu_hr => {
                debug!(
                    raw_btu_hr = raw_total_btu_hr,
                    reported_btu_hr = reported,
                    "heat clamp engaged"
                );
                ClampStatus::Engaged
            }
            None => ClampStatus::Inactive,
        };

        let (boiling, sensible) = if status == ClampStatus::Engaged {
            if raw_total_btu_hr.abs() >= MIN_RESCALE_BTU_HR {
                let scale = safe_div(reported, raw_total_btu_hr, MIN_RESCALE_BTU_HR, 1.0);
                (raw_boiling_btu_hr * scale, raw_sensible_btu_hr * scale)
            } else {
                (0.0, reported)
            }
        } else {
            (raw_boiling_btu_hr, raw_sensible_btu_hr)
        };

        self.previous_heat_btu_hr = Some(reported);
        self.previous_regime = Some(regime);
        self.previous_pumps = Some(pumps_running);

        ClampOutcome {
            heat_btu_hr: reported,
            boiling_btu_hr: boiling,
            sensible_btu_hr: sensible,
            status,
        }
    }
}
