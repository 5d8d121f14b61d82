//! Scripted heatup runs.
//!
//! A [`HeatupScenario`] ramps primary temperature linearly, holds it, and
//! optionally starts draining partway through. Runs are independent, so an
//! ensemble is executed in parallel with one state and clamp context each.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clamp::{ClampContext, ClampStatus};
use crate::engine::{SecondaryModel, StepInputs, StepSnapshot};
use crate::error::{SecondaryError, SecondaryResult};
use crate::state::Regime;

/// When to start draining during a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DrainTrigger {
    AtStart,
    AtTime { time_s: f64 },
    /// First step the commanded primary temperature reaches this value.
    AtPrimaryTemperature { temp_f: f64 },
    /// First step the top node reaches this temperature.
    AtTopTemperature { temp_f: f64 },
}

impl DrainTrigger {
    fn fires(&self, time_s: f64, primary_temp_f: f64, top_temp_f: f64) -> bool {
        match *self {
            DrainTrigger::AtStart => true,
            DrainTrigger::AtTime { time_s: at } => time_s >= at,
            DrainTrigger::AtPrimaryTemperature { temp_f } => primary_temp_f >= temp_f,
            DrainTrigger::AtTopTemperature { temp_f } => top_temp_f >= temp_f,
        }
    }
}

/// A regime change observed during a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeTransition {
    pub time_s: f64,
    pub from: Regime,
    pub to: Regime,
    pub pressure_psia: f64,
    pub top_temp_f: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatupScenario {
    pub name: String,
    pub initial_temp_f: f64,
    /// Primary temperature at the end of the ramp.
    pub final_primary_temp_f: f64,
    pub ramp_hr: f64,
    pub hold_hr: f64,
    pub dt_s: f64,
    pub pumps_running: u32,
    pub system_pressure_psia: f64,
    pub heat_sink_available: bool,
    pub drain: Option<DrainTrigger>,
    /// Record every N-th step; the final step is always recorded.
    pub record_every: usize,
    pub max_steps: usize,
}

impl Default for HeatupScenario {
    fn default() -> Self {
        Self {
            name: "heatup".to_string(),
            initial_temp_f: 100.0,
            final_primary_temp_f: 560.0,
            ramp_hr: 9.0,
            hold_hr: 1.0,
            dt_s: 10.0,
            pumps_running: 4,
            system_pressure_psia: 2_250.0,
            heat_sink_available: true,
            drain: None,
            record_every: 6,
            max_steps: 1_000_000,
        }
    }
}

impl HeatupScenario {
    pub fn duration_s(&self) -> f64 {
        (self.ramp_hr + self.hold_hr) * sg_core::conv::S_PER_HR
    }

    /// Commanded primary temperature at `time_s`.
    pub fn primary_temp_at(&self, time_s: f64) -> f64 {
        let ramp_s = self.ramp_hr * sg_core::conv::S_PER_HR;
        if ramp_s <= 0.0 {
            return self.final_primary_temp_f;
        }
        let w = sg_core::unit_clamp(time_s / ramp_s);
        sg_core::lerp(self.initial_temp_f, self.final_primary_temp_f, w)
    }

    pub fn validate(&self) -> SecondaryResult<()> {
        if !self.dt_s.is_finite() || self.dt_s <= 0.0 {
            return Err(SecondaryError::InvalidArg {
                what: "dt_s must be positive",
            });
        }
        if !(self.ramp_hr >= 0.0 && self.hold_hr >= 0.0) {
            return Err(SecondaryError::InvalidArg {
                what: "ramp_hr and hold_hr must be non-negative",
            });
        }
        if !self.initial_temp_f.is_finite() || !self.final_primary_temp_f.is_finite() {
            return Err(SecondaryError::InvalidArg {
                what: "temperatures must be finite",
            });
        }
        if self.record_every == 0 {
            return Err(SecondaryError::InvalidArg {
                what: "record_every must be positive",
            });
        }
        if self.max_steps == 0 {
            return Err(SecondaryError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        Ok(())
    }
}

/// Milestones gathered over every step, recorded or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatupSummary {
    pub steps: usize,
    pub first_boiling_time_s: Option<f64>,
    pub first_boiling_top_temp_f: Option<f64>,
    pub first_boiling_cumulative_steam_lb: Option<f64>,
    pub steam_dump_time_s: Option<f64>,
    pub drain_complete_time_s: Option<f64>,
    pub final_regime: Regime,
    pub final_pressure_psia: f64,
    pub final_water_mass_lb: f64,
    pub cumulative_steam_lb: f64,
    pub max_heat_removal_mw: f64,
    pub clamp_engaged_steps: usize,
    pub clamp_bypassed_steps: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatupRecord {
    pub name: String,
    pub snapshots: Vec<StepSnapshot>,
    pub transitions: Vec<RegimeTransition>,
    pub summary: HeatupSummary,
}

/// Run one scenario from a fresh wet-layup state.
pub fn run_heatup(model: &SecondaryModel, scenario: &HeatupScenario) -> SecondaryResult<HeatupRecord> {
    scenario.validate()?;

    let mut clamp = ClampContext::new();
    let mut state = model.initialize(scenario.initial_temp_f, &mut clamp);
    let total_s = scenario.duration_s();
    let steps = ((total_s / scenario.dt_s).ceil() as usize).min(scenario.max_steps);

    let mut snapshots = Vec::with_capacity(steps / scenario.record_every + 2);
    let mut first_boiling: Option<(f64, f64, f64)> = None;
    let mut steam_dump_time_s = None;
    let mut drain_complete_time_s = None;
    let mut max_heat_removal_mw: f64 = 0.0;
    let mut clamp_engaged_steps = 0;
    let mut clamp_bypassed_steps = 0;
    let mut transitions = Vec::new();
    let mut regime = state.regime;
    let mut last: Option<StepSnapshot> = None;

    debug!(name = %scenario.name, steps, "heatup run starting");

    for step in 1..=steps {
        let primary_temp_f = scenario.primary_temp_at(state.elapsed_s + scenario.dt_s);
        if let Some(trigger) = scenario.drain
            && !state.draining.active
            && !state.draining.complete
            && trigger.fires(state.elapsed_s, primary_temp_f, state.top_temp_f)
        {
            state.start_draining();
        }

        let inputs = StepInputs {
            primary_temp_f,
            pumps_running: scenario.pumps_running,
            system_pressure_psia: scenario.system_pressure_psia,
            dt_s: scenario.dt_s,
            heat_sink_available: scenario.heat_sink_available,
            isolated: false,
        };
        let snap = model.advance(&mut state, &mut clamp, &inputs);

        if snap.regime != regime {
            transitions.push(RegimeTransition {
                time_s: snap.time_s,
                from: regime,
                to: snap.regime,
                pressure_psia: snap.pressure_psia,
                top_temp_f: snap.top_temp_f,
            });
            regime = snap.regime;
        }
        if first_boiling.is_none() && snap.regime != Regime::Subcooled {
            first_boiling = Some((snap.time_s, snap.top_temp_f, snap.cumulative_steam_lb));
        }
        if steam_dump_time_s.is_none() && snap.regime == Regime::SteamDump {
            steam_dump_time_s = Some(snap.time_s);
        }
        if drain_complete_time_s.is_none() && snap.draining_complete {
            drain_complete_time_s = Some(snap.time_s);
        }
        max_heat_removal_mw = max_heat_removal_mw.max(snap.heat_removal_mw);
        match snap.clamp_status {
            ClampStatus::Engaged => clamp_engaged_steps += 1,
            ClampStatus::Bypassed(_) => clamp_bypassed_steps += 1,
            ClampStatus::Inactive => {}
        }

        if step % scenario.record_every == 0 {
            snapshots.push(snap.clone());
        }
        last = Some(snap);
    }

    let Some(last) = last else {
        return Err(SecondaryError::InvalidArg {
            what: "scenario has no steps",
        });
    };
    if steps % scenario.record_every != 0 {
        snapshots.push(last.clone());
    }

    let summary = HeatupSummary {
        steps,
        first_boiling_time_s: first_boiling.map(|(t, _, _)| t),
        first_boiling_top_temp_f: first_boiling.map(|(_, top, _)| top),
        first_boiling_cumulative_steam_lb: first_boiling.map(|(_, _, lb)| lb),
        steam_dump_time_s,
        drain_complete_time_s,
        final_regime: last.regime,
        final_pressure_psia: last.pressure_psia,
        final_water_mass_lb: last.water_mass_lb,
        cumulative_steam_lb: last.cumulative_steam_lb,
        max_heat_removal_mw,
        clamp_engaged_steps,
        clamp_bypassed_steps,
    };

    info!(
        name = %scenario.name,
        steps,
        final_regime = summary.final_regime.as_str(),
        final_pressure_psia = summary.final_pressure_psia,
        steam_lb = summary.cumulative_steam_lb,
        "heatup run finished"
    );

    Ok(HeatupRecord {
        name: scenario.name.clone(),
        snapshots,
        transitions,
        summary,
    })
}

/// Run several scenarios in parallel against one shared model.
///
/// Results come back in scenario order.
pub fn run_ensemble(
    model: &SecondaryModel,
    scenarios: &[HeatupScenario],
) -> Vec<SecondaryResult<HeatupRecord>> {
    scenarios
        .par_iter()
        .map(|scenario| run_heatup(model, scenario))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_then_hold() {
        let s = HeatupScenario::default();
        assert_eq!(s.primary_temp_at(0.0), 100.0);
        assert!((s.primary_temp_at(4.5 * 3600.0) - 330.0).abs() < 1e-9);
        assert_eq!(s.primary_temp_at(9.0 * 3600.0), 560.0);
        assert_eq!(s.primary_temp_at(9.5 * 3600.0), 560.0);
    }

    #[test]
    fn rejects_zero_step() {
        let s = HeatupScenario {
            dt_s: 0.0,
            ..HeatupScenario::default()
        };
        assert!(run_heatup(&SecondaryModel::with_defaults(), &s).is_err());
    }

    #[test]
    fn records_decimated_steps_plus_final() {
        let s = HeatupScenario {
            ramp_hr: 0.0,
            hold_hr: 65.0 / 3600.0,
            final_primary_temp_f: 100.0,
            record_every: 3,
            ..HeatupScenario::default()
        };
        let rec = run_heatup(&SecondaryModel::with_defaults(), &s).unwrap();
        // 7 steps: recorded at 3, 6 and the final 7
        assert_eq!(rec.summary.steps, 7);
        assert_eq!(rec.snapshots.len(), 3);
        assert!((rec.snapshots[2].time_s - 70.0).abs() < 1e-9);
    }

    #[test]
    fn drain_trigger_fires() {
        assert!(DrainTrigger::AtStart.fires(0.0, 0.0, 0.0));
        assert!(!DrainTrigger::AtTime { time_s: 60.0 }.fires(30.0, 0.0, 0.0));
        assert!(DrainTrigger::AtPrimaryTemperature { temp_f: 200.0 }.fires(0.0, 205.0, 150.0));
        assert!(!DrainTrigger::AtTopTemperature { temp_f: 200.0 }.fires(0.0, 205.0, 150.0));
    }
}
