use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::interaction::InteractionKind;

/// Lower bound of every chemistry field.
pub const LEVEL_MIN: f64 = 0.0;
/// Upper bound of every chemistry field.
pub const LEVEL_MAX: f64 = 100.0;
/// Step applied per idle tick while a field drifts back to its baseline.
pub const DRIFT_STEP: f64 = 0.5;

/// Simulated neurochemical levels. Every field stays within [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChemistryState {
    pub dopamine: f64,
    pub oxytocin: f64,
    pub cortisol: f64,
}

impl ChemistryState {
    /// Resting levels the idle drift pulls toward.
    pub const BASELINE: ChemistryState = ChemistryState {
        dopamine: 50.0,
        oxytocin: 50.0,
        cortisol: 20.0,
    };

    /// Builds a state, clamping every field into range.
    pub fn new(dopamine: f64, oxytocin: f64, cortisol: f64) -> Self {
        ChemistryState {
            dopamine,
            oxytocin,
            cortisol,
        }
        .clamped()
    }

    pub fn clamped(self) -> Self {
        ChemistryState {
            dopamine: clamp_level(self.dopamine),
            oxytocin: clamp_level(self.oxytocin),
            cortisol: clamp_level(self.cortisol),
        }
    }

    /// Deterministic transition for one interaction. Pure: the same input
    /// state and kind always produce the same output.
    pub fn apply(&self, kind: InteractionKind) -> Self {
        let next = match kind {
            InteractionKind::PhysicalTouch => ChemistryState {
                dopamine: self.dopamine + 5.0,
                oxytocin: self.oxytocin + 15.0,
                cortisol: self.cortisol - 5.0,
            },
            InteractionKind::Argument => ChemistryState {
                dopamine: self.dopamine - 10.0,
                oxytocin: self.oxytocin - 8.0,
                cortisol: self.cortisol + 20.0,
            },
            InteractionKind::DeepTalk => ChemistryState {
                dopamine: self.dopamine + 8.0,
                oxytocin: self.oxytocin + 12.0,
                cortisol: self.cortisol - 3.0,
            },
            InteractionKind::None => ChemistryState {
                dopamine: drift_toward(self.dopamine, Self::BASELINE.dopamine),
                oxytocin: drift_toward(self.oxytocin, Self::BASELINE.oxytocin),
                cortisol: drift_toward(self.cortisol, Self::BASELINE.cortisol),
            },
        };

        next.clamped()
    }

    /// Field values in display order: dopamine, oxytocin, cortisol.
    pub fn levels(&self) -> [(&'static str, f64); 3] {
        [
            ("Dopamine", self.dopamine),
            ("Oxytocin", self.oxytocin),
            ("Cortisol", self.cortisol),
        ]
    }

    pub fn is_in_range(&self) -> bool {
        self.levels()
            .iter()
            .all(|(_, v)| (LEVEL_MIN..=LEVEL_MAX).contains(v))
    }
}

impl Default for ChemistryState {
    fn default() -> Self {
        Self::BASELINE
    }
}

impl std::fmt::Display for ChemistryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "dopamine {:.1}, oxytocin {:.1}, cortisol {:.1}",
            self.dopamine, self.oxytocin, self.cortisol
        )
    }
}

/// Parses `"dopamine,oxytocin,cortisol"`, e.g. `"50,50,20"`.
impl FromStr for ChemistryState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            anyhow::bail!(
                "expected three comma separated levels (dopamine,oxytocin,cortisol), got '{}'",
                s
            );
        }

        let mut values = [0.0_f64; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse::<f64>()
                .with_context(|| format!("invalid level '{}'", part))?;
            if !slot.is_finite() {
                anyhow::bail!("level '{}' is not a finite number", part);
            }
        }

        Ok(ChemistryState::new(values[0], values[1], values[2]))
    }
}

fn clamp_level(value: f64) -> f64 {
    value.clamp(LEVEL_MIN, LEVEL_MAX)
}

/// Moves `value` one step toward `baseline`; a value already at baseline stays put.
fn drift_toward(value: f64, baseline: f64) -> f64 {
    if value > baseline {
        value - DRIFT_STEP
    } else if value < baseline {
        value + DRIFT_STEP
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(d: f64, o: f64, c: f64) -> ChemistryState {
        ChemistryState {
            dopamine: d,
            oxytocin: o,
            cortisol: c,
        }
    }

    #[test]
    fn test_argument_from_baseline() {
        let next = ChemistryState::BASELINE.apply(InteractionKind::Argument);
        assert_eq!(next, state(40.0, 42.0, 40.0));
    }

    #[test]
    fn test_physical_touch_from_baseline() {
        let next = ChemistryState::BASELINE.apply(InteractionKind::PhysicalTouch);
        assert_eq!(next, state(55.0, 65.0, 15.0));
    }

    #[test]
    fn test_deep_talk_from_baseline() {
        let next = ChemistryState::BASELINE.apply(InteractionKind::DeepTalk);
        assert_eq!(next, state(58.0, 62.0, 17.0));
    }

    #[test]
    fn test_argument_clamps_at_zero() {
        let next = state(0.0, 0.0, 0.0).apply(InteractionKind::Argument);
        assert_eq!(next, state(0.0, 0.0, 20.0));
    }

    #[test]
    fn test_touch_clamps_at_hundred() {
        let next = state(98.0, 95.0, 2.0).apply(InteractionKind::PhysicalTouch);
        assert_eq!(next, state(100.0, 100.0, 0.0));
    }

    #[test]
    fn test_idle_ticks_at_baseline_do_not_move() {
        let mut current = ChemistryState::BASELINE;
        for _ in 0..20 {
            current = current.apply(InteractionKind::None);
        }
        assert_eq!(current, ChemistryState::BASELINE);
    }

    #[test]
    fn test_idle_drifts_toward_baseline() {
        let next = state(60.0, 30.0, 80.0).apply(InteractionKind::None);
        assert_eq!(next, state(59.5, 30.5, 79.5));
    }

    #[test]
    fn test_transition_is_deterministic() {
        let start = state(33.0, 71.0, 64.0);
        for kind in InteractionKind::ALL {
            assert_eq!(start.apply(kind), start.apply(kind));
        }
    }

    #[test]
    fn test_every_kind_stays_in_range_from_extremes() {
        for start in [state(0.0, 0.0, 0.0), state(100.0, 100.0, 100.0)] {
            for kind in InteractionKind::ALL {
                assert!(start.apply(kind).is_in_range(), "{:?} from {}", kind, start);
            }
        }
    }

    #[test]
    fn test_parse_state() {
        let parsed: ChemistryState = "10, 20.5,30".parse().unwrap();
        assert_eq!(parsed, state(10.0, 20.5, 30.0));

        let clamped: ChemistryState = "-5,150,50".parse().unwrap();
        assert_eq!(clamped, state(0.0, 100.0, 50.0));

        assert!("1,2".parse::<ChemistryState>().is_err());
        assert!("a,b,c".parse::<ChemistryState>().is_err());
        assert!("NaN,1,2".parse::<ChemistryState>().is_err());
    }
}
