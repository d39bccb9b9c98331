use std::str::FromStr;

use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The event driving one chemistry transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    PhysicalTouch,
    Argument,
    DeepTalk,
    None,
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 4] = [
        InteractionKind::PhysicalTouch,
        InteractionKind::Argument,
        InteractionKind::DeepTalk,
        InteractionKind::None,
    ];

    /// Draw weights. `None` counts twice, so a quiet tick is as likely as
    /// any two interactions put together.
    pub const WEIGHTS: [(InteractionKind, u32); 4] = [
        (InteractionKind::PhysicalTouch, 1),
        (InteractionKind::Argument, 1),
        (InteractionKind::DeepTalk, 1),
        (InteractionKind::None, 2),
    ];

    pub fn total_weight() -> u32 {
        Self::WEIGHTS.iter().map(|(_, w)| w).sum()
    }

    /// Maps a roll in `0..total_weight()` onto the weight table.
    /// Rolls past the end land on the last entry.
    pub fn from_roll(roll: u32) -> InteractionKind {
        let mut remaining = roll;
        for (kind, weight) in Self::WEIGHTS {
            if remaining < weight {
                return kind;
            }
            remaining -= weight;
        }
        Self::WEIGHTS[Self::WEIGHTS.len() - 1].0
    }

    /// Uniform draw over the weighted table.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> InteractionKind {
        Self::from_roll(rng.gen_range(0..Self::total_weight()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            InteractionKind::PhysicalTouch => "Physical Touch",
            InteractionKind::Argument => "Argument",
            InteractionKind::DeepTalk => "Deep Talk",
            InteractionKind::None => "None",
        }
    }

    pub fn is_event(&self) -> bool {
        !matches!(self, InteractionKind::None)
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionKind::PhysicalTouch => write!(f, "physical_touch"),
            InteractionKind::Argument => write!(f, "argument"),
            InteractionKind::DeepTalk => write!(f, "deep_talk"),
            InteractionKind::None => write!(f, "none"),
        }
    }
}

impl FromStr for InteractionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "physical_touch" | "touch" => Ok(InteractionKind::PhysicalTouch),
            "argument" => Ok(InteractionKind::Argument),
            "deep_talk" | "talk" => Ok(InteractionKind::DeepTalk),
            "none" | "idle" => Ok(InteractionKind::None),
            _ => Err(anyhow::anyhow!(
                "unknown interaction '{}' (expected physical_touch, argument, deep_talk or none)",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_weight_table_covers_every_kind() {
        for kind in InteractionKind::ALL {
            assert!(InteractionKind::WEIGHTS.iter().any(|(k, w)| *k == kind && *w > 0));
        }
        assert_eq!(InteractionKind::total_weight(), 5);
    }

    #[test]
    fn test_rolls_map_onto_multiset() {
        let rolled: Vec<InteractionKind> = (0..InteractionKind::total_weight())
            .map(InteractionKind::from_roll)
            .collect();
        assert_eq!(
            rolled,
            vec![
                InteractionKind::PhysicalTouch,
                InteractionKind::Argument,
                InteractionKind::DeepTalk,
                InteractionKind::None,
                InteractionKind::None,
            ]
        );
        assert_eq!(InteractionKind::from_roll(99), InteractionKind::None);
    }

    #[test]
    fn test_draw_frequencies_follow_weights() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts: HashMap<InteractionKind, u32> = HashMap::new();
        let draws = 50_000;
        for _ in 0..draws {
            *counts.entry(InteractionKind::draw(&mut rng)).or_default() += 1;
        }

        for (kind, weight) in InteractionKind::WEIGHTS {
            let expected = draws as f64 * weight as f64 / 5.0;
            let seen = counts[&kind] as f64;
            assert!(
                (seen - expected).abs() < expected * 0.05,
                "{:?}: saw {} expected about {}",
                kind,
                seen,
                expected
            );
        }
    }

    #[test]
    fn test_seeded_draws_are_reproducible() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let left: Vec<_> = (0..32).map(|_| InteractionKind::draw(&mut a)).collect();
        let right: Vec<_> = (0..32).map(|_| InteractionKind::draw(&mut b)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_parse_and_display() {
        for kind in InteractionKind::ALL {
            assert_eq!(kind.to_string().parse::<InteractionKind>().unwrap(), kind);
        }
        assert_eq!(
            "Deep Talk".parse::<InteractionKind>().unwrap(),
            InteractionKind::DeepTalk
        );
        assert_eq!(
            "physical-touch".parse::<InteractionKind>().unwrap(),
            InteractionKind::PhysicalTouch
        );
        assert!("hug".parse::<InteractionKind>().is_err());
    }
}
