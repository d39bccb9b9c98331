use serde::{Deserialize, Serialize};

use crate::chemistry::ChemistryState;

/// Cortisol above this raises a stress alert.
pub const STRESS_THRESHOLD: f64 = 60.0;
/// Oxytocin below this flags a bonding deficit.
pub const BONDING_THRESHOLD: f64 = 40.0;
/// Dopamine below this flags low reward.
pub const REWARD_THRESHOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    StressAlert,
    BondingDeficit,
    LowReward,
    Optimal,
}

impl RecommendationCategory {
    pub fn title(&self) -> &'static str {
        match self {
            RecommendationCategory::StressAlert => "Stress Alert",
            RecommendationCategory::BondingDeficit => "Bonding Deficit",
            RecommendationCategory::LowReward => "Low Reward",
            RecommendationCategory::Optimal => "Optimal",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RecommendationCategory::StressAlert => {
                "Cortisol is elevated. De-escalate, take a break and avoid further conflict."
            }
            RecommendationCategory::BondingDeficit => {
                "Oxytocin is low. Plan physical closeness or a deep conversation to rebuild connection."
            }
            RecommendationCategory::LowReward => {
                "Dopamine is low. Introduce something new or rewarding to lift motivation."
            }
            RecommendationCategory::Optimal => {
                "Chemistry is balanced. Keep up the current rhythm of interaction."
            }
        }
    }
}

impl std::fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub message: String,
}

impl Recommendation {
    pub fn new(category: RecommendationCategory) -> Self {
        Recommendation {
            category,
            message: category.message().to_string(),
        }
    }
}

/// Derives advisories from a state. Rules run in priority order and every
/// match is kept; `Optimal` appears alone when nothing matched, so the
/// result is never empty.
pub fn derive_recommendations(state: &ChemistryState) -> Vec<Recommendation> {
    let rules: [(bool, RecommendationCategory); 3] = [
        (
            state.cortisol > STRESS_THRESHOLD,
            RecommendationCategory::StressAlert,
        ),
        (
            state.oxytocin < BONDING_THRESHOLD,
            RecommendationCategory::BondingDeficit,
        ),
        (
            state.dopamine < REWARD_THRESHOLD,
            RecommendationCategory::LowReward,
        ),
    ];

    let mut recommendations: Vec<Recommendation> = rules
        .into_iter()
        .filter(|(matched, _)| *matched)
        .map(|(_, category)| Recommendation::new(category))
        .collect();

    if recommendations.is_empty() {
        recommendations.push(Recommendation::new(RecommendationCategory::Optimal));
    }

    recommendations
}
