use crate::pricing::ev::Verdict;
use serde::{Deserialize, Serialize};

// ── AI analysis payload (strict, fails closed on malformed shape) ──

/// Recent-performance trend as judged by the analyst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Hot,
    Cold,
    Neutral,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hot => write!(f, "hot"),
            Self::Cold => write!(f, "cold"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvRating {
    /// 0-100 mathematical EV assessment.
    pub score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerHistory {
    pub trend: Trend,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VibeAura {
    pub emoji: String,
    pub reason: String,
}

/// The exact JSON shape the model is instructed to return. Every field
/// is required; unknown fields are rejected rather than trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AiAnalysis {
    pub verdict: Verdict,
    pub ev_rating: EvRating,
    pub player_history: PlayerHistory,
    pub vibe_aura: VibeAura,
}
