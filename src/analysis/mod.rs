//! AI bet-analysis path. Produces a [`BetVerdict`] that is independent
//! of the EV calculator: the model's judgment is parsed and stored
//! as-is, it never flows through `pricing`.

pub mod client;
pub mod types;

use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::pricing::ev::Verdict;
use crate::state::BetVerdict;
use base64::Engine as _;
use client::{AiClient, ChatMessage, ChatRequest, ContentPart, ImageUrl, MessageContent};
use smallvec::smallvec;
use types::{AiAnalysis, EvRating, PlayerHistory, Trend, VibeAura};

const SYSTEM_PROMPT: &str = r#"You are a brutally honest sports betting analyst with a sense of humor. Analyze the bet and provide:
1. A verdict: either "W" (winner) or "L" (loser)
2. EV Rating (0-100): Mathematical expected value assessment
3. Player History: Recent performance trend (hot/cold/neutral)
4. Vibe/Aura: A fun, bold personality assessment

Be confident, slightly cocky, and entertaining. Use sports culture language. Make it shareable.

Return ONLY valid JSON in this exact format:
{
  "verdict": "W" or "L",
  "evRating": { "score": 0-100, "reason": "brief explanation" },
  "playerHistory": { "trend": "hot" | "cold" | "neutral", "reason": "brief explanation" },
  "vibeAura": { "emoji": "single emoji", "reason": "bold one-liner" }
}"#;

/// Analyze a described bet, optionally with a screenshot. The caller
/// (the analysis worker) substitutes [`fallback_verdict`] on failure;
/// validation errors inside `pricing` never get a substitute.
pub async fn analyze_bet(
    ai: &AiClient,
    cfg: &AppConfig,
    bet_text: &str,
    image_base64: Option<&str>,
) -> AppResult<BetVerdict> {
    let analysis = run_analysis(ai, cfg, bet_text, image_base64).await?;
    Ok(build_verdict(bet_text, analysis))
}

async fn run_analysis(
    ai: &AiClient,
    cfg: &AppConfig,
    bet_text: &str,
    image_base64: Option<&str>,
) -> AppResult<AiAnalysis> {
    let user_content = match image_base64 {
        Some(b64) => {
            // Reject garbage before it goes over the wire
            base64::engine::general_purpose::STANDARD
                .decode(b64)
                .map_err(|e| AppError::Parse(format!("image base64: {e}")))?;

            let text = if bet_text.is_empty() {
                "Analyze this bet from the screenshot:".to_string()
            } else {
                bet_text.to_string()
            };
            MessageContent::Parts(vec![
                ContentPart::Text { text },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:image/jpeg;base64,{b64}"),
                    },
                },
            ])
        }
        None => MessageContent::Text(format!("Analyze this bet: {bet_text}")),
    };

    let request = ChatRequest {
        model: cfg.openai_model.clone(),
        messages: smallvec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(SYSTEM_PROMPT.to_string()),
            },
            ChatMessage {
                role: "user",
                content: user_content,
            },
        ],
        temperature: cfg.ai_temperature,
        max_tokens: cfg.ai_max_tokens,
    };

    let content = ai.complete(&request).await?;

    // Strict, fail-closed decode of the model's JSON
    serde_json::from_str::<AiAnalysis>(content.trim())
        .map_err(|e| AppError::Parse(format!("AI payload: {e}")))
}

fn build_verdict(bet_text: &str, analysis: AiAnalysis) -> BetVerdict {
    BetVerdict {
        id: uuid::Uuid::new_v4().to_string(),
        bet_description: describe(bet_text),
        verdict: analysis.verdict,
        ev_rating: analysis.ev_rating,
        player_history: analysis.player_history,
        vibe_aura: analysis.vibe_aura,
        timestamp: chrono::Utc::now().timestamp_millis(),
    }
}

/// Degraded placeholder when the AI path is unavailable.
pub fn fallback_verdict(bet_text: &str) -> BetVerdict {
    BetVerdict {
        id: uuid::Uuid::new_v4().to_string(),
        bet_description: describe(bet_text),
        verdict: Verdict::L,
        ev_rating: EvRating {
            score: 30.0,
            reason: "Analysis temporarily unavailable".into(),
        },
        player_history: PlayerHistory {
            trend: Trend::Neutral,
            reason: "Unable to fetch recent stats".into(),
        },
        vibe_aura: VibeAura {
            emoji: "🤷".into(),
            reason: "Try again in a moment".into(),
        },
        timestamp: chrono::Utc::now().timestamp_millis(),
    }
}

fn describe(bet_text: &str) -> String {
    if bet_text.is_empty() {
        "Screenshot bet".to_string()
    } else {
        bet_text.to_string()
    }
}
