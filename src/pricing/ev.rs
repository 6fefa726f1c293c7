//! Expected value computation for a single American-odds bet.
//!
//! EV per unit staked = p * (D - 1) - (1 - p)
//!
//! where:
//!   p = probability used for EV math (fairProb when supplied, else winProb)
//!   D = decimal odds derived from the American odds
//!
//! All inputs are f64. Pure function, no side effects.

use crate::errors::{AppError, AppResult};
use crate::pricing::odds;

/// Classification of a bet. Serialized as "W" / "L" on the wire and in
/// the history store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Verdict {
    W,
    L,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::W => write!(f, "W"),
            Self::L => write!(f, "L"),
        }
    }
}

/// Bet parameters. Stack-allocated value object.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvInput {
    /// American odds, e.g. -120 or +150.
    pub odds: f64,
    /// Caller's estimated win probability, 0..1.
    pub win_prob: f64,
    /// Amount at risk. Defaults to 1 when absent.
    pub stake: Option<f64>,
    /// Optional vig-removed probability; overrides win_prob for EV math.
    pub fair_prob: Option<f64>,
}

/// Rule-based one-liners accompanying the verdict.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvReasons {
    pub ev_rating: String,
    pub player_history: String,
    pub vibe_aura: String,
}

/// EV computation result. Constructed fresh per call, never mutated.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvOutput {
    pub decimal_odds: f64,
    /// From book odds, vig included.
    pub implied_prob: f64,
    /// The probability actually used: fair_prob when supplied, else win_prob.
    pub fair_prob_used: f64,
    /// Expected profit per 1 stake unit.
    pub ev_per_stake: f64,
    /// fair_prob_used - implied_prob.
    pub edge: f64,
    pub verdict: Verdict,
    pub reasons: EvReasons,
}

/// Edge beyond which the read is called hot (or cold, mirrored).
const EDGE_THRESHOLD: f64 = 0.05;

const GOOD_VIBES: [&str; 3] = [
    "Main character energy 😎",
    "Crowd buff incoming 📣",
    "Green lights only 💡",
];

const BAD_VIBES: [&str; 3] = [
    "Cold aura after that missed PK ❄️",
    "Narrative tax alert 🧾",
    "Trap line vibes 🪤",
];

/// Deterministic pick: index derived from the exact odds value, so the
/// same bet always gets the same line. Not a RNG.
#[inline]
fn pick(arr: &[&'static str; 3], key: f64) -> &'static str {
    let idx = ((key * 1000.0).round() as i64).unsigned_abs() % arr.len() as u64;
    arr[idx as usize]
}

/// Compute expected value, edge, and a W/L verdict with mini reasons.
///
/// Validation is all-or-nothing: any bad field fails with the matching
/// error variant and no partial output. `stake` is validated but EV is
/// per-unit by contract, never multiplied by the stake. `fair_prob`,
/// when supplied, is used as-is without its own range check.
pub fn calculate_ev(input: &EvInput) -> AppResult<EvOutput> {
    if !input.odds.is_finite() {
        return Err(AppError::InvalidOdds);
    }
    if !(input.win_prob >= 0.0 && input.win_prob <= 1.0) {
        return Err(AppError::InvalidWinProb);
    }
    let stake = input.stake.unwrap_or(1.0);
    if !(stake > 0.0) {
        return Err(AppError::InvalidStake);
    }

    let decimal_odds = odds::american_to_decimal(input.odds)?;
    let implied_prob = odds::decimal_to_implied_prob(decimal_odds)?;
    let p = input.fair_prob.unwrap_or(input.win_prob);

    let profit_if_win = decimal_odds - 1.0;
    let ev_per_stake = p * profit_if_win - (1.0 - p);
    let edge = p - implied_prob;
    // Ties favor W
    let verdict = if ev_per_stake >= 0.0 { Verdict::W } else { Verdict::L };

    let sign = if ev_per_stake >= 0.0 { "+" } else { "" };
    let ev_rating = format!("EV {sign}{ev_per_stake:.2} per unit");

    let player_history = if edge > EDGE_THRESHOLD {
        "Trending hot vs market 🔥"
    } else if edge < -EDGE_THRESHOLD {
        "Cold read vs market ❄️"
    } else {
        "Within coin-flip range 🪙"
    }
    .to_string();

    let vibes = match verdict {
        Verdict::W => &GOOD_VIBES,
        Verdict::L => &BAD_VIBES,
    };
    let vibe_aura = pick(vibes, input.odds).to_string();

    Ok(EvOutput {
        decimal_odds,
        implied_prob,
        fair_prob_used: p,
        ev_per_stake,
        edge,
        verdict,
        reasons: EvReasons {
            ev_rating,
            player_history,
            vibe_aura,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(odds: f64, win_prob: f64) -> EvInput {
        EvInput {
            odds,
            win_prob,
            stake: None,
            fair_prob: None,
        }
    }

    #[test]
    fn test_favorite_with_edge_is_w() {
        // -120 at 55%: thin positive EV
        let out = calculate_ev(&input(-120.0, 0.55)).unwrap();
        assert!((out.decimal_odds - 1.8333333333333333).abs() < 1e-12);
        assert!((out.ev_per_stake - 0.008333333333333).abs() < 1e-3, "ev: {}", out.ev_per_stake);
        assert_eq!(out.verdict, Verdict::W);
    }

    #[test]
    fn test_underdog_without_edge_is_l() {
        let out = calculate_ev(&input(150.0, 0.35)).unwrap();
        assert!((out.ev_per_stake - (-0.125)).abs() < 1e-12, "ev: {}", out.ev_per_stake);
        assert_eq!(out.verdict, Verdict::L);
    }

    #[test]
    fn test_big_dog_big_edge_trends_hot() {
        let out = calculate_ev(&input(200.0, 0.5)).unwrap();
        assert_eq!(out.decimal_odds, 3.0);
        assert_eq!(out.ev_per_stake, 0.5);
        assert_eq!(out.verdict, Verdict::W);
        assert!((out.edge - (0.5 - 1.0 / 3.0)).abs() < 1e-12);
        assert!(out.edge > 0.05);
        assert_eq!(out.reasons.player_history, "Trending hot vs market 🔥");
    }

    #[test]
    fn test_heavy_favorite_negative_ev() {
        let out = calculate_ev(&input(-200.0, 0.6)).unwrap();
        assert_eq!(out.decimal_odds, 1.5);
        assert!((out.ev_per_stake - (-0.1)).abs() < 1e-12, "ev: {}", out.ev_per_stake);
        assert_eq!(out.verdict, Verdict::L);
    }

    #[test]
    fn test_fair_prob_overrides_win_prob() {
        let out = calculate_ev(&EvInput {
            odds: -120.0,
            win_prob: 0.5,
            stake: None,
            fair_prob: Some(0.6),
        })
        .unwrap();
        assert_eq!(out.fair_prob_used, 0.6);
    }

    #[test]
    fn test_standard_juice_is_coin_flip_range() {
        let out = calculate_ev(&input(-110.0, 0.52)).unwrap();
        assert!(out.edge.abs() <= 0.05, "edge: {}", out.edge);
        assert_eq!(out.reasons.player_history, "Within coin-flip range 🪙");
    }

    #[test]
    fn test_ev_rating_carries_explicit_sign() {
        let pos = calculate_ev(&input(200.0, 0.5)).unwrap();
        assert_eq!(pos.reasons.ev_rating, "EV +0.50 per unit");
        let neg = calculate_ev(&input(-200.0, 0.6)).unwrap();
        assert_eq!(neg.reasons.ev_rating, "EV -0.10 per unit");
    }

    #[test]
    fn test_zero_ev_ties_favor_w() {
        // Even odds at exactly 50%: EV is 0, verdict must be W
        let out = calculate_ev(&input(100.0, 0.5)).unwrap();
        assert_eq!(out.ev_per_stake, 0.0);
        assert_eq!(out.verdict, Verdict::W);
        assert_eq!(out.reasons.ev_rating, "EV +0.00 per unit");
    }

    #[test]
    fn test_vibe_line_is_deterministic_in_odds() {
        let a = calculate_ev(&input(-137.0, 0.9)).unwrap();
        let b = calculate_ev(&input(-137.0, 0.9)).unwrap();
        assert_eq!(a.reasons.vibe_aura, b.reasons.vibe_aura);
        // index = |round(-137 * 1000)| % 3 = 137000 % 3 = 2
        assert_eq!(a.reasons.vibe_aura, GOOD_VIBES[2]);
    }

    #[test]
    fn test_ev_monotonic_in_win_prob() {
        for odds in [-250.0, -110.0, 130.0, 400.0] {
            let mut prev = f64::NEG_INFINITY;
            for i in 0..=20 {
                let p = i as f64 / 20.0;
                let ev = calculate_ev(&input(odds, p)).unwrap().ev_per_stake;
                assert!(ev >= prev, "EV decreased at odds {odds}, p {p}");
                prev = ev;
            }
        }
    }

    #[test]
    fn test_stake_validated_but_not_multiplied() {
        let per_unit = calculate_ev(&input(150.0, 0.35)).unwrap();
        let staked = calculate_ev(&EvInput {
            odds: 150.0,
            win_prob: 0.35,
            stake: Some(25.0),
            fair_prob: None,
        })
        .unwrap();
        assert_eq!(per_unit.ev_per_stake, staked.ev_per_stake, "EV is per-unit");
    }

    #[test]
    fn test_invalid_inputs_fail_with_field_errors() {
        assert!(matches!(
            calculate_ev(&input(f64::NAN, 0.5)),
            Err(AppError::InvalidOdds)
        ));
        assert!(matches!(
            calculate_ev(&input(-110.0, 1.5)),
            Err(AppError::InvalidWinProb)
        ));
        assert!(matches!(
            calculate_ev(&input(-110.0, -0.1)),
            Err(AppError::InvalidWinProb)
        ));
        for bad_stake in [0.0, -5.0, f64::NAN] {
            assert!(
                matches!(
                    calculate_ev(&EvInput {
                        odds: -110.0,
                        win_prob: 0.5,
                        stake: Some(bad_stake),
                        fair_prob: None,
                    }),
                    Err(AppError::InvalidStake)
                ),
                "stake {bad_stake} should be rejected"
            );
        }
    }
}
