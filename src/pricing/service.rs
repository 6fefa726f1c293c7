//! Single synchronous entry point for EV requests, whatever their
//! source (API body, parsed AI output). Re-runs the field checks at
//! the boundary before delegating, so a bad input never reaches the
//! calculator half-validated.

use crate::errors::{AppError, AppResult};
use crate::pricing::ev::{self, EvInput, EvOutput};

/// Validate and compute. Local, synchronous, no network.
pub fn get_ev(input: &EvInput) -> AppResult<EvOutput> {
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

    ev::calculate_ev(&EvInput {
        stake: Some(stake),
        ..*input
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::ev::Verdict;

    #[test]
    fn test_delegates_to_calculator() {
        let out = get_ev(&EvInput {
            odds: -120.0,
            win_prob: 0.55,
            stake: None,
            fair_prob: None,
        })
        .unwrap();
        assert_eq!(out.verdict, Verdict::W);
        assert!((out.decimal_odds - 1.8333333333333333).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_rejects_before_delegating() {
        assert!(matches!(
            get_ev(&EvInput {
                odds: f64::INFINITY,
                win_prob: 0.5,
                stake: None,
                fair_prob: None,
            }),
            Err(AppError::InvalidOdds)
        ));
        assert!(matches!(
            get_ev(&EvInput {
                odds: -110.0,
                win_prob: 2.0,
                stake: None,
                fair_prob: None,
            }),
            Err(AppError::InvalidWinProb)
        ));
        assert!(matches!(
            get_ev(&EvInput {
                odds: -110.0,
                win_prob: 0.5,
                stake: Some(0.0),
                fair_prob: None,
            }),
            Err(AppError::InvalidStake)
        ));
    }

    #[test]
    fn test_absent_stake_defaults_to_one() {
        let a = get_ev(&EvInput {
            odds: 150.0,
            win_prob: 0.4,
            stake: None,
            fair_prob: None,
        })
        .unwrap();
        let b = get_ev(&EvInput {
            odds: 150.0,
            win_prob: 0.4,
            stake: Some(1.0),
            fair_prob: None,
        })
        .unwrap();
        assert_eq!(a.ev_per_stake, b.ev_per_stake);
    }
}
