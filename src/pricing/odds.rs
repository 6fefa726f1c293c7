//! Odds conversions between American and decimal formats, plus implied
//! probability. All functions are pure: same inputs, same outputs, no
//! allocations.

use crate::errors::{AppError, AppResult};

/// Convert American odds to decimal odds.
///
/// Positive odds are the underdog convention (profit per 100 staked),
/// negative odds the favorite convention (stake needed to win 100).
///
/// Rejects non-finite input. Odds of exactly 0 are nonsensical but not
/// rejected here; upstream validation layers are expected to keep them
/// out (see `service::get_ev`).
#[inline]
pub fn american_to_decimal(odds: f64) -> AppResult<f64> {
    if !odds.is_finite() {
        return Err(AppError::InvalidOdds);
    }
    Ok(if odds > 0.0 {
        1.0 + odds / 100.0
    } else {
        1.0 + 100.0 / odds.abs()
    })
}

/// Convert decimal odds to the bookmaker's implied win probability
/// (vig included). Requires `decimal_odds > 1`.
#[inline]
pub fn decimal_to_implied_prob(decimal_odds: f64) -> AppResult<f64> {
    if !(decimal_odds > 1.0) {
        return Err(AppError::InvalidDecimalOdds);
    }
    Ok(1.0 / decimal_odds)
}

/// American odds straight to implied probability.
/// Fails with whichever underlying check fails first.
#[inline]
pub fn implied_prob_from_american(odds: f64) -> AppResult<f64> {
    decimal_to_implied_prob(american_to_decimal(odds)?)
}

/// Remove the vig from a two-way market: given decimal odds for both
/// sides, rescale the raw implied probabilities so they sum to exactly 1.
/// The raw sum is the bookmaker's overround.
///
/// No bound checks here; callers supply valid decimal odds (> 1).
#[inline]
pub fn normalize_two_way_fair_probs(dec_a: f64, dec_b: f64) -> (f64, f64) {
    let pa = 1.0 / dec_a;
    let pb = 1.0 / dec_b;
    let sum = pa + pb;
    (pa / sum, pb / sum)
}
