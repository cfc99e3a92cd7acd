//! RTP report derived from an accumulator

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::accumulator::Accumulator;

/// z-score of a two-sided 95% interval
const Z_95: f64 = 1.96;

/// Interval on the mean multiplier
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }
}

/// Return-to-player statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RtpReport {
    pub total_games: u64,
    pub total_bet: f64,
    pub total_payout_rtp: f64,
    pub base_payout_rtp: f64,
    pub bonus_payout_rtp: f64,
    pub hit_frequency: f64,
    pub mean_multiplier: f64,
    pub standard_deviation: f64,
    pub max_multiplier: f64,
    pub bonus_trigger_frequency: f64,
    /// One trigger every N games
    pub bonus_trigger_hitrate: f64,
    pub symbol_payouts_rtp: BTreeMap<String, f64>,
    pub confidence_interval_95: ConfidenceInterval,
}

impl RtpReport {
    /// Derive statistics. Zero trials or zero bet yield zeros, never NaN.
    pub fn from_accumulator(acc: &Accumulator) -> Self {
        let n = acc.total_trials as f64;
        let games = n.max(1.0);
        let per_bet = |amount: f64| {
            if acc.total_bet > 0.0 {
                amount / acc.total_bet
            } else {
                0.0
            }
        };

        let mean = per_bet(acc.total_payout);
        let variance = if acc.total_trials > 0 {
            (acc.sum_squared_multipliers / n - mean * mean).max(0.0)
        } else {
            0.0
        };
        let standard_deviation = variance.sqrt();
        let margin = Z_95 * standard_deviation / games.sqrt();

        Self {
            total_games: acc.total_trials,
            total_bet: acc.total_bet,
            total_payout_rtp: mean,
            base_payout_rtp: per_bet(acc.base_payout),
            bonus_payout_rtp: per_bet(acc.bonus_payout),
            hit_frequency: acc.winning_trials as f64 / games,
            mean_multiplier: mean,
            standard_deviation,
            max_multiplier: acc.max_multiplier,
            bonus_trigger_frequency: acc.bonus_triggers as f64 / games,
            bonus_trigger_hitrate: n / (acc.bonus_triggers.max(1) as f64),
            symbol_payouts_rtp: acc
                .symbol_payouts
                .iter()
                .map(|(symbol, payout)| (symbol.clone(), per_bet(*payout)))
                .collect(),
            confidence_interval_95: ConfidenceInterval {
                lower: mean - margin,
                upper: mean + margin,
            },
        }
    }
}

impl fmt::Display for RtpReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} games | RTP {:.4}% (base {:.4}%, bonus {:.4}%) | 95% CI [{:.4}%, {:.4}%] | hit {:.2}% | sd {:.3} | bonus 1 in {:.1}",
            self.total_games,
            self.total_payout_rtp * 100.0,
            self.base_payout_rtp * 100.0,
            self.bonus_payout_rtp * 100.0,
            self.confidence_interval_95.lower * 100.0,
            self.confidence_interval_95.upper * 100.0,
            self.hit_frequency * 100.0,
            self.standard_deviation,
            self.bonus_trigger_hitrate,
        )
    }
}
