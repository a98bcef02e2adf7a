//! Priority scoring
//!
//! The scorer is a pure function: it is re-run on every floating-pool
//! maintenance pass and must give the same answer for the same inputs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::claim::Claim;
use crate::error::DispatchError;

/// Weight triple for the priority formula.
///
/// The weighted sum is used directly as the score; the weights are not
/// normalized to sum to 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriorityWeights {
    #[serde(default = "PriorityWeights::default_aging")]
    pub aging: f64,
    #[serde(default = "PriorityWeights::default_payer")]
    pub payer: f64,
    #[serde(default = "PriorityWeights::default_denial")]
    pub denial: f64,
}

impl PriorityWeights {
    fn default_aging() -> f64 {
        0.4
    }

    fn default_payer() -> f64 {
        0.3
    }

    fn default_denial() -> f64 {
        0.3
    }

    /// Rejects negative components and non-positive sums
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.aging < 0.0 || self.payer < 0.0 || self.denial < 0.0 {
            return Err(DispatchError::Configuration(
                "priority weights must be non-negative".to_string(),
            ));
        }
        if self.aging + self.payer + self.denial <= 0.0 {
            return Err(DispatchError::Configuration(
                "priority weights must sum to a positive number".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            aging: Self::default_aging(),
            payer: Self::default_payer(),
            denial: Self::default_denial(),
        }
    }
}

/// Computes the base priority score from raw factors.
///
/// `score = aging_days * w.aging + payer_risk * w.payer + (denied ? 10 : 0) * w.denial`
///
/// Negative aging clamps to zero. Output is non-negative and unbounded;
/// bounding into bands happens at classification time.
pub fn priority_score(aging_days: i64, payer_risk: u8, denied: bool, weights: &PriorityWeights) -> f64 {
    let aging = aging_days.max(0) as f64;
    let denial_factor = if denied { 10.0 } else { 0.0 };
    aging * weights.aging + f64::from(payer_risk) * weights.payer + denial_factor * weights.denial
}

/// Scores a claim as of `today`
pub fn score_claim(claim: &Claim, weights: &PriorityWeights, today: NaiveDate) -> f64 {
    priority_score(
        claim.aging_days(today),
        claim.effective_payer_risk(),
        claim.is_denied(),
        weights,
    )
}

/// Urgency band derived from the base priority score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyBand {
    Routine,
    Medium,
    High,
    Critical,
}

impl UrgencyBand {
    pub fn classify(score: f64, bands: &UrgencyBands) -> Self {
        if score >= bands.critical {
            UrgencyBand::Critical
        } else if score >= bands.high {
            UrgencyBand::High
        } else if score >= bands.medium {
            UrgencyBand::Medium
        } else {
            UrgencyBand::Routine
        }
    }

    /// High and Critical claims get the stricter capacity treatment
    pub fn is_urgent(&self) -> bool {
        matches!(self, UrgencyBand::High | UrgencyBand::Critical)
    }
}

/// Score thresholds for urgency banding
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UrgencyBands {
    #[serde(default = "UrgencyBands::default_critical")]
    pub critical: f64,
    #[serde(default = "UrgencyBands::default_high")]
    pub high: f64,
    #[serde(default = "UrgencyBands::default_medium")]
    pub medium: f64,
}

impl UrgencyBands {
    fn default_critical() -> f64 {
        12.0
    }

    fn default_high() -> f64 {
        8.0
    }

    fn default_medium() -> f64 {
        5.0
    }

    pub fn validate(&self) -> Result<(), DispatchError> {
        if !(self.critical > self.high && self.high > self.medium && self.medium > 0.0) {
            return Err(DispatchError::Configuration(format!(
                "urgency bands must satisfy critical > high > medium > 0, got {}/{}/{}",
                self.critical, self.high, self.medium
            )));
        }
        Ok(())
    }
}

impl Default for UrgencyBands {
    fn default() -> Self {
        Self {
            critical: Self::default_critical(),
            high: Self::default_high(),
            medium: Self::default_medium(),
        }
    }
}
