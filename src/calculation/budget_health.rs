//! Budget health classification for the gauge next to a result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::format::format_percent;

/// How far the current budget sits from the initial one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetHealthBand {
    /// Below half of the initial budget.
    Critical,
    /// Between half and 80% of the initial budget.
    Warning,
    /// Between 80% and 100% of the initial budget.
    Below,
    /// Exactly on the initial budget.
    OnTarget,
    /// Above the initial budget.
    Over,
}

/// Gauge reading for a budget ratio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetHealth {
    /// Classification of the ratio.
    pub band: BudgetHealthBand,
    /// Bar fill in percent, clamped to `0..=100`.
    pub fill_percent: Decimal,
    /// The ratio as a percentage with one decimal (`"87.5%"`).
    pub display_percent: String,
    /// One-line description of the state.
    pub description: String,
}

impl BudgetHealth {
    /// Reads the gauge for a ratio.
    ///
    /// ```
    /// use rust_decimal::Decimal;
    /// use salary_engine::calculation::{BudgetHealth, BudgetHealthBand};
    ///
    /// let health = BudgetHealth::from_ratio(Decimal::new(875, 3));
    /// assert_eq!(health.band, BudgetHealthBand::Below);
    /// assert_eq!(health.display_percent, "87.5%");
    /// ```
    pub fn from_ratio(ratio: Decimal) -> Self {
        let half = Decimal::new(5, 1);
        let eighty = Decimal::new(8, 1);

        let band = if ratio < half {
            BudgetHealthBand::Critical
        } else if ratio < eighty {
            BudgetHealthBand::Warning
        } else if ratio < Decimal::ONE {
            BudgetHealthBand::Below
        } else if ratio > Decimal::ONE {
            BudgetHealthBand::Over
        } else {
            BudgetHealthBand::OnTarget
        };

        let description = if ratio > Decimal::ONE {
            "Over budget - salary increases proportionally"
        } else if ratio < Decimal::ONE {
            "Under budget - salary decreases proportionally"
        } else {
            "Budget on target"
        };

        let fill_percent = ratio
            .saturating_mul(Decimal::ONE_HUNDRED)
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
            .normalize();

        Self {
            band,
            fill_percent,
            display_percent: format_percent(ratio, 1),
            description: description.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_bands() {
        assert_eq!(BudgetHealth::from_ratio(dec("0.3")).band, BudgetHealthBand::Critical);
        assert_eq!(BudgetHealth::from_ratio(dec("0.5")).band, BudgetHealthBand::Warning);
        assert_eq!(BudgetHealth::from_ratio(dec("0.79")).band, BudgetHealthBand::Warning);
        assert_eq!(BudgetHealth::from_ratio(dec("0.8")).band, BudgetHealthBand::Below);
        assert_eq!(BudgetHealth::from_ratio(dec("1")).band, BudgetHealthBand::OnTarget);
        assert_eq!(BudgetHealth::from_ratio(dec("1.2")).band, BudgetHealthBand::Over);
    }

    #[test]
    fn test_fill_is_clamped() {
        assert_eq!(BudgetHealth::from_ratio(dec("2.5")).fill_percent, dec("100"));
        assert_eq!(BudgetHealth::from_ratio(dec("0.42")).fill_percent, dec("42"));
        assert_eq!(BudgetHealth::from_ratio(dec("0")).fill_percent, Decimal::ZERO);
    }

    #[test]
    fn test_display_and_description() {
        let over = BudgetHealth::from_ratio(dec("1.25"));
        assert_eq!(over.display_percent, "125.0%");
        assert!(over.description.starts_with("Over budget"));

        let on_target = BudgetHealth::from_ratio(dec("1"));
        assert_eq!(on_target.description, "Budget on target");
    }

    #[test]
    fn test_huge_ratio_saturates() {
        let health = BudgetHealth::from_ratio(Decimal::MAX);
        assert_eq!(health.band, BudgetHealthBand::Over);
        assert_eq!(health.fill_percent, dec("100"));
        assert!(health.display_percent.ends_with('%'));
    }
}
