//! Lending policy constants

use serde::{Deserialize, Serialize};

/// Lending policy applied to every evaluation
///
/// Percentages are expressed as whole percents (15.0 = 15%) except
/// `establishment_fee_rate`, which is a decimal fraction of the loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// LVR granted at `base_lvr_age`
    pub base_lvr_pct: f64,

    /// Age at which `base_lvr_pct` applies
    pub base_lvr_age: u32,

    /// LVR added per year of age above `base_lvr_age`
    pub base_lvr_increment_pct: f64,

    /// LVR deducted for apartments
    pub apartment_lvr_adjustment_pct: f64,

    /// Minimum age of a single borrower
    pub min_single_age: u32,

    /// Minimum age of the youngest joint borrower
    pub min_couple_age: u32,

    pub min_loan_size: f64,
    pub max_top_up: f64,
    pub max_care: f64,
    pub max_reno_amount: f64,

    /// Sub-limits as a percent of the loan limit
    pub max_refi_pct: f64,
    pub max_travel_pct: f64,
    pub max_give_pct: f64,

    /// Fee charged on the requested amount, capitalised into the loan
    pub establishment_fee_rate: f64,

    /// Length of a standard projection table
    pub projection_periods: u32,

    /// Age at which a drawdown pool is planned to be exhausted
    pub projection_age: u32,

    /// House price growth assumed by the low growth stress scenario
    pub stress_low_hpi_pct: f64,

    /// Added to the interest rate by the rate shock scenario
    pub stress_interest_rate_shock_pct: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            base_lvr_pct: 15.0,
            base_lvr_age: 60,
            base_lvr_increment_pct: 1.0,
            apartment_lvr_adjustment_pct: 5.0,
            min_single_age: 60,
            min_couple_age: 65,
            min_loan_size: 50_000.0,
            max_top_up: 50_000.0,
            max_care: 50_000.0,
            max_reno_amount: 50_000.0,
            max_refi_pct: 50.0,
            max_travel_pct: 10.0,
            max_give_pct: 15.0,
            establishment_fee_rate: 0.015,
            projection_periods: 16,
            projection_age: 90,
            stress_low_hpi_pct: 1.0,
            stress_interest_rate_shock_pct: 2.0,
        }
    }
}

impl PolicyConfig {
    /// Apply one named setting, as read from a policy file
    ///
    /// Returns `false` when the name is not a known setting.
    pub(crate) fn set(&mut self, name: &str, value: f64) -> bool {
        match name {
            "base_lvr_pct" => self.base_lvr_pct = value,
            "base_lvr_age" => self.base_lvr_age = value as u32,
            "base_lvr_increment_pct" => self.base_lvr_increment_pct = value,
            "apartment_lvr_adjustment_pct" => self.apartment_lvr_adjustment_pct = value,
            "min_single_age" => self.min_single_age = value as u32,
            "min_couple_age" => self.min_couple_age = value as u32,
            "min_loan_size" => self.min_loan_size = value,
            "max_top_up" => self.max_top_up = value,
            "max_care" => self.max_care = value,
            "max_reno_amount" => self.max_reno_amount = value,
            "max_refi_pct" => self.max_refi_pct = value,
            "max_travel_pct" => self.max_travel_pct = value,
            "max_give_pct" => self.max_give_pct = value,
            "establishment_fee_rate" => self.establishment_fee_rate = value,
            "projection_periods" => self.projection_periods = value as u32,
            "projection_age" => self.projection_age = value as u32,
            "stress_low_hpi_pct" => self.stress_low_hpi_pct = value,
            "stress_interest_rate_shock_pct" => self.stress_interest_rate_shock_pct = value,
            _ => return false,
        }
        true
    }

    /// Whether a setting must hold a whole number
    pub(crate) fn is_integral(name: &str) -> bool {
        matches!(
            name,
            "base_lvr_age" | "min_single_age" | "min_couple_age" | "projection_periods" | "projection_age"
        )
    }
}
