//! Economic assumptions driving the projections
//!
//! All rates here are whole percents per annum (2.5 = 2.5%).

use serde::{Deserialize, Serialize};

/// Economic assumptions for one projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomicAssumptions {
    /// Escalates drawdowns and pension income
    pub inflation_rate: f64,

    /// Earned by the drawdown pool
    pub investment_return_rate: f64,

    /// House price inflation
    pub house_price_inflation_rate: f64,

    /// Base interest rate, nominal, compounded monthly
    pub interest_rate: f64,

    /// Margin over the base rate, nominal, compounded monthly
    pub lending_margin: f64,
}

impl Default for EconomicAssumptions {
    fn default() -> Self {
        Self {
            inflation_rate: 2.5,
            investment_return_rate: 5.0,
            house_price_inflation_rate: 4.0,
            interest_rate: 3.0,
            lending_margin: 2.0,
        }
    }
}

impl EconomicAssumptions {
    /// Nominal loan rate (base rate plus margin)
    pub fn nominal_loan_rate(&self) -> f64 {
        self.interest_rate + self.lending_margin
    }

    /// Effective annual loan rate
    pub fn effective_loan_rate(&self) -> f64 {
        effective_annual_rate(self.nominal_loan_rate())
    }
}

/// Convert a nominal annual percent compounded monthly to an effective annual percent
pub fn effective_annual_rate(nominal_pct: f64) -> f64 {
    ((1.0 + nominal_pct / (12.0 * 100.0)).powi(12) - 1.0) * 100.0
}
