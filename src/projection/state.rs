//! Running state carried from one projected year to the next

use crate::loan::LoanContext;

/// State at the beginning of a projected year
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Current projection period (0-indexed)
    pub period_index: u32,

    /// Age of the youngest borrower
    pub age: u32,

    /// Opening pool balance
    pub pool_balance: f64,

    /// Drawdown scheduled before any exhaustion clamp
    pub scheduled_drawdown: f64,

    pub pension_income: f64,

    /// Drawdowns actually taken so far
    pub cumulative_drawdown: f64,

    pub house_value: f64,
    pub loan_balance: f64,
}

impl ProjectionState {
    /// Initialize state at projection start; any top up is paid into the pool
    pub fn from_context(context: &LoanContext, opening_loan_balance: f64) -> Self {
        Self {
            period_index: 0,
            age: context.youngest_age,
            pool_balance: context.retirement.pool_balance + context.requested.top_up,
            scheduled_drawdown: context.retirement.annual_drawdown,
            pension_income: context.retirement.annual_pension_income,
            cumulative_drawdown: 0.0,
            house_value: context.property_valuation,
            loan_balance: opening_loan_balance,
        }
    }

    /// Advance to the next year
    ///
    /// Rates are decimal fractions. Drawdown schedule and pension escalate with
    /// inflation, house value with house price inflation, and the loan with its
    /// effective annual rate.
    pub fn advance(
        &mut self,
        end_pool_balance: f64,
        inflation_rate: f64,
        house_price_inflation_rate: f64,
        effective_loan_rate: f64,
    ) {
        self.period_index += 1;
        self.age += 1;
        self.pool_balance = end_pool_balance;
        self.scheduled_drawdown *= 1.0 + inflation_rate;
        self.pension_income *= 1.0 + inflation_rate;
        self.house_value *= 1.0 + house_price_inflation_rate;
        self.loan_balance *= 1.0 + effective_loan_rate;
    }

    pub fn home_equity(&self) -> f64 {
        self.house_value - self.loan_balance
    }

    /// Home equity as a percent of house value, floored at zero
    pub fn home_equity_pct(&self) -> f64 {
        if self.house_value <= 0.0 {
            0.0
        } else {
            (self.home_equity() / self.house_value * 100.0).max(0.0)
        }
    }
}
