//! Projection output structures

use super::stress::Scenario;
use serde::{Deserialize, Serialize};

/// One projected year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPeriod {
    // Timing
    pub period_index: u32,
    pub begin_age: u32,

    // Drawdown pool
    pub begin_pool_balance: f64,
    pub drawdown: f64,
    pub drawdown_per_payment: f64,
    pub investment_return: f64,
    pub end_pool_balance: f64,

    // Income
    pub pension_income: f64,
    pub total_income: f64,
    pub pension_income_share_pct: f64,
    pub cumulative_drawdown: f64,

    // Property and loan
    pub begin_house_value: f64,
    pub begin_loan_balance: f64,
    pub home_equity: f64,
    pub home_equity_pct: f64,
}

/// Projection for one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionTable {
    pub scenario: Scenario,
    pub periods: Vec<ProjectionPeriod>,
}

impl ProjectionTable {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            periods: Vec::new(),
        }
    }

    pub fn add_period(&mut self, period: ProjectionPeriod) {
        self.periods.push(period);
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let total_drawdown: f64 = self.periods.iter().map(|p| p.drawdown).sum();
        let total_investment_return: f64 = self.periods.iter().map(|p| p.investment_return).sum();

        let final_pool_balance = self.periods.last().map(|p| p.end_pool_balance).unwrap_or(0.0);
        let final_home_equity = self.periods.last().map(|p| p.home_equity).unwrap_or(0.0);
        let final_home_equity_pct = self.periods.last().map(|p| p.home_equity_pct).unwrap_or(0.0);

        let pool_exhausted_period = self
            .periods
            .iter()
            .find(|p| p.begin_pool_balance > 0.0 && p.end_pool_balance <= 0.0)
            .map(|p| p.period_index);

        ProjectionSummary {
            scenario: self.scenario,
            total_periods: self.periods.len() as u32,
            total_drawdown,
            total_investment_return,
            final_pool_balance,
            final_home_equity,
            final_home_equity_pct,
            pool_exhausted_period,
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub scenario: Scenario,
    pub total_periods: u32,
    pub total_drawdown: f64,
    pub total_investment_return: f64,
    pub final_pool_balance: f64,
    pub final_home_equity: f64,
    pub final_home_equity_pct: f64,

    /// First period in which the pool ran out
    pub pool_exhausted_period: Option<u32>,
}
