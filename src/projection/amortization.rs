//! Drawdown pool recurrence
//!
//! Each period the pool earns a return on the average of its opening and
//! post-drawdown balance (mid-year convention for a drawdown taken evenly through
//! the year), and the drawdown escalates with inflation.
//!
//! Rates in this module are decimal fractions (0.05 = 5%).

use super::solver::Bisection;
use crate::error::{EngineError, InputError};
use serde::{Deserialize, Serialize};

/// Pool movement for one period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodFlow {
    pub opening_balance: f64,
    pub drawdown: f64,
    pub investment_return: f64,
    pub closing_balance: f64,
}

/// Closing balance after `periods` periods, without clamping.
///
/// This is the function the solver inverts: it is strictly decreasing in the
/// drawdown and strictly increasing in the opening balance.
pub fn terminal_balance(
    opening_balance: f64,
    opening_drawdown: f64,
    periods: u32,
    investment_return_rate: f64,
    inflation_rate: f64,
) -> f64 {
    let mut balance = opening_balance;
    let mut drawdown = opening_drawdown;
    for _ in 0..periods {
        let investment_return = (balance - drawdown / 2.0) * investment_return_rate;
        balance = balance - drawdown + investment_return;
        drawdown *= 1.0 + inflation_rate;
    }
    balance
}

/// Pool recurrence under fixed return and inflation rates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmortizationModel {
    pub investment_return_rate: f64,
    pub inflation_rate: f64,

    /// Reduce a drawdown that would overdraw the pool so it closes at zero
    pub clamp_to_balance: bool,

    pub solver: Bisection,
}

impl AmortizationModel {
    pub fn new(investment_return_rate: f64, inflation_rate: f64) -> Self {
        Self {
            investment_return_rate,
            inflation_rate,
            clamp_to_balance: false,
            solver: Bisection::default(),
        }
    }

    pub fn with_clamp(mut self, clamp_to_balance: bool) -> Self {
        self.clamp_to_balance = clamp_to_balance;
        self
    }

    pub fn with_solver(mut self, solver: Bisection) -> Self {
        self.solver = solver;
        self
    }

    /// Apply one period of the recurrence
    pub fn step(&self, opening_balance: f64, drawdown: f64) -> PeriodFlow {
        let r = self.investment_return_rate;
        let mut flow = unclamped_step(opening_balance, drawdown, r);

        if self.clamp_to_balance && flow.closing_balance < 0.0 {
            if opening_balance <= 0.0 {
                flow = PeriodFlow {
                    opening_balance,
                    drawdown: 0.0,
                    investment_return: 0.0,
                    closing_balance: opening_balance,
                };
            } else {
                // Solves opening - d + (opening - d/2) * r = 0 for d
                let exhausting = opening_balance * (1.0 + r) / (1.0 + r / 2.0);
                flow = unclamped_step(opening_balance, exhausting, r);
                flow.closing_balance = 0.0;
            }
        }

        flow
    }

    /// Run the recurrence forward, one flow per period
    pub fn simulate(&self, opening_balance: f64, opening_drawdown: f64, periods: u32) -> Vec<PeriodFlow> {
        let mut flows = Vec::with_capacity(periods as usize);
        let mut balance = opening_balance;
        let mut scheduled = opening_drawdown;

        for _ in 0..periods {
            let flow = self.step(balance, scheduled);
            balance = flow.closing_balance;
            scheduled *= 1.0 + self.inflation_rate;
            flows.push(flow);
        }

        flows
    }

    /// Closing balance after `periods`, honouring the clamp setting
    pub fn terminal_balance(&self, opening_balance: f64, opening_drawdown: f64, periods: u32) -> f64 {
        if !self.clamp_to_balance {
            return terminal_balance(
                opening_balance,
                opening_drawdown,
                periods,
                self.investment_return_rate,
                self.inflation_rate,
            );
        }
        self.simulate(opening_balance, opening_drawdown, periods)
            .last()
            .map(|flow| flow.closing_balance)
            .unwrap_or(opening_balance)
    }

    /// First-period drawdown, escalating with inflation, that exhausts `balance`
    /// after exactly `periods` periods.
    pub fn calc_drawdown_for_balance(&self, balance: f64, periods: u32) -> Result<f64, EngineError> {
        validate_periods(periods)?;
        if balance < 0.0 {
            return Err(InputError::InvalidValue {
                field: "balance",
                value: balance,
            }
            .into());
        }
        if balance == 0.0 {
            return Ok(0.0);
        }

        let (r, i) = (self.investment_return_rate, self.inflation_rate);
        let upper = 2.0 * balance * (1.0 + r.abs()) + 1.0;
        let drawdown = self
            .solver
            .solve(|d| terminal_balance(balance, d, periods, r, i), 0.0, 0.0, upper)?;
        Ok(drawdown)
    }

    /// Opening balance that sustains `drawdown` (escalating with inflation) to
    /// exhaustion after exactly `periods` periods.
    pub fn calc_balance_for_drawdown(&self, drawdown: f64, periods: u32) -> Result<f64, EngineError> {
        validate_periods(periods)?;
        if drawdown < 0.0 {
            return Err(InputError::InvalidValue {
                field: "drawdown",
                value: drawdown,
            }
            .into());
        }
        if drawdown == 0.0 {
            return Ok(0.0);
        }

        let (r, i) = (self.investment_return_rate, self.inflation_rate);
        let total_drawn: f64 = (0..periods).map(|k| drawdown * (1.0 + i).powi(k as i32)).sum();
        let discount_cover = (1.0 + r).powi(-(periods as i32 + 1)).max(1.0);
        let upper = 2.0 * (total_drawn + 1.0) * discount_cover;

        let balance = self
            .solver
            .solve(|b| terminal_balance(b, drawdown, periods, r, i), 0.0, 0.0, upper)?;
        Ok(balance)
    }
}

fn unclamped_step(opening_balance: f64, drawdown: f64, investment_return_rate: f64) -> PeriodFlow {
    let investment_return = (opening_balance - drawdown / 2.0) * investment_return_rate;
    PeriodFlow {
        opening_balance,
        drawdown,
        investment_return,
        closing_balance: opening_balance - drawdown + investment_return,
    }
}

fn validate_periods(periods: u32) -> Result<(), InputError> {
    if periods == 0 {
        return Err(InputError::InvalidValue {
            field: "periods",
            value: 0.0,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvergenceError;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_single_period_mid_year_return() {
        let model = AmortizationModel::new(0.05, 0.0);
        let flow = model.step(1000.0, 100.0);

        assert_abs_diff_eq!(flow.investment_return, 47.5, epsilon = 1e-9);
        assert_abs_diff_eq!(flow.closing_balance, 947.5, epsilon = 1e-9);
    }

    #[test]
    fn test_drawdown_escalates_with_inflation() {
        let closing = terminal_balance(1000.0, 100.0, 2, 0.0, 0.10);
        assert_abs_diff_eq!(closing, 790.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unclamped_pool_goes_negative() {
        let model = AmortizationModel::new(0.05, 0.0);
        assert!(model.terminal_balance(100.0, 500.0, 3) < 0.0);
    }

    #[test]
    fn test_clamp_exhausts_pool_at_zero() {
        let model = AmortizationModel::new(0.05, 0.0).with_clamp(true);
        let flows = model.simulate(100.0, 500.0, 3);

        assert_abs_diff_eq!(flows[0].drawdown, 100.0 * 1.05 / 1.025, epsilon = 1e-9);
        assert_abs_diff_eq!(flows[0].closing_balance, 0.0, epsilon = 1e-9);
        assert_eq!(flows[1].drawdown, 0.0);
        assert_eq!(flows[2].closing_balance, 0.0);
    }

    #[test]
    fn test_drawdown_for_balance_exhausts_pool() {
        let model = AmortizationModel::new(0.05, 0.025);
        let drawdown = model.calc_drawdown_for_balance(400_000.0, 25).unwrap();

        assert!(drawdown > 400_000.0 / 25.0);
        let closing = terminal_balance(400_000.0, drawdown, 25, 0.05, 0.025);
        assert!(closing.abs() <= 1.0, "closing balance {}", closing);
    }

    #[test]
    fn test_balance_for_drawdown_is_inverse() {
        let model = AmortizationModel::new(0.06, 0.03);
        let balance = 250_000.0;

        let drawdown = model.calc_drawdown_for_balance(balance, 20).unwrap();
        let recovered = model.calc_balance_for_drawdown(drawdown, 20).unwrap();

        assert_abs_diff_eq!(recovered, balance, epsilon = 2.0);
    }

    #[test]
    fn test_zero_short_circuits() {
        let model = AmortizationModel::new(0.05, 0.02);
        assert_eq!(model.calc_drawdown_for_balance(0.0, 10).unwrap(), 0.0);
        assert_eq!(model.calc_balance_for_drawdown(0.0, 10).unwrap(), 0.0);
    }

    #[test]
    fn test_zero_periods_rejected() {
        let model = AmortizationModel::new(0.05, 0.02);
        assert!(matches!(
            model.calc_drawdown_for_balance(1000.0, 0),
            Err(EngineError::Input(InputError::InvalidValue { field: "periods", .. }))
        ));
    }

    #[test]
    fn test_solver_failure_propagates() {
        let model = AmortizationModel::new(0.05, 0.02).with_solver(Bisection::new(1e-300, 5));
        let result = model.calc_drawdown_for_balance(100_000.0, 10);
        assert!(matches!(
            result,
            Err(EngineError::Convergence(ConvergenceError::MaxIterations { .. }))
        ));
    }
}
