//! Core projection engine for yearly pool, income and home equity projections

use super::amortization::AmortizationModel;
use super::solver::Bisection;
use super::state::ProjectionState;
use super::stress::{Scenario, ScenarioOverrides, ScenarioSet};
use super::table::{ProjectionPeriod, ProjectionTable};
use crate::assumptions::EconomicAssumptions;
use crate::eligibility::{total_loan_amount, LimitSet};
use crate::error::{EngineError, InputError};
use crate::loan::LoanContext;
use crate::policy::PolicyConfig;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of years a projection covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionHorizon {
    /// `PolicyConfig::projection_periods` years
    PolicyPeriods,
    /// A fixed number of years
    Periods(u32),
    /// Until the youngest borrower reaches `PolicyConfig::projection_age`
    ToProjectionAge,
}

/// Per-product drawdown behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductProfile {
    pub name: String,

    /// Stop drawing once the pool is exhausted instead of letting it go negative
    pub clamp_exhausted_pool: bool,

    /// Number of payments each annual drawdown is split into
    pub drawdowns_per_year: u32,
}

impl ProductProfile {
    /// Retirement savings pool, paid monthly, never overdrawn
    pub fn superannuation() -> Self {
        Self {
            name: "Superannuation".to_string(),
            clamp_exhausted_pool: true,
            drawdowns_per_year: 12,
        }
    }

    /// Loan funded top up pool, paid fortnightly, shortfall shown as negative
    pub fn top_up() -> Self {
        Self {
            name: "Top Up".to_string(),
            clamp_exhausted_pool: false,
            drawdowns_per_year: 26,
        }
    }
}

impl Default for ProductProfile {
    fn default() -> Self {
        Self::superannuation()
    }
}

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    pub horizon: ProjectionHorizon,
    pub product: ProductProfile,

    /// Solver used for the drawdown inversions
    pub solver: Bisection,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            horizon: ProjectionHorizon::PolicyPeriods,
            product: ProductProfile::default(),
            solver: Bisection::default(),
        }
    }
}

/// Projected age at which the loan balance overtakes the house value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NegativeEquityAge {
    AtAge(u32),
    Never,
}

impl fmt::Display for NegativeEquityAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegativeEquityAge::AtAge(age) => write!(f, "{}", age),
            NegativeEquityAge::Never => write!(f, "never"),
        }
    }
}

/// Main projection engine
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    policy: PolicyConfig,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with given policy and config
    pub fn new(policy: PolicyConfig, config: ProjectionConfig) -> Self {
        Self { policy, config }
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project one scenario; `None` overrides give the baseline
    pub fn project(
        &self,
        context: &LoanContext,
        limits: &LimitSet,
        overrides: Option<&ScenarioOverrides>,
    ) -> Result<ProjectionTable, EngineError> {
        match overrides {
            None => self.run(context, limits, Scenario::Baseline, &ScenarioOverrides::default()),
            Some(overrides) => self.run(context, limits, Scenario::Custom, overrides),
        }
    }

    /// Project one of the named scenarios
    pub fn project_scenario(
        &self,
        context: &LoanContext,
        limits: &LimitSet,
        scenario: Scenario,
    ) -> Result<ProjectionTable, EngineError> {
        let overrides = scenario.overrides(&self.policy);
        self.run(context, limits, scenario, &overrides)
    }

    /// Baseline plus the canonical stress scenarios
    pub fn project_scenarios(&self, context: &LoanContext, limits: &LimitSet) -> Result<ScenarioSet, EngineError> {
        Ok(ScenarioSet {
            baseline: self.project_scenario(context, limits, Scenario::Baseline)?,
            low_house_price_growth: self.project_scenario(context, limits, Scenario::LowHousePriceGrowth)?,
            zero_house_price_growth: self.project_scenario(context, limits, Scenario::ZeroHousePriceGrowth)?,
            interest_rate_up: self.project_scenario(context, limits, Scenario::InterestRateUp)?,
        })
    }

    /// Age at which the loan is projected to exceed the house value
    ///
    /// Closed form: both balances compound at constant rates, so the crossing
    /// year solves `loan * (1 + e)^n = valuation * (1 + h)^n`.
    pub fn negative_equity_age(
        &self,
        context: &LoanContext,
        overrides: Option<&ScenarioOverrides>,
    ) -> Result<NegativeEquityAge, EngineError> {
        if context.property_valuation <= 0.0 {
            return Err(EngineError::ZeroValuation);
        }

        let loan = total_loan_amount(&self.policy, context);
        if loan <= 0.0 {
            return Ok(NegativeEquityAge::Never);
        }
        if loan >= context.property_valuation {
            return Ok(NegativeEquityAge::AtAge(context.youngest_age));
        }

        let economic = overrides.map_or(context.economic, |o| o.apply(&context.economic));
        let growth_gap = ((1.0 + economic.effective_loan_rate() / 100.0)
            / (1.0 + economic.house_price_inflation_rate / 100.0))
            .ln();
        if growth_gap <= 0.0 {
            return Ok(NegativeEquityAge::Never);
        }

        let years = ((context.property_valuation / loan).ln() / growth_gap).floor();
        if !years.is_finite() || context.youngest_age as f64 + years > u32::MAX as f64 {
            return Ok(NegativeEquityAge::Never);
        }
        Ok(context
            .youngest_age
            .checked_add(years as u32)
            .map_or(NegativeEquityAge::Never, NegativeEquityAge::AtAge))
    }

    /// Level first-year drawdown, escalating with inflation, that runs the
    /// seeded pool down to zero at the projection age
    pub fn sustainable_drawdown(&self, context: &LoanContext) -> Result<f64, EngineError> {
        let periods = self.periods_to_projection_age(context)?;
        let balance = context.retirement.pool_balance + context.requested.top_up;
        self.pool_model(&context.economic)
            .calc_drawdown_for_balance(balance, periods)
    }

    /// Additional pool needed to sustain `drawdown` until the projection age
    pub fn required_top_up(&self, context: &LoanContext, drawdown: f64) -> Result<f64, EngineError> {
        let periods = self.periods_to_projection_age(context)?;
        let required = self
            .pool_model(&context.economic)
            .calc_balance_for_drawdown(drawdown, periods)?;
        Ok((required - context.retirement.pool_balance).max(0.0))
    }

    fn run(
        &self,
        context: &LoanContext,
        limits: &LimitSet,
        scenario: Scenario,
        overrides: &ScenarioOverrides,
    ) -> Result<ProjectionTable, EngineError> {
        let periods = self.period_count(context)?;
        if context.property_valuation <= 0.0 {
            return Err(EngineError::ZeroValuation);
        }

        let loan = total_loan_amount(&self.policy, context);
        if loan > limits.loan_limit {
            return Err(InputError::LoanExceedsLimit {
                amount: loan,
                limit: limits.loan_limit,
            }
            .into());
        }

        let economic = overrides.apply(&context.economic);
        debug!(
            "projecting {} over {} periods (hpi {:.2}%, loan rate {:.2}%)",
            scenario.label(),
            periods,
            economic.house_price_inflation_rate,
            economic.nominal_loan_rate()
        );

        let model = self.pool_model(&economic);
        let inflation = economic.inflation_rate / 100.0;
        let house_growth = economic.house_price_inflation_rate / 100.0;
        let loan_growth = economic.effective_loan_rate() / 100.0;

        let mut table = ProjectionTable::new(scenario);
        let mut state = ProjectionState::from_context(context, loan);

        for _ in 0..periods {
            let period = self.calculate_period(&model, &mut state);
            let end_pool_balance = period.end_pool_balance;
            table.add_period(period);
            state.advance(end_pool_balance, inflation, house_growth, loan_growth);
        }

        Ok(table)
    }

    /// Calculate one projected year from the running state
    fn calculate_period(&self, model: &AmortizationModel, state: &mut ProjectionState) -> ProjectionPeriod {
        let flow = model.step(state.pool_balance, state.scheduled_drawdown);
        state.cumulative_drawdown += flow.drawdown;

        let total_income = flow.drawdown + state.pension_income;
        let pension_income_share_pct = if total_income > 0.0 {
            state.pension_income / total_income * 100.0
        } else {
            0.0
        };
        let payments = self.config.product.drawdowns_per_year.max(1) as f64;

        ProjectionPeriod {
            period_index: state.period_index,
            begin_age: state.age,
            begin_pool_balance: flow.opening_balance,
            drawdown: flow.drawdown,
            drawdown_per_payment: flow.drawdown / payments,
            investment_return: flow.investment_return,
            end_pool_balance: flow.closing_balance,
            pension_income: state.pension_income,
            total_income,
            pension_income_share_pct,
            cumulative_drawdown: state.cumulative_drawdown,
            begin_house_value: state.house_value,
            begin_loan_balance: state.loan_balance,
            home_equity: state.home_equity(),
            home_equity_pct: state.home_equity_pct(),
        }
    }

    fn pool_model(&self, economic: &EconomicAssumptions) -> AmortizationModel {
        AmortizationModel::new(
            economic.investment_return_rate / 100.0,
            economic.inflation_rate / 100.0,
        )
        .with_clamp(self.config.product.clamp_exhausted_pool)
        .with_solver(self.config.solver)
    }

    fn period_count(&self, context: &LoanContext) -> Result<u32, InputError> {
        let periods = match self.config.horizon {
            ProjectionHorizon::PolicyPeriods => self.policy.projection_periods,
            ProjectionHorizon::Periods(periods) => periods,
            ProjectionHorizon::ToProjectionAge => {
                self.policy.projection_age.saturating_sub(context.youngest_age)
            }
        };
        require_min_periods(periods)
    }

    fn periods_to_projection_age(&self, context: &LoanContext) -> Result<u32, InputError> {
        require_min_periods(self.policy.projection_age.saturating_sub(context.youngest_age))
    }
}

fn require_min_periods(periods: u32) -> Result<u32, InputError> {
    if periods < 2 {
        return Err(InputError::PeriodTooShort { periods });
    }
    Ok(periods)
}
