//! Maximum LVR and per-purpose loan limits

use crate::loan::{LoanContext, Purpose};
use crate::policy::PolicyConfig;
use serde::{Deserialize, Serialize};

/// Limits derived from the lending policy for one context
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimitSet {
    /// Maximum loan to value ratio, in percent
    pub max_lvr_pct: f64,
    pub loan_limit: f64,
    pub top_up_limit: f64,
    pub refinance_limit: f64,
    pub give_limit: f64,
    pub renovate_limit: f64,
    pub travel_limit: f64,
    pub care_limit: f64,
    pub min_loan_size_met: bool,
}

impl LimitSet {
    /// Ceiling for the amount requested for `purpose`
    pub fn limit_for(&self, purpose: Purpose) -> f64 {
        match purpose {
            Purpose::TopUp => self.top_up_limit,
            Purpose::Refinance => self.refinance_limit,
            Purpose::Give => self.give_limit,
            Purpose::Renovate => self.renovate_limit,
            Purpose::Travel => self.travel_limit,
            Purpose::Care => self.care_limit,
        }
    }
}

/// Maximum LVR in percent
///
/// Starts from the base LVR at the base age, scales linearly with the youngest
/// borrower's age, deducts the apartment adjustment, then reserves the
/// protected equity share. Never negative.
pub fn max_lvr_pct(policy: &PolicyConfig, youngest_age: u32, is_apartment: bool, protected_equity_pct: f64) -> f64 {
    let years_over_base = youngest_age as f64 - policy.base_lvr_age as f64;
    let mut lvr = policy.base_lvr_pct + years_over_base * policy.base_lvr_increment_pct;

    if is_apartment {
        lvr = (lvr - policy.apartment_lvr_adjustment_pct).max(0.0);
    }

    lvr *= 1.0 - protected_equity_pct / 100.0;
    lvr.max(0.0)
}

/// Derive every limit for `context`
pub fn evaluate_limits(policy: &PolicyConfig, context: &LoanContext) -> LimitSet {
    let max_lvr_pct = max_lvr_pct(
        policy,
        context.youngest_age,
        context.is_apartment,
        context.protected_equity_pct,
    );
    let loan_limit = max_lvr_pct / 100.0 * context.property_valuation;

    LimitSet {
        max_lvr_pct,
        loan_limit,
        top_up_limit: policy.max_top_up.min(loan_limit),
        refinance_limit: loan_limit * policy.max_refi_pct / 100.0,
        give_limit: loan_limit * policy.max_give_pct / 100.0,
        renovate_limit: policy.max_reno_amount.min(loan_limit),
        travel_limit: loan_limit * policy.max_travel_pct / 100.0,
        care_limit: policy.max_care.min(loan_limit),
        min_loan_size_met: loan_limit >= policy.min_loan_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::EconomicAssumptions;
    use crate::loan::{RequestedAmounts, RetirementPosition};
    use approx::assert_relative_eq;

    fn context(youngest_age: u32, is_apartment: bool, protected_equity_pct: f64, valuation: f64) -> LoanContext {
        LoanContext {
            is_joint: false,
            youngest_age,
            is_apartment,
            postcode: "2000".to_string(),
            property_valuation: valuation,
            protected_equity_pct,
            requested: RequestedAmounts::default(),
            economic: EconomicAssumptions::default(),
            retirement: RetirementPosition::default(),
        }
    }

    #[test]
    fn test_single_house_age_70() {
        let limits = evaluate_limits(&PolicyConfig::default(), &context(70, false, 0.0, 500_000.0));

        assert_eq!(limits.max_lvr_pct, 25.0);
        assert_eq!(limits.loan_limit, 125_000.0);
        assert_eq!(limits.refinance_limit, 62_500.0);
        assert_eq!(limits.travel_limit, 12_500.0);
        assert_eq!(limits.give_limit, 18_750.0);
        assert_eq!(limits.top_up_limit, 50_000.0);
        assert_eq!(limits.care_limit, 50_000.0);
        assert!(limits.min_loan_size_met);
    }

    #[test]
    fn test_apartment_with_protected_equity() {
        let lvr = max_lvr_pct(&PolicyConfig::default(), 63, true, 10.0);
        assert_relative_eq!(lvr, 11.7, epsilon = 1e-9);
    }

    #[test]
    fn test_apartment_adjustment_floors_at_zero() {
        let policy = PolicyConfig {
            apartment_lvr_adjustment_pct: 40.0,
            ..Default::default()
        };
        assert_eq!(max_lvr_pct(&policy, 65, true, 0.0), 0.0);
    }

    #[test]
    fn test_full_protection_leaves_no_lvr() {
        assert_eq!(max_lvr_pct(&PolicyConfig::default(), 80, false, 100.0), 0.0);
    }

    #[test]
    fn test_small_loan_limits_cap_fixed_amounts() {
        // 15% of 200k = 30k, below the fixed care and top up caps
        let limits = evaluate_limits(&PolicyConfig::default(), &context(60, false, 0.0, 200_000.0));

        assert_relative_eq!(limits.loan_limit, 30_000.0, epsilon = 1e-6);
        assert_eq!(limits.care_limit, limits.loan_limit);
        assert_eq!(limits.renovate_limit, limits.loan_limit);
        assert!(!limits.min_loan_size_met);
    }

    #[test]
    fn test_minimum_loan_size_is_inclusive() {
        // 25% of 200k is exactly the 50k minimum
        let limits = evaluate_limits(&PolicyConfig::default(), &context(70, false, 0.0, 200_000.0));
        assert_eq!(limits.loan_limit, 50_000.0);
        assert!(limits.min_loan_size_met);
    }
}
