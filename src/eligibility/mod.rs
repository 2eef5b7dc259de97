//! Lending policy evaluation: LVR, loan limits and eligibility verdicts

mod limits;
mod verdict;

pub use limits::{evaluate_limits, max_lvr_pct, LimitSet};
pub use verdict::{total_loan_amount, CheckItem, CheckStatus, EligibilityEvaluator, EligibilityVerdict};
