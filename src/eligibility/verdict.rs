//! Structured pass/fail verdicts
//!
//! Business rule failures (too young, postcode not approved, loan too small) are
//! expected outcomes and are reported as verdict items rather than errors.

use super::limits::{evaluate_limits, LimitSet};
use crate::loan::{LoanContext, LoanEnquiry, RequestedAmounts};
use crate::policy::{PolicyConfig, PostcodeLookup};
use log::debug;
use serde::{Deserialize, Serialize};

/// Outcome of one eligibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Ok,
    Error,
}

/// One line of a verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckItem {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

impl CheckItem {
    fn ok(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            detail: detail.into(),
        }
    }

    fn error(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            detail: detail.into(),
        }
    }

    fn check(name: &str, passed: bool, ok_detail: impl Into<String>, error_detail: impl Into<String>) -> Self {
        if passed {
            Self::ok(name, ok_detail)
        } else {
            Self::error(name, error_detail)
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == CheckStatus::Ok
    }
}

/// Result of an eligibility evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub eligible: bool,
    pub items: Vec<CheckItem>,

    /// Requested amounts plus the establishment fee
    pub total_loan_amount: f64,
    pub establishment_fee: f64,

    /// Headroom left under the loan limit
    pub available_amount: f64,
}

impl EligibilityVerdict {
    fn new(items: Vec<CheckItem>, amounts: LoanAmounts) -> Self {
        Self {
            eligible: items.iter().all(CheckItem::is_ok),
            items,
            total_loan_amount: amounts.total_loan_amount,
            establishment_fee: amounts.establishment_fee,
            available_amount: amounts.available_amount,
        }
    }

    /// First failed check, if any
    pub fn first_error(&self) -> Option<&CheckItem> {
        self.items.iter().find(|item| !item.is_ok())
    }
}

/// Money figures shared by both verdict kinds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct LoanAmounts {
    total_loan_amount: f64,
    establishment_fee: f64,
    available_amount: f64,
}

impl LoanAmounts {
    fn new(policy: &PolicyConfig, requested: &RequestedAmounts, loan_limit: f64) -> Self {
        let requested_total = requested.total();
        let establishment_fee = requested_total * policy.establishment_fee_rate;
        let total_loan_amount = requested_total + establishment_fee;
        Self {
            total_loan_amount,
            establishment_fee,
            available_amount: (loan_limit - total_loan_amount).max(0.0),
        }
    }
}

/// Total loan amount (requested amounts plus establishment fee) for `context`
pub fn total_loan_amount(policy: &PolicyConfig, context: &LoanContext) -> f64 {
    LoanAmounts::new(policy, &context.requested, 0.0).total_loan_amount
}

/// Policy engine evaluating enquiries against the lending policy
#[derive(Clone, Copy)]
pub struct EligibilityEvaluator<'a> {
    policy: &'a PolicyConfig,
    postcodes: &'a dyn PostcodeLookup,
}

impl<'a> EligibilityEvaluator<'a> {
    pub fn new(policy: &'a PolicyConfig, postcodes: &'a dyn PostcodeLookup) -> Self {
        Self { policy, postcodes }
    }

    pub fn policy(&self) -> &PolicyConfig {
        self.policy
    }

    /// Quick eligibility check of a raw enquiry
    ///
    /// Checks run in order and stop at the first failure, which is always the
    /// last item of the returned verdict.
    pub fn evaluate_basic_eligibility(&self, enquiry: &LoanEnquiry) -> EligibilityVerdict {
        let policy = self.policy;
        let mut items = Vec::with_capacity(5);
        let no_amounts = LoanAmounts::new(policy, &enquiry.requested, 0.0);

        let data_check = match (enquiry.first_missing_field(), enquiry.validate_values()) {
            (Some(field), _) => {
                debug!("enquiry is missing {field}");
                CheckItem::error("Data", "Insufficient data")
            }
            (None, Err(e)) => CheckItem::error("Data", e.to_string()),
            (None, Ok(())) => CheckItem::ok("Data", "Complete"),
        };
        let data_ok = data_check.is_ok();
        items.push(data_check);
        if !data_ok {
            return EligibilityVerdict::new(items, no_amounts);
        }

        let postcode = enquiry.postcode.as_deref().unwrap_or_default().trim();
        if !self.postcodes.is_eligible_postcode(postcode) {
            items.push(CheckItem::error("Postcode", "Invalid Postcode"));
            return EligibilityVerdict::new(items, no_amounts);
        }
        items.push(CheckItem::ok("Postcode", "Eligible"));

        let youngest_age = match enquiry.youngest_age() {
            Some(age) => age,
            None => {
                items.push(CheckItem::error("Borrower ages", "Missing Age"));
                return EligibilityVerdict::new(items, no_amounts);
            }
        };
        items.push(CheckItem::ok("Borrower ages", "Complete"));

        let age_check = if enquiry.is_joint() {
            CheckItem::check(
                "Minimum age",
                youngest_age >= policy.min_couple_age,
                "Meets minimum age",
                format!("Youngest joint borrower must be {}", policy.min_couple_age),
            )
        } else {
            CheckItem::check(
                "Minimum age",
                youngest_age >= policy.min_single_age,
                "Meets minimum age",
                format!("Youngest borrower must be {}", policy.min_single_age),
            )
        };
        let age_ok = age_check.is_ok();
        items.push(age_check);
        if !age_ok {
            return EligibilityVerdict::new(items, no_amounts);
        }

        let context = match LoanContext::from_enquiry(enquiry) {
            Ok(context) => context,
            Err(e) => {
                items.push(CheckItem::error("Data", e.to_string()));
                return EligibilityVerdict::new(items, no_amounts);
            }
        };
        let limits = self.evaluate_limits(&context);
        let max_loan = limits.max_lvr_pct / 100.0 * context.property_valuation;
        items.push(CheckItem::check(
            "Minimum loan size",
            max_loan >= policy.min_loan_size,
            format!("Maximum loan {:.0}", max_loan),
            "Minimum Loan Size cannot be met",
        ));

        EligibilityVerdict::new(items, LoanAmounts::new(policy, &context.requested, limits.loan_limit))
    }

    pub fn evaluate_limits(&self, context: &LoanContext) -> LimitSet {
        evaluate_limits(self.policy, context)
    }

    /// Full check of the requested amounts against every limit
    ///
    /// Unlike the basic check, every item is evaluated so the caller can show
    /// all problems at once.
    pub fn evaluate_loan_request(&self, context: &LoanContext, limits: &LimitSet) -> EligibilityVerdict {
        let amounts = LoanAmounts::new(self.policy, &context.requested, limits.loan_limit);
        let mut items = Vec::with_capacity(8);

        for (purpose, amount) in context.requested.items() {
            let limit = limits.limit_for(purpose);
            items.push(CheckItem::check(
                purpose.label(),
                amount <= limit,
                format!("{:.0} within limit of {:.0}", amount, limit),
                format!("{} amount exceeds limit of {:.0}", purpose.label(), limit),
            ));
        }

        items.push(CheckItem::check(
            "Loan limit",
            amounts.total_loan_amount <= limits.loan_limit,
            format!("{:.0} available", amounts.available_amount),
            format!(
                "Total loan of {:.0} exceeds loan limit of {:.0}",
                amounts.total_loan_amount, limits.loan_limit
            ),
        ));
        items.push(CheckItem::check(
            "Minimum loan size",
            amounts.total_loan_amount >= self.policy.min_loan_size,
            "Meets minimum loan size",
            format!("Loan must be at least {:.0}", self.policy.min_loan_size),
        ));

        EligibilityVerdict::new(items, amounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::EconomicAssumptions;
    use crate::loan::{DwellingType, LoanType, RetirementPosition};
    use crate::policy::PostcodeSet;
    use approx::assert_relative_eq;

    fn postcodes() -> PostcodeSet {
        PostcodeSet::new(["2000", "3000"])
    }

    fn single_enquiry(age: u32, valuation: f64) -> LoanEnquiry {
        LoanEnquiry {
            loan_type: Some(LoanType::Single),
            dwelling_type: Some(DwellingType::House),
            age_1: Some(age),
            postcode: Some("2000".to_string()),
            property_valuation: Some(valuation),
            ..Default::default()
        }
    }

    fn last_detail(verdict: &EligibilityVerdict) -> &str {
        &verdict.items.last().unwrap().detail
    }

    #[test]
    fn test_single_borrower_eligible() {
        let policy = PolicyConfig::default();
        let set = postcodes();
        let evaluator = EligibilityEvaluator::new(&policy, &set);

        let verdict = evaluator.evaluate_basic_eligibility(&single_enquiry(70, 500_000.0));
        assert!(verdict.eligible);
        assert_eq!(verdict.items.len(), 5);
        assert!(verdict.first_error().is_none());
        assert_eq!(verdict.available_amount, 125_000.0);
    }

    #[test]
    fn test_insufficient_data() {
        let policy = PolicyConfig::default();
        let set = postcodes();
        let evaluator = EligibilityEvaluator::new(&policy, &set);

        let mut enquiry = single_enquiry(70, 500_000.0);
        enquiry.dwelling_type = None;
        let verdict = evaluator.evaluate_basic_eligibility(&enquiry);

        assert!(!verdict.eligible);
        assert_eq!(verdict.items.len(), 1);
        assert_eq!(last_detail(&verdict), "Insufficient data");
    }

    #[test]
    fn test_invalid_postcode_wins_over_age() {
        let policy = PolicyConfig::default();
        let set = postcodes();
        let evaluator = EligibilityEvaluator::new(&policy, &set);

        let mut enquiry = single_enquiry(50, 500_000.0);
        enquiry.postcode = Some("9999".to_string());
        let verdict = evaluator.evaluate_basic_eligibility(&enquiry);

        assert_eq!(last_detail(&verdict), "Invalid Postcode");
        assert_eq!(verdict.first_error().unwrap().name, "Postcode");
    }

    #[test]
    fn test_joint_without_second_age() {
        let policy = PolicyConfig::default();
        let set = postcodes();
        let evaluator = EligibilityEvaluator::new(&policy, &set);

        let mut enquiry = single_enquiry(70, 500_000.0);
        enquiry.loan_type = Some(LoanType::Joint);
        let verdict = evaluator.evaluate_basic_eligibility(&enquiry);

        assert_eq!(last_detail(&verdict), "Missing Age");
    }

    #[test]
    fn test_single_age_boundary() {
        let policy = PolicyConfig::default();
        let set = postcodes();
        let evaluator = EligibilityEvaluator::new(&policy, &set);

        let verdict = evaluator.evaluate_basic_eligibility(&single_enquiry(59, 1_000_000.0));
        assert!(!verdict.eligible);
        assert_eq!(last_detail(&verdict), "Youngest borrower must be 60");

        let verdict = evaluator.evaluate_basic_eligibility(&single_enquiry(60, 1_000_000.0));
        assert!(verdict.eligible);
    }

    #[test]
    fn test_joint_age_boundary() {
        let policy = PolicyConfig::default();
        let set = postcodes();
        let evaluator = EligibilityEvaluator::new(&policy, &set);

        let mut enquiry = single_enquiry(70, 1_000_000.0);
        enquiry.loan_type = Some(LoanType::Joint);
        enquiry.age_2 = Some(64);
        let verdict = evaluator.evaluate_basic_eligibility(&enquiry);
        assert_eq!(last_detail(&verdict), "Youngest joint borrower must be 65");

        enquiry.age_2 = Some(65);
        assert!(evaluator.evaluate_basic_eligibility(&enquiry).eligible);
    }

    #[test]
    fn test_minimum_loan_size_boundary() {
        let policy = PolicyConfig::default();
        let set = postcodes();
        let evaluator = EligibilityEvaluator::new(&policy, &set);

        // 25% of 200k is exactly the minimum
        let verdict = evaluator.evaluate_basic_eligibility(&single_enquiry(70, 200_000.0));
        assert!(verdict.eligible);

        let verdict = evaluator.evaluate_basic_eligibility(&single_enquiry(70, 199_000.0));
        assert!(!verdict.eligible);
        assert_eq!(last_detail(&verdict), "Minimum Loan Size cannot be met");
    }

    #[test]
    fn test_postcode_lookup_is_injected() {
        let policy = PolicyConfig::default();
        let nothing_eligible = |_: &str| false;
        let evaluator = EligibilityEvaluator::new(&policy, &nothing_eligible);

        let verdict = evaluator.evaluate_basic_eligibility(&single_enquiry(70, 500_000.0));
        assert_eq!(last_detail(&verdict), "Invalid Postcode");
    }

    fn request_context(requested: RequestedAmounts) -> LoanContext {
        LoanContext {
            is_joint: false,
            youngest_age: 70,
            is_apartment: false,
            postcode: "2000".to_string(),
            property_valuation: 500_000.0,
            protected_equity_pct: 0.0,
            requested,
            economic: EconomicAssumptions::default(),
            retirement: RetirementPosition::default(),
        }
    }

    #[test]
    fn test_loan_request_within_limits() {
        let policy = PolicyConfig::default();
        let set = postcodes();
        let evaluator = EligibilityEvaluator::new(&policy, &set);

        let context = request_context(RequestedAmounts {
            top_up: 40_000.0,
            refinance: 30_000.0,
            ..Default::default()
        });
        let limits = evaluator.evaluate_limits(&context);
        let verdict = evaluator.evaluate_loan_request(&context, &limits);

        assert!(verdict.eligible);
        assert_eq!(verdict.items.len(), 8);
        assert_relative_eq!(verdict.establishment_fee, 1_050.0, epsilon = 1e-9);
        assert_relative_eq!(verdict.total_loan_amount, 71_050.0, epsilon = 1e-9);
        assert_relative_eq!(verdict.available_amount, 53_950.0, epsilon = 1e-9);
    }

    #[test]
    fn test_loan_request_reports_every_breach() {
        let policy = PolicyConfig::default();
        let set = postcodes();
        let evaluator = EligibilityEvaluator::new(&policy, &set);

        let context = request_context(RequestedAmounts {
            give: 20_000.0,
            travel: 15_000.0,
            ..Default::default()
        });
        let limits = evaluator.evaluate_limits(&context);
        let verdict = evaluator.evaluate_loan_request(&context, &limits);

        let failed: Vec<&str> = verdict
            .items
            .iter()
            .filter(|item| !item.is_ok())
            .map(|item| item.name.as_str())
            .collect();
        assert!(!verdict.eligible);
        assert_eq!(failed, vec!["Give", "Travel", "Minimum loan size"]);
    }

    #[test]
    fn test_loan_over_limit_has_no_available_amount() {
        let policy = PolicyConfig::default();
        let set = postcodes();
        let evaluator = EligibilityEvaluator::new(&policy, &set);

        let context = request_context(RequestedAmounts {
            top_up: 50_000.0,
            refinance: 62_500.0,
            renovate: 20_000.0,
            ..Default::default()
        });
        let limits = evaluator.evaluate_limits(&context);
        let verdict = evaluator.evaluate_loan_request(&context, &limits);

        assert!(!verdict.eligible);
        assert_eq!(verdict.first_error().unwrap().name, "Loan limit");
        assert_eq!(verdict.available_amount, 0.0);
    }
}
