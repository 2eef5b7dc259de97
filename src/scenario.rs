//! Scenario runner for single and batch enquiries
//!
//! Loads the lending policy and postcode set once, then runs the full pipeline
//! (basic eligibility, limits, request verdict, scenario projections) for any
//! number of enquiries without re-reading reference data.

use crate::eligibility::{EligibilityEvaluator, EligibilityVerdict, LimitSet};
use crate::error::{EngineError, LoadError};
use crate::loan::{LoanContext, LoanEnquiry};
use crate::policy::{load_default_reference_data, PolicyConfig, PostcodeSet};
use crate::projection::{NegativeEquityAge, ProjectionConfig, ProjectionEngine, ScenarioSet};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Everything produced for one enquiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnquiryOutcome {
    pub basic: EligibilityVerdict,

    /// Present once the enquiry has enough data to build a context
    pub limits: Option<LimitSet>,
    pub request: Option<EligibilityVerdict>,

    /// Present only when both verdicts are eligible
    pub scenarios: Option<ScenarioSet>,
    pub negative_equity_age: Option<NegativeEquityAge>,
}

impl EnquiryOutcome {
    pub fn is_eligible(&self) -> bool {
        self.basic.eligible && self.request.as_ref().is_some_and(|request| request.eligible)
    }
}

/// Pre-loaded runner for efficient batch evaluation
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_default_data()?;
/// let outcomes = runner.run_batch(&enquiries);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    postcodes: PostcodeSet,
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    /// Create a runner with the standard policy and the given postcode set
    pub fn new(postcodes: PostcodeSet) -> Self {
        Self::with_reference_data(PolicyConfig::default(), postcodes, ProjectionConfig::default())
    }

    /// Create a runner with pre-built reference data
    pub fn with_reference_data(policy: PolicyConfig, postcodes: PostcodeSet, config: ProjectionConfig) -> Self {
        Self {
            postcodes,
            engine: ProjectionEngine::new(policy, config),
        }
    }

    /// Create a runner from the bundled reference data files
    pub fn from_default_data() -> Result<Self, LoadError> {
        let (policy, postcodes) = load_default_reference_data()?;
        Ok(Self::with_reference_data(policy, postcodes, ProjectionConfig::default()))
    }

    pub fn policy(&self) -> &PolicyConfig {
        self.engine.policy()
    }

    pub fn postcodes(&self) -> &PostcodeSet {
        &self.postcodes
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    pub fn evaluator(&self) -> EligibilityEvaluator<'_> {
        EligibilityEvaluator::new(self.engine.policy(), &self.postcodes)
    }

    /// Run the full pipeline for one enquiry
    ///
    /// Ineligible enquiries are an `Ok` outcome carrying the failed checks;
    /// errors are reserved for projection faults.
    pub fn run(&self, enquiry: &LoanEnquiry) -> Result<EnquiryOutcome, EngineError> {
        let evaluator = self.evaluator();
        let basic = evaluator.evaluate_basic_eligibility(enquiry);

        let context = match LoanContext::from_enquiry(enquiry) {
            Ok(context) => context,
            Err(e) => {
                debug!("enquiry stopped before limits: {}", e);
                return Ok(EnquiryOutcome {
                    basic,
                    limits: None,
                    request: None,
                    scenarios: None,
                    negative_equity_age: None,
                });
            }
        };

        let limits = evaluator.evaluate_limits(&context);
        let request = evaluator.evaluate_loan_request(&context, &limits);

        let (scenarios, negative_equity_age) = if basic.eligible && request.eligible {
            let scenarios = self.engine.project_scenarios(&context, &limits)?;
            let age = self.engine.negative_equity_age(&context, None)?;
            (Some(scenarios), Some(age))
        } else {
            (None, None)
        };

        Ok(EnquiryOutcome {
            basic,
            limits: Some(limits),
            request: Some(request),
            scenarios,
            negative_equity_age,
        })
    }

    /// Run many enquiries in parallel, one result per enquiry in input order
    pub fn run_batch(&self, enquiries: &[LoanEnquiry]) -> Vec<Result<EnquiryOutcome, EngineError>> {
        enquiries.par_iter().map(|enquiry| self.run(enquiry)).collect()
    }
}
