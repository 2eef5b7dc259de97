//! Equity Release Engine - eligibility and projection engine for reverse mortgage loans
//!
//! This library provides:
//! - Lending policy evaluation (maximum LVR, per-purpose limits, verdicts)
//! - Drawdown pool amortization and bisection root finding
//! - Year-by-year pool, income and home equity projections
//! - Stressed house price and interest rate scenarios
//! - Batch evaluation of many enquiries against shared reference data

pub mod error;
pub mod policy;
pub mod assumptions;
pub mod loan;
pub mod eligibility;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use error::{ConvergenceError, EngineError, InputError, LoadError};
pub use policy::{PolicyConfig, PostcodeLookup, PostcodeSet};
pub use assumptions::EconomicAssumptions;
pub use loan::{LoanContext, LoanEnquiry};
pub use eligibility::{EligibilityEvaluator, EligibilityVerdict, LimitSet};
pub use projection::{ProjectionEngine, ProjectionConfig, ProjectionTable, ScenarioSet};
pub use scenario::{EnquiryOutcome, ScenarioRunner};
