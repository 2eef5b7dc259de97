//! Error types for the eligibility and projection engine
//!
//! Input problems are recoverable by correcting the enquiry. Convergence faults are
//! internal calculation failures and are never approximated away.

use thiserror::Error;

/// Invalid or insufficient caller input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("postcode {0} is not eligible")]
    InvalidPostcode(String),

    #[error("joint loan requires a second borrower age")]
    MissingAge,

    #[error("youngest borrower is {age}, minimum is {minimum}")]
    BelowMinimumAge { age: u32, minimum: u32 },

    #[error("maximum loan of {max_loan:.2} is below the minimum loan size of {minimum:.2}")]
    BelowMinimumLoanSize { max_loan: f64, minimum: f64 },

    #[error("loan amount {amount:.2} exceeds the loan limit of {limit:.2}")]
    LoanExceedsLimit { amount: f64, limit: f64 },

    #[error("projection needs at least 2 periods, got {periods}")]
    PeriodTooShort { periods: u32 },
}

/// Failure of the bisection solver
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvergenceError {
    #[error("bracket bound is not finite: {value}")]
    NonFiniteBracket { value: f64 },

    #[error("bracket [{lower}, {upper}] is empty or inverted")]
    InvalidBracket { lower: f64, upper: f64 },

    #[error(
        "root not bracketed by [{lower}, {upper}] (residuals {lower_residual:.4}, {upper_residual:.4})"
    )]
    NotBracketed {
        lower: f64,
        upper: f64,
        lower_residual: f64,
        upper_residual: f64,
    },

    #[error("residual is not finite at x = {x}")]
    NonFiniteResidual { x: f64 },

    #[error("no convergence after {iterations} iterations (best x = {best:.6}, residual {residual:.6})")]
    MaxIterations {
        iterations: u32,
        best: f64,
        residual: f64,
    },
}

/// Top-level engine error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("calculation failed to converge: {0}")]
    Convergence(#[from] ConvergenceError),

    #[error("property valuation is zero")]
    ZeroValuation,
}

impl EngineError {
    /// Calculations are deterministic, so a failure recurs on identical input.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Message suitable for showing to the end user
    pub fn user_message(&self) -> String {
        match self {
            EngineError::Input(e) => e.to_string(),
            EngineError::Convergence(_) | EngineError::ZeroValuation => {
                "Calculation unavailable".to_string()
            }
        }
    }
}

/// Failure loading reference data
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read reference data: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("unknown policy setting: {0}")]
    UnknownSetting(String),

    #[error("invalid value {value:?} for policy setting {name}")]
    InvalidSetting { name: String, value: String },
}
