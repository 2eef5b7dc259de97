//! Borrower, property and requested loan inputs

mod context;
mod enquiry;

pub use context::{DwellingType, LoanContext, LoanType, Purpose, RequestedAmounts, RetirementPosition};
pub use enquiry::{age_on, LoanEnquiry};

use crate::error::InputError;

pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<(), InputError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InputError::InvalidValue { field, value })
    }
}
