//! Raw enquiry data as gathered by the application forms

use super::{non_negative, DwellingType, LoanType, RequestedAmounts, RetirementPosition};
use crate::assumptions::EconomicAssumptions;
use crate::error::InputError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Enquiry as received from the caller; any field may still be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanEnquiry {
    pub loan_type: Option<LoanType>,
    pub dwelling_type: Option<DwellingType>,
    pub age_1: Option<u32>,
    pub age_2: Option<u32>,
    pub postcode: Option<String>,
    pub property_valuation: Option<f64>,
    pub protected_equity_pct: f64,
    pub requested: RequestedAmounts,
    pub economic: EconomicAssumptions,
    pub retirement: RetirementPosition,
}

impl LoanEnquiry {
    /// Fill borrower ages from dates of birth as at `as_of`
    pub fn with_birth_dates(mut self, dob_1: NaiveDate, dob_2: Option<NaiveDate>, as_of: NaiveDate) -> Self {
        self.age_1 = Some(age_on(dob_1, as_of));
        self.age_2 = dob_2.map(|dob| age_on(dob, as_of));
        self
    }

    /// Name of the first required field that is absent
    ///
    /// A non-positive valuation or blank postcode counts as absent.
    pub fn first_missing_field(&self) -> Option<&'static str> {
        if self.dwelling_type.is_none() {
            return Some("dwelling_type");
        }
        if self.loan_type.is_none() {
            return Some("loan_type");
        }
        if self.age_1.is_none() {
            return Some("age_1");
        }
        if !matches!(self.property_valuation, Some(v) if v.is_finite() && v > 0.0) {
            return Some("property_valuation");
        }
        if self.postcode.as_deref().map_or(true, |code| code.trim().is_empty()) {
            return Some("postcode");
        }
        None
    }

    /// Check the values that are present, regardless of what is missing
    pub fn validate_values(&self) -> Result<(), InputError> {
        if !(0.0..=100.0).contains(&self.protected_equity_pct) {
            return Err(InputError::InvalidValue {
                field: "protected_equity_pct",
                value: self.protected_equity_pct,
            });
        }
        self.requested.validate()?;
        non_negative("pool_balance", self.retirement.pool_balance)?;
        non_negative("annual_drawdown", self.retirement.annual_drawdown)?;
        non_negative("annual_pension_income", self.retirement.annual_pension_income)
    }

    pub fn is_joint(&self) -> bool {
        self.loan_type == Some(LoanType::Joint)
    }

    /// Youngest borrower age, if every required age is known
    pub fn youngest_age(&self) -> Option<u32> {
        let age_1 = self.age_1?;
        if self.is_joint() {
            self.age_2.map(|age_2| age_1.min(age_2))
        } else {
            Some(age_1)
        }
    }
}

/// Age in whole years on `as_of`
pub fn age_on(dob: NaiveDate, as_of: NaiveDate) -> u32 {
    let mut years = as_of.year() - dob.year();
    if (as_of.month(), as_of.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_on_birthday_boundary() {
        let dob = date(1955, 7, 15);
        assert_eq!(age_on(dob, date(2025, 7, 14)), 69);
        assert_eq!(age_on(dob, date(2025, 7, 15)), 70);
        assert_eq!(age_on(dob, date(1950, 1, 1)), 0);
    }

    #[test]
    fn test_birth_dates_fill_ages() {
        let enquiry = LoanEnquiry {
            loan_type: Some(LoanType::Joint),
            ..Default::default()
        }
        .with_birth_dates(date(1958, 3, 1), Some(date(1961, 9, 30)), date(2025, 6, 30));

        assert_eq!(enquiry.age_1, Some(67));
        assert_eq!(enquiry.age_2, Some(63));
        assert_eq!(enquiry.youngest_age(), Some(63));
    }

    #[test]
    fn test_first_missing_field_order() {
        let mut enquiry = LoanEnquiry::default();
        assert_eq!(enquiry.first_missing_field(), Some("dwelling_type"));

        enquiry.dwelling_type = Some(DwellingType::House);
        enquiry.loan_type = Some(LoanType::Single);
        enquiry.age_1 = Some(70);
        enquiry.property_valuation = Some(0.0);
        assert_eq!(enquiry.first_missing_field(), Some("property_valuation"));

        enquiry.property_valuation = Some(500_000.0);
        enquiry.postcode = Some("  ".to_string());
        assert_eq!(enquiry.first_missing_field(), Some("postcode"));

        enquiry.postcode = Some("2000".to_string());
        assert_eq!(enquiry.first_missing_field(), None);
    }

    #[test]
    fn test_joint_youngest_needs_both_ages() {
        let enquiry = LoanEnquiry {
            loan_type: Some(LoanType::Joint),
            age_1: Some(70),
            ..Default::default()
        };
        assert_eq!(enquiry.youngest_age(), None);
    }
}
