//! Validated loan context used by every calculation

use super::{non_negative, LoanEnquiry};
use crate::assumptions::EconomicAssumptions;
use crate::error::InputError;
use serde::{Deserialize, Serialize};

/// Number of borrowers on the loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanType {
    Single,
    Joint,
}

/// Security property type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DwellingType {
    House,
    Apartment,
}

/// Purposes a loan amount can be requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Purpose {
    TopUp,
    Refinance,
    Give,
    Renovate,
    Travel,
    Care,
}

impl Purpose {
    pub fn label(&self) -> &'static str {
        match self {
            Purpose::TopUp => "Top Up",
            Purpose::Refinance => "Refinance",
            Purpose::Give => "Give",
            Purpose::Renovate => "Renovate",
            Purpose::Travel => "Travel",
            Purpose::Care => "Care",
        }
    }
}

/// Amount requested per purpose
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestedAmounts {
    pub top_up: f64,
    pub refinance: f64,
    pub give: f64,
    pub renovate: f64,
    pub travel: f64,
    pub care: f64,
}

impl RequestedAmounts {
    pub fn get(&self, purpose: Purpose) -> f64 {
        match purpose {
            Purpose::TopUp => self.top_up,
            Purpose::Refinance => self.refinance,
            Purpose::Give => self.give,
            Purpose::Renovate => self.renovate,
            Purpose::Travel => self.travel,
            Purpose::Care => self.care,
        }
    }

    /// Requested amounts in a fixed purpose order
    pub fn items(&self) -> [(Purpose, f64); 6] {
        [
            Purpose::TopUp,
            Purpose::Refinance,
            Purpose::Give,
            Purpose::Renovate,
            Purpose::Travel,
            Purpose::Care,
        ]
        .map(|purpose| (purpose, self.get(purpose)))
    }

    pub fn total(&self) -> f64 {
        self.items().iter().map(|(_, amount)| amount).sum()
    }

    pub(crate) fn validate(&self) -> Result<(), InputError> {
        for (purpose, amount) in self.items() {
            non_negative(purpose_field(purpose), amount)?;
        }
        Ok(())
    }
}

fn purpose_field(purpose: Purpose) -> &'static str {
    match purpose {
        Purpose::TopUp => "top_up",
        Purpose::Refinance => "refinance",
        Purpose::Give => "give",
        Purpose::Renovate => "renovate",
        Purpose::Travel => "travel",
        Purpose::Care => "care",
    }
}

/// Existing drawdown pool and income of the borrowers
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetirementPosition {
    /// Current pool (e.g. superannuation) balance
    pub pool_balance: f64,

    /// Drawdown requested in the first year
    pub annual_drawdown: f64,

    /// Pension income in the first year
    pub annual_pension_income: f64,
}

/// Complete, validated parameters for one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanContext {
    pub is_joint: bool,
    pub youngest_age: u32,
    pub is_apartment: bool,
    pub postcode: String,
    pub property_valuation: f64,
    pub protected_equity_pct: f64,
    pub requested: RequestedAmounts,
    pub economic: EconomicAssumptions,
    pub retirement: RetirementPosition,
}

impl LoanContext {
    /// Build a context from an enquiry, rejecting missing or invalid data
    pub fn from_enquiry(enquiry: &LoanEnquiry) -> Result<Self, InputError> {
        if let Some(field) = enquiry.first_missing_field() {
            return Err(InputError::MissingField(field));
        }
        let youngest_age = enquiry.youngest_age().ok_or(InputError::MissingAge)?;

        enquiry.validate_values()?;
        let property_valuation = enquiry
            .property_valuation
            .ok_or(InputError::MissingField("property_valuation"))?;

        Ok(Self {
            is_joint: enquiry.is_joint(),
            youngest_age,
            is_apartment: enquiry.dwelling_type == Some(DwellingType::Apartment),
            postcode: enquiry.postcode.as_deref().unwrap_or_default().trim().to_string(),
            property_valuation,
            protected_equity_pct: enquiry.protected_equity_pct,
            requested: enquiry.requested,
            economic: enquiry.economic,
            retirement: enquiry.retirement,
        })
    }
}

impl TryFrom<&LoanEnquiry> for LoanContext {
    type Error = InputError;

    fn try_from(enquiry: &LoanEnquiry) -> Result<Self, Self::Error> {
        Self::from_enquiry(enquiry)
    }
}
