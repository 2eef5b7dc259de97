//! Stressed economic scenarios

use super::table::ProjectionTable;
use crate::assumptions::EconomicAssumptions;
use crate::policy::PolicyConfig;
use serde::{Deserialize, Serialize};

/// Scenario a projection table was produced under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    Baseline,
    LowHousePriceGrowth,
    ZeroHousePriceGrowth,
    InterestRateUp,
    /// Caller supplied overrides
    Custom,
}

impl Scenario {
    /// The canonical stress scenarios, in presentation order
    pub const STRESSES: [Scenario; 3] = [
        Scenario::LowHousePriceGrowth,
        Scenario::ZeroHousePriceGrowth,
        Scenario::InterestRateUp,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Baseline => "Baseline",
            Scenario::LowHousePriceGrowth => "Low house price growth",
            Scenario::ZeroHousePriceGrowth => "Zero house price growth",
            Scenario::InterestRateUp => "Interest rate shock",
            Scenario::Custom => "Custom",
        }
    }

    /// Overrides that turn the baseline into this scenario
    pub fn overrides(&self, policy: &PolicyConfig) -> ScenarioOverrides {
        match self {
            Scenario::Baseline | Scenario::Custom => ScenarioOverrides::default(),
            Scenario::LowHousePriceGrowth => ScenarioOverrides {
                house_inflation_shock_level: Some(policy.stress_low_hpi_pct),
                ..Default::default()
            },
            Scenario::ZeroHousePriceGrowth => ScenarioOverrides {
                house_inflation_shock_level: Some(0.0),
                ..Default::default()
            },
            Scenario::InterestRateUp => ScenarioOverrides {
                interest_rate_shock: Some(policy.stress_interest_rate_shock_pct),
                ..Default::default()
            },
        }
    }
}

/// Changes applied to the economic assumptions of a context
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioOverrides {
    /// Percentage points added to the base interest rate
    pub interest_rate_shock: Option<f64>,

    /// Replacement house price inflation rate, in percent
    pub house_inflation_shock_level: Option<f64>,
}

impl ScenarioOverrides {
    pub fn apply(&self, economic: &EconomicAssumptions) -> EconomicAssumptions {
        let mut stressed = *economic;
        if let Some(shock) = self.interest_rate_shock {
            stressed.interest_rate += shock;
        }
        if let Some(level) = self.house_inflation_shock_level {
            stressed.house_price_inflation_rate = level;
        }
        stressed
    }
}

/// Baseline plus every canonical stress projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub baseline: ProjectionTable,
    pub low_house_price_growth: ProjectionTable,
    pub zero_house_price_growth: ProjectionTable,
    pub interest_rate_up: ProjectionTable,
}

impl ScenarioSet {
    pub fn tables(&self) -> [&ProjectionTable; 4] {
        [
            &self.baseline,
            &self.low_house_price_growth,
            &self.zero_house_price_growth,
            &self.interest_rate_up,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_hpi_and_shift_rate() {
        let policy = PolicyConfig::default();
        let base = EconomicAssumptions::default();

        let low = Scenario::LowHousePriceGrowth.overrides(&policy).apply(&base);
        assert_eq!(low.house_price_inflation_rate, policy.stress_low_hpi_pct);
        assert_eq!(low.interest_rate, base.interest_rate);

        let zero = Scenario::ZeroHousePriceGrowth.overrides(&policy).apply(&base);
        assert_eq!(zero.house_price_inflation_rate, 0.0);

        let shock = Scenario::InterestRateUp.overrides(&policy).apply(&base);
        assert_eq!(shock.interest_rate, base.interest_rate + 2.0);
        assert_eq!(shock.house_price_inflation_rate, base.house_price_inflation_rate);
    }

    #[test]
    fn test_baseline_has_no_overrides() {
        let base = EconomicAssumptions::default();
        let unchanged = Scenario::Baseline.overrides(&PolicyConfig::default()).apply(&base);
        assert_eq!(unchanged, base);
    }
}
