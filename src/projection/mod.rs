//! Pool amortization, root finding and year-by-year loan projections

pub mod amortization;
pub mod solver;
mod state;
mod table;
mod stress;
mod engine;

pub use amortization::{AmortizationModel, PeriodFlow};
pub use solver::Bisection;
pub use state::ProjectionState;
pub use table::{ProjectionPeriod, ProjectionSummary, ProjectionTable};
pub use stress::{Scenario, ScenarioOverrides, ScenarioSet};
pub use engine::{NegativeEquityAge, ProductProfile, ProjectionConfig, ProjectionEngine, ProjectionHorizon};
