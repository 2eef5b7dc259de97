//! Lending policy and postcode reference data

mod data;
mod postcode;
pub mod loader;

pub use data::PolicyConfig;
pub use postcode::{PostcodeLookup, PostcodeSet};
pub use loader::{load_policy, load_postcodes, load_default_reference_data};
