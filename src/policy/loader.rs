//! Load lending policy and postcode reference data from CSV
//!
//! Policy files hold `name,value` rows that override `PolicyConfig::default()`.
//! Postcode files hold a single `postcode` column.

use super::{PolicyConfig, PostcodeSet};
use crate::error::LoadError;
use csv::Reader;
use log::info;
use std::io::Read;
use std::path::Path;

/// Default path to the reference data directory
pub const DEFAULT_DATA_PATH: &str = "data";

/// Raw row of a policy settings file
#[derive(Debug, serde::Deserialize)]
struct SettingRow {
    name: String,
    value: String,
}

/// Raw row of a postcode file
#[derive(Debug, serde::Deserialize)]
struct PostcodeRow {
    postcode: String,
}

/// Load policy overrides from a CSV file
pub fn load_policy<P: AsRef<Path>>(path: P) -> Result<PolicyConfig, LoadError> {
    let file = std::fs::File::open(path.as_ref())?;
    let policy = load_policy_from_reader(file)?;
    info!("loaded lending policy from {}", path.as_ref().display());
    Ok(policy)
}

/// Load policy overrides from any reader
pub fn load_policy_from_reader<R: Read>(reader: R) -> Result<PolicyConfig, LoadError> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut policy = PolicyConfig::default();

    for result in csv_reader.deserialize() {
        let row: SettingRow = result?;
        let name = row.name.trim();
        let raw = row.value.trim();

        let invalid = || LoadError::InvalidSetting {
            name: name.to_string(),
            value: raw.to_string(),
        };
        let value: f64 = raw.parse().map_err(|_| invalid())?;
        if !value.is_finite() || value < 0.0 {
            return Err(invalid());
        }
        if PolicyConfig::is_integral(name) && (value.fract() != 0.0 || value > u32::MAX as f64) {
            return Err(invalid());
        }

        if !policy.set(name, value) {
            return Err(LoadError::UnknownSetting(name.to_string()));
        }
    }

    Ok(policy)
}

/// Load approved postcodes from a CSV file
pub fn load_postcodes<P: AsRef<Path>>(path: P) -> Result<PostcodeSet, LoadError> {
    let file = std::fs::File::open(path.as_ref())?;
    let postcodes = load_postcodes_from_reader(file)?;
    info!(
        "loaded {} eligible postcodes from {}",
        postcodes.len(),
        path.as_ref().display()
    );
    Ok(postcodes)
}

/// Load approved postcodes from any reader
pub fn load_postcodes_from_reader<R: Read>(reader: R) -> Result<PostcodeSet, LoadError> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut codes = Vec::new();

    for result in csv_reader.deserialize() {
        let row: PostcodeRow = result?;
        codes.push(row.postcode);
    }

    Ok(PostcodeSet::new(codes))
}

/// Load the default policy file and postcode list from the data directory
pub fn load_default_reference_data() -> Result<(PolicyConfig, PostcodeSet), LoadError> {
    let dir = Path::new(DEFAULT_DATA_PATH);
    Ok((
        load_policy(dir.join("lending_policy.csv"))?,
        load_postcodes(dir.join("eligible_postcodes.csv"))?,
    ))
}
