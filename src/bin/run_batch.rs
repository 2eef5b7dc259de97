//! Evaluate a file of enquiries in parallel
//!
//! Reads one enquiry per CSV row and writes one summary row per enquiry

use anyhow::{Context, Result};
use clap::Parser;
use equity_release_engine::loan::{DwellingType, LoanType, RequestedAmounts, RetirementPosition};
use equity_release_engine::{EnquiryOutcome, LoanEnquiry, ScenarioRunner};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "run_batch", version, about = "Batch evaluate equity release enquiries")]
struct Cli {
    /// Enquiry CSV file
    input: PathBuf,

    #[arg(long, default_value = "batch_output.csv")]
    output: PathBuf,
}

/// Flat enquiry row; blank amount cells read as zero
#[derive(Debug, Deserialize)]
struct EnquiryRow {
    id: String,
    loan_type: Option<LoanType>,
    dwelling_type: Option<DwellingType>,
    age_1: Option<u32>,
    age_2: Option<u32>,
    postcode: Option<String>,
    property_valuation: Option<f64>,
    protected_equity_pct: Option<f64>,
    top_up: Option<f64>,
    refinance: Option<f64>,
    give: Option<f64>,
    renovate: Option<f64>,
    travel: Option<f64>,
    care: Option<f64>,
    pool_balance: Option<f64>,
    annual_drawdown: Option<f64>,
    annual_pension_income: Option<f64>,
}

impl EnquiryRow {
    fn to_enquiry(&self) -> LoanEnquiry {
        LoanEnquiry {
            loan_type: self.loan_type,
            dwelling_type: self.dwelling_type,
            age_1: self.age_1,
            age_2: self.age_2,
            postcode: self.postcode.clone(),
            property_valuation: self.property_valuation,
            protected_equity_pct: self.protected_equity_pct.unwrap_or(0.0),
            requested: RequestedAmounts {
                top_up: self.top_up.unwrap_or(0.0),
                refinance: self.refinance.unwrap_or(0.0),
                give: self.give.unwrap_or(0.0),
                renovate: self.renovate.unwrap_or(0.0),
                travel: self.travel.unwrap_or(0.0),
                care: self.care.unwrap_or(0.0),
            },
            retirement: RetirementPosition {
                pool_balance: self.pool_balance.unwrap_or(0.0),
                annual_drawdown: self.annual_drawdown.unwrap_or(0.0),
                annual_pension_income: self.annual_pension_income.unwrap_or(0.0),
            },
            ..Default::default()
        }
    }
}

/// An input row, parsed or with the reason it could not be
struct ParsedRow {
    id: String,
    enquiry: Result<LoanEnquiry, String>,
}

/// Read enquiries row by row so one malformed row does not sink the batch
fn read_rows<R: Read>(reader: R) -> Result<Vec<ParsedRow>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers().context("reading header row")?.clone();
    let id_column = headers.iter().position(|name| name.trim() == "id");

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let line = index + 2;
        let parsed = match record {
            Ok(record) => {
                let id = id_column
                    .and_then(|column| record.get(column))
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| format!("line {}", line));
                let enquiry = record
                    .deserialize::<EnquiryRow>(Some(&headers))
                    .map(|row| row.to_enquiry())
                    .map_err(|e| format!("Malformed row: {}", e));
                ParsedRow { id, enquiry }
            }
            Err(e) => ParsedRow {
                id: format!("line {}", line),
                enquiry: Err(format!("Malformed row: {}", e)),
            },
        };
        if let Err(message) = &parsed.enquiry {
            log::warn!("enquiry {}: {}", parsed.id, message);
        }
        rows.push(parsed);
    }
    Ok(rows)
}

/// Evaluate every parseable row and produce one summary per input row
fn summarize(runner: &ScenarioRunner, rows: &[ParsedRow]) -> Vec<SummaryRow> {
    let enquiries: Vec<LoanEnquiry> = rows
        .iter()
        .filter_map(|row| row.enquiry.as_ref().ok().cloned())
        .collect();
    let mut outcomes = runner.run_batch(&enquiries).into_iter();

    rows.iter()
        .map(|row| match &row.enquiry {
            Err(message) => SummaryRow::failed(&row.id, message.clone()),
            Ok(_) => match outcomes.next() {
                Some(Ok(outcome)) => SummaryRow::new(&row.id, &outcome),
                Some(Err(e)) => {
                    log::warn!("enquiry {} failed: {}", row.id, e);
                    SummaryRow::failed(&row.id, e.user_message())
                }
                None => SummaryRow::failed(&row.id, "Calculation unavailable".to_string()),
            },
        })
        .collect()
}

/// One summary row per enquiry
#[derive(Debug, Default, Serialize)]
struct SummaryRow {
    id: String,
    eligible: bool,
    failed_check: String,
    max_lvr_pct: Option<f64>,
    loan_limit: Option<f64>,
    total_loan_amount: Option<f64>,
    negative_equity_age: String,
    final_pool_balance: Option<f64>,
    final_home_equity: Option<f64>,
    worst_stressed_home_equity: Option<f64>,
}

impl SummaryRow {
    fn new(id: &str, outcome: &EnquiryOutcome) -> Self {
        let failed_check = outcome
            .basic
            .first_error()
            .or_else(|| outcome.request.as_ref().and_then(|r| r.first_error()))
            .map(|item| format!("{}: {}", item.name, item.detail))
            .unwrap_or_default();

        let mut row = Self {
            id: id.to_string(),
            eligible: outcome.is_eligible(),
            failed_check,
            max_lvr_pct: outcome.limits.map(|l| l.max_lvr_pct),
            loan_limit: outcome.limits.map(|l| l.loan_limit),
            total_loan_amount: outcome.request.as_ref().map(|r| r.total_loan_amount),
            negative_equity_age: outcome
                .negative_equity_age
                .map(|age| age.to_string())
                .unwrap_or_default(),
            ..Default::default()
        };

        if let Some(scenarios) = &outcome.scenarios {
            let baseline = scenarios.baseline.summary();
            row.final_pool_balance = Some(baseline.final_pool_balance);
            row.final_home_equity = Some(baseline.final_home_equity);
            row.worst_stressed_home_equity = scenarios
                .tables()
                .iter()
                .map(|table| table.summary().final_home_equity)
                .reduce(f64::min);
        }
        row
    }

    fn failed(id: &str, message: String) -> Self {
        Self {
            id: id.to_string(),
            failed_check: message,
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let start = Instant::now();
    let runner = ScenarioRunner::from_default_data().context("loading reference data")?;

    let file = File::open(&cli.input).with_context(|| format!("opening {}", cli.input.display()))?;
    let rows = read_rows(file).with_context(|| format!("reading {}", cli.input.display()))?;
    println!("Loaded {} enquiries in {:?}", rows.len(), start.elapsed());

    let run_start = Instant::now();
    let summaries = summarize(&runner, &rows);
    println!("Evaluated in {:?}", run_start.elapsed());

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    let eligible = summaries.iter().filter(|summary| summary.eligible).count();
    for summary in summaries {
        writer.serialize(summary)?;
    }
    writer.flush()?;

    println!("{} of {} enquiries eligible", eligible, rows.len());
    println!("Summary written to {}", cli.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use equity_release_engine::PostcodeSet;

    const HEADER: &str = "id,loan_type,dwelling_type,age_1,age_2,postcode,property_valuation,protected_equity_pct,\
top_up,refinance,give,renovate,travel,care,pool_balance,annual_drawdown,annual_pension_income\n";

    fn runner() -> ScenarioRunner {
        ScenarioRunner::new(PostcodeSet::new(["2000"]))
    }

    #[test]
    fn test_blank_amount_cells_read_as_zero() {
        let data = format!(
            "{}E001,Single,House,70,,2000,500000,0,50000,20000,0,0,0,0,200000,20000,15000\n\
             E002,Single,House,70,,2000,500000,,,50000,,,,,,,\n",
            HEADER
        );
        let rows = read_rows(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        let enquiry = rows[1].enquiry.as_ref().unwrap();
        assert_eq!(enquiry.requested.top_up, 0.0);
        assert_eq!(enquiry.requested.refinance, 50_000.0);
        assert_eq!(enquiry.protected_equity_pct, 0.0);
        assert_eq!(enquiry.age_2, None);
    }

    #[test]
    fn test_malformed_row_does_not_abort_batch() {
        let data = format!(
            "{}E001,Single,House,70,,2000,500000,0,50000,20000,0,0,0,0,200000,20000,15000\n\
             E002,Single,House,seventy,,2000,500000,0,50000,0,0,0,0,0,0,0,0\n\
             E003,Single,House,80,,2000,500000,0,50000,0,0,0,0,0,0,0,0\n",
            HEADER
        );
        let rows = read_rows(data.as_bytes()).unwrap();
        let summaries = summarize(&runner(), &rows);

        let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["E001", "E002", "E003"]);
        assert!(summaries[0].eligible);
        assert!(!summaries[1].eligible);
        assert!(summaries[1].failed_check.starts_with("Malformed row"));
        assert!(summaries[2].eligible);
    }
}
