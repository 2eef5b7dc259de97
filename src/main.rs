//! Equity Release Engine CLI
//!
//! Evaluates one enquiry read from a JSON file and writes its scenario
//! projections as CSV

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use equity_release_engine::policy::{load_policy, load_postcodes, loader::DEFAULT_DATA_PATH};
use equity_release_engine::projection::{ProductProfile, ProjectionHorizon, ProjectionPeriod};
use equity_release_engine::{LoanEnquiry, ProjectionConfig, ScenarioRunner};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "equity-release", version, about = "Evaluate and project an equity release enquiry")]
struct Cli {
    /// Enquiry JSON file
    #[arg(long)]
    enquiry: PathBuf,

    #[arg(long, help = "Lending policy CSV (name,value rows)")]
    policy: Option<PathBuf>,

    #[arg(long, help = "Eligible postcodes CSV")]
    postcodes: Option<PathBuf>,

    #[arg(long, default_value = "projection_output.csv")]
    output: PathBuf,

    #[arg(long, value_enum, default_value_t = Product::Superannuation)]
    product: Product,

    #[arg(long, help = "Project to the policy projection age instead of a fixed number of years")]
    to_projection_age: bool,

    #[arg(long, help = "Print the full outcome as JSON")]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Product {
    Superannuation,
    TopUp,
}

/// One CSV row: a projected year tagged with its scenario
#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    scenario: &'a str,
    period: u32,
    age: u32,
    begin_pool_balance: f64,
    drawdown: f64,
    drawdown_per_payment: f64,
    investment_return: f64,
    end_pool_balance: f64,
    pension_income: f64,
    total_income: f64,
    pension_income_share_pct: f64,
    cumulative_drawdown: f64,
    house_value: f64,
    loan_balance: f64,
    home_equity: f64,
    home_equity_pct: f64,
}

impl<'a> OutputRow<'a> {
    fn new(scenario: &'a str, row: &ProjectionPeriod) -> Self {
        Self {
            scenario,
            period: row.period_index,
            age: row.begin_age,
            begin_pool_balance: row.begin_pool_balance,
            drawdown: row.drawdown,
            drawdown_per_payment: row.drawdown_per_payment,
            investment_return: row.investment_return,
            end_pool_balance: row.end_pool_balance,
            pension_income: row.pension_income,
            total_income: row.total_income,
            pension_income_share_pct: row.pension_income_share_pct,
            cumulative_drawdown: row.cumulative_drawdown,
            house_value: row.begin_house_value,
            loan_balance: row.begin_loan_balance,
            home_equity: row.home_equity,
            home_equity_pct: row.home_equity_pct,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let data_dir = Path::new(DEFAULT_DATA_PATH);
    let policy_path = cli.policy.unwrap_or_else(|| data_dir.join("lending_policy.csv"));
    let postcode_path = cli.postcodes.unwrap_or_else(|| data_dir.join("eligible_postcodes.csv"));

    let policy = load_policy(&policy_path)
        .with_context(|| format!("loading lending policy from {}", policy_path.display()))?;
    let postcodes = load_postcodes(&postcode_path)
        .with_context(|| format!("loading postcodes from {}", postcode_path.display()))?;

    let config = ProjectionConfig {
        horizon: if cli.to_projection_age {
            ProjectionHorizon::ToProjectionAge
        } else {
            ProjectionHorizon::PolicyPeriods
        },
        product: match cli.product {
            Product::Superannuation => ProductProfile::superannuation(),
            Product::TopUp => ProductProfile::top_up(),
        },
        ..Default::default()
    };
    let runner = ScenarioRunner::with_reference_data(policy, postcodes, config);

    let file = File::open(&cli.enquiry)
        .with_context(|| format!("opening enquiry {}", cli.enquiry.display()))?;
    let enquiry: LoanEnquiry = serde_json::from_reader(file).context("parsing enquiry JSON")?;

    let outcome = runner.run(&enquiry).map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    println!("Basic eligibility: {}", if outcome.basic.eligible { "eligible" } else { "not eligible" });
    for item in outcome.basic.items.iter().chain(outcome.request.iter().flat_map(|r| r.items.iter())) {
        println!("  {:<20} {:?}  {}", item.name, item.status, item.detail);
    }

    if let Some(limits) = &outcome.limits {
        println!();
        println!("Maximum LVR:  {:.2}%", limits.max_lvr_pct);
        println!("Loan limit:   ${:.2}", limits.loan_limit);
    }
    if let Some(request) = &outcome.request {
        println!("Total loan:   ${:.2} (fee ${:.2})", request.total_loan_amount, request.establishment_fee);
        println!("Available:    ${:.2}", request.available_amount);
    }
    if let Some(age) = outcome.negative_equity_age {
        println!("Negative equity age: {}", age);
    }

    let Some(scenarios) = &outcome.scenarios else {
        println!("\nNo projection: enquiry is not eligible");
        return Ok(());
    };

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    for table in scenarios.tables() {
        for row in &table.periods {
            writer.serialize(OutputRow::new(table.scenario.label(), row))?;
        }
    }
    writer.flush()?;

    println!();
    println!("{:<24} {:>14} {:>14} {:>10}", "Scenario", "Final pool", "Final equity", "Equity %");
    println!("{}", "-".repeat(65));
    for table in scenarios.tables() {
        let summary = table.summary();
        println!(
            "{:<24} {:>14.2} {:>14.2} {:>10.2}",
            table.scenario.label(),
            summary.final_pool_balance,
            summary.final_home_equity,
            summary.final_home_equity_pct
        );
    }
    println!("\nProjection tables written to {}", cli.output.display());

    Ok(())
}
