use std::net::IpAddr;

use clap::{Args, Parser, Subcommand};

use crate::advisor::AdvisorArgs;
use crate::core::{FinancialProfile, SimulationOverrides};

#[derive(Parser, Debug)]
#[command(
    name = "stability",
    about = "Household financial stability score, risk zone and short-term projection"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API.
    Serve(ServeArgs),
    /// Score one household and print the result as JSON.
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,
    #[arg(long, default_value_t = 8000)]
    pub port: u16,
    #[command(flatten)]
    pub advisor: AdvisorArgs,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[arg(long)]
    pub monthly_income: f64,
    #[arg(long)]
    pub fixed_expenses: f64,
    #[arg(long, default_value_t = 0.0, help = "Total monthly EMI across all loans")]
    pub total_emi: f64,
    #[arg(long, default_value_t = 0.0, help = "Liquid savings available today")]
    pub existing_savings: f64,
    #[arg(long, default_value_t = 0.0, help = "Annual insurance premium")]
    pub insurance_premium: f64,
    #[arg(long, default_value_t = 0)]
    pub dependents: u32,
    #[arg(long, default_value_t = 30)]
    pub age: u32,
    #[arg(long, default_value_t = 0.0)]
    pub investments: f64,
    #[arg(long, default_value = "")]
    pub goals: String,
    #[arg(long, help = "Simulate with this monthly EMI instead of --total-emi")]
    pub new_emi: Option<f64>,
    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Simulate adding this amount to --fixed-expenses (may be negative)"
    )]
    pub expense_change: Option<f64>,
    #[arg(long, help = "Accepted for simulation but not yet applied")]
    pub savings_target: Option<f64>,
    #[command(flatten)]
    pub advisor: AdvisorArgs,
}

impl AnalyzeArgs {
    pub fn overrides(&self) -> SimulationOverrides {
        SimulationOverrides {
            new_emi: self.new_emi,
            expense_change: self.expense_change,
            savings_target: self.savings_target,
        }
    }
}

pub fn build_profile(args: &AnalyzeArgs) -> Result<FinancialProfile, String> {
    for (name, value) in [
        ("--monthly-income", args.monthly_income),
        ("--fixed-expenses", args.fixed_expenses),
        ("--total-emi", args.total_emi),
        ("--existing-savings", args.existing_savings),
        ("--insurance-premium", args.insurance_premium),
        ("--investments", args.investments),
    ] {
        if !value.is_finite() {
            return Err(format!("{name} must be a finite number"));
        }
    }

    if args.monthly_income < 0.0 {
        return Err("--monthly-income must be >= 0".to_string());
    }

    for (name, value) in [
        ("--new-emi", args.new_emi),
        ("--expense-change", args.expense_change),
        ("--savings-target", args.savings_target),
    ] {
        if value.is_some_and(|v| !v.is_finite()) {
            return Err(format!("{name} must be a finite number"));
        }
    }

    Ok(FinancialProfile {
        monthly_income: args.monthly_income,
        fixed_expenses: args.fixed_expenses,
        total_emi: args.total_emi,
        existing_savings: args.existing_savings,
        dependents: args.dependents,
        age: args.age,
        insurance_premium: args.insurance_premium,
        investments: args.investments,
        goals: args.goals.clone(),
    })
}
