use serde::{Deserialize, Serialize};

/// User-reported monthly figures for one household.
///
/// `dependents`, `age`, `investments` and `goals` are carried through to the
/// advisor context but never feed the ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialProfile {
    pub monthly_income: f64,
    pub fixed_expenses: f64,
    pub total_emi: f64,
    pub existing_savings: f64,
    pub dependents: u32,
    pub age: u32,
    /// Annual premium; spread across twelve months in the outflow.
    pub insurance_premium: f64,
    pub investments: f64,
    pub goals: String,
}

/// Unrounded ratios derived from a [`FinancialProfile`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioSet {
    pub emi_to_income: f64,
    pub savings_rate: f64,
    pub runway_months: f64,
    pub expense_to_income: f64,
    pub total_monthly_outflow: f64,
}

/// Display form of a [`RatioSet`], as reported on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioSummary {
    pub emi_to_income: f64,
    pub savings_rate: f64,
    pub runway_months: f64,
    pub expense_to_income: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum RiskZone {
    Critical,
    Risk,
    Neutral,
    Growth,
    #[serde(rename = "Wealth Building")]
    WealthBuilding,
}

impl RiskZone {
    pub const ALL: [RiskZone; 5] = [
        RiskZone::Critical,
        RiskZone::Risk,
        RiskZone::Neutral,
        RiskZone::Growth,
        RiskZone::WealthBuilding,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RiskZone::Critical => "Critical",
            RiskZone::Risk => "Risk",
            RiskZone::Neutral => "Neutral",
            RiskZone::Growth => "Growth",
            RiskZone::WealthBuilding => "Wealth Building",
        }
    }
}

impl std::fmt::Display for RiskZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPair {
    #[serde(rename = "risk_3_month")]
    pub three_month: RiskLevel,
    #[serde(rename = "risk_6_month")]
    pub six_month: RiskLevel,
}

/// Everything the engine decides about one profile, before advisory text is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub score: f64,
    pub risk_zone: RiskZone,
    pub ratios: RatioSet,
    pub projection: ProjectionPair,
}

/// Sparse what-if changes applied to a baseline profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOverrides {
    /// Replaces `total_emi`.
    pub new_emi: Option<f64>,
    /// Added to `fixed_expenses`.
    pub expense_change: Option<f64>,
    /// Accepted but not applied to any figure.
    pub savings_target: Option<f64>,
}

impl SimulationOverrides {
    pub fn is_empty(&self) -> bool {
        self.new_emi.is_none() && self.expense_change.is_none() && self.savings_target.is_none()
    }
}
