mod engine;
mod simulation;
mod types;

pub use engine::{
    assess_profile, calculate_ratios, classify_risk_zone, compose_score, project_risk,
};
pub use simulation::{apply_overrides, simulate_profile};
pub use types::{
    Assessment, FinancialProfile, ProjectionPair, RatioSet, RatioSummary, RiskLevel, RiskZone,
    SimulationOverrides,
};
