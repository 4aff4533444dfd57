use super::engine::assess_profile;
use super::types::{Assessment, FinancialProfile, SimulationOverrides};

/// Returns a copy of `baseline` with the what-if changes applied.
pub fn apply_overrides(
    baseline: &FinancialProfile,
    overrides: &SimulationOverrides,
) -> FinancialProfile {
    let mut profile = baseline.clone();
    if let Some(v) = overrides.new_emi {
        profile.total_emi = v;
    }
    if let Some(v) = overrides.expense_change {
        profile.fixed_expenses += v;
    }
    // TODO: savings_target is accepted but not wired into any figure yet; decide
    // whether it should raise existing_savings or set a target savings rate.
    profile
}

pub fn simulate_profile(
    baseline: &FinancialProfile,
    overrides: &SimulationOverrides,
) -> (FinancialProfile, Assessment) {
    let profile = apply_overrides(baseline, overrides);
    let assessment = assess_profile(&profile);
    (profile, assessment)
}
