use super::types::{
    Assessment, FinancialProfile, ProjectionPair, RatioSet, RatioSummary, RiskLevel, RiskZone,
};

const MONTHS_PER_YEAR: f64 = 12.0;

const RUNWAY_WEIGHT: f64 = 0.4;
const SAVINGS_WEIGHT: f64 = 0.3;
const EMI_WEIGHT: f64 = 0.2;
const EXPENSE_WEIGHT: f64 = 0.1;

const RUNWAY_SATURATION_MONTHS: f64 = 12.0;
const SAVINGS_SATURATION_RATE: f64 = 0.30;

/// Runs the full pipeline on one profile: ratios first, then zone, score and
/// projection, each read from the same unrounded ratio set.
pub fn assess_profile(profile: &FinancialProfile) -> Assessment {
    let ratios = calculate_ratios(profile);
    Assessment {
        score: compose_score(&ratios),
        risk_zone: classify_risk_zone(&ratios),
        ratios,
        projection: project_risk(&ratios),
    }
}

/// Derives the four ratios. Never fails: a non-positive income zeroes the
/// income-relative ratios and a non-positive outflow zeroes the runway.
pub fn calculate_ratios(profile: &FinancialProfile) -> RatioSet {
    let income = profile.monthly_income;
    let outflow = profile.fixed_expenses
        + profile.total_emi
        + profile.insurance_premium / MONTHS_PER_YEAR;

    let per_income = |value: f64| if income > 0.0 { value / income } else { 0.0 };
    let runway_months = if outflow > 0.0 {
        profile.existing_savings / outflow
    } else {
        0.0
    };

    RatioSet {
        emi_to_income: per_income(profile.total_emi),
        savings_rate: per_income(income - outflow),
        runway_months,
        expense_to_income: per_income(outflow),
        total_monthly_outflow: outflow,
    }
}

/// First matching rule wins. Bounds are intentionally asymmetric between rules.
pub fn classify_risk_zone(ratios: &RatioSet) -> RiskZone {
    let emi = ratios.emi_to_income;
    let runway = ratios.runway_months;

    if emi > 0.50 || runway < 1.0 {
        return RiskZone::Critical;
    }
    if (0.35..=0.50).contains(&emi) || (1.0..3.0).contains(&runway) {
        return RiskZone::Risk;
    }
    if (0.20..0.35).contains(&emi) || (3.0..6.0).contains(&runway) {
        return RiskZone::Neutral;
    }
    if emi < 0.10 && runway > 12.0 {
        return RiskZone::WealthBuilding;
    }
    if emi < 0.20 && (6.0..=12.0).contains(&runway) {
        return RiskZone::Growth;
    }

    // Deliberate default for combinations the rules above leave open, e.g. an
    // EMI ratio in [0.10, 0.20) with more than a year of runway.
    RiskZone::Neutral
}

/// Weighted blend of four clamped sub-scores, rounded half-to-even.
pub fn compose_score(ratios: &RatioSet) -> f64 {
    let runway_score = sub_score(ratios.runway_months / RUNWAY_SATURATION_MONTHS * 100.0);
    let savings_score = sub_score(ratios.savings_rate / SAVINGS_SATURATION_RATE * 100.0);
    // 100 at 20% EMI burden, 0 at 60%.
    let emi_score = sub_score(-250.0 * ratios.emi_to_income + 150.0);
    // 100 at 50% of income spent, 0 at 100%.
    let expense_score = sub_score(-200.0 * ratios.expense_to_income + 200.0);

    let total = RUNWAY_WEIGHT * runway_score
        + SAVINGS_WEIGHT * savings_score
        + EMI_WEIGHT * emi_score
        + EXPENSE_WEIGHT * expense_score;
    total.round_ties_even().clamp(0.0, 100.0)
}

fn sub_score(raw: f64) -> f64 {
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 100.0)
}

pub fn project_risk(ratios: &RatioSet) -> ProjectionPair {
    ProjectionPair {
        three_month: three_month_risk(ratios.runway_months),
        six_month: six_month_risk(ratios.runway_months),
    }
}

fn three_month_risk(runway_months: f64) -> RiskLevel {
    if runway_months < 3.0 {
        RiskLevel::High
    } else if runway_months < 6.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn six_month_risk(runway_months: f64) -> RiskLevel {
    if runway_months < 6.0 {
        RiskLevel::High
    } else if runway_months < 12.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

impl RatioSet {
    /// Rounds for display only; decisions are always made on the unrounded set.
    /// Non-finite ratios (e.g. from a subnormal income) saturate so the wire
    /// form is always a JSON number.
    pub fn summary(&self) -> RatioSummary {
        RatioSummary {
            emi_to_income: display_ratio(self.emi_to_income, 2),
            savings_rate: display_ratio(self.savings_rate, 2),
            runway_months: display_ratio(self.runway_months, 1),
            expense_to_income: display_ratio(self.expense_to_income, 2),
        }
    }
}

fn display_ratio(value: f64, decimals: usize) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    if value.is_infinite() {
        return if value > 0.0 { f64::MAX } else { f64::MIN };
    }
    round_to(value, decimals)
}

// Formatting rounds the exact binary value, so 2.675 (stored just below) gives 2.67.
fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_profile() -> FinancialProfile {
        FinancialProfile {
            monthly_income: 50_000.0,
            fixed_expenses: 15_000.0,
            total_emi: 20_000.0,
            existing_savings: 60_000.0,
            dependents: 2,
            age: 34,
            insurance_premium: 12_000.0,
            investments: 0.0,
            goals: "Child education".to_string(),
        }
    }

    fn ratios_with(emi_to_income: f64, runway_months: f64) -> RatioSet {
        RatioSet {
            emi_to_income,
            savings_rate: 0.2,
            runway_months,
            expense_to_income: 0.6,
            total_monthly_outflow: 1.0,
        }
    }

    #[test]
    fn calculate_ratios_matches_high_emi_household() {
        let ratios = calculate_ratios(&sample_profile());

        assert_approx(ratios.total_monthly_outflow, 36_000.0);
        assert_approx(ratios.emi_to_income, 0.40);
        assert_approx(ratios.savings_rate, 0.28);
        assert_approx(ratios.runway_months, 60_000.0 / 36_000.0);
        assert_approx(ratios.expense_to_income, 0.72);

        let summary = ratios.summary();
        assert_approx(summary.runway_months, 1.7);
        assert_approx(summary.emi_to_income, 0.4);
    }

    #[test]
    fn display_rounding_follows_stored_binary_value() {
        // 1.15 and 2.675 are stored slightly below the written decimal.
        assert_approx(round_to(11_500.0 / 10_000.0, 1), 1.1);
        assert_approx(round_to(2.675, 2), 2.67);
        assert_approx(round_to(60_000.0 / 36_000.0, 1), 1.7);
        assert_approx(round_to(-0.284, 2), -0.28);
    }

    #[test]
    fn subnormal_income_keeps_summary_finite() {
        let profile = FinancialProfile {
            monthly_income: 5e-324,
            ..sample_profile()
        };
        let assessment = assess_profile(&profile);
        assert!(assessment.ratios.emi_to_income.is_infinite());
        assert_eq!(assessment.risk_zone, RiskZone::Critical);
        assert!((0.0..=100.0).contains(&assessment.score));

        let summary = assessment.ratios.summary();
        assert_eq!(summary.emi_to_income, f64::MAX);
        assert_eq!(summary.savings_rate, f64::MIN);
        assert_eq!(summary.expense_to_income, f64::MAX);
        assert_approx(summary.runway_months, 1.7);
    }

    #[test]
    fn high_emi_household_lands_in_risk_zone() {
        let assessment = assess_profile(&sample_profile());

        assert_eq!(assessment.risk_zone, RiskZone::Risk);
        assert_approx(assessment.score, 49.0);
        assert_eq!(assessment.projection.three_month, RiskLevel::High);
        assert_eq!(assessment.projection.six_month, RiskLevel::High);
    }

    #[test]
    fn low_emi_household_with_eleven_months_runway_is_growth() {
        let profile = FinancialProfile {
            monthly_income: 100_000.0,
            fixed_expenses: 20_000.0,
            total_emi: 5_000.0,
            existing_savings: 300_000.0,
            insurance_premium: 12_000.0,
            ..sample_profile()
        };
        let assessment = assess_profile(&profile);

        assert_approx(assessment.ratios.total_monthly_outflow, 26_000.0);
        assert_approx(assessment.ratios.emi_to_income, 0.05);
        assert_approx(assessment.ratios.summary().runway_months, 11.5);
        assert_eq!(assessment.risk_zone, RiskZone::Growth);
        assert_approx(assessment.score, 98.0);
        assert_eq!(assessment.projection.three_month, RiskLevel::Low);
        assert_eq!(assessment.projection.six_month, RiskLevel::Medium);
    }

    #[test]
    fn zero_income_without_savings_is_critical() {
        let profile = FinancialProfile {
            monthly_income: 0.0,
            fixed_expenses: 10_000.0,
            total_emi: 5_000.0,
            existing_savings: 0.0,
            insurance_premium: 0.0,
            ..sample_profile()
        };
        let assessment = assess_profile(&profile);

        assert_approx(assessment.ratios.emi_to_income, 0.0);
        assert_approx(assessment.ratios.savings_rate, 0.0);
        assert_approx(assessment.ratios.expense_to_income, 0.0);
        assert_approx(assessment.ratios.runway_months, 0.0);
        assert_eq!(assessment.risk_zone, RiskZone::Critical);
        // Only the EMI and expense sub-scores saturate.
        assert_approx(assessment.score, 30.0);
    }

    #[test]
    fn non_positive_outflow_zeroes_runway() {
        let profile = FinancialProfile {
            fixed_expenses: -5_000.0,
            total_emi: 0.0,
            insurance_premium: 0.0,
            existing_savings: 1_000_000.0,
            ..sample_profile()
        };
        let ratios = calculate_ratios(&profile);
        assert_approx(ratios.runway_months, 0.0);
        assert_eq!(classify_risk_zone(&ratios), RiskZone::Critical);
    }

    #[test]
    fn classification_uses_unrounded_runway() {
        // 0.96 months displays as 1.0 but must still count as under one month.
        let profile = FinancialProfile {
            monthly_income: 100_000.0,
            fixed_expenses: 50_000.0,
            total_emi: 0.0,
            insurance_premium: 0.0,
            existing_savings: 48_000.0,
            ..sample_profile()
        };
        let assessment = assess_profile(&profile);
        assert_approx(assessment.ratios.summary().runway_months, 1.0);
        assert_eq!(assessment.risk_zone, RiskZone::Critical);
    }

    #[test]
    fn classifier_rules_respect_boundary_inclusivity() {
        let cases = [
            (0.5001, 20.0, RiskZone::Critical),
            (0.05, 0.999, RiskZone::Critical),
            (0.50, 20.0, RiskZone::Risk),
            (0.35, 20.0, RiskZone::Risk),
            (0.05, 1.0, RiskZone::Risk),
            (0.05, 2.999, RiskZone::Risk),
            (0.3499, 20.0, RiskZone::Neutral),
            (0.20, 20.0, RiskZone::Neutral),
            (0.05, 3.0, RiskZone::Neutral),
            (0.05, 5.999, RiskZone::Neutral),
            (0.0999, 12.001, RiskZone::WealthBuilding),
            (0.10, 12.001, RiskZone::Neutral),
            (0.0999, 12.0, RiskZone::Growth),
            (0.19, 6.0, RiskZone::Growth),
            (0.19, 12.0, RiskZone::Growth),
            (0.19, 12.001, RiskZone::Neutral),
        ];

        for (emi, runway, expected) in cases {
            assert_eq!(
                classify_risk_zone(&ratios_with(emi, runway)),
                expected,
                "emi={emi}, runway={runway}"
            );
        }
    }

    #[test]
    fn classifier_boundary_grid_is_total() {
        let emis = [0.0999, 0.10, 0.19, 0.20, 0.34, 0.35, 0.4999, 0.50, 0.5001];
        let runways = [0.999, 1.0, 2.999, 3.0, 5.999, 6.0, 11.999, 12.0, 12.001];
        let mut seen = std::collections::HashSet::new();

        for emi in emis {
            for runway in runways {
                let zone = classify_risk_zone(&ratios_with(emi, runway));
                assert!(RiskZone::ALL.contains(&zone));
                seen.insert(zone);

                if emi > 0.50 || runway < 1.0 {
                    assert_eq!(zone, RiskZone::Critical, "emi={emi}, runway={runway}");
                }
            }
        }

        assert_eq!(seen.len(), RiskZone::ALL.len());
    }

    #[test]
    fn sub_scores_hit_their_anchor_points() {
        let mut ratios = RatioSet {
            emi_to_income: 0.20,
            savings_rate: 0.30,
            runway_months: 12.0,
            expense_to_income: 0.50,
            total_monthly_outflow: 1.0,
        };
        assert_approx(compose_score(&ratios), 100.0);

        ratios.emi_to_income = 0.60;
        ratios.expense_to_income = 1.0;
        assert_approx(compose_score(&ratios), 70.0);

        ratios.runway_months = 0.0;
        ratios.savings_rate = -0.5;
        assert_approx(compose_score(&ratios), 0.0);
    }

    #[test]
    fn score_rounds_half_to_even() {
        // 0.75 months of runway scores 6.25, weighted to exactly 2.5.
        let ratios = RatioSet {
            emi_to_income: 0.60,
            savings_rate: 0.0,
            runway_months: 0.75,
            expense_to_income: 1.0,
            total_monthly_outflow: 1.0,
        };
        assert_approx(compose_score(&ratios), 2.0);
    }

    #[test]
    fn projection_ladders_are_independent() {
        let cases = [
            (2.999, RiskLevel::High, RiskLevel::High),
            (3.0, RiskLevel::Medium, RiskLevel::High),
            (5.999, RiskLevel::Medium, RiskLevel::High),
            (6.0, RiskLevel::Low, RiskLevel::Medium),
            (11.999, RiskLevel::Low, RiskLevel::Medium),
            (12.0, RiskLevel::Low, RiskLevel::Low),
        ];
        for (runway, three, six) in cases {
            let pair = project_risk(&ratios_with(0.1, runway));
            assert_eq!(pair.three_month, three, "runway={runway}");
            assert_eq!(pair.six_month, six, "runway={runway}");
        }
    }

    #[test]
    fn assess_profile_is_idempotent() {
        let profile = sample_profile();
        assert_eq!(assess_profile(&profile), assess_profile(&profile));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_non_positive_income_zeroes_income_ratios(
            income in -1_000_000.0f64..=0.0,
            fixed in -50_000.0f64..500_000.0,
            emi in -50_000.0f64..500_000.0,
            savings in -1_000_000.0f64..10_000_000.0,
            premium in 0.0f64..1_000_000.0
        ) {
            let profile = FinancialProfile {
                monthly_income: income,
                fixed_expenses: fixed,
                total_emi: emi,
                existing_savings: savings,
                insurance_premium: premium,
                ..sample_profile()
            };
            let ratios = calculate_ratios(&profile);
            prop_assert_eq!(ratios.emi_to_income, 0.0);
            prop_assert_eq!(ratios.savings_rate, 0.0);
            prop_assert_eq!(ratios.expense_to_income, 0.0);
            if ratios.total_monthly_outflow <= 0.0 {
                prop_assert_eq!(ratios.runway_months, 0.0);
            }
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(128))]

        #[test]
        fn prop_score_stays_within_bounds(
            emi in -1.0e6f64..1.0e6,
            savings_rate in -1.0e6f64..1.0e6,
            runway in -1.0e6f64..1.0e6,
            expense in -1.0e6f64..1.0e6
        ) {
            let ratios = RatioSet {
                emi_to_income: emi,
                savings_rate,
                runway_months: runway,
                expense_to_income: expense,
                total_monthly_outflow: 1.0,
            };
            let score = compose_score(&ratios);
            prop_assert!((0.0..=100.0).contains(&score));
            prop_assert_eq!(score, score.round());

            let zone = classify_risk_zone(&ratios);
            prop_assert!(RiskZone::ALL.contains(&zone));
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_six_month_risk_never_below_three_month(runway in -10.0f64..40.0) {
            let pair = project_risk(&ratios_with(0.1, runway));
            let rank = |level: RiskLevel| match level {
                RiskLevel::Low => 0,
                RiskLevel::Medium => 1,
                RiskLevel::High => 2,
            };
            prop_assert!(rank(pair.six_month) >= rank(pair.three_month));
        }
    }
}
