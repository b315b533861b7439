use std::time::Instant;

use parking_lot::RwLock;
use tracing::debug;

use crate::config::{ConfigError, ScoreRange, ScoringConfig};
use crate::model::finance::{amortized_monthly_payment, post_loan_debt_ratio_pct, round1};
use crate::model::{
    ClientProfile, Decision, EvaluationResult, FactorBreakdown, FactorDetail, ValidationError,
};

use super::{HIGH_DEBT_RATIO_PCT, WEAK_FACTOR_MARK};

/// Weighted-factor scorecard engine.
///
/// Constructed once with a validated configuration and passed by handle into
/// the orchestrator; configuration changes go through
/// [`update_config`](Self::update_config), which re-validates and leaves the
/// active configuration untouched on rejection.
pub struct ScorecardEngine {
    config: RwLock<ScoringConfig>,
}

impl ScorecardEngine {
    /// Creates an engine from a configuration, rejecting an invalid one.
    pub fn new(config: ScoringConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: RwLock::new(config),
        })
    }

    /// Creates an engine with the default scorecard tables.
    pub fn with_defaults() -> Self {
        Self::new(ScoringConfig::default()).expect("default configuration is valid")
    }

    /// Returns a snapshot of the active configuration.
    pub fn config(&self) -> ScoringConfig {
        self.config.read().clone()
    }

    /// Replaces the configuration after re-validation. On error the active
    /// configuration is unchanged.
    pub fn update_config(&self, config: ScoringConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.config.write() = config;
        debug!("scorecard configuration updated");
        Ok(())
    }

    /// Evaluates a profile against the active configuration.
    pub fn evaluate(&self, profile: &ClientProfile) -> Result<EvaluationResult, ValidationError> {
        let started = Instant::now();
        profile.validate()?;

        let config = self.config.read().clone();

        let age_points = score_range(f64::from(profile.age), &config.age_ranges);
        let income_points = score_range(profile.monthly_income, &config.income_ranges);

        let debt_ratio = profile.total_debt / profile.monthly_income;
        let debt_points = score_range(debt_ratio, &config.debt_ratio_ranges);

        let history_points = match profile.credit_history {
            crate::model::CreditHistory::Good => config.history_points.good,
            crate::model::CreditHistory::Fair => config.history_points.fair,
            crate::model::CreditHistory::Poor => config.history_points.poor,
        };
        let employment_points = if profile.stable_employment {
            config.employment_points.stable
        } else {
            config.employment_points.unstable
        };

        let weights = &config.weights;
        let total_score = age_points * weights.age / 100.0
            + income_points * weights.income / 100.0
            + debt_points * weights.debt / 100.0
            + history_points * weights.history / 100.0
            + employment_points * weights.employment / 100.0;

        // validation guarantees the bands cover [0,100], so selection is total
        let band = config
            .band_for(total_score)
            .expect("validated rate bands cover [0,100]")
            .clone();

        let monthly_payment =
            amortized_monthly_payment(profile.requested_amount, band.annual_rate, profile.term_months);
        let debt_ratio_pct = post_loan_debt_ratio_pct(
            monthly_payment,
            profile.total_debt,
            profile.term_months,
            profile.monthly_income,
        );

        let decision = if total_score >= config.approval_threshold {
            Decision::Approved
        } else {
            Decision::Rejected
        };

        let factors = FactorBreakdown {
            age: factor_detail(profile.age.to_string(), age_points, weights.age),
            income: factor_detail(
                profile.monthly_income.to_string(),
                income_points,
                weights.income,
            ),
            debt_ratio: factor_detail(format!("{debt_ratio:.2}"), debt_points, weights.debt),
            history: factor_detail(
                profile.credit_history.label().to_string(),
                history_points,
                weights.history,
            ),
            employment: factor_detail(
                if profile.stable_employment { "Yes" } else { "No" }.to_string(),
                employment_points,
                weights.employment,
            ),
        };

        let explanation = build_explanation(
            &factors,
            total_score,
            decision,
            &band.label,
            band.annual_rate,
            debt_ratio,
            debt_ratio_pct,
            config.approval_threshold,
        );

        let latency_ms = started.elapsed().as_millis() as u64;

        debug!(
            total_score,
            band = %band.label,
            decision = %decision,
            latency_ms,
            "scorecard evaluation complete"
        );

        Ok(EvaluationResult {
            decision,
            total_score,
            annual_rate: band.annual_rate,
            band: Some(band.label),
            monthly_payment,
            debt_ratio_pct,
            explanation,
            factors: Some(factors),
            key_factors: vec![],
            latency_ms,
            similar_cases: None,
        })
    }
}

/// First interval containing `value` wins, in declared order. No interval
/// matching is an explicit 0-point fallback, not a silent coercion.
fn score_range(value: f64, ranges: &[ScoreRange]) -> f64 {
    ranges
        .iter()
        .find(|range| range.contains(value))
        .map(|range| range.points)
        .unwrap_or(0.0)
}

fn factor_detail(value: String, points: f64, weight: f64) -> FactorDetail {
    FactorDetail {
        value,
        points,
        weight,
        contribution: round1(points * weight / 100.0),
    }
}

#[allow(clippy::too_many_arguments)]
fn build_explanation(
    factors: &FactorBreakdown,
    total_score: f64,
    decision: Decision,
    band_label: &str,
    annual_rate: f64,
    debt_ratio: f64,
    debt_ratio_pct: f64,
    threshold: f64,
) -> String {
    let mut text = String::from("SCORECARD EVALUATION\n\n");

    text.push_str(&format!("Total score: {total_score:.1}/100\n"));
    text.push_str(&format!("Risk class: {band_label}\n"));
    text.push_str(&format!(
        "Assigned rate: {:.1}% annual\n\n",
        annual_rate * 100.0
    ));

    text.push_str("FACTOR SCORES:\n");
    text.push_str(&format!("- Age: {:.0}/100\n", factors.age.points));
    text.push_str(&format!("- Income: {:.0}/100\n", factors.income.points));
    text.push_str(&format!(
        "- Debt-to-income ratio ({:.1}%): {:.0}/100\n",
        debt_ratio * 100.0,
        factors.debt_ratio.points
    ));
    text.push_str(&format!(
        "- Credit history: {:.0}/100\n",
        factors.history.points
    ));
    text.push_str(&format!(
        "- Employment stability: {:.0}/100\n\n",
        factors.employment.points
    ));

    text.push_str("ANALYSIS:\n");
    match decision {
        Decision::Approved => {
            text.push_str("The applicant meets the minimum required score.\n");
            text.push_str(&format!("Projected debt ratio: {debt_ratio_pct:.1}%\n"));
            if debt_ratio_pct > HIGH_DEBT_RATIO_PCT {
                text.push_str(
                    "Warning: the projected debt ratio is high. Consider a lower amount or a longer term.\n",
                );
            }
        }
        Decision::Rejected => {
            text.push_str(&format!(
                "The applicant does NOT meet the minimum required score ({threshold:.0} points).\n"
            ));

            let weak = weak_areas(factors);
            if !weak.is_empty() {
                text.push_str(&format!("Weak areas: {}\n", weak.join(", ")));
            }
        }
    }

    text
}

fn weak_areas(factors: &FactorBreakdown) -> Vec<&'static str> {
    let checks = [
        (factors.age.points, "age"),
        (factors.income.points, "income"),
        (factors.debt_ratio.points, "debt level"),
        (factors.history.points, "credit history"),
        (factors.employment.points, "employment stability"),
    ];

    checks
        .into_iter()
        .filter(|(points, _)| *points < WEAK_FACTOR_MARK)
        .map(|(_, name)| name)
        .collect()
}
