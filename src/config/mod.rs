//! Scorecard configuration: factor weights, score range tables, rate bands
//! and the approval threshold.
//!
//! A [`ScoringConfig`] is validated on construction and on every update
//! (see [`ScorecardEngine::update_config`](crate::scorecard::ScorecardEngine::update_config));
//! an invalid configuration is rejected before it can affect scoring.

pub mod error;


pub use error::ConfigError;

use serde::{Deserialize, Serialize};

/// Weights must sum to 100 within this tolerance.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.1;

/// Adjacent closed rate bands may leave at most this seam between the upper
/// bound of one band and the lower bound of the next (the integer-boundary
/// convention: `0-49`, `50-59`, ...).
pub const MAX_BAND_SEAM: f64 = 1.0;

/// Scoring interval for a numeric factor: the first interval containing the
/// value wins, in declared order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
    pub points: f64,
}

impl ScoreRange {
    pub fn new(min: f64, max: f64, points: f64) -> Self {
        Self { min, max, points }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Score interval mapped to an annual rate and a risk label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateBand {
    pub min_score: f64,
    pub max_score: f64,
    /// Annual rate as a fraction (`0.12` = 12%).
    pub annual_rate: f64,
    pub label: String,
}

impl RateBand {
    pub fn new(min_score: f64, max_score: f64, annual_rate: f64, label: &str) -> Self {
        Self {
            min_score,
            max_score,
            annual_rate,
            label: label.to_string(),
        }
    }
}

/// Per-factor weights, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    pub age: f64,
    pub income: f64,
    pub debt: f64,
    pub history: f64,
    pub employment: f64,
}

impl FactorWeights {
    pub fn sum(&self) -> f64 {
        self.age + self.income + self.debt + self.history + self.employment
    }

    fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("age", self.age),
            ("income", self.income),
            ("debt", self.debt),
            ("history", self.history),
            ("employment", self.employment),
        ]
    }
}

/// Exact-match score table for the credit history category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoints {
    pub good: f64,
    pub fair: f64,
    pub poor: f64,
}

/// Exact-match score table for employment stability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentPoints {
    pub stable: f64,
    pub unstable: f64,
}

/// Full scorecard configuration.
///
/// `rate_bands` must be sorted ascending by `min_score` and partition
/// `[0,100]`: no overlaps, no seam wider than [`MAX_BAND_SEAM`]. Band
/// selection is therefore total — there is no last-band fallback to mask a
/// misconfigured table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: FactorWeights,
    pub age_ranges: Vec<ScoreRange>,
    pub income_ranges: Vec<ScoreRange>,
    pub debt_ratio_ranges: Vec<ScoreRange>,
    pub history_points: HistoryPoints,
    pub employment_points: EmploymentPoints,
    pub rate_bands: Vec<RateBand>,
    /// Approved iff total score >= threshold. In [0,100].
    pub approval_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: FactorWeights {
                age: 15.0,
                income: 25.0,
                debt: 20.0,
                history: 25.0,
                employment: 15.0,
            },
            age_ranges: vec![
                ScoreRange::new(18.0, 25.0, 60.0),
                ScoreRange::new(26.0, 35.0, 100.0),
                ScoreRange::new(36.0, 50.0, 90.0),
                ScoreRange::new(51.0, 65.0, 70.0),
                ScoreRange::new(66.0, 100.0, 40.0),
            ],
            income_ranges: vec![
                ScoreRange::new(0.0, 1500.0, 40.0),
                ScoreRange::new(1501.0, 3000.0, 70.0),
                ScoreRange::new(3001.0, 5000.0, 90.0),
                ScoreRange::new(5001.0, f64::INFINITY, 100.0),
            ],
            debt_ratio_ranges: vec![
                ScoreRange::new(0.0, 0.3, 100.0),
                ScoreRange::new(0.3, 0.5, 80.0),
                ScoreRange::new(0.5, 0.7, 60.0),
                ScoreRange::new(0.7, f64::INFINITY, 30.0),
            ],
            history_points: HistoryPoints {
                good: 100.0,
                fair: 60.0,
                poor: 20.0,
            },
            employment_points: EmploymentPoints {
                stable: 100.0,
                unstable: 40.0,
            },
            rate_bands: vec![
                RateBand::new(0.0, 49.0, 0.25, "B - High Risk"),
                RateBand::new(50.0, 59.0, 0.22, "BB - Moderate"),
                RateBand::new(60.0, 69.0, 0.18, "BBB - Acceptable"),
                RateBand::new(70.0, 79.0, 0.15, "A - Good"),
                RateBand::new(80.0, 89.0, 0.12, "AA - Very Good"),
                RateBand::new(90.0, 100.0, 0.10, "AAA - Excellent"),
            ],
            approval_threshold: 60.0,
        }
    }
}

impl ScoringConfig {
    /// Validates every invariant. Called on construction and on update.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_weights()?;
        self.validate_threshold()?;
        self.validate_ranges("age", &self.age_ranges)?;
        self.validate_ranges("income", &self.income_ranges)?;
        self.validate_ranges("debt_ratio", &self.debt_ratio_ranges)?;
        self.validate_categorical()?;
        self.validate_bands()
    }

    /// Selects the rate band containing `score`, scanning ascending.
    ///
    /// On a validated config this is total for any `score` in [0,100]; a
    /// fractional score landing on the seam between two integer-bounded
    /// bands resolves to the higher band.
    pub fn band_for(&self, score: f64) -> Option<&RateBand> {
        self.rate_bands.iter().find(|band| score <= band.max_score)
    }

    fn validate_weights(&self) -> Result<(), ConfigError> {
        for (factor, value) in self.weights.entries() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { factor, value });
            }
        }

        let sum = self.weights.sum();
        if (sum - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum { actual: sum });
        }

        Ok(())
    }

    fn validate_threshold(&self) -> Result<(), ConfigError> {
        let t = self.approval_threshold;
        if !t.is_finite() || !(0.0..=100.0).contains(&t) {
            return Err(ConfigError::ThresholdOutOfRange { value: t });
        }
        Ok(())
    }

    fn validate_ranges(
        &self,
        factor: &'static str,
        ranges: &[ScoreRange],
    ) -> Result<(), ConfigError> {
        if ranges.is_empty() {
            return Err(ConfigError::EmptyRangeTable { factor });
        }

        for range in ranges {
            if range.min.is_nan() || range.max.is_nan() || range.min > range.max {
                return Err(ConfigError::InvertedRange {
                    factor,
                    min: range.min,
                    max: range.max,
                });
            }
            if !range.points.is_finite() || !(0.0..=100.0).contains(&range.points) {
                return Err(ConfigError::PointsOutOfRange {
                    factor,
                    points: range.points,
                });
            }
        }

        Ok(())
    }

    fn validate_categorical(&self) -> Result<(), ConfigError> {
        let tables = [
            ("history.good", self.history_points.good),
            ("history.fair", self.history_points.fair),
            ("history.poor", self.history_points.poor),
            ("employment.stable", self.employment_points.stable),
            ("employment.unstable", self.employment_points.unstable),
        ];

        for (factor, points) in tables {
            if !points.is_finite() || !(0.0..=100.0).contains(&points) {
                return Err(ConfigError::CategoricalPointsOutOfRange { factor, points });
            }
        }

        Ok(())
    }

    fn validate_bands(&self) -> Result<(), ConfigError> {
        let bands = &self.rate_bands;
        if bands.is_empty() {
            return Err(ConfigError::NoRateBands);
        }

        for band in bands {
            if band.min_score.is_nan() || band.max_score.is_nan() || band.min_score > band.max_score
            {
                return Err(ConfigError::InvertedBand {
                    label: band.label.clone(),
                });
            }
            if !band.annual_rate.is_finite() || band.annual_rate < 0.0 {
                return Err(ConfigError::NegativeRate {
                    label: band.label.clone(),
                    rate: band.annual_rate,
                });
            }
        }

        // first band must anchor at 0, last band must reach 100
        let first = &bands[0];
        if first.min_score != 0.0 {
            return Err(ConfigError::BandsMustStartAtZero {
                actual: first.min_score,
            });
        }
        let last = &bands[bands.len() - 1];
        if last.max_score != 100.0 {
            return Err(ConfigError::BandsMustEndAtHundred {
                actual: last.max_score,
            });
        }

        for pair in bands.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            if upper.min_score < lower.min_score {
                return Err(ConfigError::BandsNotSorted {
                    label: upper.label.clone(),
                });
            }
            if upper.min_score <= lower.max_score {
                return Err(ConfigError::BandOverlap {
                    lower: lower.label.clone(),
                    upper: upper.label.clone(),
                });
            }
            if upper.min_score - lower.max_score > MAX_BAND_SEAM {
                return Err(ConfigError::BandGap {
                    lower: lower.label.clone(),
                    upper: upper.label.clone(),
                });
            }
        }

        Ok(())
    }
}
