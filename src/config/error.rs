//! Configuration error types.

use thiserror::Error;

/// Rejected scorecard configuration. The previously active configuration
/// stays in effect when an update fails with one of these.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Factor weights must sum to 100 (± tolerance).
    #[error("factor weights must sum to 100, got {actual}")]
    WeightSum { actual: f64 },

    #[error("weight for '{factor}' must be a finite non-negative number, got {value}")]
    InvalidWeight { factor: &'static str, value: f64 },

    #[error("approval threshold must be in [0,100], got {value}")]
    ThresholdOutOfRange { value: f64 },

    #[error("score range table for '{factor}' is empty")]
    EmptyRangeTable { factor: &'static str },

    #[error("score range for '{factor}' is inverted or NaN: [{min}, {max}]")]
    InvertedRange {
        factor: &'static str,
        min: f64,
        max: f64,
    },

    #[error("points for '{factor}' must be in [0,100], got {points}")]
    PointsOutOfRange { factor: &'static str, points: f64 },

    #[error("categorical points for '{factor}' must be in [0,100], got {points}")]
    CategoricalPointsOutOfRange { factor: &'static str, points: f64 },

    #[error("at least one rate band is required")]
    NoRateBands,

    #[error("rate band '{label}' has inverted or NaN bounds")]
    InvertedBand { label: String },

    #[error("rate band '{label}' has an invalid annual rate {rate}")]
    NegativeRate { label: String, rate: f64 },

    #[error("rate bands must be sorted ascending by min score (band '{label}' is out of order)")]
    BandsNotSorted { label: String },

    /// Bands must cover [0,100] from the bottom.
    #[error("first rate band must start at score 0, got {actual}")]
    BandsMustStartAtZero { actual: f64 },

    /// Bands must cover [0,100] up to the top.
    #[error("last rate band must end at score 100, got {actual}")]
    BandsMustEndAtHundred { actual: f64 },

    #[error("rate bands '{lower}' and '{upper}' overlap")]
    BandOverlap { lower: String, upper: String },

    #[error("gap between rate bands '{lower}' and '{upper}'")]
    BandGap { lower: String, upper: String },
}
