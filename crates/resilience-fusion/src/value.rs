//! The free-form value shapes the fusion engine knows how to combine.
//! `spec.md`'s `data` field is deliberately free-form; the fusion engine
//! only needs to distinguish numeric, categorical, and time-series shapes to
//! pick an algorithm.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum FusionValue {
    Number(f64),
    Category(String),
    Series(Vec<SeriesPoint>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl FusionValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FusionValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            FusionValue::Category(c) => Some(c.as_str()),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&[SeriesPoint]> {
        match self {
            FusionValue::Series(points) => Some(points),
            _ => None,
        }
    }

    /// "Numerical results must be finite numbers; categorical/temporal must
    /// be non-null (and array of length >= 1 for temporal)."
    pub fn is_valid(&self) -> bool {
        match self {
            FusionValue::Number(n) => n.is_finite(),
            FusionValue::Category(_) => true,
            FusionValue::Series(points) => !points.is_empty(),
        }
    }
}
