//! `DataRequest`: the facade-level request envelope, per `spec.md` §3.

use std::collections::HashMap;
use std::time::Duration;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    PrimaryOnly,
    Failover,
    Fusion,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceFilters {
    pub required: Vec<String>,
    pub excluded: Vec<String>,
    pub preferred: Vec<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityRequirements {
    pub min_confidence: f64,
    pub max_latency: Duration,
    pub require_fresh_data: bool,
}

impl Default for QualityRequirements {
    fn default() -> Self {
        Self {
            min_confidence: 0.0,
            max_latency: Duration::from_millis(10_000),
            require_fresh_data: false,
        }
    }
}

/// Advisory only, per the open-question resolution in `spec.md` §9: cost
/// estimation/budgets surface as warnings, never as a gate.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Budget {
    pub max_cost: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct DataRequest {
    pub data_type: String,
    pub parameters: HashMap<String, String>,
    pub strategy: Strategy,
    pub sources: SourceFilters,
    pub quality: QualityRequirements,
    pub budget: Option<Budget>,
}

impl DataRequest {
    pub fn new(data_type: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            data_type: data_type.into(),
            parameters: HashMap::new(),
            strategy,
            sources: SourceFilters::default(),
            quality: QualityRequirements::default(),
            budget: None,
        }
    }

    pub fn with_required(mut self, ids: Vec<String>) -> Self {
        self.sources.required = ids;
        self
    }

    pub fn with_excluded(mut self, ids: Vec<String>) -> Self {
        self.sources.excluded = ids;
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.quality.min_confidence = min_confidence;
        self
    }

    pub fn with_max_latency(mut self, max_latency: Duration) -> Self {
        self.quality.max_latency = max_latency;
        self
    }
}
