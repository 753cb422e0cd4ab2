//! `DataResponse`: the facade-level response envelope, per `spec.md` §3.

use std::time::Duration;

use crate::request::Strategy;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMetadata {
    pub strategy: Strategy,
    pub sources_used: Vec<String>,
    pub confidence: f64,
    pub latency: Duration,
    pub warnings: Vec<String>,
    /// Set when more than one adapter was tried under `failover`.
    pub failover_occurred: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseQuality {
    pub accuracy: f64,
    pub completeness: f64,
    pub freshness: f64,
    pub reliability: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseCompliance {
    pub license_compliant: bool,
    pub attribution_required: bool,
    pub usage_restrictions: Vec<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct DataResponse<T> {
    pub data: T,
    pub metadata: ResponseMetadata,
    pub quality: ResponseQuality,
    pub compliance: ResponseCompliance,
}
