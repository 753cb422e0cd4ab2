//! Shared data model for the data source resilience core: `SourceConfig`,
//! `DataRequest`/`DataResponse`, `SourceContribution`, `SourceMetrics`,
//! `Incident`, `FeedItem`, and `RobotsRules`, per `spec.md` §3.
//!
//! These are plain values, not owned by any one component: each is
//! constructed by one component and read by others by value, matching the
//! ownership rule in `spec.md` §3 ("cross-component communication is by
//! value or via narrow read-only accessors").

mod adapter;
mod contribution;
mod feed;
mod metrics;
mod request;
mod response;
mod robots;
mod source;

pub use adapter::{AdapterFailure, AdapterSuccess, SourceAdapter};
pub use contribution::{ContributionStatus, SourceContribution};
pub use feed::FeedItem;
pub use metrics::{Incident, IncidentType, PerformancePoint, QualityAssessment, Severity, SourceMetrics};
pub use request::{Budget, DataRequest, QualityRequirements, SourceFilters, Strategy};
pub use response::{DataResponse, ResponseCompliance, ResponseMetadata, ResponseQuality};
pub use robots::{RobotsRules, UserAgentRules};
pub use source::{Authentication, ComplianceProfile, QualityBaseline, RetryPolicy, SourceConfig, SourceConfigBuilder};
