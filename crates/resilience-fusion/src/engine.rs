//! Algorithm selection by `dataType` tag and the warnings the fusion engine
//! attaches to every outcome, per `spec.md` §4.4.

use resilience_types::SourceContribution;

use crate::algorithms::{self, FusionOutput};
use crate::error::FusionError;
use crate::value::FusionValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    WeightedAverage,
    MajorityVote,
    Temporal,
    QualitySelection,
    Ensemble,
}

/// "numerical -> weighted average; categorical/boolean -> weighted majority
/// vote; time-series -> temporal weighting; otherwise -> quality-based
/// single selection; `ensemble` composes the three primary algorithms."
pub fn select_algorithm(data_type: &str) -> Algorithm {
    match data_type.to_ascii_lowercase().as_str() {
        "numerical" | "numeric" | "number" => Algorithm::WeightedAverage,
        "categorical" | "boolean" | "category" => Algorithm::MajorityVote,
        "time-series" | "timeseries" | "temporal" => Algorithm::Temporal,
        "ensemble" => Algorithm::Ensemble,
        _ => Algorithm::QualitySelection,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FusionOutcome {
    pub algorithm: Algorithm,
    pub output: FusionOutput,
    pub confidence: f64,
    pub warnings: Vec<String>,
    pub sources_used: Vec<String>,
}

/// Fuses `contributions` (already filtered to successes by the caller is
/// NOT required: this function filters internally) according to the
/// algorithm selected for `data_type`, then attaches warnings.
pub fn fuse(
    data_type: &str,
    contributions: &[SourceContribution<FusionValue>],
    min_confidence: f64,
) -> Result<FusionOutcome, FusionError> {
    let successes: Vec<&SourceContribution<FusionValue>> = contributions
        .iter()
        .filter(|c| c.is_success() && c.data.as_ref().is_some_and(FusionValue::is_valid))
        .collect();

    if successes.is_empty() {
        return Err(FusionError::NoContributions);
    }

    let algorithm = select_algorithm(data_type);
    let result = match algorithm {
        Algorithm::WeightedAverage => algorithms::weighted_average(&successes)?,
        Algorithm::MajorityVote => algorithms::majority_vote(&successes)?,
        Algorithm::Temporal => algorithms::temporal(&successes)?,
        Algorithm::QualitySelection => algorithms::quality_selection(&successes)?,
        Algorithm::Ensemble => algorithms::ensemble(&successes)?,
    };

    let sources_used: Vec<String> = successes.iter().map(|c| c.source_id.clone()).collect();
    let warnings = build_warnings(&successes, result.confidence, min_confidence);

    Ok(FusionOutcome {
        algorithm,
        output: result.output,
        confidence: result.confidence,
        warnings,
        sources_used,
    })
}

fn build_warnings(
    successes: &[&SourceContribution<FusionValue>],
    confidence: f64,
    min_confidence: f64,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if confidence < min_confidence {
        warnings.push(format!(
            "confidence {confidence:.2} below requested minimum {min_confidence:.2}"
        ));
    }

    if successes.len() == 1 {
        warnings.push("only one source contributed".to_string());
    }

    let avg_latency_ms = successes.iter().map(|c| c.latency.as_secs_f64() * 1000.0).sum::<f64>()
        / successes.len() as f64;
    if avg_latency_ms > 2_000.0 {
        warnings.push(format!("average latency {avg_latency_ms:.0}ms exceeds 2s"));
    }

    let weights: Vec<f64> = successes.iter().map(|c| c.weight).collect();
    let mean_weight = weights.iter().sum::<f64>() / weights.len() as f64;
    let weight_variance =
        weights.iter().map(|w| (w - mean_weight).powi(2)).sum::<f64>() / weights.len() as f64;
    if weight_variance > 0.3 {
        warnings.push(format!("weight variance {weight_variance:.2} exceeds 0.3"));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use resilience_types::ContributionStatus;
    use std::time::Duration;

    fn contribution(source_id: &str, value: f64, latency_ms: u64, weight: f64) -> SourceContribution<FusionValue> {
        SourceContribution {
            source_id: source_id.to_string(),
            status: ContributionStatus::Success,
            data: Some(FusionValue::Number(value)),
            latency: Duration::from_millis(latency_ms),
            confidence: 0.9,
            weight,
        }
    }

    #[test]
    fn two_numeric_sources_weighted_average() {
        let contributions = vec![
            contribution("A", 10.0, 100, 0.97),
            contribution("B", 12.0, 200, 0.82),
        ];
        let outcome = fuse("numerical", &contributions, 0.0).unwrap();
        let value = match outcome.output {
            FusionOutput::Scalar(FusionValue::Number(n)) => n,
            _ => panic!("expected scalar number"),
        };
        assert!(value > 10.0 && value < 12.0);
        assert!(outcome.confidence >= 0.0 && outcome.confidence <= 1.0);
        assert!(!outcome.warnings.iter().any(|w| w.contains("only one source")));
    }

    #[test]
    fn single_source_warns() {
        let contributions = vec![contribution("A", 10.0, 100, 0.9)];
        let outcome = fuse("numerical", &contributions, 0.0).unwrap();
        assert!(outcome.warnings.iter().any(|w| w.contains("only one source")));
    }

    #[test]
    fn algorithm_selection_matches_data_type() {
        assert_eq!(select_algorithm("numerical"), Algorithm::WeightedAverage);
        assert_eq!(select_algorithm("categorical"), Algorithm::MajorityVote);
        assert_eq!(select_algorithm("boolean"), Algorithm::MajorityVote);
        assert_eq!(select_algorithm("time-series"), Algorithm::Temporal);
        assert_eq!(select_algorithm("ensemble"), Algorithm::Ensemble);
        assert_eq!(select_algorithm("anything-else"), Algorithm::QualitySelection);
    }

    #[test]
    fn no_successful_contributions_is_infeasible() {
        let contributions: Vec<SourceContribution<FusionValue>> = vec![];
        assert!(matches!(fuse("numerical", &contributions, 0.0), Err(FusionError::NoContributions)));
    }
}
