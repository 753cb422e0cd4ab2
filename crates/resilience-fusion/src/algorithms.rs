//! The four primary fusion algorithms plus ensemble composition, per
//! `spec.md` §4.4.

use resilience_types::SourceContribution;
use std::collections::HashMap;

use crate::error::FusionError;
use crate::value::{FusionValue, SeriesPoint};

/// Per the open question in `spec.md` §9: the source mixes flattening and
/// weight-sorting for temporal fusion with unclear semantics. This
/// implementation treats the output as an unordered set of items annotated
/// with `source_id`/`weight`, leaving merge policy to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalContribution {
    pub source_id: String,
    pub weight: f64,
    pub point: SeriesPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FusionOutput {
    Scalar(FusionValue),
    Temporal(Vec<TemporalContribution>),
}

pub struct AlgorithmResult {
    pub output: FusionOutput,
    pub confidence: f64,
}

fn mean_and_stddev(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// `0.3*min(1, N/3) + 0.4*avgWeight + 0.3*agreement`, `agreement = max(0, 1
/// - stddev/|mean|)`.
pub fn weighted_average(
    successes: &[&SourceContribution<FusionValue>],
) -> Result<AlgorithmResult, FusionError> {
    let values: Vec<f64> = successes
        .iter()
        .map(|c| c.data.as_ref().and_then(FusionValue::as_number))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| FusionError::Infeasible { reason: "non-numeric contribution for weighted_average".into() })?;

    if !values.iter().all(|v| v.is_finite()) {
        return Err(FusionError::Infeasible { reason: "non-finite numeric contribution".into() });
    }

    let weights: Vec<f64> = successes.iter().map(|c| c.weight).collect();
    let total_weight: f64 = weights.iter().sum();
    let weighted_value = values.iter().zip(&weights).map(|(v, w)| v * w).sum::<f64>() / total_weight;

    let n = values.len() as f64;
    let avg_weight = total_weight / n;
    let (mean, stddev) = mean_and_stddev(&values);
    let agreement = if mean.abs() < f64::EPSILON {
        if stddev < f64::EPSILON { 1.0 } else { 0.0 }
    } else {
        (1.0 - stddev / mean.abs()).max(0.0)
    };

    let confidence = 0.3 * (n / 3.0).min(1.0) + 0.4 * avg_weight + 0.3 * agreement;

    Ok(AlgorithmResult {
        output: FusionOutput::Scalar(FusionValue::Number(weighted_value)),
        confidence: confidence.clamp(0.0, 1.0),
    })
}

/// `maxWeightedVotes / totalWeight`.
pub fn majority_vote(
    successes: &[&SourceContribution<FusionValue>],
) -> Result<AlgorithmResult, FusionError> {
    let mut tallies: HashMap<String, f64> = HashMap::new();
    let mut total_weight = 0.0;

    for contribution in successes {
        let category = contribution
            .data
            .as_ref()
            .and_then(FusionValue::as_category)
            .ok_or_else(|| FusionError::Infeasible { reason: "non-categorical contribution for majority_vote".into() })?;
        *tallies.entry(category.to_string()).or_insert(0.0) += contribution.weight;
        total_weight += contribution.weight;
    }

    let (winner, winner_weight) = tallies
        .into_iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .ok_or_else(|| FusionError::Infeasible { reason: "no contributions for majority_vote".into() })?;

    let confidence = if total_weight > 0.0 { winner_weight / total_weight } else { 0.0 };

    Ok(AlgorithmResult {
        output: FusionOutput::Scalar(FusionValue::Category(winner)),
        confidence: confidence.clamp(0.0, 1.0),
    })
}

/// Picks the single highest-quality contribution (`confidence` doubling as
/// the per-contribution quality score); "confidence = quality score of
/// chosen source."
pub fn quality_selection(
    successes: &[&SourceContribution<FusionValue>],
) -> Result<AlgorithmResult, FusionError> {
    let chosen = successes
        .iter()
        .max_by(|a, b| a.confidence.partial_cmp(&b.confidence).unwrap_or(std::cmp::Ordering::Equal))
        .ok_or_else(|| FusionError::Infeasible { reason: "no contributions for quality_selection".into() })?;

    let data = chosen.data.clone().ok_or_else(|| FusionError::Infeasible { reason: "chosen source has no data".into() })?;

    Ok(AlgorithmResult {
        output: FusionOutput::Scalar(data),
        confidence: chosen.confidence.clamp(0.0, 1.0),
    })
}

/// `0.7*avgWeight + 0.3*min(1, N/5)`. Output is the unordered, annotated set
/// described in the open-question resolution above.
pub fn temporal(
    successes: &[&SourceContribution<FusionValue>],
) -> Result<AlgorithmResult, FusionError> {
    let mut items = Vec::new();
    for contribution in successes {
        let points = contribution
            .data
            .as_ref()
            .and_then(FusionValue::as_series)
            .ok_or_else(|| FusionError::Infeasible { reason: "non-series contribution for temporal fusion".into() })?;
        if points.is_empty() {
            return Err(FusionError::Infeasible { reason: "empty series contribution".into() });
        }
        for point in points {
            items.push(TemporalContribution {
                source_id: contribution.source_id.clone(),
                weight: contribution.weight,
                point: *point,
            });
        }
    }

    let n = successes.len() as f64;
    let total_weight: f64 = successes.iter().map(|c| c.weight).sum();
    let avg_weight = total_weight / n;
    let confidence = 0.7 * avg_weight + 0.3 * (n / 5.0).min(1.0);

    Ok(AlgorithmResult {
        output: FusionOutput::Temporal(items),
        confidence: confidence.clamp(0.0, 1.0),
    })
}

/// Composes the three primary algorithms: weighted average for numeric
/// data, highest-confidence pick otherwise.
pub fn ensemble(
    successes: &[&SourceContribution<FusionValue>],
) -> Result<AlgorithmResult, FusionError> {
    let all_numeric = successes.iter().all(|c| matches!(c.data, Some(FusionValue::Number(_))));
    if all_numeric {
        return weighted_average(successes);
    }

    let all_categorical = successes.iter().all(|c| matches!(c.data, Some(FusionValue::Category(_))));
    if all_categorical {
        return majority_vote(successes);
    }

    quality_selection(successes)
}
