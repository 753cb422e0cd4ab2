//! Converts an adapter's free-form `serde_json::Value` payload into the
//! fusion engine's typed [`FusionValue`], per `spec.md` §4.4's algorithm
//! selection by `dataType`.

use chrono::{DateTime, Utc};
use resilience_fusion::{FusionValue, SeriesPoint};
use serde_json::Value;

pub fn to_fusion_value(data_type: &str, value: &Value) -> Option<FusionValue> {
    match data_type.to_ascii_lowercase().as_str() {
        "numerical" | "numeric" | "number" => value.as_f64().map(FusionValue::Number),
        "categorical" | "boolean" | "category" => match value {
            Value::String(s) => Some(FusionValue::Category(s.clone())),
            Value::Bool(b) => Some(FusionValue::Category(b.to_string())),
            other => other.as_str().map(|s| FusionValue::Category(s.to_string())),
        },
        "time-series" | "timeseries" | "temporal" => {
            let points = value.as_array()?.iter().filter_map(series_point).collect::<Vec<_>>();
            if points.is_empty() {
                None
            } else {
                Some(FusionValue::Series(points))
            }
        }
        _ => {
            if let Some(n) = value.as_f64() {
                Some(FusionValue::Number(n))
            } else if let Some(s) = value.as_str() {
                Some(FusionValue::Category(s.to_string()))
            } else {
                None
            }
        }
    }
}

fn series_point(entry: &Value) -> Option<SeriesPoint> {
    let timestamp = entry.get("timestamp")?.as_str()?;
    let timestamp: DateTime<Utc> = timestamp.parse().ok()?;
    let value = entry.get("value")?.as_f64()?;
    Some(SeriesPoint { timestamp, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_conversion() {
        assert_eq!(to_fusion_value("numerical", &json!(42.5)), Some(FusionValue::Number(42.5)));
    }

    #[test]
    fn categorical_conversion() {
        assert_eq!(
            to_fusion_value("categorical", &json!("sunny")),
            Some(FusionValue::Category("sunny".to_string()))
        );
    }

    #[test]
    fn unparseable_series_entry_is_dropped() {
        let series = json!([{"timestamp": "2024-01-01T00:00:00Z", "value": 1.0}, {"bogus": true}]);
        match to_fusion_value("time-series", &series) {
            Some(FusionValue::Series(points)) => assert_eq!(points.len(), 1),
            other => panic!("expected one valid series point, got {other:?}"),
        }
    }
}
