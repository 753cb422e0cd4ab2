//! Extracted-field validation rules, per `spec.md` §4.8 step 6.

use regex::Regex;

#[derive(Debug, Clone)]
pub enum ValidationRule {
    Required { field: String },
    Pattern { field: String, regex: String },
    Range { field: String, min: f64, max: f64 },
    Custom { field: String, description: String, check: fn(&str) -> bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct RuleViolation {
    pub field: String,
    pub severity: RuleSeverity,
    pub message: String,
}

impl ValidationRule {
    pub fn field(&self) -> &str {
        match self {
            ValidationRule::Required { field }
            | ValidationRule::Pattern { field, .. }
            | ValidationRule::Range { field, .. }
            | ValidationRule::Custom { field, .. } => field,
        }
    }

    /// Evaluates this rule against the extracted value for its field. A
    /// `required` miss is an error; `pattern`/`range`/`custom` misses are
    /// warnings, per spec §4.8 step 6. Returns `None` when the rule is
    /// satisfied, or not applicable (e.g. a non-required rule on a field
    /// that was never extracted).
    pub fn evaluate(&self, value: Option<&str>) -> Option<RuleViolation> {
        match self {
            ValidationRule::Required { field } => {
                let missing = value.map(|v| v.trim().is_empty()).unwrap_or(true);
                missing.then(|| RuleViolation {
                    field: field.clone(),
                    severity: RuleSeverity::Error,
                    message: format!("required field `{field}` is missing"),
                })
            }
            ValidationRule::Pattern { field, regex } => {
                let value = value?;
                let re = Regex::new(regex).ok()?;
                (!re.is_match(value)).then(|| RuleViolation {
                    field: field.clone(),
                    severity: RuleSeverity::Warning,
                    message: format!("field `{field}` does not match pattern `{regex}`"),
                })
            }
            ValidationRule::Range { field, min, max } => {
                let parsed: f64 = value?.parse().ok()?;
                (parsed < *min || parsed > *max).then(|| RuleViolation {
                    field: field.clone(),
                    severity: RuleSeverity::Warning,
                    message: format!("field `{field}` = {parsed} is outside [{min}, {max}]"),
                })
            }
            ValidationRule::Custom { field, description, check } => {
                let value = value?;
                (!check(value)).then(|| RuleViolation {
                    field: field.clone(),
                    severity: RuleSeverity::Warning,
                    message: format!("field `{field}` failed custom check: {description}"),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_miss_is_an_error() {
        let rule = ValidationRule::Required { field: "price".to_string() };
        let violation = rule.evaluate(None).unwrap();
        assert_eq!(violation.severity, RuleSeverity::Error);
    }

    #[test]
    fn pattern_miss_is_a_warning() {
        let rule = ValidationRule::Pattern { field: "sku".to_string(), regex: r"^[A-Z]{3}-\d+$".to_string() };
        let violation = rule.evaluate(Some("nope")).unwrap();
        assert_eq!(violation.severity, RuleSeverity::Warning);
        assert!(rule.evaluate(Some("ABC-123")).is_none());
    }

    #[test]
    fn range_miss_is_a_warning() {
        let rule = ValidationRule::Range { field: "price".to_string(), min: 0.0, max: 100.0 };
        let violation = rule.evaluate(Some("150")).unwrap();
        assert_eq!(violation.severity, RuleSeverity::Warning);
        assert!(rule.evaluate(Some("50")).is_none());
    }

    #[test]
    fn custom_rule_runs_the_supplied_predicate() {
        let rule = ValidationRule::Custom {
            field: "title".to_string(),
            description: "must not be empty".to_string(),
            check: |v| !v.is_empty(),
        };
        assert!(rule.evaluate(Some("")).is_some());
        assert!(rule.evaluate(Some("ok")).is_none());
    }
}
