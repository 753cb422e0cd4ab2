//! Feed item filter rules: `contains/equals/regex/greater/less` on a named
//! field, case-insensitive unless specified, per `spec.md` §4.7.

use regex::Regex;
use resilience_types::FeedItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Contains,
    Equals,
    Regex,
    GreaterThan,
    LessThan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterRule {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
    pub case_sensitive: bool,
}

impl FilterRule {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        Self { field: field.into(), op, value: value.into(), case_sensitive: false }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Returns `true` if `item` satisfies this rule. A field that doesn't
    /// resolve on the item (e.g. `author` on an item with none) never
    /// matches.
    pub fn matches(&self, item: &FeedItem) -> bool {
        let Some(field_value) = field_value(item, &self.field) else {
            return false;
        };

        match self.op {
            FilterOp::Contains => self.normalize(&field_value).contains(&self.normalize(&self.value)),
            FilterOp::Equals => self.normalize(&field_value) == self.normalize(&self.value),
            FilterOp::Regex => Regex::new(&self.value).is_ok_and(|re| re.is_match(&field_value)),
            FilterOp::GreaterThan => numeric_compare(&field_value, &self.value, |a, b| a > b),
            FilterOp::LessThan => numeric_compare(&field_value, &self.value, |a, b| a < b),
        }
    }

    fn normalize(&self, s: &str) -> String {
        if self.case_sensitive {
            s.to_string()
        } else {
            s.to_ascii_lowercase()
        }
    }
}

fn numeric_compare(field_value: &str, rule_value: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (field_value.trim().parse::<f64>(), rule_value.trim().parse::<f64>()) {
        (Ok(a), Ok(b)) => cmp(a, b),
        _ => false,
    }
}

pub fn field_value(item: &FeedItem, field: &str) -> Option<String> {
    match field {
        "id" => Some(item.id.clone()),
        "title" => Some(item.title.clone()),
        "link" => Some(item.link.clone()),
        "description" => Some(item.description.clone()),
        "source" => Some(item.source.clone()),
        "content" => item.content.clone(),
        "author" => item.author.clone(),
        "pubDate" | "pub_date" => item.pub_date.map(|d| d.to_rfc3339()),
        "tags" => Some(item.tags.join(",")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> FeedItem {
        FeedItem {
            id: "1".into(),
            title: "Solar Capacity Reaches Record High".into(),
            link: "https://example.com/1".into(),
            description: "desc".into(),
            pub_date: None,
            source: "energy-news".into(),
            tags: vec!["solar".into()],
            content: None,
            author: None,
        }
    }

    #[test]
    fn contains_is_case_insensitive_by_default() {
        let rule = FilterRule::new("title", FilterOp::Contains, "SOLAR");
        assert!(rule.matches(&item()));
    }

    #[test]
    fn case_sensitive_contains_fails_on_mismatch() {
        let rule = FilterRule::new("title", FilterOp::Contains, "SOLAR").case_sensitive(true);
        assert!(!rule.matches(&item()));
    }

    #[test]
    fn missing_field_never_matches() {
        let rule = FilterRule::new("author", FilterOp::Equals, "anyone");
        assert!(!rule.matches(&item()));
    }

    #[test]
    fn regex_matches_pattern() {
        let rule = FilterRule::new("title", FilterOp::Regex, r"Record\s+High");
        assert!(rule.matches(&item()));
    }
}
