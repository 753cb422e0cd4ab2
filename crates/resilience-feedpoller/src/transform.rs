//! Transformation chain applied to a feed item in declared order:
//! `filter`, `map`, `validate`, `enrich`, per `spec.md` §4.7.

use resilience_types::FeedItem;

use crate::filter::FilterRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapOp {
    Uppercase,
    Lowercase,
    Trim,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Drops the item silently if the rule doesn't match.
    Filter(FilterRule),
    /// Rewrites a field's textual value in place.
    Map { field: String, op: MapOp },
    /// Like `Filter`, but a non-match counts as a poll error rather than a
    /// silent drop.
    Validate(FilterRule),
    /// Appends a static tag to the item.
    Enrich { tag: String },
}

/// The result of running an item through the transform chain.
pub enum TransformOutcome {
    Kept(FeedItem),
    Dropped,
    Invalid,
}

pub fn apply(mut item: FeedItem, transforms: &[Transform]) -> TransformOutcome {
    for transform in transforms {
        match transform {
            Transform::Filter(rule) => {
                if !rule.matches(&item) {
                    return TransformOutcome::Dropped;
                }
            }
            Transform::Validate(rule) => {
                if !rule.matches(&item) {
                    return TransformOutcome::Invalid;
                }
            }
            Transform::Map { field, op } => apply_map(&mut item, field, *op),
            Transform::Enrich { tag } => {
                if !item.tags.contains(tag) {
                    item.tags.push(tag.clone());
                }
            }
        }
    }
    TransformOutcome::Kept(item)
}

fn apply_map(item: &mut FeedItem, field: &str, op: MapOp) {
    let transform = |s: &str| match op {
        MapOp::Uppercase => s.to_uppercase(),
        MapOp::Lowercase => s.to_lowercase(),
        MapOp::Trim => s.trim().to_string(),
    };

    match field {
        "title" => item.title = transform(&item.title),
        "description" => item.description = transform(&item.description),
        "content" => item.content = item.content.as_deref().map(transform),
        "author" => item.author = item.author.as_deref().map(transform),
        _ => {}
    }
}
