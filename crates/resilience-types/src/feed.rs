//! `FeedItem`, per `spec.md` §3 and §6.4.

use chrono::{DateTime, Utc};
use std::hash::{Hash, Hasher};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: Option<DateTime<Utc>>,
    pub source: String,
    pub tags: Vec<String>,
    pub content: Option<String>,
    pub author: Option<String>,
}

impl FeedItem {
    /// Derives the stable dedup key from `guid|link|title|pubDate` per
    /// `spec.md` §3. Whichever of `guid`/`link`/`title`/`pubDate` are present
    /// are hashed together; callers pass `guid` as `id` when the source feed
    /// carries one, else an empty string.
    pub fn derive_id(guid: &str, link: &str, title: &str, pub_date: &str) -> String {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        guid.hash(&mut hasher);
        link.hash(&mut hasher);
        title.hash(&mut hasher);
        pub_date.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    /// The dedup key used by the feed poller's per-stream cache:
    /// `id|link|title|pubDate`.
    pub fn dedupe_key(&self) -> String {
        let pub_date = self
            .pub_date
            .map(|d| d.to_rfc3339())
            .unwrap_or_default();
        format!("{}|{}|{}|{}", self.id, self.link, self.title, pub_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_id_is_stable() {
        let a = FeedItem::derive_id("g1", "https://x", "Title", "2026-01-01");
        let b = FeedItem::derive_id("g1", "https://x", "Title", "2026-01-01");
        assert_eq!(a, b);
    }

    #[test]
    fn derive_id_differs_on_any_field_change() {
        let a = FeedItem::derive_id("g1", "https://x", "Title", "2026-01-01");
        let b = FeedItem::derive_id("g2", "https://x", "Title", "2026-01-01");
        assert_ne!(a, b);
    }
}
