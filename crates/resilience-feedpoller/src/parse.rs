//! Type-specific feed parsing, per `spec.md` §6.4. Malformed documents never
//! panic or propagate a hard error to the ticker: they produce zero items
//! and the caller records an error metric.

use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use resilience_types::FeedItem;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedType {
    Rss,
    Atom,
    JsonFeed,
    NewsApi,
}

pub fn parse(feed_type: FeedType, source: &str, body: &[u8]) -> Vec<FeedItem> {
    match feed_type {
        FeedType::Rss => parse_rss(source, body),
        FeedType::Atom => parse_atom(source, body),
        FeedType::JsonFeed => parse_json_feed(source, body),
        FeedType::NewsApi => parse_news_api(source, body),
    }
}

fn text_or_default(text: Option<String>) -> String {
    text.unwrap_or_default()
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(s)
        .map(|d| d.with_timezone(&Utc))
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|d| d.with_timezone(&Utc)))
        .ok()
}

/// Collects `<item>` elements from an RSS document, tolerating any malformed
/// or truncated XML by simply stopping at the first parse error.
fn parse_rss(source: &str, body: &[u8]) -> Vec<FeedItem> {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut buf = Vec::new();
    let mut in_item = false;
    let mut current_tag: Option<String> = None;
    let mut fields: std::collections::HashMap<String, String> = std::collections::HashMap::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "item" {
                    in_item = true;
                    fields.clear();
                } else if in_item {
                    current_tag = Some(name);
                }
            }
            Ok(Event::Text(e)) => {
                if in_item {
                    if let Some(tag) = &current_tag {
                        let text = e.unescape().unwrap_or_default().to_string();
                        fields.entry(tag.clone()).or_default().push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "item" {
                    in_item = false;
                    let guid = fields.get("guid").cloned().unwrap_or_default();
                    let link = fields.get("link").cloned().unwrap_or_default();
                    let title = fields.get("title").cloned().unwrap_or_default();
                    let pub_date_raw = fields.get("pubDate").cloned().unwrap_or_default();
                    items.push(FeedItem {
                        id: if guid.is_empty() {
                            FeedItem::derive_id(&guid, &link, &title, &pub_date_raw)
                        } else {
                            guid
                        },
                        title,
                        link,
                        description: text_or_default(fields.get("description").cloned()),
                        pub_date: parse_date(&pub_date_raw),
                        source: source.to_string(),
                        tags: fields.get("category").cloned().into_iter().collect(),
                        content: fields.get("content:encoded").cloned(),
                        author: fields.get("dc:creator").cloned().or_else(|| fields.get("author").cloned()),
                    });
                } else {
                    current_tag = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    items
}

fn parse_atom(source: &str, body: &[u8]) -> Vec<FeedItem> {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut buf = Vec::new();
    let mut in_entry = false;
    let mut current_tag: Option<String> = None;
    let mut fields: std::collections::HashMap<String, String> = std::collections::HashMap::new();
    let mut link = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "entry" {
                    in_entry = true;
                    fields.clear();
                    link.clear();
                } else if in_entry {
                    if name == "link" && link.is_empty() {
                        if let Some(href) = e.attributes().flatten().find(|a| a.key.as_ref() == b"href") {
                            link = String::from_utf8_lossy(&href.value).to_string();
                        }
                    }
                    current_tag = Some(name);
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if in_entry && name == "link" && link.is_empty() {
                    if let Some(href) = e.attributes().flatten().find(|a| a.key.as_ref() == b"href") {
                        link = String::from_utf8_lossy(&href.value).to_string();
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if in_entry {
                    if let Some(tag) = &current_tag {
                        let text = e.unescape().unwrap_or_default().to_string();
                        fields.entry(tag.clone()).or_default().push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "entry" {
                    in_entry = false;
                    let id = fields.get("id").cloned().unwrap_or_default();
                    let title = fields.get("title").cloned().unwrap_or_default();
                    let published = fields
                        .get("published")
                        .or_else(|| fields.get("updated"))
                        .cloned()
                        .unwrap_or_default();
                    items.push(FeedItem {
                        id: if id.is_empty() {
                            FeedItem::derive_id(&id, &link, &title, &published)
                        } else {
                            id
                        },
                        title,
                        link: link.clone(),
                        description: text_or_default(fields.get("summary").cloned()),
                        pub_date: parse_date(&published),
                        source: source.to_string(),
                        tags: fields.get("category").cloned().into_iter().collect(),
                        content: fields.get("content").cloned(),
                        author: fields.get("name").cloned(),
                    });
                } else {
                    current_tag = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    items
}

fn parse_json_feed(source: &str, body: &[u8]) -> Vec<FeedItem> {
    let Ok(doc) = serde_json::from_slice::<Value>(body) else {
        return Vec::new();
    };
    let Some(items) = doc.get("items").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| {
            let id = item.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
            let title = item.get("title").and_then(Value::as_str).unwrap_or_default().to_string();
            let url = item.get("url").and_then(Value::as_str).unwrap_or_default().to_string();
            let date = item.get("date_published").and_then(Value::as_str).unwrap_or_default();
            FeedItem {
                id: if id.is_empty() { FeedItem::derive_id(&id, &url, &title, date) } else { id },
                title,
                link: url,
                description: item.get("summary").and_then(Value::as_str).unwrap_or_default().to_string(),
                pub_date: parse_date(date),
                source: source.to_string(),
                tags: item
                    .get("tags")
                    .and_then(Value::as_array)
                    .map(|tags| tags.iter().filter_map(Value::as_str).map(str::to_string).collect())
                    .unwrap_or_default(),
                content: item
                    .get("content_text")
                    .or_else(|| item.get("content_html"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                author: item.get("author").and_then(|a| a.get("name")).and_then(Value::as_str).map(str::to_string),
            }
        })
        .collect()
}

fn parse_news_api(source: &str, body: &[u8]) -> Vec<FeedItem> {
    let Ok(doc) = serde_json::from_slice::<Value>(body) else {
        return Vec::new();
    };
    let Some(articles) = doc.get("articles").and_then(Value::as_array) else {
        return Vec::new();
    };

    articles
        .iter()
        .map(|article| {
            let url = article.get("url").and_then(Value::as_str).unwrap_or_default().to_string();
            let title = article.get("title").and_then(Value::as_str).unwrap_or_default().to_string();
            let published = article.get("publishedAt").and_then(Value::as_str).unwrap_or_default();
            let article_source = article
                .get("source")
                .and_then(|s| s.get("name"))
                .and_then(Value::as_str)
                .unwrap_or(source)
                .to_string();
            FeedItem {
                id: FeedItem::derive_id("", &url, &title, published),
                title,
                link: url,
                description: article.get("description").and_then(Value::as_str).unwrap_or_default().to_string(),
                pub_date: parse_date(published),
                source: article_source,
                tags: Vec::new(),
                content: article.get("content").and_then(Value::as_str).map(str::to_string),
                author: article.get("author").and_then(Value::as_str).map(str::to_string),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rss_item() {
        let xml = br#"<rss><channel><item><guid>g1</guid><title>Hello</title><link>https://x</link><pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate><description>desc</description></item></channel></rss>"#;
        let items = parse(FeedType::Rss, "test-feed", xml);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Hello");
        assert_eq!(items[0].id, "g1");
        assert!(items[0].pub_date.is_some());
    }

    #[test]
    fn parses_atom_entry() {
        let xml = br#"<feed><entry><id>e1</id><title>World</title><link href="https://y"/><summary>s</summary><published>2024-01-01T00:00:00Z</published></entry></feed>"#;
        let items = parse(FeedType::Atom, "test-feed", xml);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].link, "https://y");
    }

    #[test]
    fn malformed_rss_yields_no_items_not_a_panic() {
        let xml = b"<rss><channel><item><title>unterminated";
        let items = parse(FeedType::Rss, "test-feed", xml);
        assert!(items.is_empty());
    }

    #[test]
    fn parses_json_feed() {
        let body = br#"{"items":[{"id":"1","title":"T","url":"https://z","date_published":"2024-01-01T00:00:00Z","tags":["a"],"content_text":"body","author":{"name":"Jo"}}]}"#;
        let items = parse(FeedType::JsonFeed, "test-feed", body);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].author.as_deref(), Some("Jo"));
    }

    #[test]
    fn parses_news_api() {
        let body = br#"{"articles":[{"url":"https://z","title":"T","publishedAt":"2024-01-01T00:00:00Z","source":{"name":"Reuters"},"description":"d"}]}"#;
        let items = parse(FeedType::NewsApi, "test-feed", body);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, "Reuters");
    }

    #[test]
    fn malformed_json_yields_no_items() {
        let items = parse(FeedType::JsonFeed, "test-feed", b"not json");
        assert!(items.is_empty());
    }
}
