//! Field extraction restricted to the subset declared in `spec.md` §4.8
//! step 5: the literal `title`, and class/id attribute selectors. A selector
//! outside the subset, or one that matches nothing, yields `None` plus a
//! warning rather than failing the job.

use scraper::{ElementRef, Html, Selector};

pub struct ExtractionOutcome {
    pub value: Option<String>,
    pub warning: Option<String>,
}

pub fn extract(document: &Html, field: &str, selector: &str) -> ExtractionOutcome {
    if selector == "title" {
        let parsed = Selector::parse("title").expect("static selector is valid");
        return match document.select(&parsed).next() {
            Some(el) => ExtractionOutcome { value: Some(collect_text(&el)), warning: None },
            None => ExtractionOutcome {
                value: None,
                warning: Some(format!("field `{field}`: no <title> element found")),
            },
        };
    }

    if !(selector.starts_with('.') || selector.starts_with('#')) {
        return ExtractionOutcome {
            value: None,
            warning: Some(format!(
                "field `{field}`: selector `{selector}` is outside the supported subset (title, .class, #id)"
            )),
        };
    }

    match Selector::parse(selector) {
        Ok(parsed) => match document.select(&parsed).next() {
            Some(el) => ExtractionOutcome { value: Some(collect_text(&el)), warning: None },
            None => ExtractionOutcome {
                value: None,
                warning: Some(format!("field `{field}`: selector `{selector}` matched nothing")),
            },
        },
        Err(_) => ExtractionOutcome {
            value: None,
            warning: Some(format!("field `{field}`: selector `{selector}` failed to parse")),
        },
    }
}

fn collect_text(el: &ElementRef) -> String {
    el.text().collect::<Vec<_>>().join("").trim().to_string()
}
