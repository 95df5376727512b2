//! Embedded page payload extraction.
//!
//! Site pages carry their data as a JSON blob in a
//! `<script id="__NEXT_DATA__">` tag. Where the result records sit inside
//! that blob depends on the page shape, so records are located by walking
//! the tree rather than by a fixed path:
//!
//! 1. every `pages` array (paginated query cache), taking each page's
//!    `events` / `markets` / `data` / `results` array, or the page itself
//!    when it is an array;
//! 2. failing that, any `events` array anywhere in the tree.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::ports::{ClientError, ClientResult};

static NEXT_DATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script[^>]*\bid=["']__NEXT_DATA__["'][^>]*>(.*?)</script>"#)
        .expect("constant __NEXT_DATA__ pattern compiles")
});

/// Keys under which a page object holds its result records.
const PAGE_RECORD_KEYS: [&str; 4] = ["events", "markets", "data", "results"];

/// Extract and parse the embedded JSON payload from an HTML page.
pub fn extract_next_data(html: &str) -> ClientResult<Value> {
    let raw = NEXT_DATA
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .ok_or_else(|| ClientError::Malformed("embedded page data not found".to_string()))?;

    serde_json::from_str(raw)
        .map_err(|e| ClientError::Malformed(format!("embedded page data is not JSON: {e}")))
}

/// Visit every `(key, value)` pair of every object in the tree.
fn walk<'a, F>(value: &'a Value, visit: &mut F)
where
    F: FnMut(&'a str, &'a Value),
{
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                visit(key.as_str(), child);
                walk(child, visit);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, visit);
            }
        }
        _ => {}
    }
}

fn looks_like_record(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|o| o.contains_key("markets") || o.contains_key("question"))
}

fn record_key(value: &Value) -> Option<String> {
    ["id", "slug"].iter().find_map(|key| match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Locate the result records (events or bare markets) in a search payload.
///
/// Records are returned in first-seen order, deduplicated by id or slug.
pub fn collect_records(root: &Value) -> Vec<&Value> {
    let mut found: Vec<&Value> = Vec::new();

    walk(root, &mut |key, value| {
        if key != "pages" {
            return;
        }
        let Some(pages) = value.as_array() else { return };
        for page in pages {
            if let Some(items) = page.as_array() {
                found.extend(items.iter().filter(|v| looks_like_record(v)));
                continue;
            }
            for records_key in PAGE_RECORD_KEYS {
                if let Some(items) = page.get(records_key).and_then(Value::as_array) {
                    found.extend(items.iter().filter(|v| looks_like_record(v)));
                }
            }
        }
    });

    if found.is_empty() {
        walk(root, &mut |key, value| {
            if key != "events" {
                return;
            }
            if let Some(items) = value.as_array() {
                found.extend(items.iter().filter(|v| looks_like_record(v)));
            }
        });
    }

    let mut seen = HashSet::new();
    found.retain(|record| record_key(record).is_none_or(|k| seen.insert(k)));
    found
}

/// Find the event (or bare market) with the given slug on an event page.
///
/// Objects carrying a `markets` list win over bare markets with the same slug.
pub fn find_by_slug<'a>(root: &'a Value, slug: &str) -> Option<&'a Value> {
    let mut event = None;
    let mut market = None;

    let mut check = |value: &'a Value| {
        if value.get("slug").and_then(Value::as_str) != Some(slug) {
            return;
        }
        if value.get("markets").is_some_and(Value::is_array) {
            event.get_or_insert(value);
        } else if value.get("question").is_some() {
            market.get_or_insert(value);
        }
    };

    check(root);
    walk(root, &mut |_, value| check(value));
    // Array elements are not visited as keyed values; check them too.
    walk(root, &mut |_, value| {
        if let Some(items) = value.as_array() {
            items.iter().for_each(&mut check);
        }
    });

    event.or(market)
}
