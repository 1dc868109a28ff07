//! Image extraction from upstream chat-completion responses.
//!
//! The router does not guarantee where generated images land in the response.
//! In practice they show up in four shapes, sometimes combined:
//!
//! 1. an `images` array on the message (`image_url` / `image` tagged entries);
//! 2. structured `content` parts with the same tagging;
//! 3. plain-text `content` with markdown image syntax, inline data-URLs, or
//!    bare image links;
//! 4. buried arbitrarily deep in an otherwise unknown response tree.
//!
//! Extraction is best-effort over untrusted JSON: nothing here errors, the
//! result is simply the (possibly empty) ordered, de-duplicated URL list.
//! The URL heuristics are compatibility-frozen: clients already depend on
//! exactly what they match.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use url::Url;

/// Deep-scan recursion limit for the fallback tree walk.
const DEEP_SCAN_MAX_DEPTH: u8 = 8;

static INLINE_IMAGE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Matches, in document order: markdown image syntax, bare data-URLs, and
/// bare http(s) URLs. Alternation order keeps a markdown wrapper from being
/// reported twice (once as syntax, once as its inner URL).
fn inline_image_regex() -> &'static Regex {
    INLINE_IMAGE_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?x)
            (?P<md>!\[[^\]]*\]\((?P<md_url>[^)\s]+)\))
            |(?P<data>data:image/[A-Za-z0-9.+-]+;base64,[A-Za-z0-9+/=_-]+)
            |(?P<url>https?://[^\s"'<>)\]}]+)
            "#,
        )
        .expect("inline image regex is valid")
    })
}

/// True for strings the product treats as a displayable image source:
/// embedded data-URLs, or absolute http(s) URLs whose path (query and
/// fragment ignored) ends in a common raster extension.
pub fn is_image_like(value: &str) -> bool {
    if value.starts_with("data:image/") {
        return true;
    }
    let Ok(url) = Url::parse(value) else {
        return false;
    };
    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }
    let path = url.path().to_ascii_lowercase();
    ["png", "jpg", "jpeg", "gif", "webp", "bmp", "avif"]
        .iter()
        .any(|ext| path.ends_with(&format!(".{}", ext)))
}

/// Extract URLs from a tagged part list (`images` field entries or structured
/// `content` parts; the upstream uses the same tagging for both).
fn from_tagged_parts(parts: Option<&Value>) -> Vec<String> {
    let Some(items) = parts.and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut urls = Vec::new();
    for item in items {
        match item.get("type").and_then(Value::as_str) {
            Some("image_url") => {
                if let Some(url) = item
                    .get("image_url")
                    .and_then(|v| v.get("url"))
                    .and_then(Value::as_str)
                {
                    urls.push(url.to_string());
                }
            }
            Some("image") => {
                if let Some(b64) = item
                    .get("image")
                    .and_then(|v| v.get("b64_json"))
                    .and_then(Value::as_str)
                {
                    urls.push(format!("data:image/png;base64,{}", b64));
                }
            }
            _ => {}
        }
    }
    urls
}

/// Extract image URLs embedded in free-form text, in document order.
fn from_text(text: &str) -> Vec<String> {
    let mut urls = Vec::new();
    for caps in inline_image_regex().captures_iter(text) {
        if caps.name("md").is_some() {
            // Markdown declares its target to be an image; accept data-URLs
            // and any absolute http(s) target without an extension check.
            if let Some(target) = caps.name("md_url") {
                let target = target.as_str();
                if target.starts_with("data:image/")
                    || Url::parse(target)
                        .map(|u| u.scheme() == "http" || u.scheme() == "https")
                        .unwrap_or(false)
                {
                    urls.push(target.to_string());
                }
            }
        } else if let Some(data) = caps.name("data") {
            urls.push(data.as_str().to_string());
        } else if let Some(bare) = caps.name("url") {
            if is_image_like(bare.as_str()) {
                urls.push(bare.as_str().to_string());
            }
        }
    }
    urls
}

/// Depth-bounded recursive visitor over the untyped response tree. Collects
/// image-like strings and image URLs embedded inside longer strings.
fn deep_scan(value: &Value, depth: u8, urls: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            if is_image_like(s) {
                urls.push(s.clone());
            } else {
                urls.extend(from_text(s));
            }
        }
        Value::Array(items) if depth > 0 => {
            for item in items {
                deep_scan(item, depth - 1, urls);
            }
        }
        Value::Object(map) if depth > 0 => {
            for item in map.values() {
                deep_scan(item, depth - 1, urls);
            }
        }
        _ => {}
    }
}

fn dedup_preserving_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|u| !u.is_empty())
        .filter(|u| seen.insert(u.clone()))
        .collect()
}

/// JS-flavoured type tag for the debug snapshot (diagnosing which of the
/// upstream output conventions a misbehaving response used).
fn value_type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
        Some(Value::Number(_)) => "number",
        Some(Value::Bool(_)) => "boolean",
    }
}

fn first_choice_message(response: &Value) -> Option<&Value> {
    response
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
}

/// Extract every image URL from an upstream response, ordered and
/// de-duplicated. The explicit message fields win; the deep scan only runs
/// when they yield nothing.
pub fn extract_image_urls(response: &Value) -> Vec<String> {
    let mut urls = Vec::new();

    if let Some(message) = first_choice_message(response) {
        urls.extend(from_tagged_parts(message.get("images")));
        match message.get("content") {
            Some(Value::String(text)) => urls.extend(from_text(text)),
            Some(content) => urls.extend(from_tagged_parts(Some(content))),
            None => {}
        }
    }

    if urls.is_empty() {
        deep_scan(response, DEEP_SCAN_MAX_DEPTH, &mut urls);
    }

    dedup_preserving_order(urls)
}

/// Snapshot of the offending message shape, attached to the no-image error.
pub fn debug_snapshot(response: &Value) -> Value {
    let message = first_choice_message(response);
    serde_json::json!({
        "messageContentType": value_type_name(message.and_then(|m| m.get("content"))),
        "imagesFieldType": value_type_name(message.and_then(|m| m.get("images"))),
    })
}
