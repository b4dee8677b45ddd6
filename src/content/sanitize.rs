use ammonia::Builder;
use std::collections::HashSet;
use url::Url;

use crate::error::{AppError, AppResult};

const EXCERPT_CHARS: usize = 100;

/// Strip scripts, event handlers and other unsafe markup from rich-text post
/// content while keeping formatting tags.
pub fn sanitize_html(content: &str) -> String {
    Builder::default()
        .link_rel(Some("noopener noreferrer"))
        .clean(content)
        .to_string()
}

/// Reduce markup to its text content, entities decoded.
pub fn plain_text(text: &str) -> String {
    let stripped = Builder::default()
        .tags(HashSet::new())
        .clean(text)
        .to_string();
    html_escape::decode_html_entities(&stripped).into_owned()
}

/// Plain-text preview of post content for list views.
pub fn excerpt(content: &str) -> String {
    let text = plain_text(content);
    let text = text.trim();
    if text.chars().count() > EXCERPT_CHARS {
        let cut: String = text.chars().take(EXCERPT_CHARS).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

/// Blank means "no media". Anything else must be an absolute http(s) URL.
pub fn normalize_media_url(media_url: Option<&str>) -> AppResult<Option<String>> {
    let Some(raw) = media_url.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let parsed = Url::parse(raw)
        .map_err(|_| AppError::BadRequest("Media URL must be a valid URL".into()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(Some(parsed.to_string())),
        _ => Err(AppError::BadRequest(
            "Media URL must use http or https".into(),
        )),
    }
}
