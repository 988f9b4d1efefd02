use crate::types::{ComposeError, Result};

use super::DocumentLoader;

/// Loads markup that is already block HTML (`.html`, `.htm`)
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupLoader;

/// Inner markup of `<body>`, or the whole input when there is no body
fn body_of(html: &str) -> &str {
    let lower = html.to_ascii_lowercase();
    let Some(open) = lower.find("<body") else {
        return html;
    };
    let Some(content_start) = lower[open..].find('>').map(|e| open + e + 1) else {
        return html;
    };
    let content_end = lower[content_start..]
        .find("</body")
        .map_or(html.len(), |e| content_start + e);
    &html[content_start..content_end]
}

impl DocumentLoader for MarkupLoader {
    fn extensions(&self) -> &[&'static str] {
        &["html", "htm"]
    }

    async fn convert(&self, bytes: Vec<u8>) -> Result<String> {
        let html = String::from_utf8(bytes)
            .map_err(|e| ComposeError::Conversion(format!("Markup is not UTF-8: {}", e)))?;
        Ok(body_of(&html).to_string())
    }
}
