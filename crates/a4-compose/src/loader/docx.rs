//! Minimal DOCX to block markup conversion
//!
//! Reads the paragraphs of `word/document.xml` and emits one element per
//! paragraph: headings for `HeadingN`/`Title` styles, list items for
//! numbered paragraphs (grouped into `<ul>`), paragraphs otherwise. Run
//! formatting, tables and images are not reproduced.

use crate::types::{ComposeError, Result};
use std::io::{Cursor, Read};

use super::DocumentLoader;

#[derive(Debug, Default, Clone, Copy)]
pub struct DocxLoader;

impl DocumentLoader for DocxLoader {
    fn extensions(&self) -> &[&'static str] {
        &["docx"]
    }

    async fn convert(&self, bytes: Vec<u8>) -> Result<String> {
        tokio::task::spawn_blocking(move || docx_to_markup(&bytes)).await?
    }
}

fn docx_to_markup(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ComposeError::Conversion(format!("Not a DOCX container: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ComposeError::Conversion(format!("Missing document body: {}", e)))?
        .read_to_string(&mut xml)
        .map_err(|e| ComposeError::Conversion(format!("Unreadable document body: {}", e)))?;

    Ok(document_xml_to_markup(&xml))
}

#[derive(Debug, Default, PartialEq)]
struct Paragraph {
    style: Option<String>,
    numbered: bool,
    /// Already XML-escaped, so usable as markup as-is
    text: String,
}

impl Paragraph {
    fn heading_level(&self) -> Option<u8> {
        let style = self.style.as_deref()?;
        if style == "Title" {
            return Some(1);
        }
        style
            .strip_prefix("Heading")
            .and_then(|n| n.trim().parse::<u8>().ok())
            .filter(|level| (1..=6).contains(level))
    }
}

/// Name of the tag starting at `start` (which points at `<`)
fn tag_name(xml: &str, start: usize) -> &str {
    let rest = &xml[start + 1..];
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(rest.len());
    &rest[..end]
}

fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{name}=\"");
    let start = tag.find(&needle)? + needle.len();
    let end = tag[start..].find('"')?;
    Some(&tag[start..start + end])
}

fn parse_paragraph(body: &str) -> Paragraph {
    let mut paragraph = Paragraph::default();
    let mut pos = 0;

    while let Some(offset) = body[pos..].find('<') {
        let start = pos + offset;
        let Some(tag_end) = body[start..].find('>').map(|e| start + e + 1) else {
            break;
        };
        let tag = &body[start..tag_end];

        match tag_name(body, start) {
            "w:pStyle" => paragraph.style = attribute(tag, "w:val").map(str::to_string),
            "w:numPr" => paragraph.numbered = true,
            "w:t" if !tag.ends_with("/>") => {
                let text_end = body[tag_end..]
                    .find("</w:t>")
                    .map_or(body.len(), |e| tag_end + e);
                paragraph.text.push_str(&body[tag_end..text_end]);
                pos = text_end;
                continue;
            }
            "w:tab" => paragraph.text.push(' '),
            "w:br" | "w:cr" => paragraph.text.push_str("<br>"),
            _ => {}
        }
        pos = tag_end;
    }

    paragraph
}

/// Find the next `<w:p>` paragraph at or after `from`, returning its span
fn next_paragraph(xml: &str, from: usize) -> Option<(usize, usize)> {
    let mut pos = from;
    while let Some(offset) = xml[pos..].find("<w:p") {
        let start = pos + offset;
        if tag_name(xml, start) != "w:p" {
            pos = start + 4;
            continue;
        }
        let open_end = xml[start..].find('>').map_or(xml.len(), |e| start + e + 1);
        if xml[..open_end].ends_with("/>") {
            return Some((start, open_end));
        }
        let end = xml[open_end..]
            .find("</w:p>")
            .map_or(xml.len(), |e| open_end + e + "</w:p>".len());
        return Some((start, end));
    }
    None
}

pub(crate) fn document_xml_to_markup(xml: &str) -> String {
    let mut out = String::new();
    let mut in_list = false;
    let mut pos = 0;

    while let Some((start, end)) = next_paragraph(xml, pos) {
        pos = end;
        let paragraph = parse_paragraph(&xml[start..end]);
        let text = paragraph.text.trim();

        if paragraph.numbered {
            if !in_list {
                out.push_str("<ul>");
                in_list = true;
            }
            out.push_str(&format!("<li>{text}</li>"));
            continue;
        }

        if in_list {
            out.push_str("</ul>");
            in_list = false;
        }
        if text.is_empty() {
            continue;
        }
        match paragraph.heading_level() {
            Some(level) => out.push_str(&format!("<h{level}>{text}</h{level}>")),
            None => out.push_str(&format!("<p>{text}</p>")),
        }
    }

    if in_list {
        out.push_str("</ul>");
    }
    out
}
