//! Block markup handling
//!
//! Converters hand the composer an HTML-like string. This module splits it
//! into top-level elements (the unit of pagination) and extracts plain text
//! for renderers and measurers.

use crate::types::Block;

/// Elements that never have content or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose content is raw text (no nested tags)
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Closing these ends a line of text
const LINE_BREAKING_ELEMENTS: &[&str] = &[
    "p", "div", "li", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "ul", "ol", "table",
    "blockquote", "pre",
];

#[derive(Debug)]
struct Tag {
    name: String,
    closing: bool,
    self_closing: bool,
    /// Byte offset just past the closing `>`
    end: usize,
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Parse the tag starting at `start` (which must point at `<`).
fn parse_tag(src: &str, start: usize) -> Option<Tag> {
    let bytes = src.as_bytes();
    let mut i = start + 1;
    let closing = bytes.get(i) == Some(&b'/');
    if closing {
        i += 1;
    }

    let name_start = i;
    while i < bytes.len()
        && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-' || bytes[i] == b':')
    {
        i += 1;
    }
    if i == name_start {
        return None;
    }
    let name = src[name_start..i].to_ascii_lowercase();

    // Find the closing '>' outside of quoted attribute values
    let mut quote: Option<u8> = None;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => {
                return Some(Tag {
                    name,
                    closing,
                    self_closing: bytes[i - 1] == b'/',
                    end: i + 1,
                });
            }
            None => {}
        }
        i += 1;
    }
    None
}

/// If `src[pos..]` starts a comment or declaration, return the offset past it
fn skip_non_element(src: &str, pos: usize) -> Option<usize> {
    let rest = &src[pos..];
    if rest.starts_with("<!--") {
        Some(rest.find("-->").map_or(src.len(), |e| pos + e + 3))
    } else if rest.starts_with("<!") || rest.starts_with("<?") {
        Some(rest.find('>').map_or(src.len(), |e| pos + e + 1))
    } else {
        None
    }
}

/// Find the end of the element whose opening tag ends at `from`.
///
/// Unclosed elements extend to the end of the input.
fn element_end(src: &str, from: usize, name: &str) -> usize {
    if RAW_TEXT_ELEMENTS.contains(&name) {
        let needle = format!("</{name}");
        return match src[from..].to_ascii_lowercase().find(&needle) {
            Some(offset) => {
                let close = from + offset;
                src[close..].find('>').map_or(src.len(), |e| close + e + 1)
            }
            None => src.len(),
        };
    }

    let mut depth = 1usize;
    let mut pos = from;
    while let Some(offset) = src[pos..].find('<') {
        let start = pos + offset;
        if let Some(next) = skip_non_element(src, start) {
            pos = next;
            continue;
        }
        match parse_tag(src, start) {
            Some(tag) if tag.closing => {
                depth -= 1;
                if depth == 0 {
                    return tag.end;
                }
                pos = tag.end;
            }
            Some(tag) => {
                if !tag.self_closing && !is_void(&tag.name) {
                    if RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) {
                        pos = element_end(src, tag.end, &tag.name);
                        continue;
                    }
                    depth += 1;
                }
                pos = tag.end;
            }
            None => pos = start + 1,
        }
    }
    src.len()
}

fn flush_text(blocks: &mut Vec<Block>, text: &mut String) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        blocks.push(Block::new(format!("<p>{trimmed}</p>")));
    }
    text.clear();
}

/// Split markup into its top-level elements, in document order.
///
/// Top-level text between elements becomes its own paragraph block;
/// whitespace-only text, comments and stray closing tags are dropped.
pub fn split_blocks(markup: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut text = String::new();
    let mut pos = 0;

    while pos < markup.len() {
        let Some(offset) = markup[pos..].find('<') else {
            text.push_str(&markup[pos..]);
            break;
        };
        let start = pos + offset;
        text.push_str(&markup[pos..start]);

        if let Some(next) = skip_non_element(markup, start) {
            pos = next;
            continue;
        }

        match parse_tag(markup, start) {
            None => {
                // A literal '<' in text
                text.push('<');
                pos = start + 1;
            }
            Some(tag) if tag.closing => pos = tag.end,
            Some(tag) => {
                flush_text(&mut blocks, &mut text);
                let end = if tag.self_closing || is_void(&tag.name) {
                    tag.end
                } else {
                    element_end(markup, tag.end, &tag.name)
                };
                blocks.push(Block::new(&markup[start..end]));
                pos = end;
            }
        }
    }
    flush_text(&mut blocks, &mut text);

    blocks
}

/// Name of the first element in `markup`, lowercased
pub fn leading_tag(markup: &str) -> Option<String> {
    let trimmed = markup.trim_start();
    let offset = markup.len() - trimmed.len();
    if !trimmed.starts_with('<') {
        return None;
    }
    parse_tag(markup, offset)
        .filter(|tag| !tag.closing)
        .map(|tag| tag.name)
}

/// Decode the common named entities and numeric character references
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        let decoded = candidate.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &candidate[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|c| (c, semi + 1))
        });

        match decoded {
            Some((ch, len)) => {
                out.push(ch);
                rest = &candidate[len..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn push_collapsed(out: &mut String, text: &str) {
    for ch in text.chars() {
        if ch.is_whitespace() && ch != '\u{a0}' {
            if !out.ends_with([' ', '\n']) && !out.is_empty() {
                out.push(' ');
            }
        } else {
            out.push(ch);
        }
    }
}

/// Plain text of a markup fragment.
///
/// Whitespace is collapsed as a browser would, `<br>` and the ends of
/// block-level elements become line breaks, list items get a bullet and
/// blank lines are removed.
pub fn plain_text(markup: &str) -> String {
    let mut out = String::new();
    let mut pos = 0;

    while pos < markup.len() {
        let Some(offset) = markup[pos..].find('<') else {
            push_collapsed(&mut out, &decode_entities(&markup[pos..]));
            break;
        };
        let start = pos + offset;
        push_collapsed(&mut out, &decode_entities(&markup[pos..start]));

        if let Some(next) = skip_non_element(markup, start) {
            pos = next;
            continue;
        }

        match parse_tag(markup, start) {
            None => {
                out.push('<');
                pos = start + 1;
            }
            Some(tag) => {
                if RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) && !tag.closing {
                    pos = element_end(markup, tag.end, &tag.name);
                    continue;
                }
                match (tag.name.as_str(), tag.closing) {
                    ("br", _) => out.push('\n'),
                    ("li", false) => {
                        if !out.is_empty() && !out.ends_with('\n') {
                            out.push('\n');
                        }
                        out.push_str("• ");
                    }
                    ("td" | "th", true) => out.push('\t'),
                    (name, true) if LINE_BREAKING_ELEMENTS.contains(&name) => out.push('\n'),
                    _ => {}
                }
                pos = tag.end;
            }
        }
    }

    out.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markups(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().map(Block::markup).collect()
    }

    #[test]
    fn test_split_top_level_elements() {
        let blocks = split_blocks("<h1>Title</h1>\n<p>One <b>bold</b></p><p>Two</p>");
        assert_eq!(
            markups(&blocks),
            vec!["<h1>Title</h1>", "<p>One <b>bold</b></p>", "<p>Two</p>"]
        );
    }

    #[test]
    fn test_split_keeps_nested_lists_together() {
        let html = "<ul><li>a<ul><li>b</li></ul></li><li>c</li></ul><p>after</p>";
        let blocks = split_blocks(html);
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0].markup(),
            "<ul><li>a<ul><li>b</li></ul></li><li>c</li></ul>"
        );
    }

    #[test]
    fn test_split_void_and_self_closing() {
        let blocks = split_blocks("<p>a</p><hr><img src=\"x.png\"/><p>b</p>");
        assert_eq!(
            markups(&blocks),
            vec!["<p>a</p>", "<hr>", "<img src=\"x.png\"/>", "<p>b</p>"]
        );
    }

    #[test]
    fn test_split_quoted_gt_in_attribute() {
        let blocks = split_blocks("<p title=\"a > b\">x</p><p>y</p>");
        assert_eq!(markups(&blocks), vec!["<p title=\"a > b\">x</p>", "<p>y</p>"]);
    }

    #[test]
    fn test_split_wraps_stray_text_and_skips_comments() {
        let blocks = split_blocks("loose text<!-- note --><p>kept</p>   ");
        assert_eq!(markups(&blocks), vec!["<p>loose text</p>", "<p>kept</p>"]);
    }

    #[test]
    fn test_split_empty_input() {
        assert!(split_blocks("").is_empty());
        assert!(split_blocks("  \n ").is_empty());
    }

    #[test]
    fn test_unclosed_element_takes_rest() {
        let blocks = split_blocks("<p>a</p><div>unclosed <p>inner</p>");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].markup(), "<div>unclosed <p>inner</p>");
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(plain_text("<p>Fish &amp; chips<br/>daily</p>"), "Fish & chips\ndaily");
        assert_eq!(
            plain_text("<ul><li>one</li><li>two</li></ul>"),
            "• one\n• two"
        );
        assert_eq!(plain_text("<p>  spaced \n   out </p>"), "spaced out");
    }

    #[test]
    fn test_decode_numeric_entities() {
        assert_eq!(decode_entities("&#65;&#x42;&unknown;&"), "AB&unknown;&");
    }

    #[test]
    fn test_leading_tag() {
        assert_eq!(leading_tag("  <H2 class=\"x\">t</H2>").as_deref(), Some("h2"));
        assert_eq!(leading_tag("text"), None);
    }
}
