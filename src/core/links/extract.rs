//! Link extraction from markdown source.
//!
//! Walks the `pulldown_cmark` event stream rather than scanning raw text, so
//! images, autolinks and literal bracket text never show up as links, and
//! labels with nested inline formatting come out as plain text.

use pulldown_cmark::{Event, LinkType, Options, Parser, Tag, TagEnd};

/// A link as written in the source: destination plus visible label text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLink {
    pub href: String,
    pub label: String,
}

/// Parser options shared by link extraction and the renderer, so both see
/// the same document structure.
pub fn markdown_options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts
}

/// Collect every link construct in document order.
///
/// Inline, reference, collapsed and shortcut links are all normalized by the
/// parser into `Tag::Link`. Autolinks (`<https://…>`, `<a@b.c>`) are skipped.
pub fn extract_raw_links(markdown: &str) -> Vec<RawLink> {
    let mut out = Vec::new();
    // (href, label buffer) of the link currently open, if any.
    let mut open: Option<(String, String)> = None;

    for event in Parser::new_ext(markdown, markdown_options()) {
        match event {
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                ..
            }) => {
                if matches!(link_type, LinkType::Autolink | LinkType::Email) {
                    continue;
                }
                open = Some((dest_url.trim().to_string(), String::new()));
            }
            Event::End(TagEnd::Link) => {
                let Some((href, label)) = open.take() else {
                    continue;
                };
                if href.is_empty() {
                    continue;
                }
                out.push(RawLink {
                    href,
                    label: label.trim().to_string(),
                });
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, label)) = open.as_mut() {
                    label.push_str(&text);
                }
            }
            _ => {}
        }
    }

    out
}
