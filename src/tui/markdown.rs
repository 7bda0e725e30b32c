//! Markdown → ANSI renderer.
//!
//! Walks the `pulldown_cmark` event stream with a style stack, collects
//! styled `Line`s, word-wraps them with `textwrap` and serializes the result
//! as one ANSI string. The pager highlights links in that string and then
//! hands it to `ansi-to-tui` for display.
//!
//! ```text
//! markdown ─► Writer (events → RenderLine) ─► wrap ─► gutter ─► ANSI
//! ```

use std::fmt::Write as _;
use std::sync::LazyLock;

use crossterm::style::{self as ct, Attribute, ContentStyle};
use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use textwrap::core::Fragment;
use textwrap::wrap_algorithms::wrap_first_fit;
use unicode_width::UnicodeWidthStr;

use crate::core::links::markdown_options;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Columns taken by the line-number gutter.
pub const GUTTER_WIDTH: usize = 4;

const BORDER: Color = Color::DarkGray;

/// Render `content` as ANSI text wrapped at `width` columns (0 = no wrap).
pub fn render(content: &str, width: u16, line_numbers: bool) -> String {
    let mut w = Writer::new();
    for event in Parser::new_ext(content, markdown_options()) {
        w.handle(event);
    }

    let gutter = if line_numbers { GUTTER_WIDTH } else { 0 };
    let wrap_at = usize::from(width).saturating_sub(gutter);
    let rows: Vec<Vec<Span<'static>>> = w
        .lines
        .into_iter()
        .flat_map(|line| wrap_line(line, wrap_at))
        .collect();

    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if line_numbers {
            let number = format!("{:>w$} ", i + 1, w = GUTTER_WIDTH - 1);
            write_span(&mut out, &Span::styled(number, Style::default().fg(BORDER)));
        }
        for span in row {
            write_span(&mut out, span);
        }
    }
    out
}

// ── Writer ──────────────────────────────────────────────────────────────────

/// One logical output line before wrapping.
#[derive(Default)]
struct RenderLine {
    /// Repeated on every wrapped row (blockquote / code borders).
    prefix: Vec<Span<'static>>,
    spans: Vec<Span<'static>>,
    /// Extra indent for continuation rows (list marker width).
    hanging: usize,
    wrap: bool,
}

struct Writer {
    lines: Vec<RenderLine>,
    /// Inline style stack; entries compose via `patch`.
    styles: Vec<Style>,
    line_prefixes: Vec<Span<'static>>,
    /// List nesting: None = unordered, Some(n) = ordered at index n.
    list_indices: Vec<Option<u64>>,
    /// Last line holds only a list marker; the item's first paragraph joins it.
    item_open: bool,
    highlighter: Option<HighlightLines<'static>>,
    in_code: bool,
    /// External destination, appended after the link text closes.
    link_url: Option<String>,
    needs_newline: bool,
}

impl Writer {
    fn new() -> Self {
        Self {
            lines: vec![],
            styles: vec![],
            line_prefixes: vec![],
            list_indices: vec![],
            item_open: false,
            highlighter: None,
            in_code: false,
            link_url: None,
            needs_newline: false,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    fn push_line(&mut self, spans: Vec<Span<'static>>) {
        self.lines.push(RenderLine {
            prefix: self.line_prefixes.clone(),
            spans,
            hanging: 0,
            wrap: !self.in_code,
        });
    }

    fn push_span(&mut self, span: Span<'static>) {
        match self.lines.last_mut() {
            Some(line) => line.spans.push(span),
            None => self.push_line(vec![span]),
        }
    }

    fn blank_line_if_needed(&mut self) {
        if self.needs_newline {
            self.push_line(vec![]);
            self.needs_newline = false;
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => {
                let style = self.style().patch(Style::default().fg(Color::White).bg(BORDER));
                self.push_span(Span::styled(c.into_string(), style));
            }
            Event::SoftBreak => self.push_span(Span::raw(" ")),
            Event::HardBreak => self.push_line(vec![]),
            Event::Rule => {
                self.blank_line_if_needed();
                self.push_line(vec![Span::styled("─".repeat(40), Style::default().fg(BORDER))]);
                self.needs_newline = true;
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[✓] " } else { "[ ] " };
                self.push_span(Span::styled(marker, Style::default().fg(BORDER)));
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.item_open {
                    self.item_open = false;
                } else {
                    self.blank_line_if_needed();
                    self.push_line(vec![]);
                }
            }
            Tag::Heading { level, .. } => {
                self.blank_line_if_needed();
                let style = heading_style(level);
                let marker = format!("{} ", "#".repeat(heading_depth(level)));
                self.push_line(vec![Span::styled(marker, style)]);
                self.push_style(style);
            }
            Tag::BlockQuote(_) => {
                self.blank_line_if_needed();
                self.line_prefixes
                    .push(Span::styled("│ ", Style::default().fg(BORDER)));
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                self.item_open = false;
                self.blank_line_if_needed();
                let lang = match &kind {
                    CodeBlockKind::Fenced(l) => l.split_whitespace().next().unwrap_or(""),
                    CodeBlockKind::Indented => "",
                };
                let border = Style::default().fg(BORDER);
                let mut top = vec![Span::styled("╭──", border)];
                if !lang.is_empty() {
                    top.push(Span::styled(format!(" {lang} "), border.add_modifier(Modifier::BOLD)));
                    top.push(Span::styled("──", border));
                }
                self.push_line(top);
                self.line_prefixes.push(Span::styled("│ ", border));
                self.in_code = true;

                if let Some(syntax) = Some(lang)
                    .filter(|l| !l.is_empty())
                    .and_then(|l| SYNTAX_SET.find_syntax_by_token(l))
                    && let Some(theme) = THEME_SET.themes.get("base16-ocean.dark")
                {
                    self.highlighter = Some(HighlightLines::new(syntax, theme));
                }
            }
            Tag::List(start) => {
                if self.list_indices.is_empty() {
                    self.blank_line_if_needed();
                }
                self.list_indices.push(start);
            }
            Tag::Item => {
                let depth = self.list_indices.len().saturating_sub(1);
                let indent = "  ".repeat(depth);
                let marker = match self.list_indices.last_mut() {
                    Some(Some(n)) => {
                        let m = format!("{indent}{n}. ");
                        *n += 1;
                        m
                    }
                    _ => format!("{indent}• "),
                };
                let hanging = marker.width();
                self.push_line(vec![Span::styled(marker, Style::default().fg(BORDER))]);
                if let Some(line) = self.lines.last_mut() {
                    line.hanging = hanging;
                }
                self.item_open = true;
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link {
                link_type,
                dest_url,
                ..
            } => {
                let shows_url = matches!(link_type, LinkType::Autolink | LinkType::Email);
                self.link_url = (!shows_url && is_external(&dest_url)).then(|| dest_url.to_string());
                self.push_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.needs_newline = true,
            TagEnd::Heading(_) => {
                self.pop_style();
                self.needs_newline = true;
            }
            TagEnd::BlockQuote(_) => {
                self.line_prefixes.pop();
                self.pop_style();
                self.needs_newline = true;
            }
            TagEnd::CodeBlock => {
                self.highlighter = None;
                self.in_code = false;
                self.line_prefixes.pop();
                self.push_line(vec![Span::styled("╰──", Style::default().fg(BORDER))]);
                self.needs_newline = true;
            }
            TagEnd::List(_) => {
                self.list_indices.pop();
                self.needs_newline = true;
            }
            TagEnd::Item => self.item_open = false,
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.link_url.take() {
                    self.push_span(Span::styled(
                        format!(" ({url})"),
                        Style::default().fg(BORDER),
                    ));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, cow: CowStr<'_>) {
        let text = cow.replace('\t', "    ");

        if self.in_code {
            match self.highlighter.take() {
                Some(mut hl) => {
                    for line in LinesWithEndings::from(text.as_str()) {
                        let spans = match hl.highlight_line(line, &SYNTAX_SET) {
                            Ok(ranges) => ranges
                                .into_iter()
                                .filter_map(|(hl_style, frag)| {
                                    let content = frag.trim_end_matches('\n');
                                    (!content.is_empty()).then(|| {
                                        let fg = hl_style.foreground;
                                        Span::styled(
                                            content.to_owned(),
                                            Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)),
                                        )
                                    })
                                })
                                .collect(),
                            Err(_) => vec![Span::raw(line.trim_end_matches('\n').to_owned())],
                        };
                        self.push_line(spans);
                    }
                    self.highlighter = Some(hl);
                }
                None => {
                    for line in text.lines() {
                        self.push_line(vec![Span::raw(line.to_owned())]);
                    }
                }
            }
            return;
        }

        let style = self.style();
        self.push_span(Span::styled(text, style));
    }
}

fn is_external(dest: &str) -> bool {
    dest.contains("://") || dest.to_ascii_lowercase().starts_with("mailto:")
}

fn heading_style(level: HeadingLevel) -> Style {
    let bold = Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 => bold.add_modifier(Modifier::UNDERLINED),
        HeadingLevel::H2 => bold,
        _ => bold.add_modifier(Modifier::ITALIC),
    }
}

fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

// ── Wrapping ────────────────────────────────────────────────────────────────

/// A word plus the whitespace after it, possibly spanning several styles.
#[derive(Debug, Default)]
struct Word {
    parts: Vec<Span<'static>>,
    width: usize,
    space: String,
    space_style: Style,
}

impl Fragment for Word {
    fn width(&self) -> f64 {
        self.width as f64
    }

    fn whitespace_width(&self) -> f64 {
        self.space.width() as f64
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

fn split_words(spans: &[Span<'static>]) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current = Word::default();

    for span in spans {
        let mut rest: &str = &span.content;
        while let Some(ch) = rest.chars().next() {
            let is_space = ch == ' ';
            let end = rest
                .find(|c: char| (c == ' ') != is_space)
                .unwrap_or(rest.len());
            let (piece, tail) = rest.split_at(end);
            rest = tail;

            if is_space {
                if current.space.is_empty() {
                    current.space_style = span.style;
                }
                current.space.push_str(piece);
            } else {
                if !current.space.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                current.width += piece.width();
                current.parts.push(Span::styled(piece.to_owned(), span.style));
            }
        }
    }

    if !current.parts.is_empty() || !current.space.is_empty() {
        words.push(current);
    }
    words
}

/// Break one logical line into rows no wider than `width` (0 = unlimited).
/// Words longer than a row are kept whole.
fn wrap_line(line: RenderLine, width: usize) -> Vec<Vec<Span<'static>>> {
    if !line.wrap || width == 0 {
        let mut row = line.prefix;
        row.extend(line.spans);
        return vec![row];
    }

    let prefix_width: usize = line.prefix.iter().map(|s| s.content.width()).sum();
    let first = width.saturating_sub(prefix_width).max(1);
    let rest = first.saturating_sub(line.hanging).max(1);

    let words = split_words(&line.spans);
    if words.is_empty() {
        return vec![line.prefix];
    }

    wrap_first_fit(&words, &[first as f64, rest as f64])
        .into_iter()
        .enumerate()
        .map(|(i, row_words)| {
            let mut row = line.prefix.clone();
            if i > 0 && line.hanging > 0 {
                row.push(Span::raw(" ".repeat(line.hanging)));
            }
            for (j, word) in row_words.iter().enumerate() {
                row.extend(word.parts.iter().cloned());
                if j + 1 < row_words.len() && !word.space.is_empty() {
                    row.push(Span::styled(word.space.clone(), word.space_style));
                }
            }
            row
        })
        .collect()
}

// ── ANSI output ─────────────────────────────────────────────────────────────

fn write_span(out: &mut String, span: &Span<'_>) {
    if span.style == Style::default() {
        out.push_str(&span.content);
    } else {
        let _ = write!(out, "{}", content_style(span.style).apply(&*span.content));
    }
}

fn content_style(style: Style) -> ContentStyle {
    let mut cs = ContentStyle::new();
    cs.foreground_color = style.fg.map(to_crossterm);
    cs.background_color = style.bg.map(to_crossterm);
    for (modifier, attribute) in [
        (Modifier::BOLD, Attribute::Bold),
        (Modifier::DIM, Attribute::Dim),
        (Modifier::ITALIC, Attribute::Italic),
        (Modifier::UNDERLINED, Attribute::Underlined),
        (Modifier::REVERSED, Attribute::Reverse),
        (Modifier::CROSSED_OUT, Attribute::CrossedOut),
    ] {
        if style.add_modifier.contains(modifier) {
            cs.attributes.set(attribute);
        }
    }
    cs
}

fn to_crossterm(color: Color) -> ct::Color {
    match color {
        Color::Reset => ct::Color::Reset,
        Color::Black => ct::Color::Black,
        Color::Red => ct::Color::DarkRed,
        Color::Green => ct::Color::DarkGreen,
        Color::Yellow => ct::Color::DarkYellow,
        Color::Blue => ct::Color::DarkBlue,
        Color::Magenta => ct::Color::DarkMagenta,
        Color::Cyan => ct::Color::DarkCyan,
        Color::Gray => ct::Color::Grey,
        Color::DarkGray => ct::Color::DarkGrey,
        Color::LightRed => ct::Color::Red,
        Color::LightGreen => ct::Color::Green,
        Color::LightYellow => ct::Color::Yellow,
        Color::LightBlue => ct::Color::Blue,
        Color::LightMagenta => ct::Color::Magenta,
        Color::LightCyan => ct::Color::Cyan,
        Color::White => ct::Color::White,
        Color::Rgb(r, g, b) => ct::Color::Rgb { r, g, b },
        Color::Indexed(i) => ct::Color::AnsiValue(i),
    }
}
