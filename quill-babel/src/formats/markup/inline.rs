//! Inline content: marks, escapes, links and mentions.
//!
//! # Marks
//!
//! Every mark has its own delimiter and they always nest in the same order,
//! outermost first:
//!
//! | Mark          | Open   | Close   |
//! |---------------|--------|---------|
//! | strikethrough | `~~`   | `~~`    |
//! | bold          | `**`   | `**`    |
//! | italic        | `_`    | `_`     |
//! | underline     | `<u>`  | `</u>`  |
//!
//! The writer keeps a stack of open marks and, between two runs, only closes
//! back to the longest common prefix of the old and new mark lists. The output
//! for a mark set therefore depends on the set alone, never on how it was
//! built.
//!
//! The scanner toggles marks on each delimiter. Since literal `\ * _ ~ [ ] < @`
//! are always backslash-escaped by the writer, an unescaped delimiter can only
//! be a mark and an unescaped `@` can only start a mention.
//!
//! # Lines
//!
//! A paragraph's text may span lines, but a line holding only whitespace
//! would end the paragraph when read back. [`drop_blank_lines`] removes such
//! lines before writing. Link labels and mention names are always written on
//! one line.

use super::MentionDirectory;
use crate::ir::nodes::{compact_inlines, Image, Inline, Link, Marks, Text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Strikethrough,
    Bold,
    Italic,
    Underline,
}

const MARK_ORDER: [Mark; 4] = [Mark::Strikethrough, Mark::Bold, Mark::Italic, Mark::Underline];

impl Mark {
    fn open(self) -> &'static str {
        match self {
            Mark::Strikethrough => "~~",
            Mark::Bold => "**",
            Mark::Italic => "_",
            Mark::Underline => "<u>",
        }
    }

    fn close(self) -> &'static str {
        match self {
            Mark::Underline => "</u>",
            other => other.open(),
        }
    }

    fn is_set(self, marks: &Marks) -> bool {
        match self {
            Mark::Strikethrough => marks.strikethrough,
            Mark::Bold => marks.bold,
            Mark::Italic => marks.italic,
            Mark::Underline => marks.underline,
        }
    }

    fn flag_mut(self, marks: &mut Marks) -> &mut bool {
        match self {
            Mark::Strikethrough => &mut marks.strikethrough,
            Mark::Bold => &mut marks.bold,
            Mark::Italic => &mut marks.italic,
            Mark::Underline => &mut marks.underline,
        }
    }
}

/// Characters that always get a backslash in literal text.
const ESCAPED: &[char] = &['\\', '*', '_', '~', '[', ']', '<', '@'];

/// Writes inline content as markup.
///
/// `single_line` folds newlines into spaces (headings, summaries). Otherwise
/// newlines are kept, whitespace-only lines are dropped first (see
/// [`drop_blank_lines`]) and a line that would start with `#` or a backtick
/// gets that character escaped.
pub fn write_inlines(inlines: &[Inline], single_line: bool) -> String {
    let content = if single_line {
        inlines.to_vec()
    } else {
        drop_blank_lines(inlines)
    };
    let mut writer = InlineWriter {
        out: String::new(),
        open: Vec::new(),
        single_line,
    };
    writer.write(&content);
    writer.set_marks(Marks::default());
    writer.out
}

struct InlineWriter {
    out: String,
    open: Vec<Mark>,
    single_line: bool,
}

impl InlineWriter {
    fn write(&mut self, inlines: &[Inline]) {
        for inline in inlines {
            match inline {
                Inline::Text(text) => {
                    if text.value.is_empty() {
                        continue;
                    }
                    self.set_marks(text.marks);
                    self.write_text(&text.value);
                }
                Inline::Mention(mention) => {
                    self.set_marks(Marks::default());
                    self.out.push('@');
                    let single_line = std::mem::replace(&mut self.single_line, true);
                    self.write_text(&mention.display);
                    self.single_line = single_line;
                }
                Inline::Link(link) => self.write_link(link),
            }
        }
    }

    fn write_link(&mut self, link: &Link) {
        self.set_marks(Marks::default());
        if ends_with_unescaped(&self.out, '!') {
            self.out.pop();
            self.out.push_str("\\!");
        }
        self.out.push('[');
        let single_line = std::mem::replace(&mut self.single_line, true);
        self.write(&link.children);
        self.single_line = single_line;
        self.set_marks(Marks::default());
        self.out.push_str("](");
        self.out.push_str(&encode_url(&link.url));
        self.out.push(')');
    }

    /// Moves the open mark stack to exactly the marks in `target`.
    fn set_marks(&mut self, target: Marks) {
        let wanted: Vec<Mark> = MARK_ORDER
            .iter()
            .copied()
            .filter(|mark| mark.is_set(&target))
            .collect();
        let keep = self
            .open
            .iter()
            .zip(&wanted)
            .take_while(|(open, want)| open == want)
            .count();

        while self.open.len() > keep {
            if let Some(mark) = self.open.pop() {
                self.out.push_str(mark.close());
            }
        }
        for mark in &wanted[keep..] {
            self.out.push_str(mark.open());
            self.open.push(*mark);
        }
    }

    fn write_text(&mut self, value: &str) {
        for c in value.chars() {
            match c {
                '\r' => {}
                '\n' if self.single_line => self.out.push(' '),
                '\n' => {
                    if !self.out.is_empty() && !self.out.ends_with('\n') {
                        self.out.push('\n');
                    }
                }
                '#' | '`' if !self.single_line && self.at_line_start() => {
                    self.out.push('\\');
                    self.out.push(c);
                }
                c if ESCAPED.contains(&c) => {
                    self.out.push('\\');
                    self.out.push(c);
                }
                c => self.out.push(c),
            }
        }
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }
}

/// Removes every line that holds nothing but whitespace, together with its
/// line break. Leading and trailing line breaks go the same way. Mentions and
/// links always count as content.
pub fn drop_blank_lines(inlines: &[Inline]) -> Vec<Inline> {
    // Each line with the marks of the break that ends it.
    let mut lines: Vec<(Vec<Inline>, Marks)> = Vec::new();
    let mut current = Vec::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => {
                for (i, part) in text.value.split('\n').enumerate() {
                    if i > 0 {
                        lines.push((std::mem::take(&mut current), text.marks));
                    }
                    if !part.is_empty() {
                        current.push(Inline::Text(Text::new(part, text.marks)));
                    }
                }
            }
            other => current.push(other.clone()),
        }
    }
    lines.push((current, Marks::default()));

    let kept: Vec<_> = lines.into_iter().filter(|(line, _)| !is_blank(line)).collect();
    let last = kept.len().saturating_sub(1);
    let mut out = Vec::new();
    for (i, (line, marks)) in kept.into_iter().enumerate() {
        out.extend(line);
        if i < last {
            out.push(Inline::Text(Text::new("\n", marks)));
        }
    }
    compact_inlines(&out)
}

fn is_blank(line: &[Inline]) -> bool {
    line.iter()
        .all(|inline| matches!(inline, Inline::Text(text) if text.value.trim().is_empty()))
}

/// Escapes literal text outside of any line-start context (image labels).
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\r' => {}
            '\n' => out.push(' '),
            c if ESCAPED.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// Removes backslash escapes in front of ASCII punctuation.
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_punctuation() {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Percent-encodes the characters that would end a link target early.
pub fn encode_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            ' ' => out.push_str("%20"),
            ')' => out.push_str("%29"),
            '\n' => out.push_str("%0A"),
            '\r' => out.push_str("%0D"),
            c => out.push(c),
        }
    }
    out
}

fn ends_with_unescaped(out: &str, c: char) -> bool {
    match out.strip_suffix(c) {
        Some(before) => {
            let backslashes = before.chars().rev().take_while(|&b| b == '\\').count();
            backslashes % 2 == 0
        }
        None => false,
    }
}

/// The visible label of an image: its alt text, or the last path segment of
/// its url when the alt text is empty.
///
/// Alt text takes precedence over the path segment; a described image reads
/// back with its description as alt text, an undescribed one with the segment.
pub fn image_label(image: &Image) -> String {
    if !image.alt.is_empty() {
        return image.alt.clone();
    }
    match url::Url::parse(&image.url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string)
            .unwrap_or_default(),
        Err(_) => image
            .url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .split('/')
            .filter(|s| !s.is_empty())
            .last()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Writes an image as `![label](url)`.
pub fn write_image(image: &Image) -> String {
    format!(
        "![{}]({})",
        escape_text(&image_label(image)),
        encode_url(&image.url)
    )
}

// ---------------------------------------------------------------------------
// scanning
// ---------------------------------------------------------------------------

/// A `[label](url)` construct found at the start of some input.
struct LinkSyntax<'a> {
    label: &'a str,
    url: &'a str,
    len: usize,
}

/// Recognizes `[label](url)` at the start of `rest`. The label ends at the
/// first unescaped `]`, the url at the first `)`.
fn link_syntax(rest: &str) -> Option<LinkSyntax<'_>> {
    let body = rest.strip_prefix('[')?;
    let mut label_end = None;
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            ']' => {
                label_end = Some(i);
                break;
            }
            _ => {}
        }
    }
    let label_end = label_end?;
    let after_label = &body[label_end + 1..];
    let target = after_label.strip_prefix('(')?;
    let url_end = target.find(')')?;
    let url = &target[..url_end];
    if url.contains('\n') {
        return None;
    }
    Some(LinkSyntax {
        label: &body[..label_end],
        url,
        len: 1 + label_end + 1 + 1 + url_end + 1,
    })
}

/// Recognizes a line that consists of a single `![label](url)`.
pub fn image_line(line: &str) -> Option<Image> {
    let line = line.trim_end();
    let rest = line.strip_prefix('!')?;
    let link = link_syntax(rest)?;
    if link.len != rest.len() {
        return None;
    }
    Some(Image {
        url: link.url.to_string(),
        alt: unescape(link.label),
    })
}

/// Recognizes a mark delimiter at the start of `rest`. `None` as the state
/// means the delimiter toggles the mark.
fn mark_token(rest: &str) -> Option<(usize, Mark, Option<bool>)> {
    if rest.starts_with("~~") {
        Some((2, Mark::Strikethrough, None))
    } else if rest.starts_with("**") {
        Some((2, Mark::Bold, None))
    } else if rest.starts_with('_') {
        Some((1, Mark::Italic, None))
    } else if rest.starts_with("<u>") {
        Some((3, Mark::Underline, Some(true)))
    } else if rest.starts_with("</u>") {
        Some((4, Mark::Underline, Some(false)))
    } else {
        None
    }
}

/// Scans inline markup into inline nodes. Never fails; anything that is not
/// recognized syntax is kept as literal text.
pub fn scan_inlines(source: &str, mentions: &MentionDirectory) -> Vec<Inline> {
    let mut scanner = InlineScanner {
        mentions,
        out: Vec::new(),
        buffer: String::new(),
    };
    scanner.scan(source, Marks::default(), false);
    compact_inlines(&scanner.out)
}

struct InlineScanner<'a> {
    mentions: &'a MentionDirectory,
    out: Vec<Inline>,
    buffer: String,
}

impl InlineScanner<'_> {
    fn flush(&mut self, marks: Marks) {
        if !self.buffer.is_empty() {
            let value = std::mem::take(&mut self.buffer);
            self.out.push(Inline::Text(Text::new(value, marks)));
        }
    }

    fn scan(&mut self, source: &str, mut marks: Marks, in_link: bool) {
        let mut pos = 0;
        while pos < source.len() {
            let rest = &source[pos..];

            if let Some(after) = rest.strip_prefix('\\') {
                if let Some(next) = after.chars().next().filter(char::is_ascii_punctuation) {
                    self.buffer.push(next);
                    pos += 1 + next.len_utf8();
                    continue;
                }
            }

            if let Some((len, mark, state)) = mark_token(rest) {
                self.flush(marks);
                let flag = mark.flag_mut(&mut marks);
                *flag = state.unwrap_or(!*flag);
                pos += len;
                continue;
            }

            if !in_link && rest.starts_with('[') {
                if let Some(link) = link_syntax(rest) {
                    self.flush(marks);
                    let outer = std::mem::take(&mut self.out);
                    self.scan(link.label, marks, true);
                    let children = std::mem::replace(&mut self.out, outer);
                    self.out.push(Inline::Link(Link {
                        url: link.url.to_string(),
                        children: compact_inlines(&children),
                    }));
                    pos += link.len;
                    continue;
                }
            }

            if let Some(after) = rest.strip_prefix('@') {
                if let Some((len, mention)) = self.mentions.longest_match(after) {
                    self.flush(marks);
                    self.out.push(Inline::Mention(mention));
                    pos += 1 + len;
                    continue;
                }
            }

            if let Some(c) = rest.chars().next() {
                self.buffer.push(c);
                pos += c.len_utf8();
            }
        }
        self.flush(marks);
    }
}
