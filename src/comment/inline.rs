//! Inline markup resolver: `{@tag content}` scanning over comment text.
//!
//! Lines are unwrapped first: each line is trimmed, lines of one paragraph
//! are joined with a single space and a blank line becomes `\n\n` at the
//! start of a new text node. The scan is a single forward pass over the
//! unwrapped characters, each of which remembers its offset in the raw input.

use super::lines::{self, Line};
use crate::error::{Diagnostic, DiagnosticKind};
use crate::model::{LinkStyle, MarkupNode, TargetReference};
use std::ops::Range;

/// A markup node with the raw extent it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub node: MarkupNode,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineParse {
    /// Nodes in reading order. Spans are contiguous and cover the parsed range.
    pub nodes: Vec<Spanned>,
    pub diagnostics: Vec<Diagnostic>,
}

impl InlineParse {
    pub fn into_nodes(self) -> Vec<MarkupNode> {
        self.nodes.into_iter().map(|s| s.node).collect()
    }
}

/// Parse a raw comment body.
pub fn parse_inline(raw: &str) -> InlineParse {
    parse_lines(&lines::split(raw), 0, raw.len())
}

/// Parse already split lines. The first span starts at `start`, the last
/// one ends at `end`.
pub(crate) fn parse_lines(lines: &[Line<'_>], start: usize, end: usize) -> InlineParse {
    let chars = unwrap(lines);
    let mut scanner = Scanner {
        chars: &chars,
        pos: 0,
        text: String::new(),
        text_start: 0,
        found: Vec::new(),
        diagnostics: Vec::new(),
    };
    scanner.run();

    let starts: Vec<usize> = scanner
        .found
        .iter()
        .enumerate()
        .map(|(i, (at, _))| if i == 0 { start } else { chars[*at].0 })
        .collect();
    let nodes = scanner
        .found
        .into_iter()
        .enumerate()
        .map(|(i, (_, node))| Spanned {
            node,
            span: starts[i]..starts.get(i + 1).copied().unwrap_or(end),
        })
        .collect();
    InlineParse {
        nodes,
        diagnostics: scanner.diagnostics,
    }
}

/// Join lines into one character stream, each character paired with its
/// raw offset. Inserted separators take the offset of the line they precede.
fn unwrap(lines: &[Line<'_>]) -> Vec<(usize, char)> {
    let mut out = Vec::new();
    let mut paragraph_break = false;
    for line in lines {
        let trimmed = line.text.trim();
        if trimmed.is_empty() {
            paragraph_break = !out.is_empty();
            continue;
        }
        let at = line.offset + (line.text.len() - line.text.trim_start().len());
        if paragraph_break {
            out.push((at, '\n'));
            out.push((at, '\n'));
            paragraph_break = false;
        } else if !out.is_empty() {
            out.push((at, ' '));
        }
        out.extend(trimmed.char_indices().map(|(i, c)| (at + i, c)));
    }
    out
}

struct Scanner<'a> {
    chars: &'a [(usize, char)],
    pos: usize,
    text: String,
    text_start: usize,
    /// Nodes paired with the unwrapped index they start at.
    found: Vec<(usize, MarkupNode)>,
    diagnostics: Vec<Diagnostic>,
}

impl Scanner<'_> {
    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|(_, c)| *c)
    }

    fn push_text(&mut self, s: &str) {
        if self.text.is_empty() {
            self.text_start = self.pos;
        }
        self.text.push_str(s);
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.found.push((self.text_start, MarkupNode::Text(text)));
        }
    }

    fn run(&mut self) {
        while let Some(c) = self.peek(0) {
            match (c, self.peek(1)) {
                ('\\', Some(brace @ ('{' | '}'))) => {
                    self.push_text(brace.encode_utf8(&mut [0; 4]));
                    self.pos += 2;
                }
                ('\n', Some('\n')) => {
                    self.flush_text();
                    self.push_text("\n\n");
                    self.pos += 2;
                }
                ('{', Some('@')) => {
                    self.flush_text();
                    let at = self.pos;
                    let node = self.inline_tag();
                    self.found.push((at, node));
                }
                _ => {
                    self.push_text(c.encode_utf8(&mut [0; 4]));
                    self.pos += 1;
                }
            }
        }
        self.flush_text();
    }

    /// Read one `{@name content}` starting at the opening brace.
    fn inline_tag(&mut self) -> MarkupNode {
        self.pos += 2;
        let mut name = String::new();
        while let Some(c) = self.peek(0) {
            if c.is_whitespace() || c == '{' || c == '}' {
                break;
            }
            name.push(c);
            self.pos += 1;
        }
        while self.peek(0).is_some_and(char::is_whitespace) {
            self.pos += 1;
        }

        let mut content = String::new();
        let mut depth = 1;
        let mut closed = false;
        while let Some(c) = self.peek(0) {
            match (c, self.peek(1)) {
                ('\\', Some(brace @ ('{' | '}'))) => {
                    content.push(c);
                    content.push(brace);
                    self.pos += 2;
                    continue;
                }
                ('{', _) => depth += 1,
                ('}', _) => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        closed = true;
                        break;
                    }
                }
                _ => {}
            }
            content.push(c);
            self.pos += 1;
        }
        if !closed {
            self.diagnostics.push(Diagnostic::new(
                DiagnosticKind::MalformedMarkup,
                format!("unterminated inline tag {{@{}", name),
            ));
        }
        tag_node(name, content)
    }
}

fn tag_node(name: String, content: String) -> MarkupNode {
    match name.as_str() {
        "code" => MarkupNode::CodeSpan(content),
        "literal" => MarkupNode::Literal(content),
        "link" | "linkplain" => {
            let (target, label) = split_reference(&content);
            MarkupNode::LinkRef {
                target: TargetReference::Unresolved(target),
                label,
                style: if name == "link" {
                    LinkStyle::Code
                } else {
                    LinkStyle::Plain
                },
            }
        }
        "value" => {
            let target = content.trim();
            MarkupNode::Value((!target.is_empty()).then(|| TargetReference::Unresolved(target.to_string())))
        }
        _ => MarkupNode::InlineTagUnknown { name, content },
    }
}

/// Split `target label...` where whitespace inside a parenthesised
/// parameter list does not end the target.
pub(crate) fn split_reference(content: &str) -> (String, Option<String>) {
    let content = content.trim();
    let mut depth = 0usize;
    let mut end = content.len();
    for (i, c) in content.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                end = i;
                break;
            }
            _ => {}
        }
    }
    let label = content[end..].trim();
    (
        content[..end].to_string(),
        (!label.is_empty()).then(|| label.to_string()),
    )
}

/// Write nodes back as comment text that parses to the same nodes.
pub fn reconstruct(nodes: &[MarkupNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            MarkupNode::Text(text) => {
                for c in text.chars() {
                    if c == '{' || c == '}' {
                        out.push('\\');
                    }
                    out.push(c);
                }
            }
            MarkupNode::CodeSpan(content) => write_tag(&mut out, "code", content),
            MarkupNode::Literal(content) => write_tag(&mut out, "literal", content),
            MarkupNode::LinkRef {
                target,
                label,
                style,
            } => {
                let content = match label {
                    Some(label) => format!("{} {}", target.text(), label),
                    None => target.text().to_string(),
                };
                write_tag(&mut out, style.tag_name(), &content);
            }
            MarkupNode::Value(target) => {
                write_tag(&mut out, "value", target.as_ref().map_or("", |t| t.text()))
            }
            MarkupNode::InlineTagUnknown { name, content } => write_tag(&mut out, name, content),
        }
    }
    out
}

fn write_tag(out: &mut String, name: &str, content: &str) {
    out.push_str("{@");
    out.push_str(name);
    if !content.is_empty() {
        out.push(' ');
        out.push_str(content);
    }
    out.push('}');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(raw: &str) -> Vec<MarkupNode> {
        parse_inline(raw).into_nodes()
    }

    fn text(s: &str) -> MarkupNode {
        MarkupNode::Text(s.to_string())
    }

    #[test]
    fn plain_text_is_one_node() {
        assert_eq!(nodes("Does a thing."), [text("Does a thing.")]);
    }

    #[test]
    fn known_tags() {
        let parsed = nodes("Use {@code a < b} or {@literal x&y}.");
        assert_eq!(
            parsed,
            [
                text("Use "),
                MarkupNode::CodeSpan("a < b".into()),
                text(" or "),
                MarkupNode::Literal("x&y".into()),
                text("."),
            ]
        );
    }

    #[test]
    fn link_with_and_without_label() {
        let parsed = nodes("{@link Foo#bar(int, String) the bar}{@linkplain Foo}");
        assert_eq!(
            parsed,
            [
                MarkupNode::LinkRef {
                    target: TargetReference::Unresolved("Foo#bar(int, String)".into()),
                    label: Some("the bar".into()),
                    style: LinkStyle::Code,
                },
                MarkupNode::LinkRef {
                    target: TargetReference::Unresolved("Foo".into()),
                    label: None,
                    style: LinkStyle::Plain,
                },
            ]
        );
    }

    #[test]
    fn value_tag() {
        assert_eq!(nodes("{@value}"), [MarkupNode::Value(None)]);
        assert_eq!(
            nodes("{@value #MAX}"),
            [MarkupNode::Value(Some(TargetReference::Unresolved("#MAX".into())))]
        );
    }

    #[test]
    fn unknown_tag_keeps_raw_content() {
        assert_eq!(
            nodes("{@index  term {nested}}"),
            [MarkupNode::InlineTagUnknown {
                name: "index".into(),
                content: "term {nested}".into(),
            }]
        );
    }

    #[test]
    fn escaped_braces_are_text() {
        assert_eq!(nodes(r"a \{@code x\} b"), [text("a {@code x} b")]);
    }

    #[test]
    fn lines_unwrap_and_paragraphs_split() {
        let raw = "First line\n * second line\n *\n * Next paragraph.";
        assert_eq!(
            nodes(raw),
            [text("First line second line"), text("\n\nNext paragraph.")]
        );
    }

    #[test]
    fn unterminated_tag_takes_the_rest() {
        let parsed = parse_inline("See {@code foo\n * bar");
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].kind, DiagnosticKind::MalformedMarkup);
        assert_eq!(
            parsed.into_nodes(),
            [text("See "), MarkupNode::CodeSpan("foo bar".into())]
        );
    }

    #[test]
    fn spans_cover_input() {
        let raw = "  Text {@code x}\n * more {@link A}\n";
        let parsed = parse_inline(raw);
        assert_eq!(parsed.nodes.first().unwrap().span.start, 0);
        assert_eq!(parsed.nodes.last().unwrap().span.end, raw.len());
        for pair in parsed.nodes.windows(2) {
            assert_eq!(pair[0].span.end, pair[1].span.start);
        }
    }

    #[test]
    fn blank_input_has_no_nodes() {
        assert!(nodes("  \n * \n").is_empty());
    }

    #[test]
    fn reconstruct_reparses_equal() {
        let raw = "A {@link B#c(int) see c} and {@code {x}} \\{ ok\n\n{@value} {@foo}";
        let first = nodes(raw);
        assert_eq!(nodes(&reconstruct(&first)), first);
    }
}
