//! Tag block extractor: splits a comment into its body and `@tag` blocks.

use super::inline::{parse_lines, split_reference};
use super::lines::{self, Line};
use crate::error::Diagnostic;
use crate::model::{DocComment, LinkStyle, MarkupNode, TagBlock, TagName, TargetReference};
use regex::Regex;
use std::sync::LazyLock;

static RE_BLOCK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z][A-Za-z0-9_.:-]*)(?:\s|$)").unwrap());

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    pub comment: DocComment,
    pub diagnostics: Vec<Diagnostic>,
}

/// A block tag and the lines of its text, the first one starting right
/// after the tag name.
struct Section<'a> {
    name: String,
    lines: Vec<Line<'a>>,
}

/// Split a raw comment into body markup and tag blocks.
pub fn extract(raw: &str) -> Extracted {
    let all = lines::split(raw);
    let mut body: Vec<Line<'_>> = Vec::new();
    let mut sections: Vec<Section<'_>> = Vec::new();
    let mut depth = 0usize;

    for line in all {
        let starts_tag = if depth == 0 {
            RE_BLOCK_TAG.captures(line.text)
        } else {
            None
        };
        depth = inline_depth(line.text, depth);
        match starts_tag {
            Some(caps) => {
                let matched = caps.get(0).map_or(0, |m| m.end());
                let name = caps.get(1).map_or("", |m| m.as_str()).to_string();
                sections.push(Section {
                    name,
                    lines: vec![line.tail(matched)],
                });
            }
            None => match sections.last_mut() {
                Some(section) => section.lines.push(line),
                None => body.push(line),
            },
        }
    }

    let body_end = sections
        .first()
        .and_then(|s| s.lines.first())
        .map_or(raw.len(), |l| line_start(raw, l.offset));
    let mut diagnostics = Vec::new();
    let parsed = parse_lines(&body, 0, body_end);
    diagnostics.extend(parsed.diagnostics.iter().cloned());
    let body = parsed.into_nodes();

    let tags = sections
        .into_iter()
        .map(|section| tag_block(section, raw.len(), &mut diagnostics))
        .collect();

    Extracted {
        comment: DocComment { body, tags },
        diagnostics,
    }
}

fn tag_block(section: Section<'_>, end: usize, diagnostics: &mut Vec<Diagnostic>) -> TagBlock {
    let name = TagName::from_name(&section.name);
    let mut lines = section.lines;
    let start = lines.first().map_or(end, |l| l.offset);
    let mut arguments = Vec::new();

    let body = match name {
        TagName::Param | TagName::Throws => {
            arguments.push(take_token(&mut lines[0]));
            inline_body(&lines, start, end, diagnostics)
        }
        TagName::See => see_body(&lines, start, end, &mut arguments, diagnostics),
        _ => inline_body(&lines, start, end, diagnostics),
    };

    TagBlock {
        name,
        arguments,
        body,
        title: None,
    }
}

fn inline_body(
    lines: &[Line<'_>],
    start: usize,
    end: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<MarkupNode> {
    let parsed = parse_lines(lines, start, end);
    diagnostics.extend(parsed.diagnostics.iter().cloned());
    parsed.into_nodes()
}

/// `@see "text"`, `@see <a href>` or `@see target label`.
fn see_body(
    lines: &[Line<'_>],
    start: usize,
    end: usize,
    arguments: &mut Vec<String>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<MarkupNode> {
    let text = lines
        .iter()
        .map(|l| l.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if text.starts_with('"') {
        return vec![MarkupNode::Text(text)];
    }
    if text.starts_with('<') {
        return inline_body(lines, start, end, diagnostics);
    }
    let (target, label) = split_reference(&text);
    arguments.push(target.clone());
    vec![MarkupNode::LinkRef {
        target: TargetReference::Unresolved(target),
        label,
        style: LinkStyle::Code,
    }]
}

/// Remove the first whitespace-delimited token from a line. Empty when the
/// line has none.
fn take_token(line: &mut Line<'_>) -> String {
    let lead = line.text.len() - line.text.trim_start().len();
    let rest = &line.text[lead..];
    let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let token = rest[..len].to_string();
    *line = line.tail(lead + len);
    token
}

/// Offset of the first byte of the raw line containing `offset`.
fn line_start(raw: &str, offset: usize) -> usize {
    raw[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Nesting depth of inline tags after reading `text`, so that `@` at the
/// start of a line inside `{@code ...}` is not taken for a block tag.
fn inline_depth(text: &str, mut depth: usize) -> usize {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if matches!(chars.peek(), Some('{' | '}')) => {
                chars.next();
            }
            '{' if depth > 0 || chars.peek() == Some(&'@') => depth += 1,
            '}' if depth > 0 => depth -= 1,
            _ => {}
        }
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> MarkupNode {
        MarkupNode::Text(s.to_string())
    }

    #[test]
    fn scenario_comment() {
        let extracted = extract("Does a thing.\n@param x the input\n@return the result");
        let comment = extracted.comment;
        assert_eq!(comment.body, [text("Does a thing.")]);
        assert_eq!(comment.tags.len(), 2);
        assert_eq!(comment.tags[0].name, TagName::Param);
        assert_eq!(comment.tags[0].arguments, ["x"]);
        assert_eq!(comment.tags[0].body, [text("the input")]);
        assert_eq!(comment.tags[1].name, TagName::Return);
        assert!(comment.tags[1].arguments.is_empty());
        assert_eq!(comment.tags[1].body, [text("the result")]);
    }

    #[test]
    fn param_argument_is_isolated() {
        let tags = extract("@param foo the foo value").comment.tags;
        assert_eq!(tags[0].arguments, ["foo"]);
        assert_eq!(tags[0].body, [text("the foo value")]);
    }

    #[test]
    fn bare_param_keeps_empty_argument() {
        let tags = extract("@param").comment.tags;
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].arguments, [""]);
        assert!(tags[0].body.is_empty());
    }

    #[test]
    fn mid_line_at_is_text() {
        let extracted = extract("Mail me@example.com\n * or see {@code\n * @Override} here");
        assert!(extracted.comment.tags.is_empty());
        assert_eq!(
            extracted.comment.body,
            [
                text("Mail me@example.com or see "),
                MarkupNode::CodeSpan("@Override".into()),
                text(" here"),
            ]
        );
    }

    #[test]
    fn multiline_tags_and_repeats() {
        let raw = "/**\n * Body.\n *\n * @throws IOException when\n *         reading fails\n * @throws IllegalStateException\n * @since 1.2\n */";
        let tags = extract(raw).comment.tags;
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].arguments, ["IOException"]);
        assert_eq!(tags[0].body, [text("when reading fails")]);
        assert_eq!(tags[1].arguments, ["IllegalStateException"]);
        assert!(tags[1].body.is_empty());
        assert_eq!(tags[2].name, TagName::Since);
        assert_eq!(tags[2].body, [text("1.2")]);
    }

    #[test]
    fn see_forms() {
        let tags = extract("@see Foo#bar(int, int) the bar\n@see \"Quoted\"\n@see <a href=\"x\">x</a>")
            .comment
            .tags;
        assert_eq!(tags[0].arguments, ["Foo#bar(int, int)"]);
        assert_eq!(
            tags[0].body,
            [MarkupNode::LinkRef {
                target: TargetReference::Unresolved("Foo#bar(int, int)".into()),
                label: Some("the bar".into()),
                style: LinkStyle::Code,
            }]
        );
        assert_eq!(tags[1].body, [text("\"Quoted\"")]);
        assert!(tags[1].arguments.is_empty());
        assert_eq!(tags[2].body, [text("<a href=\"x\">x</a>")]);
    }

    #[test]
    fn unknown_tag_is_preserved() {
        let tags = extract("@apiNote keep {@code me}").comment.tags;
        assert_eq!(tags[0].name, TagName::Custom("apiNote".into()));
        assert_eq!(
            tags[0].body,
            [text("keep "), MarkupNode::CodeSpan("me".into())]
        );
    }

    #[test]
    fn malformed_markup_is_reported() {
        let extracted = extract("Broken {@link Foo\n@return x");
        assert_eq!(extracted.diagnostics.len(), 1);
        assert!(extracted.comment.tags.is_empty());
    }
}
