//! Logical comment lines.

/// One comment line with its `*` continuation marker removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub text: &'a str,
    /// Byte offset of `text` in the raw comment.
    pub offset: usize,
}

impl<'a> Line<'a> {
    /// The part of this line starting `at` bytes into `text`.
    pub fn tail(&self, at: usize) -> Line<'a> {
        Line {
            text: &self.text[at..],
            offset: self.offset + at,
        }
    }
}

/// Split a raw comment into logical lines.
///
/// Leading whitespace is dropped. A run of `*` markers is dropped together
/// with the single space that follows it; any further indentation is kept.
/// Comment delimiters (`/**` on the first line, `*/` on the last) are
/// removed when present.
pub fn split(raw: &str) -> Vec<Line<'_>> {
    let last = raw.matches('\n').count();
    let mut lines = Vec::new();
    let mut offset = 0;
    for (index, segment) in raw.split('\n').enumerate() {
        let mut line = segment.strip_suffix('\r').unwrap_or(segment);
        if index == last {
            if let Some(open) = line.trim_end().strip_suffix("*/") {
                line = open;
            }
        }
        let mut start = line.len() - line.trim_start().len();
        if index == 0 && line[start..].starts_with("/**") {
            // the second `*` is read as the marker run
            start += 2;
        }
        let rest = &line[start..];
        if rest.starts_with('*') {
            start += rest.len() - rest.trim_start_matches('*').len();
            if line[start..].starts_with(' ') {
                start += 1;
            }
        }
        lines.push(Line {
            text: &line[start..],
            offset: offset + start,
        });
        offset += segment.len() + 1;
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markers_and_one_space() {
        let raw = "First line.\n * second\n *   indented\n **";
        let lines = split(raw);
        let texts: Vec<&str> = lines.iter().map(|l| l.text).collect();
        assert_eq!(texts, ["First line.", "second", "  indented", ""]);
    }

    #[test]
    fn strips_comment_delimiters() {
        let lines = split("/** Short. */");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Short. ");
        let texts: Vec<&str> = split("/**\n * a\n */").iter().map(|l| l.text).collect();
        assert_eq!(texts, ["", "a", ""]);
    }

    #[test]
    fn offsets_point_into_raw() {
        let raw = "a\n * b\r\n   c";
        for line in split(raw) {
            assert_eq!(&raw[line.offset..line.offset + line.text.len()], line.text);
        }
    }

    #[test]
    fn tail_moves_offset() {
        let raw = " * @param x";
        let line = split(raw)[0];
        let tail = line.tail(6);
        assert_eq!(tail.text, " x");
        assert_eq!(&raw[tail.offset..], " x");
    }
}
