//! Splits a markdown post into title, teaser and body.
//!
//! A post needs no front matter or explicit delimiters. The first ATX heading
//! is the title, the first paragraph after it is the teaser, and everything
//! that follows is the body:
//!
//! ```text
//! # Title
//!
//! Teaser paragraph, shown in listings
//! and in the feed.
//!
//! Body starts here.
//! ```
//!
//! A horizontal rule or a second heading directly after the title means the
//! post has no teaser. A document that does not open with a heading is all
//! body.

use std::io::BufRead;
use std::sync::LazyLock;

use regex::Regex;

static BLANK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*$").unwrap());
static HRULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:\* *){3,}|(?:_ *){3,}|(?:- *){3,}) *$").unwrap()
});
static ATX_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}(?: +|$)(.*)$").unwrap());
static CLOSING_HASHES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+#+\s*$").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub title: String,
    pub teaser_markdown: String,
    pub body_markdown: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    HasTitle,
    InBlurb,
    Content,
}

struct PostParser {
    state: State,
    doc: ParsedDocument,
}

impl PostParser {
    fn new() -> Self {
        Self {
            state: State::Start,
            doc: ParsedDocument::default(),
        }
    }

    fn feed(&mut self, line: &str) {
        let blank = is_blank(line);
        match self.state {
            State::Start if blank => {}
            State::Start => match atx_heading(line) {
                Some(title) => {
                    self.doc.title = title;
                    self.state = State::HasTitle;
                }
                None => self.push_body(line),
            },
            State::HasTitle if blank => {}
            State::HasTitle => {
                if is_hrule(line) || atx_heading(line).is_some() {
                    self.push_body(line);
                } else {
                    self.push_teaser(line);
                }
            }
            State::InBlurb if blank => self.push_body(line),
            State::InBlurb => self.push_teaser(line),
            State::Content => self.push_body(line),
        }
    }

    fn push_teaser(&mut self, line: &str) {
        self.doc.teaser_markdown.push_str(line);
        self.doc.teaser_markdown.push('\n');
        self.state = State::InBlurb;
    }

    fn push_body(&mut self, line: &str) {
        self.doc.body_markdown.push_str(line);
        self.doc.body_markdown.push('\n');
        self.state = State::Content;
    }
}

/// Parses a post from a line-oriented reader.
///
/// Never fails on content. Bytes that are not valid UTF-8 are replaced with
/// U+FFFD; only an I/O error ends the document early.
pub fn parse_markdown_post<R: BufRead>(reader: R) -> ParsedDocument {
    let mut parser = PostParser::new();
    for line in reader.split(b'\n') {
        match line {
            Ok(mut bytes) => {
                if bytes.last() == Some(&b'\r') {
                    bytes.pop();
                }
                parser.feed(&String::from_utf8_lossy(&bytes));
            }
            Err(e) => {
                tracing::warn!("Stopped reading post early: {}", e);
                break;
            }
        }
    }
    parser.doc
}

fn is_blank(line: &str) -> bool {
    BLANK_RE.is_match(line)
}

fn is_hrule(line: &str) -> bool {
    HRULE_RE.is_match(line)
}

/// Returns the heading text when `line` is an ATX heading, with any closing
/// run of `#` and surrounding whitespace removed.
fn atx_heading(line: &str) -> Option<String> {
    let captures = ATX_HEADING_RE.captures(line)?;
    let text = captures.get(1).map_or("", |m| m.as_str());
    let text = CLOSING_HASHES_RE.replace(text, "");
    Some(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_markdown_str(source: &str) -> ParsedDocument {
        parse_markdown_post(source.as_bytes())
    }

    #[test]
    fn extracts_title_from_leading_heading() {
        let doc = parse_markdown_str("# Hello\n\nTeaser.\n");
        assert_eq!(doc.title, "Hello");
    }

    #[test]
    fn strips_closing_hashes_from_title() {
        let doc = parse_markdown_str("## Title ##\n");
        assert_eq!(doc.title, "Title");
        assert_eq!(parse_markdown_str("###   Spaced   ###   \n").title, "Spaced");
    }

    #[test]
    fn hash_without_space_is_not_a_heading() {
        let doc = parse_markdown_str("#hashtag\n");
        assert_eq!(doc.title, "");
        assert_eq!(doc.body_markdown, "#hashtag\n");
    }

    #[test]
    fn seven_hashes_is_not_a_heading() {
        let doc = parse_markdown_str("####### Nope\n");
        assert_eq!(doc.title, "");
        assert_eq!(doc.body_markdown, "####### Nope\n");
    }

    #[test]
    fn bare_hash_is_an_empty_heading() {
        let doc = parse_markdown_str("#\n\nTeaser.\n");
        assert_eq!(doc.title, "");
        assert_eq!(doc.teaser_markdown, "Teaser.\n");
    }

    #[test]
    fn first_paragraph_becomes_teaser() {
        let doc = parse_markdown_str("# T\n\nPara one.\nStill para one.\n\nBody starts.\n");
        assert_eq!(doc.title, "T");
        assert_eq!(doc.teaser_markdown, "Para one.\nStill para one.\n");
        assert_eq!(doc.body_markdown, "\nBody starts.\n");
    }

    #[test]
    fn rule_after_title_means_no_teaser() {
        let doc = parse_markdown_str("# T\n\n---\nBody.\n");
        assert_eq!(doc.teaser_markdown, "");
        assert_eq!(doc.body_markdown, "---\nBody.\n");
    }

    #[test]
    fn spaced_rules_are_recognized() {
        for rule in ["* * *", "___", "- - - -", "***   "] {
            let doc = parse_markdown_str(&format!("# T\n{rule}\nBody.\n"));
            assert_eq!(doc.teaser_markdown, "", "rule {rule:?}");
            assert_eq!(doc.body_markdown, format!("{rule}\nBody.\n"));
        }
    }

    #[test]
    fn second_heading_after_title_means_no_teaser() {
        let doc = parse_markdown_str("# T\n\n## Section\nText.\n");
        assert_eq!(doc.title, "T");
        assert_eq!(doc.teaser_markdown, "");
        assert_eq!(doc.body_markdown, "## Section\nText.\n");
    }

    #[test]
    fn headerless_document_is_all_body() {
        let doc = parse_markdown_str("Just text.\nMore text.\n");
        assert_eq!(doc.title, "");
        assert_eq!(doc.teaser_markdown, "");
        assert_eq!(doc.body_markdown, "Just text.\nMore text.\n");
    }

    #[test]
    fn leading_blank_lines_are_dropped() {
        let doc = parse_markdown_str("\n  \n# T\n\n\nTeaser.\n");
        assert_eq!(doc.title, "T");
        assert_eq!(doc.teaser_markdown, "Teaser.\n");
        assert_eq!(doc.body_markdown, "");
    }

    #[test]
    fn content_lines_are_never_reinterpreted() {
        let doc = parse_markdown_str("Intro.\n# Late heading\n\n---\n");
        assert_eq!(doc.title, "");
        assert_eq!(doc.body_markdown, "Intro.\n# Late heading\n\n---\n");
    }

    #[test]
    fn crlf_line_endings_are_normalized() {
        let doc = parse_markdown_str("# T\r\n\r\nTeaser.\r\n\r\nBody.\r\n");
        assert_eq!(doc.title, "T");
        assert_eq!(doc.teaser_markdown, "Teaser.\n");
        assert_eq!(doc.body_markdown, "\nBody.\n");
    }

    #[test]
    fn empty_input_yields_empty_document() {
        assert_eq!(parse_markdown_str(""), ParsedDocument::default());
    }

    #[test]
    fn invalid_utf8_is_replaced_not_truncated() {
        let source = b"# Caf\xe9 notes\n\nTeaser line.\n\nBody one.\nNa\xefve line.\nBody three.\n";
        let doc = parse_markdown_post(&source[..]);
        assert_eq!(doc.title, "Caf\u{FFFD} notes");
        assert_eq!(doc.teaser_markdown, "Teaser line.\n");
        assert_eq!(
            doc.body_markdown,
            "\nBody one.\nNa\u{FFFD}ve line.\nBody three.\n"
        );
    }

    /// Every non-blank input line other than the title appears exactly once,
    /// in order, across teaser and body.
    fn assert_conserved(source: &[u8]) {
        let text = String::from_utf8_lossy(source);
        let mut expected: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if expected.first().is_some_and(|l| atx_heading(l).is_some()) {
            expected.remove(0);
        }

        let doc = parse_markdown_post(source);
        let seen: Vec<&str> = doc
            .teaser_markdown
            .lines()
            .chain(doc.body_markdown.lines())
            .filter(|l| !l.trim().is_empty())
            .collect();

        assert_eq!(seen, expected, "source {:?}", text);
    }

    #[test]
    fn every_non_blank_line_lands_exactly_once() {
        let cases: &[&[u8]] = &[
            b"\n# Title\n\nOne.\nTwo.\n\nThree.\n\n## Four\n* * *\nFive.\n",
            b"No heading here.\n\n# Late heading\nTail.\n",
            b"# T\n---\nBody.\n\nMore.\n",
            b"# T\n  \t\nTeaser.\n\t \nBody.\n   \n",
            b"# T\r\n\r\nTeaser.\nStill teaser.\r\n\r\nBody.\n",
            b"# \xff\xfe\n\nTe\xc3aser.\n\nBo\x80dy.\n",
            b"# T\n## Sub\n\nText.\n",
            b"",
            b"\n\n  \n",
            b"No trailing newline",
        ];
        for source in cases {
            assert_conserved(source);
        }
    }
}
