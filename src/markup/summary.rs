//! Lightweight markdown-ish formatting for summaries produced by the
//! analysis service.
//!
//! The service's summariser emits `**bold**`, `*italic*`, newlines, and
//! numbered points (`1. ...`). Those are mapped onto a tiny HTML vocabulary
//! (`<strong>`, `<em>`, `<br>`). The rules run in a fixed order because each
//! one operates on the previous one's output.

use std::sync::LazyLock;

use regex::Regex;

use super::{Markup, escape_text};

/// Shown when a summary is missing or empty.
pub const NO_SUMMARY: &str = "<p>No summary available.</p>";

// ---------------------------------------------------------------------------
// Compiled regexes
// ---------------------------------------------------------------------------

/// `**X**`, non-greedy, never spanning a line terminator.
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*([^\n\r\u{2028}\u{2029}]*?)\*\*").expect("bold regex must compile")
});

/// `*X*` left over after bold spans were consumed.
static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*([^\n\r\u{2028}\u{2029}]*?)\*").expect("italic regex must compile")
});

/// A numbered-list marker: ASCII digits, a dot, and any trailing whitespace
/// including line terminators. Anchored to the slice it is run on.
static NUMBERED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[0-9]+\.[\t\n\x0B\x0C\r \u{a0}\u{1680}\u{2000}-\u{200a}\u{2028}\u{2029}\u{202f}\u{205f}\u{3000}\u{feff}]*",
    )
    .expect("numbered regex must compile")
});

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Format a summary into markup.
///
/// HTML already present in `summary` passes through untouched. Use
/// [`format_summary_escaped`] when the service is not trusted.
pub fn format_summary(summary: Option<&str>) -> Markup {
    match summary.filter(|s| !s.is_empty()) {
        Some(text) => Markup::trusted(apply_rules(text)),
        None => Markup::trusted(NO_SUMMARY),
    }
}

/// Like [`format_summary`], but escapes the text before formatting.
///
/// Escaping never touches `*`, digits, `.`, or newlines, so the formatting
/// rules still apply to the escaped text.
pub fn format_summary_escaped(summary: Option<&str>) -> Markup {
    match summary.filter(|s| !s.is_empty()) {
        Some(text) => Markup::trusted(apply_rules(&escape_text(text))),
        None => Markup::trusted(NO_SUMMARY),
    }
}

fn apply_rules(text: &str) -> String {
    let bold = BOLD_RE.replace_all(text, "<strong>${1}</strong>");
    let italic = ITALIC_RE.replace_all(&bold, "<em>${1}</em>");
    let broken = italic.replace('\n', "<br>");
    mark_numbered(&broken)
}

/// Bold every numbered marker that starts a line.
///
/// After newlines became `<br>`, the remaining line starts are the text start
/// and the positions after `\r`, U+2028, or U+2029. A marker may swallow the
/// terminator that follows it; the next line still counts as a line start.
fn mark_numbered(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut line_start = true;
    for (i, c) in text.char_indices() {
        if line_start && i >= copied {
            if let Some(m) = NUMBERED_RE.find(&text[i..]) {
                out.push_str(&text[copied..i]);
                out.push_str("<br><strong>");
                out.push_str(m.as_str());
                out.push_str("</strong>");
                copied = i + m.end();
            }
        }
        line_start = matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}');
    }
    out.push_str(&text[copied..]);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(text: &str) -> String {
        format_summary(Some(text)).into_string()
    }

    #[test]
    fn missing_or_empty_gives_placeholder() {
        assert_eq!(format_summary(None).as_str(), NO_SUMMARY);
        assert_eq!(format_summary(Some("")).as_str(), NO_SUMMARY);
        assert_eq!(format_summary_escaped(None).as_str(), NO_SUMMARY);
    }

    #[test]
    fn bold_span() {
        assert_eq!(fmt("**a**"), "<strong>a</strong>");
    }

    #[test]
    fn bold_is_non_greedy_and_repeated() {
        assert_eq!(
            fmt("**one** and **two**"),
            "<strong>one</strong> and <strong>two</strong>"
        );
    }

    #[test]
    fn italic_after_bold() {
        assert_eq!(
            fmt("**Key** point is *subtle*"),
            "<strong>Key</strong> point is <em>subtle</em>"
        );
    }

    #[test]
    fn newlines_become_breaks() {
        assert_eq!(fmt("line one\nline two"), "line one<br>line two");
    }

    #[test]
    fn numbered_marker_at_start() {
        assert_eq!(fmt("1. x"), "<br><strong>1. </strong>x");
    }

    #[test]
    fn numbered_marker_only_matches_text_start_once_newlines_are_gone() {
        assert_eq!(
            fmt("2. first\n3. second"),
            "<br><strong>2. </strong>first<br>3. second"
        );
    }

    #[test]
    fn spans_do_not_cross_lines() {
        assert_eq!(fmt("*open\nclose*"), "*open<br>close*");
        assert_eq!(fmt("**a\rb**"), "**a\rb**");
        assert_eq!(fmt("*a\u{2028}b*"), "*a\u{2028}b*");
    }

    #[test]
    fn only_ascii_digits_number_a_point() {
        assert_eq!(fmt("१. x"), "१. x");
        assert_eq!(fmt("١٢. x"), "١٢. x");
    }

    #[test]
    fn carriage_return_and_separators_start_lines() {
        assert_eq!(
            fmt("intro\r2. next"),
            "intro\r<br><strong>2. </strong>next"
        );
        assert_eq!(
            fmt("a\u{2029}3. c"),
            "a\u{2029}<br><strong>3. </strong>c"
        );
        assert_eq!(
            fmt("1.\r2. b"),
            "<br><strong>1.\r</strong><br><strong>2. </strong>b"
        );
    }

    #[test]
    fn raw_html_passes_through_unescaped() {
        assert_eq!(fmt("<b>kept</b>"), "<b>kept</b>");
    }

    #[test]
    fn escaped_variant_neutralises_html_but_still_formats() {
        assert_eq!(
            format_summary_escaped(Some("**<b>x</b>**")).as_str(),
            "<strong>&lt;b&gt;x&lt;/b&gt;</strong>"
        );
    }

    #[test]
    fn plain_text_is_a_fixed_point() {
        let text = "Parliament debated the bill for three days";
        assert_eq!(fmt(text), text);
        assert_eq!(fmt(&fmt(text)), fmt(text));
    }
}
