//! Markup construction with separate trust levels.
//!
//! Two ways exist to get text onto a page:
//!
//! - [`escape_text`] / [`Element::text`]: verbatim text. Every HTML-significant
//!   character is escaped, so server-supplied strings cannot inject structure.
//! - [`Markup`]: already-built markup that is inserted as-is. Only the
//!   [`Element`] builder, [`format_summary`], and templates compiled into the
//!   binary produce it.
//!
//! A raw `String` from the backend never reaches a page without passing
//! through one of the two.

use std::fmt;

mod summary;

pub use summary::{NO_SUMMARY, format_summary, format_summary_escaped};

// ---------------------------------------------------------------------------
// Markup
// ---------------------------------------------------------------------------

/// Trusted markup, inserted into pages without further escaping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    /// Wrap a string the caller vouches for (compiled-in templates, builder
    /// output). Never call this with backend data.
    pub fn trusted(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    /// Escape plain text into markup.
    pub fn text(text: &str) -> Self {
        Self(escape_text(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, other: &Markup) {
        self.0.push_str(&other.0);
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromIterator<Markup> for Markup {
    fn from_iter<I: IntoIterator<Item = Markup>>(iter: I) -> Self {
        let mut out = Markup::default();
        for part in iter {
            out.push(&part);
        }
        out
    }
}

/// Escape text for use in element content or a quoted attribute value.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Element builder
// ---------------------------------------------------------------------------

/// Elements rendered without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta"];

/// Small HTML element builder.
///
/// ```rust,ignore
/// let card = Element::new("div")
///     .class("card")
///     .child(Element::new("h5").class("card-title").text(&perspective.label))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct Element {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Markup,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Markup::default(),
        }
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    /// Add an attribute. The value is always escaped.
    pub fn attr(mut self, name: &'static str, value: impl AsRef<str>) -> Self {
        self.attrs.push((name, escape_text(value.as_ref())));
        self
    }

    /// Append verbatim text (escaped).
    pub fn text(mut self, text: &str) -> Self {
        self.children.push(&Markup::text(text));
        self
    }

    /// Append trusted markup as-is.
    pub fn markup(mut self, markup: &Markup) -> Self {
        self.children.push(markup);
        self
    }

    pub fn child(self, element: Element) -> Self {
        let built = element.build();
        self.markup(&built)
    }

    pub fn build(self) -> Markup {
        let mut out = String::new();
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(value);
            out.push('"');
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&self.tag) {
            return Markup(out);
        }

        out.push_str(self.children.as_str());
        out.push_str("</");
        out.push_str(self.tag);
        out.push('>');
        Markup(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_html_significant_characters() {
        assert_eq!(
            escape_text(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn escape_leaves_plain_text_alone() {
        assert_eq!(escape_text("Economic Perspective"), "Economic Perspective");
    }

    #[test]
    fn builder_escapes_text_and_attributes() {
        let built = Element::new("h5")
            .class("card-title")
            .attr("data-label", "a\"b")
            .text("<script>")
            .build();
        assert_eq!(
            built.as_str(),
            r#"<h5 class="card-title" data-label="a&quot;b">&lt;script&gt;</h5>"#
        );
    }

    #[test]
    fn builder_nests_children_and_markup() {
        let built = Element::new("div")
            .child(Element::new("p").markup(&Markup::trusted("<strong>x</strong>")))
            .build();
        assert_eq!(built.as_str(), "<div><p><strong>x</strong></p></div>");
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let img = Element::new("img")
            .attr("src", "/static/visuals/a.png")
            .attr("alt", "Chart")
            .build();
        assert_eq!(img.as_str(), r#"<img src="/static/visuals/a.png" alt="Chart">"#);
    }

    #[test]
    fn markup_collects_from_iterator() {
        let joined: Markup = ["<b>1</b>", "<b>2</b>"]
            .into_iter()
            .map(Markup::trusted)
            .collect();
        assert_eq!(joined.as_str(), "<b>1</b><b>2</b>");
    }
}
