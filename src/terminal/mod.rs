//! Terminal back-end.
//!
//! Draws the regions a controller left behind as colored plain text for
//! `bharatlens analyze`. Region markup is flattened: line breaks become
//! newlines, `<strong>`/`<em>` become bold/italic, every other tag is dropped.

use std::fmt;
use std::sync::LazyLock;

use colored::Colorize;
use regex::{Captures, Regex};

use crate::ui::{Content, Region, RegionState, Regions};

static BR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<br\s*/?>").expect("br regex must compile"));
static STRONG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<strong>(.*?)</strong>").expect("strong regex must compile"));
static EM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<em>(.*?)</em>").expect("em regex must compile"));
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<h5[^>]*>(.*?)</h5>").expect("title regex must compile"));
static METRIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div class="evaluation-score">(.*?)</div><div>(.*?)</div>"#)
        .expect("metric regex must compile")
});
static IMG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<img[^>]*?src="([^"]*)"[^>]*?alt="([^"]*)"[^>]*>"#)
        .expect("img regex must compile")
});
static BLOCK_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</(?:div|p)>").expect("block regex must compile"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag regex must compile"));

/// Flatten region markup into terminal text.
pub fn markup_to_terminal(markup: &str) -> String {
    flatten(markup, "")
}

/// Like [`markup_to_terminal`], with root-relative image URLs resolved
/// against `link_base`.
fn flatten(markup: &str, link_base: &str) -> String {
    let text = BR_RE.replace_all(markup, "\n");
    let text = METRIC_RE.replace_all(&text, |caps: &Captures| {
        format!("{:>6}  {}\n", unescape(&caps[1]), unescape(&caps[2]))
    });
    let text = IMG_RE.replace_all(&text, |caps: &Captures| {
        let src = unescape(&caps[1]);
        let link = if src.starts_with('/') {
            format!("{link_base}{src}")
        } else {
            src
        };
        format!("{}: {}\n", unescape(&caps[2]), link.underline())
    });
    let text = TITLE_RE.replace_all(&text, |caps: &Captures| {
        format!("{}\n", unescape(&caps[1]).bold())
    });
    let text = STRONG_RE.replace_all(&text, |caps: &Captures| unescape(&caps[1]).bold().to_string());
    let text = EM_RE.replace_all(&text, |caps: &Captures| unescape(&caps[1]).italic().to_string());
    let text = BLOCK_END_RE.replace_all(&text, "\n");
    let text = TAG_RE.replace_all(&text, "");

    let mut lines: Vec<String> = Vec::new();
    for line in unescape(&text).lines() {
        let line = line.trim_end();
        // Collapse runs of blank lines left by nested blocks.
        if line.is_empty() && lines.last().is_none_or(String::is_empty) {
            continue;
        }
        lines.push(line.to_string());
    }
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines.join("\n")
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Regions drawn as terminal text.
pub struct TerminalView<'a> {
    regions: &'a Regions<RegionState>,
    link_base: &'a str,
}

impl<'a> TerminalView<'a> {
    pub fn new(regions: &'a Regions<RegionState>) -> Self {
        Self {
            regions,
            link_base: "",
        }
    }

    /// Resolve chart links such as `/static/visuals/x.png` against the
    /// backend so they can be opened from the terminal.
    pub fn with_link_base(mut self, base_url: &'a str) -> Self {
        self.link_base = base_url;
        self
    }

    pub fn print(&self) {
        print!("{self}");
    }

    fn content_text(&self, content: &Content) -> String {
        match content {
            Content::Empty => String::new(),
            Content::Text(text) => text.clone(),
            Content::Markup(markup) => flatten(markup.as_str(), self.link_base),
        }
    }

    fn section(
        &self,
        f: &mut fmt::Formatter<'_>,
        title: &str,
        visible: bool,
        content: &Content,
    ) -> fmt::Result {
        if !visible || content.is_empty() {
            return Ok(());
        }
        writeln!(f, "{}", title.bold().cyan())?;
        for line in self.content_text(content).lines() {
            writeln!(f, "  {line}")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for TerminalView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.regions.results;
        if !r.container.is_visible() {
            return Ok(());
        }

        // Replacement content means the layout is gone: only the banner shows.
        if !r.container.content.is_empty() {
            return writeln!(
                f,
                "{} {}",
                "✗".red().bold(),
                self.content_text(&r.container.content).trim().red()
            );
        }

        let cards_visible = r.perspectives_section.is_visible() && r.perspective_cards.is_visible();
        self.section(f, "Perspectives", cards_visible, &r.perspective_cards.content)?;
        for (title, region) in [
            ("Executive Summary", &r.executive_summary),
            ("Summary Evaluation", &r.evaluation_metrics),
            ("Historical Bias", &r.historical_chart),
            ("Source Bias", &r.source_chart),
            ("Detailed Bias Report", &r.bias_report),
        ] {
            self.section(f, title, region.is_visible(), &region.content)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Markup;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn flattens_summary_markup() {
        plain();
        let text = markup_to_terminal("<strong>Key</strong> point<br><em>note</em> &amp; more");
        assert_eq!(text, "Key point\nnote & more");
    }

    #[test]
    fn perspective_card_becomes_title_and_body() {
        plain();
        let card = r#"<div class="col-md-6 mb-3"><div class="card h-100 shadow-sm"><div class="card-body"><h5 class="card-title">Left &lt;L&gt;</h5><p class="card-text">Summary</p></div></div></div>"#;
        assert_eq!(markup_to_terminal(card), "Left <L>\nSummary");
    }

    #[test]
    fn metric_entry_reads_name_then_score() {
        plain();
        let metrics = r#"<div class="evaluation-item"><div class="evaluation-score">4</div><div>coherence</div></div><div class="evaluation-item"><div class="evaluation-score">0.5</div><div>fluency</div></div>"#;
        assert_eq!(markup_to_terminal(metrics), "     4  coherence\n   0.5  fluency");
    }

    #[test]
    fn image_shows_alt_and_url() {
        plain();
        let img = r#"<img src="/static/visuals/a.png" alt="Historical Bias Chart">"#;
        assert_eq!(markup_to_terminal(img), "Historical Bias Chart: /static/visuals/a.png");
    }

    #[test]
    fn chart_links_resolve_against_backend() {
        plain();
        let mut regions = Regions::initial();
        regions.results.container.show();
        regions.results.source_chart.content = Content::Markup(Markup::trusted(
            r#"<img src="/static/visuals/s.png" alt="Source Bias Chart">"#,
        ));
        let out = TerminalView::new(&regions)
            .with_link_base("http://127.0.0.1:5000")
            .to_string();
        assert_eq!(
            out,
            "Source Bias\n  Source Bias Chart: http://127.0.0.1:5000/static/visuals/s.png\n\n"
        );
    }

    #[test]
    fn hidden_results_draw_nothing() {
        plain();
        let regions = Regions::initial();
        assert_eq!(TerminalView::new(&regions).to_string(), "");
    }

    #[test]
    fn banner_replaces_sections() {
        plain();
        let mut regions = Regions::initial();
        regions.results.render_error("Backend down");
        regions.results.bias_report.content = Content::Text("stale".into());
        let out = TerminalView::new(&regions).to_string();
        assert_eq!(out, "✗ Backend down\n");
    }

    #[test]
    fn sections_in_page_order() {
        plain();
        let mut regions = Regions::initial();
        let r = &mut regions.results;
        r.container.show();
        r.perspective_cards.content =
            Content::Markup(Markup::trusted("<h5 class=\"card-title\">A</h5><p>a</p>"));
        r.executive_summary.content = Content::Markup(Markup::trusted("<p>Calm.</p>"));
        r.bias_report.content = Content::Text("line one\nline two".into());

        let out = TerminalView::new(&regions).to_string();
        assert_eq!(
            out,
            "Perspectives\n  A\n  a\n\nExecutive Summary\n  Calm.\n\nDetailed Bias Report\n  line one\n  line two\n\n"
        );
    }

    #[test]
    fn hidden_perspectives_section_is_skipped() {
        plain();
        let mut regions = Regions::initial();
        regions.results.container.show();
        regions.results.perspectives_section.hide();
        regions.results.perspective_cards.content = Content::Markup(Markup::trusted("<p>x</p>"));
        assert_eq!(TerminalView::new(&regions).to_string(), "");
    }
}
