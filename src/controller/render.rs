//! Rendering of a settled submission into the result regions.

use crate::analysis::{AnalysisResponse, MetricScore, Perspective};
use crate::markup::{Element, Markup, format_summary, format_summary_escaped};
use crate::ui::{Content, Region, ResultRegions};

use super::NO_BIAS_REPORT;

type SummaryFormatter = fn(Option<&str>) -> Markup;

impl<R: Region> ResultRegions<R> {
    /// Render a successful analysis and reveal the results section.
    pub fn render_results(&mut self, data: &AnalysisResponse, escape_summaries: bool) {
        let summarize: SummaryFormatter = if escape_summaries {
            format_summary_escaped
        } else {
            format_summary
        };

        // An earlier error banner replaced the section's layout; restore it.
        self.container.clear();

        if data.perspectives.is_empty() {
            self.perspective_cards.clear();
            self.perspectives_section.hide();
        } else {
            let cards: Markup = data
                .perspectives
                .iter()
                .map(|p| perspective_card(p, summarize))
                .collect();
            self.perspective_cards.set_content(Content::Markup(cards));
            self.perspectives_section.show();
        }

        self.executive_summary
            .set_content(Content::Markup(summarize(data.executive_summary.as_deref())));

        let metrics: Markup = data
            .summary_evaluation
            .iter()
            .flat_map(|scores| scores.iter())
            .map(|(metric, score)| metric_entry(metric, score))
            .collect();
        self.evaluation_metrics.set_content(if metrics.is_empty() {
            Content::Empty
        } else {
            Content::Markup(metrics)
        });

        // Missing charts leave whatever the region held before.
        if let Some(visuals) = &data.visualizations {
            if let Some(url) = visuals.historical_chart() {
                self.historical_chart
                    .set_content(Content::Markup(chart_image(url, "Historical Bias Chart")));
            }
            if let Some(url) = visuals.source_chart() {
                self.source_chart
                    .set_content(Content::Markup(chart_image(url, "Source Bias Chart")));
            }
        }

        let report = data.bias_report().unwrap_or(NO_BIAS_REPORT);
        self.bias_report.set_content(Content::Text(report.to_string()));

        self.container.show();
        self.container.scroll_into_view();
    }

    /// Replace the whole results section with an error banner.
    pub fn render_error(&mut self, message: &str) {
        self.container.set_content(Content::Markup(error_banner(message)));
        self.container.show();
        self.container.scroll_into_view();
    }
}

fn perspective_card(perspective: &Perspective, summarize: SummaryFormatter) -> Markup {
    Element::new("div")
        .class("col-md-6 mb-3")
        .child(
            Element::new("div").class("card h-100 shadow-sm").child(
                Element::new("div")
                    .class("card-body")
                    .child(Element::new("h5").class("card-title").text(&perspective.label))
                    .child(
                        Element::new("p")
                            .class("card-text")
                            .markup(&summarize(Some(perspective.summary.as_str()))),
                    ),
            ),
        )
        .build()
}

fn metric_entry(metric: &str, score: &MetricScore) -> Markup {
    Element::new("div")
        .class("evaluation-item")
        .child(
            Element::new("div")
                .class("evaluation-score")
                .text(&score.to_string()),
        )
        .child(Element::new("div").text(metric))
        .build()
}

fn chart_image(url: &str, alt: &str) -> Markup {
    Element::new("img").attr("src", url).attr("alt", alt).build()
}

pub(crate) fn error_banner(message: &str) -> Markup {
    Element::new("div")
        .class("error-message")
        .child(Element::new("i").class("fas fa-exclamation-circle"))
        .text(&format!(" {message}"))
        .build()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{RegionState, Regions};

    fn response(json: &str) -> AnalysisResponse {
        serde_json::from_str(json).unwrap()
    }

    fn markup_of(region: &RegionState) -> String {
        region.content.to_markup().into_string()
    }

    #[test]
    fn card_escapes_label_and_formats_summary() {
        let card = perspective_card(
            &Perspective {
                label: "<Tech> Perspective".to_string(),
                summary: "**Growth** slowed".to_string(),
            },
            format_summary,
        );
        assert_eq!(
            card.as_str(),
            "<div class=\"col-md-6 mb-3\"><div class=\"card h-100 shadow-sm\"><div class=\"card-body\">\
             <h5 class=\"card-title\">&lt;Tech&gt; Perspective</h5>\
             <p class=\"card-text\"><strong>Growth</strong> slowed</p></div></div></div>"
        );
    }

    #[test]
    fn metric_entry_shows_score_then_name() {
        let entry = metric_entry("Relevance to Query", &MetricScore::Text("0.71".to_string()));
        assert_eq!(
            entry.as_str(),
            "<div class=\"evaluation-item\"><div class=\"evaluation-score\">0.71</div><div>Relevance to Query</div></div>"
        );
    }

    #[test]
    fn error_banner_escapes_message() {
        assert_eq!(
            error_banner("bad <topic>").as_str(),
            "<div class=\"error-message\"><i class=\"fas fa-exclamation-circle\"></i> bad &lt;topic&gt;</div>"
        );
    }

    #[test]
    fn missing_sections_fall_back() {
        let mut regions = Regions::initial();
        regions.results.render_results(&response("{}"), false);

        let r = &regions.results;
        assert!(!r.perspectives_section.visible);
        assert_eq!(markup_of(&r.executive_summary), crate::markup::NO_SUMMARY);
        assert_eq!(r.evaluation_metrics.content, Content::Empty);
        assert_eq!(r.bias_report.content, Content::Text(NO_BIAS_REPORT.to_string()));
        assert!(r.container.visible);
        assert_eq!(r.container.scroll_requests, 1);
    }

    #[test]
    fn absent_chart_leaves_region_untouched() {
        let mut regions = Regions::initial();
        regions
            .results
            .source_chart
            .set_content(Content::Markup(Markup::trusted("<img src=\"/old.png\">")));

        regions.results.render_results(
            &response(r#"{"visualizations": {"historical_bias_chart_url": "/static/visuals/h.png"}}"#),
            false,
        );

        assert_eq!(
            markup_of(&regions.results.historical_chart),
            "<img src=\"/static/visuals/h.png\" alt=\"Historical Bias Chart\">"
        );
        assert_eq!(markup_of(&regions.results.source_chart), "<img src=\"/old.png\">");
    }

    #[test]
    fn bias_report_is_verbatim_text() {
        let mut regions = Regions::initial();
        regions
            .results
            .render_results(&response(r#"{"detailed_bias_report": "<b>**loaded**</b>"}"#), false);
        assert_eq!(
            regions.results.bias_report.content,
            Content::Text("<b>**loaded**</b>".to_string())
        );
        assert_eq!(
            markup_of(&regions.results.bias_report),
            "&lt;b&gt;**loaded**&lt;/b&gt;"
        );
    }

    #[test]
    fn escape_switch_applies_to_summaries() {
        let mut regions = Regions::initial();
        regions
            .results
            .render_results(&response(r#"{"executive_summary": "<i>x</i>"}"#), true);
        assert_eq!(markup_of(&regions.results.executive_summary), "&lt;i&gt;x&lt;/i&gt;");
    }

    #[test]
    fn success_after_error_restores_layout() {
        let mut regions = Regions::initial();
        regions.results.render_error("boom");
        assert!(!regions.results.container.content.is_empty());

        regions.results.render_results(&response("{}"), false);
        assert_eq!(regions.results.container.content, Content::Empty);
    }
}
