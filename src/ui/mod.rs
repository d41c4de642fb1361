//! Handles for the page regions the analysis form drives.
//!
//! The controller never looks elements up by identifier. It is handed a
//! [`Regions`] bundle and a [`SubmitControl`] at construction and talks to
//! them only through these traits, so the same controller renders into an
//! HTML page, a terminal, or a recording fake in tests.

use crate::markup::Markup;

mod state;

pub use state::{ButtonState, RegionState};

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// What a region displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Content {
    #[default]
    Empty,
    /// Trusted markup, inserted as-is.
    Markup(Markup),
    /// Verbatim text. Never interpreted as markup.
    Text(String),
}

impl Content {
    /// Markup for this content, escaping verbatim text.
    pub fn to_markup(&self) -> Markup {
        match self {
            Self::Empty => Markup::default(),
            Self::Markup(markup) => markup.clone(),
            Self::Text(text) => Markup::text(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Markup(markup) => markup.is_empty(),
            Self::Text(text) => text.is_empty(),
        }
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A named page region with visibility and replaceable content.
pub trait Region {
    fn show(&mut self);
    fn hide(&mut self);
    fn is_visible(&self) -> bool;
    /// Replace the region's content entirely.
    fn set_content(&mut self, content: Content);
    fn clear(&mut self) {
        self.set_content(Content::Empty);
    }
    /// Bring the region into view with smooth motion.
    fn scroll_into_view(&mut self);
}

/// The form's submit button.
pub trait SubmitControl {
    fn set_enabled(&mut self, enabled: bool);
    fn is_enabled(&self) -> bool;
    /// Cosmetic highlight shown while the topic field has content.
    fn set_highlighted(&mut self, highlighted: bool);
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Fixed element identifiers the page markup must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionId {
    AnalysisForm,
    TopicInput,
    AnalyzeButton,
    LoadingIndicator,
    ResultsSection,
    PerspectivesSection,
    PerspectivesCards,
    ExecutiveSummary,
    EvaluationMetrics,
    HistoricalChart,
    SourceChart,
    BiasReport,
}

impl RegionId {
    /// Identifiers that live in the page shell.
    pub const SHELL: &'static [RegionId] = &[
        Self::AnalysisForm,
        Self::TopicInput,
        Self::AnalyzeButton,
        Self::LoadingIndicator,
        Self::ResultsSection,
    ];

    /// Identifiers nested inside the results section.
    pub const RESULTS: &'static [RegionId] = &[
        Self::PerspectivesSection,
        Self::PerspectivesCards,
        Self::ExecutiveSummary,
        Self::EvaluationMetrics,
        Self::HistoricalChart,
        Self::SourceChart,
        Self::BiasReport,
    ];

    pub fn from_dom_id(id: &str) -> Option<Self> {
        Self::SHELL
            .iter()
            .chain(Self::RESULTS)
            .copied()
            .find(|region| region.dom_id() == id)
    }

    pub const fn dom_id(self) -> &'static str {
        match self {
            Self::AnalysisForm => "analysisForm",
            Self::TopicInput => "topicInput",
            Self::AnalyzeButton => "analyzeBtn",
            Self::LoadingIndicator => "loadingIndicator",
            Self::ResultsSection => "resultsSection",
            Self::PerspectivesSection => "perspectivesSection",
            Self::PerspectivesCards => "perspectivesCards",
            Self::ExecutiveSummary => "executiveSummary",
            Self::EvaluationMetrics => "evaluationMetrics",
            Self::HistoricalChart => "historicalChart",
            Self::SourceChart => "sourceChart",
            Self::BiasReport => "biasReport",
        }
    }
}

// ---------------------------------------------------------------------------
// Region bundles
// ---------------------------------------------------------------------------

/// Every region the controller writes to.
#[derive(Debug, Clone)]
pub struct Regions<R> {
    pub loading: R,
    pub results: ResultRegions<R>,
}

/// The results section and the regions nested inside it.
#[derive(Debug, Clone)]
pub struct ResultRegions<R> {
    pub container: R,
    pub perspectives_section: R,
    pub perspective_cards: R,
    pub executive_summary: R,
    pub evaluation_metrics: R,
    pub historical_chart: R,
    pub source_chart: R,
    pub bias_report: R,
}

impl<R> Regions<R> {
    /// Build every region from a factory keyed by identifier.
    pub fn build(mut make: impl FnMut(RegionId) -> R) -> Self {
        Self {
            loading: make(RegionId::LoadingIndicator),
            results: ResultRegions {
                container: make(RegionId::ResultsSection),
                perspectives_section: make(RegionId::PerspectivesSection),
                perspective_cards: make(RegionId::PerspectivesCards),
                executive_summary: make(RegionId::ExecutiveSummary),
                evaluation_metrics: make(RegionId::EvaluationMetrics),
                historical_chart: make(RegionId::HistoricalChart),
                source_chart: make(RegionId::SourceChart),
                bias_report: make(RegionId::BiasReport),
            },
        }
    }

    /// Look a region up by identifier. Form controls are not regions.
    pub fn get(&self, id: RegionId) -> Option<&R> {
        let r = &self.results;
        match id {
            RegionId::LoadingIndicator => Some(&self.loading),
            RegionId::ResultsSection => Some(&r.container),
            RegionId::PerspectivesSection => Some(&r.perspectives_section),
            RegionId::PerspectivesCards => Some(&r.perspective_cards),
            RegionId::ExecutiveSummary => Some(&r.executive_summary),
            RegionId::EvaluationMetrics => Some(&r.evaluation_metrics),
            RegionId::HistoricalChart => Some(&r.historical_chart),
            RegionId::SourceChart => Some(&r.source_chart),
            RegionId::BiasReport => Some(&r.bias_report),
            RegionId::AnalysisForm | RegionId::TopicInput | RegionId::AnalyzeButton => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_assigns_matching_ids() {
        let regions = Regions::build(|id| id);
        for id in RegionId::RESULTS.iter().chain(&[RegionId::LoadingIndicator, RegionId::ResultsSection]) {
            assert_eq!(regions.get(*id), Some(id));
        }
        assert_eq!(regions.get(RegionId::TopicInput), None);
    }

    #[test]
    fn text_content_is_escaped_when_marked_up() {
        let content = Content::Text("<b>raw</b>".to_string());
        assert_eq!(content.to_markup().as_str(), "&lt;b&gt;raw&lt;/b&gt;");
    }

    #[test]
    fn dom_ids_are_unique() {
        let mut ids: Vec<&str> = RegionId::SHELL
            .iter()
            .chain(RegionId::RESULTS)
            .map(|id| id.dom_id())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), RegionId::SHELL.len() + RegionId::RESULTS.len());
    }

    #[test]
    fn from_dom_id_inverts_dom_id() {
        assert_eq!(RegionId::from_dom_id("biasReport"), Some(RegionId::BiasReport));
        assert_eq!(RegionId::from_dom_id("analyzeBtn"), Some(RegionId::AnalyzeButton));
        assert_eq!(RegionId::from_dom_id("nope"), None);
    }
}
