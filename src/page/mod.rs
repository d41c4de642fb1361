//! HTML page back-end.
//!
//! A [`Page`] is a validated [`PageTemplate`]. It hands out controllers wired
//! to fresh in-memory regions and turns a controller's region state back into
//! a complete HTML document.
//!
//! Binding a template checks that every element the controller needs is
//! present. A template missing one is a deployment mistake, so
//! [`Page::bind`] fails and no controller is ever built.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use thiserror::Error;

use crate::client::AnalysisClient;
use crate::controller::AnalysisFormController;
use crate::markup::{Markup, escape_text};
use crate::ui::{ButtonState, Region, RegionId, RegionState, Regions};

pub mod template;

/// `{{kind:id}}` or `{{scroll}}`.
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(\w+)(?::(\w+))?\}\}").expect("placeholder regex must compile")
});

/// Controller type produced by a page.
pub type PageController<C> = AnalysisFormController<C, RegionState, ButtonState>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PageError {
    #[error("page template is missing required element #{id} in {fragment}")]
    MissingElement {
        id: &'static str,
        fragment: &'static str,
    },

    #[error("failed to read page template {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// The two fragments making up a page.
#[derive(Debug, Clone)]
pub struct PageTemplate {
    /// Document with form, loading indicator, and results section.
    pub shell: String,
    /// Layout placed inside the results section.
    pub results: String,
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self {
            shell: template::INDEX_HTML.to_string(),
            results: template::RESULTS_HTML.to_string(),
        }
    }
}

impl PageTemplate {
    /// Load `index.html` and `results.html` from `dir`, or the embedded
    /// templates when no directory is configured.
    pub fn load(dir: Option<&Path>) -> Result<Self, PageError> {
        let Some(dir) = dir else {
            return Ok(Self::default());
        };
        Ok(Self {
            shell: read_fragment(&dir.join("index.html"))?,
            results: read_fragment(&dir.join("results.html"))?,
        })
    }

    /// Check that every required element is present.
    pub fn validate(&self) -> Result<(), PageError> {
        check_ids(&self.shell, RegionId::SHELL, "index.html")?;
        check_ids(&self.results, RegionId::RESULTS, "results.html")
    }
}

fn read_fragment(path: &Path) -> Result<String, PageError> {
    fs::read_to_string(path).map_err(|source| PageError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

fn check_ids(fragment: &str, ids: &[RegionId], name: &'static str) -> Result<(), PageError> {
    for id in ids {
        let needle = format!("id=\"{}\"", id.dom_id());
        if !fragment.contains(&needle) {
            return Err(PageError::MissingElement {
                id: id.dom_id(),
                fragment: name,
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// A validated template.
#[derive(Debug, Clone)]
pub struct Page {
    template: PageTemplate,
}

impl Page {
    pub fn bind(template: PageTemplate) -> Result<Self, PageError> {
        template.validate()?;
        Ok(Self { template })
    }

    /// A controller wired to the page in its freshly loaded state.
    pub fn controller<C: AnalysisClient>(&self, client: C) -> PageController<C> {
        AnalysisFormController::new(client, Regions::initial(), ButtonState::default())
    }

    /// Render the page as the controller left it.
    pub fn render<C: AnalysisClient>(&self, controller: &PageController<C>) -> String {
        let state = ViewState {
            regions: controller.regions(),
            button: controller.submit_control(),
            topic: controller.topic(),
        };
        state.expand(&self.template.shell, &self.template.results)
    }
}

struct ViewState<'a> {
    regions: &'a Regions<RegionState>,
    button: &'a ButtonState,
    topic: &'a str,
}

impl ViewState<'_> {
    fn expand(&self, fragment: &str, results_layout: &str) -> String {
        PLACEHOLDER_RE
            .replace_all(fragment, |caps: &Captures| {
                let id = caps.get(2).and_then(|m| RegionId::from_dom_id(m.as_str()));
                self.placeholder(&caps[1], id, results_layout)
            })
            .into_owned()
    }

    fn placeholder(&self, kind: &str, id: Option<RegionId>, results_layout: &str) -> String {
        match (kind, id) {
            ("content", Some(RegionId::ResultsSection)) => {
                let container = &self.regions.results.container;
                if container.content.is_empty() {
                    // Nested layout; its own placeholders never nest further.
                    self.expand(results_layout, "")
                } else {
                    container.content.to_markup().into_string()
                }
            }
            ("content", Some(id)) => self
                .regions
                .get(id)
                .map(|region| region.content.to_markup().into_string())
                .unwrap_or_default(),
            ("hidden", Some(id)) => match self.regions.get(id) {
                Some(region) if !region.is_visible() => " hidden".to_string(),
                _ => String::new(),
            },
            ("value", Some(RegionId::TopicInput)) => escape_text(self.topic),
            ("disabled", Some(RegionId::AnalyzeButton)) if !self.button.enabled => {
                " disabled".to_string()
            }
            ("class", Some(RegionId::AnalyzeButton)) if self.button.highlighted => {
                "btn-primary".to_string()
            }
            ("scroll", None) => self.scroll_script().into_string(),
            _ => String::new(),
        }
    }

    fn scroll_script(&self) -> Markup {
        let results = &self.regions.results.container;
        if results.scroll_requests == 0 || !results.visible {
            return Markup::default();
        }
        Markup::trusted(format!(
            "<script>document.getElementById('{}').scrollIntoView({{behavior: 'smooth'}});</script>",
            RegionId::ResultsSection.dom_id()
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisRequest;
    use crate::client::AnalysisReply;

    struct Unreachable;

    impl AnalysisClient for Unreachable {
        fn analyze(&self, _request: &AnalysisRequest) -> anyhow::Result<AnalysisReply> {
            anyhow::bail!("connection refused")
        }
    }

    #[test]
    fn embedded_template_is_valid() {
        assert!(PageTemplate::default().validate().is_ok());
    }

    #[test]
    fn missing_shell_element_is_fatal() {
        let template = PageTemplate {
            shell: template::INDEX_HTML.replace("id=\"loadingIndicator\"", "id=\"spinner\""),
            ..PageTemplate::default()
        };
        let err = Page::bind(template).unwrap_err();
        assert!(matches!(
            err,
            PageError::MissingElement { id: "loadingIndicator", fragment: "index.html" }
        ));
    }

    #[test]
    fn missing_results_element_is_fatal() {
        let template = PageTemplate {
            results: template::RESULTS_HTML.replace("id=\"biasReport\"", ""),
            ..PageTemplate::default()
        };
        let err = Page::bind(template).unwrap_err();
        assert_eq!(
            err.to_string(),
            "page template is missing required element #biasReport in results.html"
        );
    }

    #[test]
    fn unreadable_template_dir() {
        let dir = std::env::temp_dir().join("bharatlens-no-such-template-dir");
        let err = PageTemplate::load(Some(&dir)).unwrap_err();
        assert!(matches!(err, PageError::Unreadable { .. }));
    }

    #[test]
    fn fresh_page_hides_loading_and_results() {
        let page = Page::bind(PageTemplate::default()).unwrap();
        let html = page.render(&page.controller(Unreachable));
        assert!(html.contains("<div id=\"loadingIndicator\" class=\"loading\" hidden>"));
        assert!(html.contains("<section id=\"resultsSection\" hidden>"));
        assert!(html.contains("class=\"btn \">Analyze"));
        assert!(!html.contains("scrollIntoView({behavior"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn network_error_replaces_results_layout() {
        let page = Page::bind(PageTemplate::default()).unwrap();
        let mut controller = page.controller(Unreachable);
        controller.on_input("\"quoted\" topic");
        controller.on_submit();

        let html = page.render(&controller);
        assert!(html.contains("Network error. Please check your connection and try again."));
        assert!(!html.contains("id=\"perspectivesSection\""));
        assert!(html.contains("value=\"&quot;quoted&quot; topic\""));
        assert!(html.contains("class=\"btn btn-primary\">Analyze"));
        assert!(html.contains("scrollIntoView({behavior: 'smooth'})"));
    }
}
