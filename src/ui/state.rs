use super::{Content, Region, RegionId, Regions, SubmitControl};

/// In-memory region used by the HTML page and terminal views.
///
/// It only records what the controller asked for. A view reads the recorded
/// state afterwards and draws it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionState {
    pub visible: bool,
    pub content: Content,
    /// How many times the region asked to be scrolled into view.
    pub scroll_requests: usize,
}

impl RegionState {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            content: Content::Empty,
            scroll_requests: 0,
        }
    }
}

impl Region for RegionState {
    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_content(&mut self, content: Content) {
        self.content = content;
    }

    fn scroll_into_view(&mut self) {
        self.scroll_requests += 1;
    }
}

impl Regions<RegionState> {
    /// Regions as a freshly loaded page has them: the loading indicator and
    /// the results section start hidden, everything nested is visible.
    pub fn initial() -> Self {
        Self::build(|id| {
            RegionState::new(!matches!(
                id,
                RegionId::LoadingIndicator | RegionId::ResultsSection
            ))
        })
    }
}

/// In-memory submit button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    pub enabled: bool,
    pub highlighted: bool,
}

impl Default for ButtonState {
    fn default() -> Self {
        Self {
            enabled: true,
            highlighted: false,
        }
    }
}

impl SubmitControl for ButtonState {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_page_hides_loading_and_results() {
        let regions = Regions::initial();
        assert!(!regions.loading.visible);
        assert!(!regions.results.container.visible);
        assert!(regions.results.perspectives_section.visible);
        assert_eq!(regions.results.bias_report.content, Content::Empty);
    }

    #[test]
    fn clear_resets_content_only() {
        let mut region = RegionState::new(true);
        region.set_content(Content::Text("x".to_string()));
        region.scroll_into_view();
        region.clear();
        assert_eq!(region.content, Content::Empty);
        assert!(region.visible);
        assert_eq!(region.scroll_requests, 1);
    }
}
