//! The analysis form controller.
//!
//! One submission is one request/render cycle:
//!
//! 1. show the loading indicator, hide results, disable the submit control;
//! 2. send a single `POST /analyze`;
//! 3. render the results, the service's error, or the network error;
//! 4. hide the loading indicator and re-enable the submit control.
//!
//! Step 4 is owned by an [`InFlight`] guard, so it runs exactly once on every
//! exit path, including a panic inside a region implementation.
//!
//! A disabled submit control means a request is in flight; a submit arriving
//! then is ignored. That flag is the only state that spans cycles.

use std::time::Instant;

use crate::analysis::AnalysisRequest;
use crate::client::{AnalysisClient, AnalysisReply};
use crate::diagnostics::{Diagnostics, Level, SubmissionRecord};
use crate::ui::{Region, Regions, SubmitControl};

mod render;

/// Shown for a non-2xx reply without an `error` message.
pub const ANALYSIS_FAILED: &str = "Analysis failed. Please try again.";

/// Shown when no usable reply arrived.
pub const NETWORK_ERROR: &str = "Network error. Please check your connection and try again.";

/// Shown in place of a missing bias report.
pub const NO_BIAS_REPORT: &str = "No bias report available.";

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What a call to [`AnalysisFormController::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Blank topic; nothing happened.
    Skipped,
    /// A request was already in flight; nothing happened.
    Busy,
    /// A request was sent and its outcome rendered.
    Settled(Settled),
}

impl Submission {
    pub fn settled(&self) -> Option<&Settled> {
        match self {
            Self::Settled(settled) => Some(settled),
            Self::Skipped | Self::Busy => None,
        }
    }
}

/// A completed request/render cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled {
    pub topic: String,
    pub outcome: Outcome,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Results were rendered.
    Rendered { perspectives: usize },
    /// The service rejected the request; `message` is what the banner shows.
    Failed { status: u16, message: String },
    /// No usable reply. `detail` is the transport error, for logs only.
    NetworkError { detail: String },
}

impl Outcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }

    /// The error banner text, if this outcome shows one.
    pub fn banner(&self) -> Option<&str> {
        match self {
            Self::Rendered { .. } => None,
            Self::Failed { message, .. } => Some(message),
            Self::NetworkError { .. } => Some(NETWORK_ERROR),
        }
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Knobs the controller reads while rendering.
#[derive(Debug, Clone, Default)]
pub struct ControllerOptions {
    /// Escape summary text before markdown-style formatting.
    pub escape_summaries: bool,
    pub diagnostics: Diagnostics,
}

impl ControllerOptions {
    pub fn from_config(config: &crate::config::ClientConfig) -> Self {
        Self {
            escape_summaries: config.render.escape_summaries,
            diagnostics: Diagnostics::from_config(&config.logging),
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Drives one analysis form.
pub struct AnalysisFormController<C, R, S> {
    client: C,
    regions: Regions<R>,
    submit: S,
    /// Current topic field value, as typed.
    topic: String,
    options: ControllerOptions,
}

impl<C, R, S> AnalysisFormController<C, R, S>
where
    C: AnalysisClient,
    R: Region,
    S: SubmitControl,
{
    pub fn new(client: C, regions: Regions<R>, submit: S) -> Self {
        Self {
            client,
            regions,
            submit,
            topic: String::new(),
            options: ControllerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ControllerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn regions(&self) -> &Regions<R> {
        &self.regions
    }

    pub fn submit_control(&self) -> &S {
        &self.submit
    }

    /// The topic field's current (untrimmed) value.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn into_parts(self) -> (Regions<R>, S) {
        (self.regions, self.submit)
    }

    // -- events ------------------------------------------------------------

    /// The topic field changed. Highlights the submit control while the
    /// field holds something other than whitespace.
    pub fn on_input(&mut self, value: &str) {
        self.topic = value.to_string();
        self.submit.set_highlighted(!value.trim().is_empty());
    }

    /// A key was pressed in the topic field. Enter submits the form through
    /// the same path as [`on_submit`](Self::on_submit).
    pub fn on_key_press(&mut self, key: &str) -> Option<Submission> {
        (key == "Enter").then(|| self.on_submit())
    }

    /// The form was submitted.
    pub fn on_submit(&mut self) -> Submission {
        let topic = self.topic.clone();
        self.submit(&topic)
    }

    // -- submission --------------------------------------------------------

    /// Submit `topic` for analysis and render the outcome.
    pub fn submit(&mut self, topic: &str) -> Submission {
        let Some(request) = AnalysisRequest::new(topic) else {
            return Submission::Skipped;
        };
        if !self.submit.is_enabled() {
            return Submission::Busy;
        }

        let diagnostics = &self.options.diagnostics;
        diagnostics.log(
            Level::Info,
            &format!("submitting topic=\"{}\"", request.topic()),
        );

        let started = Instant::now();
        let cycle = InFlight::begin(
            &mut self.regions.loading,
            &mut self.regions.results.container,
            &mut self.submit,
        );

        let results = &mut self.regions.results;
        let outcome = match self.client.analyze(&request) {
            Ok(AnalysisReply::Success(data)) => {
                results.render_results(&data, self.options.escape_summaries);
                Outcome::Rendered {
                    perspectives: data.perspectives.len(),
                }
            }
            Ok(AnalysisReply::Failure { status, error }) => {
                let message = error.unwrap_or_else(|| ANALYSIS_FAILED.to_string());
                results.render_error(&message);
                Outcome::Failed { status, message }
            }
            Err(err) => {
                let detail = format!("{err:#}");
                diagnostics.log(Level::Error, &format!("analysis error: {detail}"));
                results.render_error(NETWORK_ERROR);
                Outcome::NetworkError { detail }
            }
        };

        drop(cycle);
        let latency_ms = started.elapsed().as_millis() as u64;

        let topic = request.topic();
        let record = match &outcome {
            Outcome::Rendered { perspectives } => {
                SubmissionRecord::rendered(topic, *perspectives, latency_ms)
            }
            Outcome::Failed { status, message } => {
                SubmissionRecord::failed(topic, *status, message, latency_ms)
            }
            Outcome::NetworkError { detail } => {
                SubmissionRecord::network_error(topic, detail, latency_ms)
            }
        };
        diagnostics.record_submission(&record);
        diagnostics.log(
            Level::Info,
            &format!("settled topic=\"{topic}\" outcome={} latency_ms={latency_ms}", record.outcome),
        );

        Submission::Settled(Settled {
            topic: topic.to_string(),
            outcome,
            latency_ms,
        })
    }
}

// ---------------------------------------------------------------------------
// In-flight guard
// ---------------------------------------------------------------------------

/// Holds the loading indicator and submit control for the duration of a
/// request. Dropping it hides the indicator and re-enables the control.
struct InFlight<'a, R: Region, S: SubmitControl> {
    loading: &'a mut R,
    submit: &'a mut S,
}

impl<'a, R: Region, S: SubmitControl> InFlight<'a, R, S> {
    fn begin(loading: &'a mut R, results: &mut R, submit: &'a mut S) -> Self {
        loading.show();
        results.hide();
        submit.set_enabled(false);
        Self { loading, submit }
    }
}

impl<R: Region, S: SubmitControl> Drop for InFlight<'_, R, S> {
    fn drop(&mut self) {
        self.loading.hide();
        self.submit.set_enabled(true);
    }
}
