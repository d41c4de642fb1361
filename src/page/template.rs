//! Embedded page templates.
//!
//! Compiled into the binary so `bharatlens serve` and `analyze --format html`
//! need no asset directory. Placeholders:
//!
//! - `{{content:ID}}`: the region's content
//! - `{{hidden:ID}}`: ` hidden` while the region is hidden
//! - `{{value:topicInput}}`: the escaped topic
//! - `{{disabled:analyzeBtn}}` / `{{class:analyzeBtn}}`: button state
//! - `{{scroll}}`: scroll script when the results asked to be shown

/// Page shell: form, loading indicator, results section.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>BharatLens</title>
<style>
:root {
  --bg: #f6f7f9;
  --surface: #ffffff;
  --border: #d8dde3;
  --text: #1f2328;
  --muted: #59636e;
  --accent: #0d6efd;
  --red: #b42318;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}
* { box-sizing: border-box; }
body { margin: 0; background: var(--bg); color: var(--text); font-family: var(--font); line-height: 1.5; }
.app { max-width: 1100px; margin: 0 auto; padding: 24px; }
header h1 { margin: 0 0 4px; font-size: 26px; }
header p { margin: 0 0 20px; color: var(--muted); }
form { display: flex; gap: 8px; margin-bottom: 24px; }
form input { flex: 1; padding: 10px 12px; border: 1px solid var(--border); border-radius: var(--radius); font-size: 15px; }
.btn { padding: 10px 18px; border: 1px solid var(--border); border-radius: var(--radius); background: var(--surface); cursor: pointer; font-size: 15px; }
.btn-primary { background: var(--accent); border-color: var(--accent); color: #fff; }
.btn[disabled] { opacity: 0.6; cursor: progress; }
.loading { padding: 16px; color: var(--muted); }
.row { display: flex; flex-wrap: wrap; margin: 0 -8px; }
.col-md-6 { width: 50%; padding: 0 8px; }
.mb-3 { margin-bottom: 16px; }
.card { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); height: 100%; }
.card-body { padding: 16px; }
.card-title { margin: 0 0 8px; font-size: 16px; }
.section { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 20px; margin-bottom: 16px; }
.section h2 { margin: 0 0 12px; font-size: 18px; }
.evaluation-grid { display: flex; flex-wrap: wrap; gap: 12px; }
.evaluation-item { flex: 1 1 180px; text-align: center; padding: 12px; border: 1px solid var(--border); border-radius: var(--radius); }
.evaluation-score { font-size: 24px; font-weight: 700; color: var(--accent); }
.charts img { max-width: 100%; }
#biasReport { white-space: pre-wrap; font-family: monospace; font-size: 13px; }
.error-message { padding: 16px; border: 1px solid var(--red); border-radius: var(--radius); color: var(--red); background: #fef3f2; }
@media (max-width: 720px) { .col-md-6 { width: 100%; } }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1>BharatLens</h1>
    <p>Perspectives, summaries, and media bias for any news topic.</p>
  </header>

  <form id="analysisForm" method="post" action="/">
    <input id="topicInput" name="topic" type="text" placeholder="Enter a topic, e.g. monsoon session of parliament" value="{{value:topicInput}}" autofocus>
    <button id="analyzeBtn" type="submit" class="btn {{class:analyzeBtn}}"{{disabled:analyzeBtn}}>Analyze</button>
  </form>

  <div id="loadingIndicator" class="loading"{{hidden:loadingIndicator}}>Analyzing coverage, this can take a minute&hellip;</div>

  <section id="resultsSection"{{hidden:resultsSection}}>{{content:resultsSection}}</section>
</div>
<script>
(function () {
  var form = document.getElementById('analysisForm');
  var input = document.getElementById('topicInput');
  var button = document.getElementById('analyzeBtn');
  input.addEventListener('input', function () {
    button.classList.toggle('btn-primary', input.value.trim() !== '');
  });
  form.addEventListener('submit', function (e) {
    if (input.value.trim() === '' || button.disabled) { e.preventDefault(); return; }
    document.getElementById('loadingIndicator').hidden = false;
    document.getElementById('resultsSection').hidden = true;
    button.disabled = true;
  });
})();
</script>
{{scroll}}
</body>
</html>
"##;

/// Layout of the results section.
pub const RESULTS_HTML: &str = r##"
<div id="perspectivesSection" class="section"{{hidden:perspectivesSection}}>
  <h2>Perspectives</h2>
  <div id="perspectivesCards" class="row">{{content:perspectivesCards}}</div>
</div>
<div class="section">
  <h2>Executive Summary</h2>
  <div id="executiveSummary"{{hidden:executiveSummary}}>{{content:executiveSummary}}</div>
</div>
<div class="section">
  <h2>Summary Evaluation</h2>
  <div id="evaluationMetrics" class="evaluation-grid"{{hidden:evaluationMetrics}}>{{content:evaluationMetrics}}</div>
</div>
<div class="section charts">
  <h2>Bias Visualizations</h2>
  <div class="row">
    <div class="col-md-6 mb-3"><div id="historicalChart"{{hidden:historicalChart}}>{{content:historicalChart}}</div></div>
    <div class="col-md-6 mb-3"><div id="sourceChart"{{hidden:sourceChart}}>{{content:sourceChart}}</div></div>
  </div>
</div>
<div class="section">
  <h2>Detailed Bias Report</h2>
  <div id="biasReport"{{hidden:biasReport}}>{{content:biasReport}}</div>
</div>
"##;
