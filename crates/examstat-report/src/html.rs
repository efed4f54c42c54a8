//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use examstat_core::results::{AnalysisResult, QuestionResult, ScoreBucket};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"))
}

/// Generate an HTML report from an exam analysis.
pub fn generate_html(result: &AnalysisResult) -> String {
    let mut html = String::new();
    let meta = &result.metadata;
    let dist = &result.summary.score_distribution;

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>examstat report: {}</title>\n",
        html_escape(&result.exam_title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&result.exam_title)));
    html.push_str(&format!(
        "<p class=\"meta\">Exam: <strong>{}</strong> | {} students | {} variants | {} excluded | {}</p>\n",
        html_escape(&result.exam_id),
        meta.total_students,
        meta.total_variants,
        meta.excluded_students,
        meta.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if !meta.sufficient_sample {
        html.push_str(&format!(
            "<p class=\"warning\">Sample of {} is below the minimum of {}; item statistics are unreliable.</p>\n",
            meta.sample_size, result.analysis_config.min_sample_size
        ));
    }
    html.push_str("</header>\n");

    // Summary dashboard
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Mean</th><th>Median</th><th>SD</th><th>Skewness</th><th>Kurtosis</th><th>Q1</th><th>Q3</th><th>Min</th><th>Max</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{:.1}%</td><td>{:.1}%</td><td>{:.3}</td><td>{}</td><td>{}</td><td>{:.1}%</td><td>{:.1}%</td><td>{:.1}%</td><td>{:.1}%</td></tr></tbody></table>\n",
        dist.mean * 100.0,
        dist.median * 100.0,
        dist.standard_deviation,
        fmt_opt(dist.skewness),
        fmt_opt(dist.kurtosis),
        dist.quartiles.q1 * 100.0,
        dist.quartiles.q3 * 100.0,
        dist.min * 100.0,
        dist.max * 100.0,
    ));

    match &result.summary.reliability_metrics {
        Some(r) => html.push_str(&format!(
            "<p class=\"reliability\">Cronbach's alpha <strong>{:.3}</strong> | split-half {:.3} | SEM {:.3} | {} items, {} respondents</p>\n",
            r.cronbachs_alpha, r.split_half, r.standard_error_of_measurement, r.item_count, r.respondent_count
        )),
        None => html.push_str("<p class=\"reliability\">Reliability not computed.</p>\n"),
    }

    if dist.histogram.iter().any(|b| b.count > 0) {
        html.push_str(&generate_histogram(&dist.histogram));
    }
    html.push_str("</section>\n");

    // Per-question results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Items</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"items\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Question</th><th onclick=\"sortTable(1)\">Type</th><th onclick=\"sortTable(2)\">N</th><th onclick=\"sortTable(3)\">Difficulty</th><th onclick=\"sortTable(4)\">Discrimination</th><th onclick=\"sortTable(5)\">Point-biserial</th><th>Flags</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for q in &result.question_results {
        let row_class = if q.flags.is_empty() { "ok" } else { "flagged" };
        let flags: Vec<String> = q.flags.iter().map(|f| html_escape(&f.to_string())).collect();
        html.push_str(&format!(
            "<tr class=\"{}\"><td title=\"{}\">{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            row_class,
            html_escape(&q.question_text),
            html_escape(&q.question_id),
            q.question_type,
            q.respondents,
            fmt_opt(q.difficulty_index),
            fmt_opt(q.discrimination_index),
            fmt_opt(q.point_biserial_correlation),
            flags.join("<br>"),
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    let with_distractors: Vec<&QuestionResult> = result
        .question_results
        .iter()
        .filter(|q| q.distractor_analysis.is_some())
        .collect();
    if !with_distractors.is_empty() {
        html.push_str("<section class=\"distractors\">\n");
        html.push_str("<h2>Distractors</h2>\n");
        for q in with_distractors {
            html.push_str(&generate_distractor_table(q));
        }
        html.push_str("</section>\n");
    }

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(result).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(result: &AnalysisResult, path: &Path) -> Result<()> {
    let html = generate_html(result);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn generate_distractor_table(q: &QuestionResult) -> String {
    let Some(analysis) = &q.distractor_analysis else {
        return String::new();
    };

    let mut out = format!(
        "<details>\n<summary>{}</summary>\n<table class=\"distractor\">\n",
        html_escape(&q.question_id)
    );
    out.push_str("<thead><tr><th>Option</th><th>Count</th><th>Share</th></tr></thead>\n<tbody>\n");
    for option in &analysis.options {
        let class = if option.is_correct {
            "key"
        } else if option.count == 0 {
            "flagged"
        } else {
            "ok"
        };
        out.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
            class,
            html_escape(&option.option),
            option.count,
            option.proportion * 100.0
        ));
    }
    if analysis.unmatched > 0 {
        out.push_str(&format!(
            "<tr><td><em>other</em></td><td>{}</td><td>-</td></tr>\n",
            analysis.unmatched
        ));
    }
    out.push_str("</tbody></table>\n</details>\n");
    out
}

fn generate_histogram(buckets: &[ScoreBucket]) -> String {
    let bar_width = 40;
    let max_height = 160;
    let padding = 8;
    let label_height = 20;

    let peak = buckets.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    let total_width = buckets.len() * (bar_width + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        total_width,
        max_height + 2 * label_height
    );

    for (i, bucket) in buckets.iter().enumerate() {
        let x = i * (bar_width + padding) + padding;
        let height = bucket.count * max_height / peak;
        let y = label_height + max_height - height;

        let color = if bucket.lower >= 0.8 {
            "#22c55e"
        } else if bucket.lower >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"3\"/>\n",
            x, y, bar_width, height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" text-anchor=\"middle\">{}</text>\n",
            x + bar_width / 2,
            y.saturating_sub(4).max(12),
            bucket.count
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"currentColor\" text-anchor=\"middle\">{:.0}%</text>\n",
            x + bar_width / 2,
            label_height + max_height + 14,
            bucket.lower * 100.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --ok: #dcfce7; --flagged: #fde2e2; --key: #dbeafe; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --ok: #064e3b; --flagged: #7f1d1d; --key: #1e3a8a; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.warning { border-left: 4px solid #eab308; padding-left: 1rem; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.ok { background: var(--ok); }
.flagged { background: var(--flagged); }
.key { background: var(--key); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('items');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    if (!isNaN(na) && !isNaN(nb)) return asc ? na - nb : nb - na;
    return asc ? va.localeCompare(vb) : vb.localeCompare(va);
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use examstat_core::model::*;
    use examstat_core::{analyze_exam, AnalysisConfig};

    fn make_test_analysis(students: usize) -> AnalysisResult {
        let variant = ExamVariant {
            id: "v-a".into(),
            exam_id: "exam-1".into(),
            variant_code: "A".into(),
            exam_title: "Algebra <Final>".into(),
            questions: vec![
                QuestionDefinition {
                    id: "q1".into(),
                    text: "2 + 2?".into(),
                    question_type: QuestionType::MultipleChoice,
                    options: vec!["3".into(), "4".into(), "5".into()],
                    correct_answer: "4".into(),
                    points: 1.0,
                },
                QuestionDefinition {
                    id: "q2".into(),
                    text: "0 is even".into(),
                    question_type: QuestionType::TrueFalse,
                    options: vec![],
                    correct_answer: "true".into(),
                    points: 1.0,
                },
            ],
            metadata: VariantMetadata::default(),
        };

        let responses: Vec<StudentResponse> = (0..students)
            .map(|i| {
                let q1_ok = i % 2 == 0;
                let q2_ok = i % 3 != 0;
                let question_responses = vec![
                    QuestionResponse {
                        question_id: "q1".into(),
                        student_answer: if q1_ok { "4".into() } else { "3".into() },
                        is_correct: q1_ok,
                        points: if q1_ok { 1.0 } else { 0.0 },
                        max_points: 1.0,
                        response_time: Some(12.0),
                    },
                    QuestionResponse {
                        question_id: "q2".into(),
                        student_answer: q2_ok.to_string(),
                        is_correct: q2_ok,
                        points: if q2_ok { 1.0 } else { 0.0 },
                        max_points: 1.0,
                        response_time: None,
                    },
                ];
                StudentResponse {
                    student_id: format!("s{i}"),
                    variant_code: "A".into(),
                    total_score: question_responses.iter().map(|r| r.points).sum(),
                    max_possible_score: 2.0,
                    question_responses,
                    completion_time: None,
                    started_at: None,
                    completed_at: None,
                }
            })
            .collect();

        analyze_exam(&[variant], &responses, &AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn html_report_contains_required_elements() {
        let html = generate_html(&make_test_analysis(6));

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("q1"));
        assert!(html.contains("true-false"));
        assert!(html.contains("Cronbach's alpha"));
        assert!(html.contains("<svg"));
        assert!(html.contains("Distractors"));
        assert!(!html.contains("below the minimum"));
    }

    #[test]
    fn html_report_escapes_titles() {
        let html = generate_html(&make_test_analysis(6));
        assert!(html.contains("Algebra &lt;Final&gt;"));
        assert!(!html.contains("<Final>"));
    }

    #[test]
    fn html_report_warns_on_small_sample() {
        let html = generate_html(&make_test_analysis(2));
        assert!(html.contains("below the minimum"));
        assert!(html.contains("Reliability not computed"));
    }

    #[test]
    fn html_report_write_to_file() {
        let analysis = make_test_analysis(4);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.html");

        write_html_report(&analysis, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }

    #[test]
    fn escape_handles_all_special_characters() {
        assert_eq!(
            html_escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }
}
