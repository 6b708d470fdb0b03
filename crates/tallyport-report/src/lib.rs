//! # tallyport-report
//!
//! Rendering backends over the normalized record table.
//!
//! This crate provides:
//! - SVG chart renderers (`charts` module): grouped/stacked bars, lines
//! - The self-contained HTML report document (`html` module)
//! - A plain-text summary for terminals and logs
//!
//! All renderers are read-only consumers of a
//! [`RecordTable`](tallyport_core::RecordTable) and implement the
//! [`ReportRenderer`](tallyport_core::ReportRenderer) trait or compose
//! things that do.
//!
//! ## Example
//!
//! ```rust
//! use tallyport_core::{CompletionRecord, RecordTable, ReportRenderer};
//! use tallyport_report::TextSummaryRenderer;
//!
//! let table = RecordTable::from_records(vec![CompletionRecord {
//!     source: "March 2024".into(),
//!     section: "AMS PORTAL".into(),
//!     person: "Alice".into(),
//!     task: "Quality".into(),
//!     completion: 5.0,
//! }]);
//! let summary = TextSummaryRenderer::default().render(&table).unwrap();
//! assert!(summary.contains("Alice"));
//! assert!(summary.contains("5"));
//! ```

pub mod charts;
pub mod html;

pub use charts::{
    BarChartRenderer, BarMode, ChartData, ChartSeries, ChartStyle, LineChartRenderer,
    DEFAULT_PALETTE,
};
pub use html::{escape_html, HtmlReportRenderer};

use std::fmt::Write as _;

use tallyport_core::{RecordTable, ReportError, ReportRenderer};

/// Format a completion count for display: whole numbers without a
/// fractional part, anything else with one decimal place.
pub fn format_count(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{}", value as i64)
    } else {
        format!("{value:.1}")
    }
}

/// Plain-text summary renderer: headline metrics plus the leaderboard
/// and per-period totals, aligned for a fixed-width terminal.
#[derive(Clone, Debug)]
pub struct TextSummaryRenderer {
    /// Maximum leaderboard rows to print; 0 means all
    pub max_rows: usize,
}

impl Default for TextSummaryRenderer {
    fn default() -> Self {
        Self { max_rows: 0 }
    }
}

impl TextSummaryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }
}

impl ReportRenderer for TextSummaryRenderer {
    type Output = String;

    fn render(&self, table: &RecordTable) -> Result<String, ReportError> {
        let mut out = String::new();

        if table.is_empty() {
            out.push_str("No completion records.\n");
            return Ok(out);
        }

        writeln!(out, "Total completions: {}", format_count(table.total_completion()))
            .map_err(|e| ReportError::Format(e.to_string()))?;
        writeln!(out, "Active members:    {}", table.active_person_count())
            .map_err(|e| ReportError::Format(e.to_string()))?;
        if let Some((name, total)) = table.top_performer() {
            writeln!(out, "Top performer:     {} ({})", name, format_count(total))
                .map_err(|e| ReportError::Format(e.to_string()))?;
        }

        let leaderboard = table.leaderboard();
        let name_width = leaderboard
            .iter()
            .map(|(name, _)| name.chars().count())
            .max()
            .unwrap_or(0);
        let shown = if self.max_rows == 0 {
            leaderboard.len()
        } else {
            self.max_rows.min(leaderboard.len())
        };

        out.push_str("\nLeaderboard\n");
        for (i, (name, total)) in leaderboard.iter().take(shown).enumerate() {
            writeln!(
                out,
                "{:>3}. {:<name_width$}  {:>8}",
                i + 1,
                name,
                format_count(*total)
            )
            .map_err(|e| ReportError::Format(e.to_string()))?;
        }
        if shown < leaderboard.len() {
            writeln!(out, "     ... and {} more", leaderboard.len() - shown)
                .map_err(|e| ReportError::Format(e.to_string()))?;
        }

        out.push_str("\nBy period\n");
        for label in table.source_labels() {
            let period = table.for_source(&label);
            writeln!(
                out,
                "  {label}: {} completions, {} members",
                format_count(period.total_completion()),
                period.active_person_count()
            )
            .map_err(|e| ReportError::Format(e.to_string()))?;
        }

        Ok(out)
    }
}
