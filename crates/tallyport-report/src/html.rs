//! Self-contained HTML report over a record table.
//!
//! One document, no external assets: styles inline, charts embedded as
//! SVG. Layout follows the analyst workflow: headline metrics and an
//! overview across all periods first, then one section per period in
//! chronological order.

use tallyport_core::{RecordTable, ReportError, ReportRenderer};

use crate::charts::{BarChartRenderer, ChartData, ChartSeries, ChartStyle, LineChartRenderer};
use crate::format_count;

const STYLE: &str = "\
body { font-family: system-ui, -apple-system, sans-serif; margin: 0; \
background: #f4f6f8; color: #2c3e50; }
.page { max-width: 960px; margin: 0 auto; padding: 24px; }
h1 { color: #0A4D68; border-bottom: 3px solid #0A4D68; padding-bottom: 8px; }
h2 { color: #0A4D68; margin-top: 36px; }
.metrics { display: flex; gap: 16px; flex-wrap: wrap; }
.metric { background: #ffffff; border-radius: 8px; padding: 14px 20px; \
box-shadow: 0 1px 3px rgba(0,0,0,0.1); min-width: 160px; }
.metric .value { font-size: 26px; font-weight: bold; color: #0A4D68; }
.metric .label { font-size: 12px; text-transform: uppercase; color: #7f8c8d; }
table { border-collapse: collapse; background: #ffffff; width: 100%; \
box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
th { background: #0A4D68; color: #ffffff; text-align: left; padding: 8px 12px; }
td { padding: 7px 12px; border-bottom: 1px solid #ecf0f1; }
td.num { text-align: right; font-variant-numeric: tabular-nums; }
tr:last-child td { border-bottom: none; }
figure { margin: 20px 0; background: #ffffff; border-radius: 8px; \
padding: 12px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
.empty { padding: 40px; text-align: center; color: #7f8c8d; }";

/// Renders the full HTML report document.
#[derive(Clone, Debug)]
pub struct HtmlReportRenderer {
    pub title: String,
    /// Embed SVG charts; tables are always emitted
    pub include_charts: bool,
    pub chart_style: ChartStyle,
}

impl Default for HtmlReportRenderer {
    fn default() -> Self {
        Self {
            title: "Completion Report".into(),
            include_charts: true,
            chart_style: ChartStyle::default(),
        }
    }
}

impl HtmlReportRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn without_charts(mut self) -> Self {
        self.include_charts = false;
        self
    }

    /// Render and write the document to a file in one step.
    pub fn render_to_file(
        &self,
        table: &RecordTable,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), ReportError> {
        let html = self.render(table)?;
        std::fs::write(path, html)?;
        Ok(())
    }

    fn push_header(&self, out: &mut String) {
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        out.push_str("<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{}</title>\n", escape_html(&self.title)));
        out.push_str(&format!("<style>\n{STYLE}\n</style>\n"));
        out.push_str("</head>\n<body>\n<div class=\"page\">\n");
        out.push_str(&format!("<h1>{}</h1>\n", escape_html(&self.title)));
    }

    fn push_metrics(&self, out: &mut String, table: &RecordTable) {
        let top = table
            .top_performer()
            .map_or_else(|| "-".to_string(), |(name, _)| name);
        out.push_str("<div class=\"metrics\">\n");
        for (label, value) in [
            ("Total Completions", format_count(table.total_completion())),
            ("Active Members", table.active_person_count().to_string()),
            ("Top Performer", top),
        ] {
            out.push_str(&format!(
                "<div class=\"metric\"><div class=\"value\">{}</div>\
                 <div class=\"label\">{}</div></div>\n",
                escape_html(&value),
                label
            ));
        }
        out.push_str("</div>\n");
    }

    fn push_table(&self, out: &mut String, headers: &[&str], rows: &[Vec<String>]) {
        out.push_str("<table>\n<thead><tr>");
        for h in headers {
            out.push_str(&format!("<th>{}</th>", escape_html(h)));
        }
        out.push_str("</tr></thead>\n<tbody>\n");
        for row in rows {
            out.push_str("<tr>");
            for (i, cell) in row.iter().enumerate() {
                // First column is the row label, the rest are numeric
                if i == 0 {
                    out.push_str(&format!("<td>{}</td>", escape_html(cell)));
                } else {
                    out.push_str(&format!("<td class=\"num\">{}</td>", escape_html(cell)));
                }
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n</table>\n");
    }

    fn push_chart(&self, out: &mut String, svg: &str) {
        out.push_str("<figure>\n");
        out.push_str(svg);
        out.push_str("\n</figure>\n");
    }

    /// Person rows by section columns for one table view.
    fn person_section_rows(table: &RecordTable) -> (Vec<String>, Vec<Vec<String>>) {
        let sections: Vec<String> = table.sections().into_iter().collect();
        let sums = table.sum_by_person_section();

        let mut rows = Vec::new();
        for (person, total) in table.leaderboard() {
            let mut row = vec![person.clone()];
            for section in &sections {
                let value = sums
                    .get(&(person.clone(), section.clone()))
                    .copied()
                    .unwrap_or(0.0);
                row.push(format_count(value));
            }
            row.push(format_count(total));
            rows.push(row);
        }
        (sections, rows)
    }

    fn push_period(&self, out: &mut String, label: &str, period: &RecordTable) -> Result<(), ReportError> {
        out.push_str(&format!("<h2>{}</h2>\n", escape_html(label)));
        self.push_metrics(out, period);

        let (sections, rows) = Self::person_section_rows(period);
        let mut headers = vec!["Member"];
        headers.extend(sections.iter().map(String::as_str));
        headers.push("Total");
        out.push_str("<h3>Completions by Member and Portal</h3>\n");
        self.push_table(out, &headers, &rows);

        let task_rows: Vec<Vec<String>> = period
            .sum_by_task()
            .into_iter()
            .map(|(task, total)| vec![task, format_count(total)])
            .collect();
        out.push_str("<h3>Completions by Task</h3>\n");
        self.push_table(out, &["Task", "Total"], &task_rows);

        if self.include_charts {
            let persons: Vec<String> = period.leaderboard().into_iter().map(|(p, _)| p).collect();
            let sums = period.sum_by_person_section();
            let series: Vec<ChartSeries> = sections
                .iter()
                .map(|section| {
                    ChartSeries::new(
                        section.clone(),
                        persons
                            .iter()
                            .map(|p| {
                                sums.get(&(p.clone(), section.clone()))
                                    .copied()
                                    .unwrap_or(0.0)
                            })
                            .collect(),
                    )
                })
                .collect();
            let data = ChartData::new(format!("{label}: Completions by Member"), persons, series);
            let chart = BarChartRenderer::grouped()
                .style(self.chart_style.clone())
                .render(&data)?;
            self.push_chart(out, &chart);
        }
        Ok(())
    }

    fn push_overview(&self, out: &mut String, table: &RecordTable) -> Result<(), ReportError> {
        let labels = table.source_labels();

        out.push_str("<h2>Overview</h2>\n");
        self.push_metrics(out, table);

        let leaderboard_rows: Vec<Vec<String>> = table
            .leaderboard()
            .into_iter()
            .enumerate()
            .map(|(i, (person, total))| vec![(i + 1).to_string(), person, format_count(total)])
            .collect();
        out.push_str("<h3>Leaderboard</h3>\n");
        self.push_table(out, &["Rank", "Member", "Total"], &leaderboard_rows);

        if !self.include_charts || labels.len() < 2 {
            return Ok(());
        }

        // Trend line: one series per person across all periods
        let per_month = table.sum_by_person_month();
        let series: Vec<ChartSeries> = table
            .persons()
            .into_iter()
            .map(|person| {
                ChartSeries::new(
                    person.clone(),
                    labels
                        .iter()
                        .map(|label| {
                            per_month
                                .get(&(label.clone(), person.clone()))
                                .copied()
                                .unwrap_or(0.0)
                        })
                        .collect(),
                )
            })
            .collect();
        let trend = ChartData::new("Completions over Time", labels.clone(), series);
        let chart = LineChartRenderer::new()
            .style(self.chart_style.clone())
            .render(&trend)?;
        self.push_chart(out, &chart);

        // Stacked bars: portal mix per period
        let per_section = table.sum_by_section_month();
        let series: Vec<ChartSeries> = table
            .sections()
            .into_iter()
            .map(|section| {
                ChartSeries::new(
                    section.clone(),
                    labels
                        .iter()
                        .map(|label| {
                            per_section
                                .get(&(label.clone(), section.clone()))
                                .copied()
                                .unwrap_or(0.0)
                        })
                        .collect(),
                )
            })
            .collect();
        let mix = ChartData::new("Portal Mix over Time", labels, series);
        let chart = BarChartRenderer::stacked()
            .style(self.chart_style.clone())
            .render(&mix)?;
        self.push_chart(out, &chart);
        Ok(())
    }
}

impl ReportRenderer for HtmlReportRenderer {
    type Output = String;

    fn render(&self, table: &RecordTable) -> Result<String, ReportError> {
        let mut out = String::with_capacity(16 * 1024);
        self.push_header(&mut out);

        if table.is_empty() {
            out.push_str("<p class=\"empty\">No completion records to report.</p>\n");
            out.push_str("</div>\n</body>\n</html>\n");
            return Ok(out);
        }

        self.push_overview(&mut out, table)?;
        for label in table.source_labels() {
            let period = table.for_source(&label);
            self.push_period(&mut out, &label, &period)?;
        }

        out.push_str("</div>\n</body>\n</html>\n");
        Ok(out)
    }
}

/// Escape text for safe embedding in HTML content and attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
