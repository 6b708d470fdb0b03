//! SVG chart renderers for report documents.
//!
//! Three renderers share one data shape: a title, a category axis and
//! one or more named series. Bar charts come in grouped and stacked
//! flavors; the line chart draws one polyline with markers per series.

use svg::node::element::{Circle, Group, Line, Polyline, Rectangle, Text};
use svg::Document;

use tallyport_core::ReportError;

use crate::format_count;

/// Default qualitative palette, cycled when a chart has more series.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494", "#b3b3b3",
];

/// One named series of values, aligned with the chart's categories.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<f64>,
}

impl ChartSeries {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Data for one chart: categories along the x axis, series of values.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartData {
    pub title: String,
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl ChartData {
    pub fn new(
        title: impl Into<String>,
        categories: Vec<String>,
        series: Vec<ChartSeries>,
    ) -> Self {
        Self {
            title: title.into(),
            categories,
            series,
        }
    }

    fn validate(&self) -> Result<(), ReportError> {
        if self.categories.is_empty() || self.series.is_empty() {
            return Err(ReportError::InvalidData("no data to chart".into()));
        }
        for series in &self.series {
            if series.values.len() != self.categories.len() {
                return Err(ReportError::InvalidData(format!(
                    "series \"{}\" has {} values for {} categories",
                    series.name,
                    series.values.len(),
                    self.categories.len()
                )));
            }
        }
        Ok(())
    }
}

/// How bars of multiple series share a category slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BarMode {
    #[default]
    Grouped,
    Stacked,
}

/// Shared chart geometry and styling.
#[derive(Clone, Debug)]
pub struct ChartStyle {
    /// Width of the plot area in pixels
    pub plot_width: u32,
    /// Height of the plot area in pixels
    pub plot_height: u32,
    /// Padding around the whole chart
    pub padding: u32,
    /// Vertical space reserved for the title
    pub title_height: u32,
    /// Vertical space reserved for category labels
    pub axis_height: u32,
    /// Vertical space reserved for the legend
    pub legend_height: u32,
    /// Series colors, cycled
    pub palette: Vec<String>,
    pub background_color: String,
    pub grid_color: String,
    pub text_color: String,
    pub font_family: String,
    pub font_size: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            plot_width: 720,
            plot_height: 280,
            padding: 20,
            title_height: 24,
            axis_height: 36,
            legend_height: 24,
            palette: DEFAULT_PALETTE.iter().map(|c| (*c).to_string()).collect(),
            background_color: "#ffffff".into(),
            grid_color: "#ecf0f1".into(),
            text_color: "#2c3e50".into(),
            font_family: "system-ui, -apple-system, sans-serif".into(),
            font_size: 12,
        }
    }
}

impl ChartStyle {
    fn total_width(&self) -> u32 {
        self.padding * 2 + 48 + self.plot_width
    }

    fn total_height(&self) -> u32 {
        self.padding * 2
            + self.title_height
            + self.plot_height
            + self.axis_height
            + self.legend_height
    }

    /// Left edge of the plot area (after the value-axis labels).
    fn plot_left(&self) -> f64 {
        f64::from(self.padding + 48)
    }

    fn plot_top(&self) -> f64 {
        f64::from(self.padding + self.title_height)
    }

    fn plot_bottom(&self) -> f64 {
        self.plot_top() + f64::from(self.plot_height)
    }

    fn color(&self, index: usize) -> &str {
        &self.palette[index % self.palette.len()]
    }

    fn value_to_y(&self, value: f64, max: f64) -> f64 {
        self.plot_bottom() - (value / max) * f64::from(self.plot_height)
    }

    fn new_document(&self, title: &str) -> Document {
        let width = self.total_width();
        let height = self.total_height();
        let background = Rectangle::new()
            .set("width", "100%")
            .set("height", "100%")
            .set("fill", self.background_color.as_str());
        let title_text = Text::new(title)
            .set("x", self.padding)
            .set("y", self.padding + self.font_size + 2)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size + 3)
            .set("font-weight", "bold")
            .set("fill", self.text_color.as_str());
        Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0, 0, width, height))
            .set("xmlns", "http://www.w3.org/2000/svg")
            .add(background)
            .add(title_text)
    }

    /// Horizontal gridlines with value labels.
    fn render_grid(&self, max: f64) -> Group {
        let mut group = Group::new().set("class", "grid");
        let ticks = 4u32;
        for i in 0..=ticks {
            let value = max * f64::from(i) / f64::from(ticks);
            let y = self.value_to_y(value, max);
            let line = Line::new()
                .set("x1", self.plot_left())
                .set("y1", y)
                .set("x2", self.plot_left() + f64::from(self.plot_width))
                .set("y2", y)
                .set("stroke", self.grid_color.as_str())
                .set("stroke-width", 1);
            group = group.add(line);

            let label = Text::new(format_count(value))
                .set("x", self.plot_left() - 6.0)
                .set("y", y + 4.0)
                .set("font-family", self.font_family.as_str())
                .set("font-size", self.font_size - 2)
                .set("fill", self.text_color.as_str())
                .set("text-anchor", "end");
            group = group.add(label);
        }
        group
    }

    /// Category labels under the plot area.
    fn render_category_axis(&self, categories: &[String]) -> Group {
        let mut group = Group::new().set("class", "axis");
        let slot = f64::from(self.plot_width) / categories.len() as f64;
        for (i, category) in categories.iter().enumerate() {
            let x = self.plot_left() + slot * (i as f64 + 0.5);
            let label = Text::new(truncate(category, 14))
                .set("x", x)
                .set("y", self.plot_bottom() + f64::from(self.font_size) + 6.0)
                .set("font-family", self.font_family.as_str())
                .set("font-size", self.font_size - 1)
                .set("fill", self.text_color.as_str())
                .set("text-anchor", "middle");
            group = group.add(label);
        }
        group
    }

    /// Legend row below the axis: one colored box per series.
    fn render_legend(&self, series: &[ChartSeries]) -> Group {
        let mut group = Group::new().set("class", "legend");
        let box_size = 10.0;
        let y = self.plot_bottom() + f64::from(self.axis_height) + 10.0;
        let mut x = self.plot_left();
        for (i, s) in series.iter().enumerate() {
            let swatch = Rectangle::new()
                .set("x", x)
                .set("y", y - box_size + 2.0)
                .set("width", box_size)
                .set("height", box_size)
                .set("rx", 2)
                .set("fill", self.color(i));
            group = group.add(swatch);

            let label = Text::new(truncate(&s.name, 20))
                .set("x", x + box_size + 5.0)
                .set("y", y)
                .set("font-family", self.font_family.as_str())
                .set("font-size", self.font_size - 1)
                .set("fill", self.text_color.as_str());
            group = group.add(label);

            x += box_size + 12.0 + (truncate(&s.name, 20).len() as f64) * 6.5;
        }
        group
    }

    fn finish(&self, document: &Document) -> Result<String, ReportError> {
        let mut output = Vec::new();
        svg::write(&mut output, document)
            .map_err(|e| ReportError::Format(format!("failed to write SVG: {e}")))?;
        String::from_utf8(output).map_err(|e| ReportError::Format(format!("invalid UTF-8: {e}")))
    }
}

/// Bar chart renderer (grouped or stacked).
#[derive(Clone, Debug, Default)]
pub struct BarChartRenderer {
    pub style: ChartStyle,
    pub mode: BarMode,
    /// Draw the value above each bar (grouped mode only)
    pub show_values: bool,
}

impl BarChartRenderer {
    pub fn grouped() -> Self {
        Self {
            mode: BarMode::Grouped,
            show_values: true,
            ..Self::default()
        }
    }

    pub fn stacked() -> Self {
        Self {
            mode: BarMode::Stacked,
            ..Self::default()
        }
    }

    pub fn style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }

    pub fn render(&self, data: &ChartData) -> Result<String, ReportError> {
        data.validate()?;
        let style = &self.style;

        let raw_max = match self.mode {
            BarMode::Grouped => data
                .series
                .iter()
                .flat_map(|s| s.values.iter().copied())
                .fold(0.0f64, f64::max),
            BarMode::Stacked => (0..data.categories.len())
                .map(|i| data.series.iter().map(|s| s.values[i]).sum::<f64>())
                .fold(0.0f64, f64::max),
        };
        let max = nice_max(raw_max);

        let mut document = style.new_document(&data.title);
        document = document.add(style.render_grid(max));

        let slot = f64::from(style.plot_width) / data.categories.len() as f64;
        let mut bars = Group::new().set("class", "bars");

        match self.mode {
            BarMode::Grouped => {
                let bar_width = (slot * 0.8) / data.series.len() as f64;
                for (si, series) in data.series.iter().enumerate() {
                    for (ci, value) in series.values.iter().enumerate() {
                        let x = style.plot_left()
                            + slot * ci as f64
                            + slot * 0.1
                            + bar_width * si as f64;
                        let y = style.value_to_y(*value, max);
                        let bar = Rectangle::new()
                            .set("x", x)
                            .set("y", y)
                            .set("width", bar_width.max(1.0))
                            .set("height", (style.plot_bottom() - y).max(0.0))
                            .set("fill", style.color(si));
                        bars = bars.add(bar);

                        if self.show_values && *value > 0.0 {
                            let label = Text::new(format_count(*value))
                                .set("x", x + bar_width / 2.0)
                                .set("y", y - 3.0)
                                .set("font-family", style.font_family.as_str())
                                .set("font-size", style.font_size - 2)
                                .set("fill", style.text_color.as_str())
                                .set("text-anchor", "middle");
                            bars = bars.add(label);
                        }
                    }
                }
            }
            BarMode::Stacked => {
                let bar_width = slot * 0.6;
                for (ci, _) in data.categories.iter().enumerate() {
                    let x = style.plot_left() + slot * ci as f64 + slot * 0.2;
                    let mut running = 0.0;
                    for (si, series) in data.series.iter().enumerate() {
                        let value = series.values[ci];
                        if value <= 0.0 {
                            continue;
                        }
                        let top = style.value_to_y(running + value, max);
                        let bottom = style.value_to_y(running, max);
                        let segment = Rectangle::new()
                            .set("x", x)
                            .set("y", top)
                            .set("width", bar_width)
                            .set("height", (bottom - top).max(0.0))
                            .set("fill", style.color(si));
                        bars = bars.add(segment);
                        running += value;
                    }
                }
            }
        }

        document = document.add(bars);
        document = document.add(style.render_category_axis(&data.categories));
        document = document.add(style.render_legend(&data.series));
        style.finish(&document)
    }
}

/// Line chart renderer: one polyline with circle markers per series.
#[derive(Clone, Debug)]
pub struct LineChartRenderer {
    pub style: ChartStyle,
    pub marker_radius: f64,
}

impl Default for LineChartRenderer {
    fn default() -> Self {
        Self {
            style: ChartStyle::default(),
            marker_radius: 3.5,
        }
    }
}

impl LineChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }

    pub fn render(&self, data: &ChartData) -> Result<String, ReportError> {
        data.validate()?;
        let style = &self.style;

        let raw_max = data
            .series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0f64, f64::max);
        let max = nice_max(raw_max);

        let mut document = style.new_document(&data.title);
        document = document.add(style.render_grid(max));

        let slot = f64::from(style.plot_width) / data.categories.len() as f64;
        let mut lines = Group::new().set("class", "lines");

        for (si, series) in data.series.iter().enumerate() {
            let points: Vec<(f64, f64)> = series
                .values
                .iter()
                .enumerate()
                .map(|(ci, value)| {
                    (
                        style.plot_left() + slot * (ci as f64 + 0.5),
                        style.value_to_y(*value, max),
                    )
                })
                .collect();

            let path: Vec<String> = points.iter().map(|(x, y)| format!("{x},{y}")).collect();
            let polyline = Polyline::new()
                .set("points", path.join(" "))
                .set("fill", "none")
                .set("stroke", style.color(si))
                .set("stroke-width", 2);
            lines = lines.add(polyline);

            for (x, y) in points {
                let marker = Circle::new()
                    .set("cx", x)
                    .set("cy", y)
                    .set("r", self.marker_radius)
                    .set("fill", style.color(si));
                lines = lines.add(marker);
            }
        }

        document = document.add(lines);
        document = document.add(style.render_category_axis(&data.categories));
        document = document.add(style.render_legend(&data.series));
        style.finish(&document)
    }
}

/// Round a maximum up to 1, 2 or 5 times a power of ten so gridline
/// values come out even. A non-positive maximum charts as 1.
fn nice_max(max: f64) -> f64 {
    if max <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(max.log10().floor());
    let normalized = max / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Truncate a string to a maximum length with ellipsis.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_data() -> ChartData {
        ChartData::new(
            "Completions per Person",
            vec!["Alice".into(), "Bob".into()],
            vec![
                ChartSeries::new("AMS PORTAL", vec![5.0, 3.0]),
                ChartSeries::new("EMEA PORTAL", vec![2.0, 0.0]),
            ],
        )
    }

    #[test]
    fn grouped_bar_chart_is_valid_svg() {
        let svg = BarChartRenderer::grouped().render(&sample_data()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains("Completions per Person"));
        assert!(svg.contains("Alice"));
        assert!(svg.contains(DEFAULT_PALETTE[0]));
    }

    #[test]
    fn stacked_bar_chart_renders_segments() {
        let svg = BarChartRenderer::stacked().render(&sample_data()).unwrap();
        assert!(svg.contains("rect"));
        assert!(svg.contains(DEFAULT_PALETTE[1]));
    }

    #[test]
    fn line_chart_draws_polylines_and_markers() {
        let svg = LineChartRenderer::new().render(&sample_data()).unwrap();
        assert!(svg.contains("polyline"));
        assert!(svg.contains("circle"));
    }

    #[test]
    fn empty_data_is_rejected() {
        let data = ChartData::new("Empty", vec![], vec![]);
        assert!(matches!(
            BarChartRenderer::grouped().render(&data),
            Err(ReportError::InvalidData(_))
        ));
    }

    #[test]
    fn misaligned_series_is_rejected() {
        let data = ChartData::new(
            "Bad",
            vec!["Alice".into()],
            vec![ChartSeries::new("AMS", vec![1.0, 2.0])],
        );
        assert!(BarChartRenderer::grouped().render(&data).is_err());
    }

    #[test]
    fn nice_max_rounds_to_even_steps() {
        assert_eq!(nice_max(0.0), 1.0);
        assert_eq!(nice_max(3.2), 5.0);
        assert_eq!(nice_max(17.0), 20.0);
        assert_eq!(nice_max(50.0), 50.0);
        assert_eq!(nice_max(730.0), 1000.0);
    }

    #[test]
    fn truncate_long_labels() {
        assert_eq!(truncate("Short", 14), "Short");
        assert_eq!(truncate("A very long category label", 14), "A very long...");
    }
}
