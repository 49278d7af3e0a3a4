use chrono::NaiveDate;
use maud::{Markup, html};

use crate::config::MAX_AXIS_LABELS;
use crate::navigation::RenderSink;

use super::SeriesResult;

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 240.0;
const MARGIN_LEFT: f64 = 50.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 28.0;
const MARGIN_BOTTOM: f64 = 40.0;

/// Above this many points the trend line is drawn without markers.
const MAX_MARKED_POINTS: usize = 40;

const TEXT_STYLE: &str = "fill: var(--foreground); font-family: inherit";
const SVG_CONTAINER_STYLE: &str = "width:100%;height:auto";

fn format_value(v: f64) -> String {
    if v == v.floor() && v.abs() < 1_000_000.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

/// Shortens a bucket key for the x axis: days become `dd/mm`, months `mm/yyyy`.
fn format_label(key: &str) -> String {
    if let Ok(day) = NaiveDate::parse_from_str(key, "%Y-%m-%d") {
        return day.format("%d/%m").to_string();
    }
    if let Some((year, month)) = key.split_once('-') {
        return format!("{month}/{year}");
    }
    key.to_owned()
}

fn x_at(i: usize, len: usize, chart_w: f64) -> f64 {
    MARGIN_LEFT + (i as f64 / (len - 1).max(1) as f64) * chart_w
}

fn y_at(value: f64, max_val: f64, chart_h: f64) -> f64 {
    MARGIN_TOP + chart_h - (value / max_val) * chart_h
}

fn polyline_points(values: &[f64], max_val: f64, chart_w: f64, chart_h: f64) -> String {
    values
        .iter()
        .enumerate()
        .map(|(i, val)| {
            format!(
                "{:.1},{:.1}",
                x_at(i, values.len(), chart_w),
                y_at(*val, max_val, chart_h)
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Draws the trend series over the raw series on a zero-based y axis.
pub fn render_series_chart(series: &SeriesResult) -> Markup {
    let caption = series.caption.to_string();
    if series.labels.is_empty() {
        return empty_chart(&caption);
    }

    let max_val = series
        .smooth
        .iter()
        .chain(&series.raw)
        .copied()
        .fold(0.0_f64, f64::max);
    let max_val = if max_val == 0.0 { 1.0 } else { max_val };

    let chart_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let chart_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let baseline = MARGIN_TOP + chart_h;

    let trend = polyline_points(&series.smooth, max_val, chart_w, chart_h);
    let area = format!(
        "{MARGIN_LEFT:.1},{baseline:.1} {trend} {:.1},{baseline:.1}",
        x_at(series.smooth.len() - 1, series.smooth.len(), chart_w)
    );
    let raw = polyline_points(&series.raw, max_val, chart_w, chart_h);
    let marked = series.labels.len() <= MAX_MARKED_POINTS;

    html! {
        svg viewBox=(format!("0 0 {WIDTH} {HEIGHT}")) xmlns="http://www.w3.org/2000/svg" style=(SVG_CONTAINER_STYLE) {
            rect width=(WIDTH) height=(HEIGHT) style="fill: var(--background)" {}
            text x=(MARGIN_LEFT) y="16" font-size="12" style=(TEXT_STYLE) { (caption) }
            text x=(MARGIN_LEFT - 5.0) y=(MARGIN_TOP + 10.0) font-size="10" text-anchor="end" style=(TEXT_STYLE) {
                (format_value(max_val))
            }
            text x=(MARGIN_LEFT - 5.0) y=(baseline) font-size="10" text-anchor="end" style=(TEXT_STYLE) { "0" }
            line x1=(MARGIN_LEFT) y1=(baseline) x2=(MARGIN_LEFT + chart_w) y2=(baseline) style="stroke: var(--muted)" {}

            polygon.trend-area points=(area) opacity="0.2" style="fill: var(--accent)" {}
            polyline.trend points=(trend) fill="none" stroke-width="2" style="stroke: var(--accent)" {}
            @if !series.raw.is_empty() {
                polyline.raw points=(raw) fill="none" stroke-width="1.5" opacity="0.6" style="stroke: var(--muted)" {}
            }
            @if marked {
                @for (i, (label, val)) in series.labels.iter().zip(&series.smooth).enumerate() {
                    circle cx=(x_at(i, series.smooth.len(), chart_w)) cy=(y_at(*val, max_val, chart_h)) r="3" style="fill: var(--accent)" {
                        title { (label) ": " (format_value(*val)) }
                    }
                }
            }
            (write_x_axis(&series.labels, chart_w))
        }
    }
}

fn write_x_axis(labels: &[String], chart_w: f64) -> Markup {
    let label_y = HEIGHT - 12.0;
    let step = labels.len().div_ceil(MAX_AXIS_LABELS).max(1);
    html! {
        @for (i, label) in labels.iter().enumerate().step_by(step) {
            @let x = x_at(i, labels.len(), chart_w);
            text x=(x) y=(label_y) font-size="10" text-anchor="middle" style=(TEXT_STYLE) {
                (format_label(label))
            }
        }
    }
}

fn empty_chart(label: &str) -> Markup {
    html! {
        svg viewBox=(format!("0 0 {WIDTH} {HEIGHT}")) xmlns="http://www.w3.org/2000/svg" style=(SVG_CONTAINER_STYLE) {
            rect width=(WIDTH) height=(HEIGHT) style="fill: var(--background)" {}
            text x=(WIDTH / 2.0) y=(HEIGHT / 2.0) font-size="14" text-anchor="middle" style=(TEXT_STYLE) {
                (label) " (no data)"
            }
        }
    }
}

/// SVG chart as last drawn, plus how many times it has been redrawn.
pub struct SvgChart {
    pub markup: Markup,
    pub revision: u32,
}

/// Renders series to inline SVG.
#[derive(Default)]
pub struct SvgSink;

impl RenderSink for SvgSink {
    type Chart = SvgChart;

    fn create(&mut self, series: &SeriesResult) -> SvgChart {
        SvgChart {
            markup: render_series_chart(series),
            revision: 0,
        }
    }

    fn update(&mut self, chart: &mut SvgChart, series: &SeriesResult) {
        chart.markup = render_series_chart(series);
        chart.revision += 1;
    }
}
