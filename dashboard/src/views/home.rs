use std::sync::Arc;

use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use maud::{Markup, html};

use crate::charts::svg::SvgSink;
use crate::charts::{ChartView, SeriesResult};
use crate::error::ChartError;
use crate::events::{Event, FORM_FORMAT};
use crate::navigation::{ChartController, Navigator};
use crate::state::AppState;
use crate::styles::{Charts as ChartClass, Panels as PanelClass};
use crate::summary;

use super::{ChartQuery, page_shell};

pub async fn index(
    Query(query): Query<ChartQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Markup, ChartError> {
    let events = state.snapshot();
    let now = state.now();
    let chart = render_chart_section(&query, &state, events.clone(), now)?;

    let content = html! {
        h1 { (state.config.title) }
        (render_last_entry(&events, now))
        div #chart-section { (chart) }
        (render_summary(&events, now))
        (render_entry_form(now))
    };
    Ok(page_shell(&state.config.title, content))
}

pub async fn fragment_chart(
    Query(query): Query<ChartQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Markup, ChartError> {
    render_chart_section(&query, &state, state.snapshot(), state.now())
}

fn render_chart_section(
    query: &ChartQuery,
    state: &AppState,
    events: Vec<Event>,
    now: DateTime<Utc>,
) -> Result<Markup, ChartError> {
    let mut controller = ChartController::new(SvgSink, query.position(&state.config)?, events, now)?;
    if let Some(step) = query.step {
        controller.step(step)?;
    }
    let navigator = *controller.navigator();

    Ok(html! {
        div.(ChartClass::CHART_TOOLBAR) {
            (render_view_selector(navigator.view()))
            (render_nav(&navigator))
        }
        div.(ChartClass::CHART_CAPTION) { (controller.series().caption.to_string()) }
        div.(ChartClass::CHART_CONTAINER) {
            (controller.chart().markup)
        }
        (render_legend(controller.series()))
    })
}

fn chart_url(view: ChartView, offset: u32, step: Option<&str>) -> String {
    let mut url = format!("/fragments/chart?view={}&offset={offset}", view.id());
    if let Some(step) = step {
        url.push_str("&step=");
        url.push_str(step);
    }
    url
}

fn render_view_selector(active: ChartView) -> Markup {
    html! {
        select name="view"
            hx-get="/fragments/chart"
            hx-target="#chart-section"
            hx-swap="innerHTML"
        {
            @for view in ChartView::ALL {
                option value=(view.id()) selected[view == active] { (view.display_name()) }
            }
        }
    }
}

fn render_nav(navigator: &Navigator) -> Markup {
    let view = navigator.view();
    let offset = navigator.offset();
    html! {
        div.(ChartClass::CHART_NAV).(if view.is_navigable() { "" } else { ChartClass::NAV_DISABLED }) {
            button
                disabled[!view.is_navigable()]
                hx-get=(chart_url(view, offset, Some("prev")))
                hx-target="#chart-section"
                hx-swap="innerHTML"
            { "<" }
            button
                disabled[!navigator.can_go_next()]
                hx-get=(chart_url(view, offset, Some("next")))
                hx-target="#chart-section"
                hx-swap="innerHTML"
            { ">" }
        }
    }
}

fn render_legend(series: &SeriesResult) -> Markup {
    html! {
        div.(ChartClass::LEGEND) {
            span.(ChartClass::LEGEND_TREND) { "trend" }
            @if !series.view.is_rate_only() {
                span.(ChartClass::LEGEND_RAW) { "daily count" }
            }
        }
    }
}

fn render_last_entry(events: &[Event], now: DateTime<Utc>) -> Markup {
    match (summary::last_entry(events, now), summary::freshness(events, now)) {
        (Some(entry), Some(age)) => html! {
            div.(PanelClass::LAST_ENTRY) { (entry.to_string()) " (" (age) " ago)" }
        },
        _ => html! {
            div.(PanelClass::LAST_ENTRY) { "No entries yet." }
        },
    }
}

fn render_summary(events: &[Event], now: DateTime<Utc>) -> Markup {
    let report = summary::summarize(events, now).report();
    let items = [
        ("total", report.total),
        ("per day, 30 days", report.avg_last_30),
        ("per day, 365 days", report.avg_last_365),
        ("per day, lifetime", report.avg_lifetime),
        ("peak hour", report.peak_slot),
    ];
    html! {
        div.(PanelClass::SUMMARY_GRID) {
            @for (label, value) in items {
                div.(PanelClass::SUMMARY_ITEM) {
                    div.(PanelClass::SUMMARY_VALUE) { (value) }
                    div.(PanelClass::SUMMARY_LABEL) { (label) }
                }
            }
        }
    }
}

fn render_entry_form(now: DateTime<Utc>) -> Markup {
    html! {
        form.(PanelClass::ENTRY_FORM)
            hx-post="/log"
            hx-swap="none"
            hx-on:htmx:after-request="if (event.detail.successful) window.location.reload()"
        {
            input type="datetime-local" name="user_time" required value=(now.format(FORM_FORMAT).to_string());
            button.(PanelClass::SUBMIT_BTN) type="submit" { "log" }
        }
    }
}
