//! Calendar paging state and the controller that keeps a chart in sync with it.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::charts::{self, ChartView, SeriesResult};
use crate::error::ChartError;
use crate::events::Event;

/// A paging request from the view's prev/next controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Prev,
    Next,
}

/// Selected view plus how many periods back it is paged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigator {
    view: ChartView,
    offset: u32,
}

impl Navigator {
    pub fn new(view: ChartView) -> Self {
        Navigator { view, offset: 0 }
    }

    /// Resumes at a previously rendered position. Views that cannot page are
    /// pinned to offset 0.
    pub fn restore(view: ChartView, offset: u32) -> Self {
        let offset = if view.is_navigable() { offset } else { 0 };
        Navigator { view, offset }
    }

    pub fn view(&self) -> ChartView {
        self.view
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Returns true when the state changed and the chart needs a recompute.
    pub fn change_view(&mut self, view: ChartView) -> bool {
        let changed = self.view != view || self.offset != 0;
        self.view = view;
        self.offset = 0;
        changed
    }

    pub fn prev(&mut self) -> bool {
        if !self.view.is_navigable() {
            return false;
        }
        match self.offset.checked_add(1) {
            Some(offset) => {
                self.offset = offset;
                true
            }
            None => false,
        }
    }

    pub fn next(&mut self) -> bool {
        if !self.view.is_navigable() || self.offset == 0 {
            return false;
        }
        self.offset -= 1;
        true
    }

    pub fn step(&mut self, step: Step) -> bool {
        match step {
            Step::Prev => self.prev(),
            Step::Next => self.next(),
        }
    }

    pub fn can_go_next(&self) -> bool {
        self.view.is_navigable() && self.offset > 0
    }
}

/// Draws series. A chart is created once and then updated in place.
pub trait RenderSink {
    type Chart;

    fn create(&mut self, series: &SeriesResult) -> Self::Chart;
    fn update(&mut self, chart: &mut Self::Chart, series: &SeriesResult);
}

/// Owns the navigation state, an event snapshot and the chart drawn from them.
pub struct ChartController<S: RenderSink> {
    sink: S,
    chart: S::Chart,
    navigator: Navigator,
    events: Vec<Event>,
    now: DateTime<Utc>,
    series: SeriesResult,
}

impl<S: RenderSink> ChartController<S> {
    /// Computes the initial series and creates the chart for it.
    pub fn new(
        mut sink: S,
        navigator: Navigator,
        events: Vec<Event>,
        now: DateTime<Utc>,
    ) -> Result<Self, ChartError> {
        let series = charts::compute(navigator.view(), navigator.offset(), &events, now)?;
        let chart = sink.create(&series);
        Ok(ChartController {
            sink,
            chart,
            navigator,
            events,
            now,
            series,
        })
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn series(&self) -> &SeriesResult {
        &self.series
    }

    pub fn chart(&self) -> &S::Chart {
        &self.chart
    }

    pub fn change_view(&mut self, view: ChartView) -> Result<(), ChartError> {
        let mut navigator = self.navigator;
        if navigator.change_view(view) {
            self.apply(navigator)?;
        }
        Ok(())
    }

    pub fn prev(&mut self) -> Result<(), ChartError> {
        self.step(Step::Prev)
    }

    pub fn next(&mut self) -> Result<(), ChartError> {
        self.step(Step::Next)
    }

    pub fn step(&mut self, step: Step) -> Result<(), ChartError> {
        let mut navigator = self.navigator;
        if navigator.step(step) {
            self.apply(navigator)?;
        }
        Ok(())
    }

    /// Commits `navigator` only once its series computed, so a failed step
    /// leaves both state and chart untouched.
    fn apply(&mut self, navigator: Navigator) -> Result<(), ChartError> {
        let series = charts::compute(navigator.view(), navigator.offset(), &self.events, self.now)?;
        debug!(view = %navigator.view(), offset = navigator.offset(), "recomputed chart");
        self.sink.update(&mut self.chart, &series);
        self.navigator = navigator;
        self.series = series;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        created: usize,
        updates: usize,
    }

    impl RenderSink for RecordingSink {
        type Chart = Vec<String>;

        fn create(&mut self, series: &SeriesResult) -> Self::Chart {
            self.created += 1;
            vec![series.caption.to_string()]
        }

        fn update(&mut self, chart: &mut Self::Chart, series: &SeriesResult) {
            self.updates += 1;
            chart.push(series.caption.to_string());
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    #[test]
    fn next_at_zero_is_a_no_op() {
        let mut nav = Navigator::new(ChartView::Rolling30);
        assert!(!nav.next());
        assert_eq!(nav.offset(), 0);
    }

    #[test]
    fn prev_then_next_returns_to_start() {
        let mut nav = Navigator::restore(ChartView::Rolling365, 3);
        assert!(nav.prev());
        assert_eq!(nav.offset(), 4);
        assert!(nav.next());
        assert_eq!(nav.offset(), 3);
    }

    #[test]
    fn changing_view_resets_offset() {
        let mut nav = Navigator::restore(ChartView::Rolling30, 5);
        assert!(nav.change_view(ChartView::Rolling365));
        assert_eq!(nav.offset(), 0);
        assert_eq!(nav.view(), ChartView::Rolling365);
    }

    #[test]
    fn non_navigable_views_ignore_paging() {
        let mut nav = Navigator::restore(ChartView::MonthlyAggregate, 7);
        assert_eq!(nav.offset(), 0);
        assert!(!nav.prev());
        assert!(!nav.next());
        assert!(!nav.can_go_next());
        assert_eq!(nav.offset(), 0);
    }

    #[test]
    fn controller_creates_once_then_updates() {
        let nav = Navigator::new(ChartView::Rolling30);
        let mut controller =
            ChartController::new(RecordingSink::default(), nav, Vec::new(), now()).unwrap();

        controller.next().unwrap();
        controller.prev().unwrap();
        controller.prev().unwrap();
        controller.next().unwrap();
        controller.change_view(ChartView::YearlyAggregate).unwrap();
        controller.prev().unwrap();

        assert_eq!(controller.sink.created, 1);
        assert_eq!(controller.sink.updates, 4);
        assert_eq!(controller.navigator().offset(), 0);
        assert_eq!(
            controller.chart(),
            &vec![
                "20 Sep - 19 Oct".to_owned(),
                "September 2026".to_owned(),
                "August 2026".to_owned(),
                "September 2026".to_owned(),
                "History (average per day)".to_owned(),
            ]
        );
    }

    #[test]
    fn failed_recompute_keeps_previous_state() {
        use chrono::{Datelike, NaiveDate};

        let earliest = 2026 - NaiveDate::MIN.year();
        let nav = Navigator::restore(ChartView::Rolling365, earliest as u32);
        let mut controller =
            ChartController::new(RecordingSink::default(), nav, Vec::new(), now()).unwrap();

        assert!(controller.prev().is_err());
        assert_eq!(controller.navigator().offset(), earliest as u32);
        assert_eq!(controller.sink.updates, 0);
        assert_eq!(controller.chart().len(), 1);
    }
}
