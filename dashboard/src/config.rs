//! Behavioral constants for the summary panel, the metrics API and chart rendering.

/// Window of the `/api/metrics` breakdown, in days.
pub const RECENT_BREAKDOWN_DAYS: u32 = 7;

/// Maximum number of x-axis labels drawn under a chart.
pub const MAX_AXIS_LABELS: usize = 10;
