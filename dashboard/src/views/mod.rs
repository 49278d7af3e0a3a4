pub mod home;

use axum::http::header;
use axum::response::IntoResponse;
use maud::{DOCTYPE, Markup, html};
use serde::Deserialize;

use crate::charts::ChartView;
use crate::dashboard_config::DashboardConfig;
use crate::error::ChartError;
use crate::navigation::{Navigator, Step};
use crate::styles;

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@2.0.4";

/// Query of the chart page and fragment: `?view=last30&offset=2&step=prev`.
#[derive(Deserialize, Default)]
pub struct ChartQuery {
    pub view: Option<String>,
    #[serde(default)]
    pub offset: u32,
    pub step: Option<Step>,
}

impl ChartQuery {
    /// The position the client last rendered, before `step` is applied.
    ///
    /// A missing view falls back to the configured default; an unknown one fails.
    pub fn position(&self, config: &DashboardConfig) -> Result<Navigator, ChartError> {
        let view = match self.view.as_deref() {
            Some(id) => id.parse::<ChartView>()?,
            None => config.default_view,
        };
        Ok(Navigator::restore(view, self.offset))
    }
}

pub fn page_shell(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href="/styles.css";
                script src=(HTMX_SRC) {}
            }
            body {
                main { (content) }
            }
        }
    }
}

pub async fn styles() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], styles::ALL.as_str())
}
