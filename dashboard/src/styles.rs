mod global {
    turf::style_sheet!("assets/global.css");
}

mod charts {
    turf::style_sheet!("assets/charts.css");
}

mod panels {
    turf::style_sheet!("assets/panels.css");
}

pub use charts::ClassName as Charts;
pub use panels::ClassName as Panels;

use std::sync::LazyLock;

pub static ALL: LazyLock<String> = LazyLock::new(|| {
    [
        global::STYLE_SHEET,
        charts::STYLE_SHEET,
        panels::STYLE_SHEET,
    ]
    .join("\n")
});
