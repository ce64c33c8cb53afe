//! Chart rendering. [layout] computes every number (scale, bar heights, goal line), [html] turns
//! the result into a fragment the host can append to its page.

pub mod html;
pub mod layout;

use chrono::NaiveDate;

use crate::{activity::counts::DailyCounts, config::settings::Settings};

use html::DisplayFragment;
use layout::ChartLayout;

/// Renders the chart for `counts`, the last of which is `today`.
pub fn render(counts: DailyCounts, settings: &Settings, today: NaiveDate) -> DisplayFragment {
    let layout = ChartLayout::compute(counts, settings, today);
    html::serialize(&layout, settings)
}
