use chrono::{Duration, NaiveDate};

use crate::{
    activity::counts::DailyCounts,
    config::settings::Settings,
    utils::{percentage::Percentage, time::window_start},
};

/// Visual state of a bar. Precedence when several apply: today and goal met, goal met, today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarStyle {
    Plain,
    Today,
    GoalMet,
    TodayGoalMet,
}

impl BarStyle {
    pub fn of(is_today: bool, goal_met: bool) -> Self {
        match (is_today, goal_met) {
            (true, true) => BarStyle::TodayGoalMet,
            (false, true) => BarStyle::GoalMet,
            (true, false) => BarStyle::Today,
            (false, false) => BarStyle::Plain,
        }
    }

    pub fn is_goal_met(&self) -> bool {
        matches!(self, BarStyle::GoalMet | BarStyle::TodayGoalMet)
    }

    pub fn is_today(&self) -> bool {
        matches!(self, BarStyle::Today | BarStyle::TodayGoalMet)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    pub date: NaiveDate,
    pub count: u64,
    pub height_px: u32,
    pub style: BarStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalLine {
    pub value: u64,
    pub bottom: Percentage,
}

/// Every number the chart needs, computed before any markup is produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub range_days: u32,
    pub total: u64,
    pub scale_max: u64,
    pub mid_tick: u64,
    pub chart_height_px: u32,
    /// Bar width before the resize script measured the real chart width.
    pub bar_width_px: u32,
    pub goal_line: Option<GoalLine>,
    pub bars: Vec<Bar>,
}

impl ChartLayout {
    pub fn compute(counts: DailyCounts, settings: &Settings, today: NaiveDate) -> Self {
        let range_days = settings.range_len();
        let counts = counts.normalized(range_days as usize);
        let chart_height_px = settings.chart_height_px.max(1);
        let goal = u64::from(settings.goal_per_day);

        let shown_goal = if settings.show_goal_line { goal } else { 0 };
        let scale_max = counts.max().max(shown_goal).max(1);

        let start_day = window_start(today, range_days);
        let last = counts.len().saturating_sub(1);
        let bars = counts
            .iter()
            .enumerate()
            .map(|(i, &count)| Bar {
                date: start_day + Duration::days(i as i64),
                count,
                height_px: bar_height(count, scale_max, chart_height_px),
                style: BarStyle::of(i == last, goal > 0 && count >= goal),
            })
            .collect();

        let goal_line = settings.show_goal_line.then(|| GoalLine {
            value: goal,
            bottom: Percentage::clamped_ratio(goal as f64, scale_max as f64),
        });

        let bar_width_px = fit_bar_width(
            settings
                .chart_min_width_px
                .saturating_sub(settings.tick_label_padding_left_px),
            range_days,
            settings.bar_gap_px,
            settings.bar_min_px,
            settings.bar_max_px,
        );

        Self {
            range_days,
            total: counts.total(),
            scale_max,
            mid_tick: (scale_max as f64 / 2.).round() as u64,
            chart_height_px,
            bar_width_px,
            goal_line,
            bars,
        }
    }

    pub fn title(&self) -> String {
        format!("Last {} days: {} reviews", self.range_days, self.total)
    }
}

/// Height of a bar in pixels. Never below one pixel so empty days stay visible.
pub fn bar_height(value: u64, scale_max: u64, chart_height_px: u32) -> u32 {
    let scale_max = scale_max.max(1) as f64;
    let height = (f64::from(chart_height_px) * value as f64 / scale_max).round();
    (height as u32).clamp(1, chart_height_px.max(1))
}

/// Width of one bar so that `bars` bars with fixed gaps fill `available_px`, bounded by the
/// configured minimum and maximum. The embedded resize script does the same computation.
pub fn fit_bar_width(available_px: u32, bars: u32, gap_px: u32, min_px: u32, max_px: u32) -> u32 {
    let bars = bars.max(1);
    let total_gap = gap_px.saturating_mul(bars - 1);
    let width = available_px.saturating_sub(total_gap) / bars;
    width.min(max_px).max(min_px)
}
