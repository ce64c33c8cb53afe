//! State of the settings dialog. The host draws the widgets; this is what they are bound to.

use std::ops::RangeInclusive;

use crate::config::{settings::validated_range, Settings};

pub const GOAL_BOUNDS: RangeInclusive<u32> = 0..=999_999;
pub const HEIGHT_BOUNDS: RangeInclusive<u32> = 40..=500;
pub const WIDTH_VW_BOUNDS: RangeInclusive<u32> = 30..=100;
pub const MIN_WIDTH_BOUNDS: RangeInclusive<u32> = 200..=3000;
pub const MAX_WIDTH_BOUNDS: RangeInclusive<u32> = 200..=4000;
pub const GAP_BOUNDS: RangeInclusive<u32> = 0..=50;
pub const BAR_MIN_BOUNDS: RangeInclusive<u32> = 1..=60;
pub const BAR_MAX_BOUNDS: RangeInclusive<u32> = 1..=80;

fn bounded(value: u32, bounds: &RangeInclusive<u32>) -> u32 {
    value.clamp(*bounds.start(), *bounds.end())
}

/// One field per control of the dialog, grouped the way the dialog tabs are.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsForm {
    // General
    pub enabled: bool,
    pub range_days: u32,
    pub goal_per_day: u32,
    pub show_goal_line: bool,

    // Layout
    pub chart_height_px: u32,
    pub chart_width_vw: u32,
    pub chart_min_width_px: u32,
    pub chart_max_width_px: u32,

    // Bars
    pub bar_gap_px: u32,
    pub bar_min_px: u32,
    pub bar_max_px: u32,

    // Colors
    pub bar_rgba: String,
    pub today_bar_rgba: String,
    pub goal_line_rgba: String,
    pub tick_rgba: String,
    pub goal_met_bar_rgba: String,
    pub goal_met_outline_rgba: String,
    pub today_goal_bar_rgba: String,
    pub today_goal_outline_rgba: String,
}

impl SettingsForm {
    /// Populates the fields from `settings`, bringing every value inside what its control
    /// accepts. A range outside of the allowed set becomes 30 days.
    pub fn load_current(settings: &Settings) -> Self {
        Self {
            enabled: settings.enabled,
            range_days: validated_range(settings.range_days),
            goal_per_day: bounded(settings.goal_per_day, &GOAL_BOUNDS),
            show_goal_line: settings.show_goal_line,

            chart_height_px: bounded(settings.chart_height_px, &HEIGHT_BOUNDS),
            chart_width_vw: bounded(settings.chart_width_vw, &WIDTH_VW_BOUNDS),
            chart_min_width_px: bounded(settings.chart_min_width_px, &MIN_WIDTH_BOUNDS),
            chart_max_width_px: bounded(settings.chart_max_width_px, &MAX_WIDTH_BOUNDS),

            bar_gap_px: bounded(settings.bar_gap_px, &GAP_BOUNDS),
            bar_min_px: bounded(settings.bar_min_px, &BAR_MIN_BOUNDS),
            bar_max_px: bounded(settings.bar_max_px, &BAR_MAX_BOUNDS),

            bar_rgba: settings.bar_rgba.clone(),
            today_bar_rgba: settings.today_bar_rgba.clone(),
            goal_line_rgba: settings.goal_line_rgba.clone(),
            tick_rgba: settings.tick_rgba.clone(),
            goal_met_bar_rgba: settings.goal_met_bar_rgba.clone(),
            goal_met_outline_rgba: settings.goal_met_outline_rgba.clone(),
            today_goal_bar_rgba: settings.today_goal_bar_rgba.clone(),
            today_goal_outline_rgba: settings.today_goal_outline_rgba.clone(),
        }
    }

    /// "Reset to defaults": fields only, nothing is saved.
    pub fn load_defaults() -> Self {
        Self::load_current(&Settings::default())
    }

    /// Writes the fields over `base`. Options the dialog doesn't show, unknown keys and the cache
    /// fields come from `base` unchanged. Colours are trimmed, not validated.
    pub fn export(&self, base: Settings) -> Settings {
        Settings {
            enabled: self.enabled,
            range_days: validated_range(self.range_days),
            goal_per_day: self.goal_per_day,
            show_goal_line: self.show_goal_line,

            chart_height_px: self.chart_height_px,
            chart_width_vw: self.chart_width_vw,
            chart_min_width_px: self.chart_min_width_px,
            chart_max_width_px: self.chart_max_width_px,

            bar_gap_px: self.bar_gap_px,
            bar_min_px: self.bar_min_px,
            bar_max_px: self.bar_max_px,

            bar_rgba: self.bar_rgba.trim().to_string(),
            today_bar_rgba: self.today_bar_rgba.trim().to_string(),
            goal_line_rgba: self.goal_line_rgba.trim().to_string(),
            tick_rgba: self.tick_rgba.trim().to_string(),
            goal_met_bar_rgba: self.goal_met_bar_rgba.trim().to_string(),
            goal_met_outline_rgba: self.goal_met_outline_rgba.trim().to_string(),
            today_goal_bar_rgba: self.today_goal_bar_rgba.trim().to_string(),
            today_goal_outline_rgba: self.today_goal_outline_rgba.trim().to_string(),

            ..base
        }
    }
}
