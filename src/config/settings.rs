use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Range lengths the chart can be configured with.
pub const ALLOWED_RANGES: [u32; 5] = [7, 30, 90, 180, 365];

pub const DEFAULT_RANGE_DAYS: u32 = 30;

/// Every option the add-on understands, each with its default. Colours are kept as the raw
/// `rgba(r,g,b,a)` strings the user typed; nothing validates them.
///
/// Keys that are not named fields (cache fields, options from other versions) land in `extra` and
/// are written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub enabled: bool,
    pub range_days: u32,

    pub goal_per_day: u32,
    pub show_goal_line: bool,

    pub chart_height_px: u32,
    pub chart_width_vw: u32,
    pub chart_min_width_px: u32,
    pub chart_max_width_px: u32,
    pub tick_label_padding_left_px: u32,

    pub bar_gap_px: u32,
    pub bar_min_px: u32,
    pub bar_max_px: u32,

    pub container_border_rgba: String,
    pub tick_rgba: String,
    pub bar_rgba: String,
    pub today_bar_rgba: String,
    pub today_outline_rgba: String,
    pub goal_line_rgba: String,
    pub goal_label_opacity: f64,
    pub goal_met_bar_rgba: String,
    pub goal_met_outline_rgba: String,
    pub today_goal_bar_rgba: String,
    pub today_goal_outline_rgba: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            range_days: DEFAULT_RANGE_DAYS,

            goal_per_day: 200,
            show_goal_line: true,

            chart_height_px: 140,
            chart_width_vw: 75,
            chart_min_width_px: 600,
            chart_max_width_px: 1100,
            tick_label_padding_left_px: 34,

            bar_gap_px: 4,
            bar_min_px: 6,
            bar_max_px: 28,

            container_border_rgba: "rgba(120,160,235,0.25)".into(),
            tick_rgba: "rgba(120,160,235,0.28)".into(),
            bar_rgba: "rgba(120,160,235,0.55)".into(),
            today_bar_rgba: "rgba(235,120,120,0.80)".into(),
            today_outline_rgba: "rgba(200,90,90,0.55)".into(),
            goal_line_rgba: "rgba(120,160,235,0.75)".into(),
            goal_label_opacity: 0.90,
            goal_met_bar_rgba: "rgba(90,135,230,0.75)".into(),
            goal_met_outline_rgba: "rgba(70,110,200,0.45)".into(),
            today_goal_bar_rgba: "rgba(220,90,90,0.90)".into(),
            today_goal_outline_rgba: "rgba(180,70,70,0.65)".into(),

            extra: Map::new(),
        }
    }
}

impl Settings {
    /// Number of days the chart covers. A persisted range outside of [ALLOWED_RANGES] counts as
    /// [DEFAULT_RANGE_DAYS].
    pub fn range_len(&self) -> u32 {
        validated_range(self.range_days)
    }

    /// Default settings as a json object. This is also what gets published to the host as the
    /// add-on's default config.
    pub fn defaults_object() -> Map<String, Value> {
        match serde_json::to_value(Settings::default()) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Overlays persisted values onto the defaults. A value that doesn't fit its option (for
    /// example a string where a number is expected) is dropped and the default stays. Whole
    /// floats such as `140.0` are accepted for integer options.
    pub fn merged(persisted: Map<String, Value>) -> Settings {
        let mut merged = Self::defaults_object();
        for (key, value) in persisted {
            let fitted = match merged.get(&key) {
                Some(default) => fit_option(default, value),
                None => Some(value),
            };
            match fitted {
                Some(value) => {
                    merged.insert(key, value);
                }
                None => warn!("Ignoring persisted option {key}: value doesn't fit"),
            }
        }

        match serde_json::from_value(Value::Object(merged)) {
            Ok(v) => v,
            Err(e) => {
                warn!("Falling back to default settings: {e:?}");
                Settings::default()
            }
        }
    }

    pub fn to_object(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Checks `value` against the json kind of the option's `default`. Integer options take
/// non-negative whole numbers that fit a `u32`.
fn fit_option(default: &Value, value: Value) -> Option<Value> {
    match default {
        Value::Bool(_) => value.is_boolean().then_some(value),
        Value::String(_) => value.is_string().then_some(value),
        Value::Number(n) if n.is_f64() => value.is_number().then_some(value),
        Value::Number(_) => {
            if let Some(v) = value.as_u64() {
                return u32::try_from(v).ok().map(Value::from);
            }
            value
                .as_f64()
                .filter(|v| *v >= 0. && v.fract() == 0. && *v <= f64::from(u32::MAX))
                .map(|v| Value::from(v as u32))
        }
        _ => Some(value),
    }
}

/// Returns `value` if it is one of [ALLOWED_RANGES], otherwise [DEFAULT_RANGE_DAYS].
pub fn validated_range(value: u32) -> u32 {
    if ALLOWED_RANGES.contains(&value) {
        value
    } else {
        DEFAULT_RANGE_DAYS
    }
}
