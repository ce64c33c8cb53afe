use std::fmt::{Display, Write};

use crate::config::settings::Settings;

use super::layout::{Bar, BarStyle, ChartLayout};

/// Shown in place of a count while the pointer is outside of the chart.
pub const HOVER_PLACEHOLDER: &str = "—";

/// Self-contained piece of page: markup, styling and the interaction script. Appended to the
/// end of the host page body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFragment {
    pub markup: String,
    pub style: String,
    pub script: String,
}

impl Display for DisplayFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n<style>{}</style>\n<script>{}</script>\n",
            self.markup, self.style, self.script
        )
    }
}

fn bar_classes(style: BarStyle) -> String {
    let mut classes = String::from("rb-bar");
    if style.is_goal_met() {
        classes.push_str(" rb-goalmet");
    }
    if style.is_today() {
        classes.push_str(" rb-today");
    }
    classes
}

fn bar_markup(bar: &Bar) -> String {
    format!(
        "<div class='{}' data-date='{}' data-count='{}' style='height:{}px;'></div>",
        bar_classes(bar.style),
        bar.date.format("%Y-%m-%d"),
        bar.count,
        bar.height_px,
    )
}

/// Turns a computed layout into text. No numbers are derived here apart from formatting.
pub fn serialize(layout: &ChartLayout, settings: &Settings) -> DisplayFragment {
    DisplayFragment {
        markup: markup(layout),
        style: style(layout, settings),
        script: script(layout, settings),
    }
}

fn markup(layout: &ChartLayout) -> String {
    let height = layout.chart_height_px;

    let goal = layout
        .goal_line
        .as_ref()
        .map(|goal| {
            format!(
                "<div class='rb-goal' style='bottom:{}%;'><span>{}</span></div>",
                *goal.bottom, goal.value
            )
        })
        .unwrap_or_default();

    let bars = layout.bars.iter().fold(String::new(), |mut out, bar| {
        let _ = write!(out, "{}", bar_markup(bar));
        out
    });

    format!(
        r#"
<div id="rb-container">
  <div id="rb-head">
    <div id="rb-title">{title}</div>
    <div id="rb-hover-val">{HOVER_PLACEHOLDER}</div>
  </div>

  <div id="rb-chartwrap" style="height:{height}px;">
    <div class="rb-tick rb-t0"><span>0</span></div>
    <div class="rb-tick rb-t50"><span>{mid}</span></div>
    <div class="rb-tick rb-t100"><span>{max}</span></div>

    {goal}

    <div id="rb-chart" style="height:{height}px;">
      {bars}
    </div>
  </div>
</div>
"#,
        title = layout.title(),
        mid = layout.mid_tick,
        max = layout.scale_max,
    )
}

fn style(layout: &ChartLayout, s: &Settings) -> String {
    format!(
        r#"
  #rb-container {{
    margin: 14px auto;
    padding: 14px 16px;
    border: 1px solid {container_border};
    border-radius: 12px;
    max-width: 1200px;
  }}

  #rb-head {{
    display: flex;
    align-items: baseline;
    justify-content: space-between;
    gap: 12px;
    margin-bottom: 10px;
  }}

  #rb-title {{
    font-size: 14px;
    font-weight: 600;
    opacity: 0.95;
  }}

  #rb-hover-val {{
    font-size: 12px;
    opacity: 0.7;
    white-space: nowrap;
    font-weight: 600;
  }}

  #rb-chartwrap {{
    --rb-chart-w: {width_vw}vw;
    --rb-bar-w: {bar_w}px;
    --rb-gap: {gap}px;

    position: relative;
    display: flex;
    justify-content: center;
  }}

  #rb-chart {{
    width: var(--rb-chart-w);
    max-width: {max_w}px;
    min-width: {min_w}px;

    display: flex;
    align-items: flex-end;
    justify-content: center;
    position: relative;
    overflow: hidden;

    padding-left: {pad_left}px;
  }}

  .rb-tick {{
    position: absolute;
    left: 0;
    width: 100%;
    border-top: 1px dashed {tick};
    pointer-events: none;
  }}

  .rb-tick span {{
    position: absolute;
    left: 0;
    top: -9px;
    font-size: 11px;
    opacity: 0.6;
  }}

  .rb-t0   {{ bottom: 0; }}
  .rb-t50  {{ bottom: 50%; }}
  .rb-t100 {{ bottom: 100%; }}

  .rb-goal {{
    position: absolute;
    left: 0;
    width: 100%;
    border-top: 2px solid {goal_line};
    pointer-events: none;
  }}
  .rb-goal span {{
    position: absolute;
    left: 42px;
    top: -18px;
    font-size: 11px;
    font-weight: 600;
    opacity: {goal_label_opacity};
  }}

  .rb-bar {{
    display: block;
    width: var(--rb-bar-w);
    margin-right: var(--rb-gap);
    background: {bar};
    border-radius: 3px;
  }}

  #rb-chart .rb-bar:last-child {{
    margin-right: 0;
  }}

  .rb-today {{
    background: {today_bar};
    outline: 1px solid {today_outline};
  }}

  .rb-goalmet {{
    background: {goal_met_bar};
    outline: 1px solid {goal_met_outline};
  }}

  .rb-today.rb-goalmet {{
    background: {today_goal_bar};
    outline: 2px solid {today_goal_outline};
  }}
"#,
        container_border = s.container_border_rgba,
        width_vw = s.chart_width_vw,
        bar_w = layout.bar_width_px,
        gap = s.bar_gap_px,
        max_w = s.chart_max_width_px,
        min_w = s.chart_min_width_px,
        pad_left = s.tick_label_padding_left_px,
        tick = s.tick_rgba,
        goal_line = s.goal_line_rgba,
        goal_label_opacity = s.goal_label_opacity,
        bar = s.bar_rgba,
        today_bar = s.today_bar_rgba,
        today_outline = s.today_outline_rgba,
        goal_met_bar = s.goal_met_bar_rgba,
        goal_met_outline = s.goal_met_outline_rgba,
        today_goal_bar = s.today_goal_bar_rgba,
        today_goal_outline = s.today_goal_outline_rgba,
    )
}

fn script(layout: &ChartLayout, s: &Settings) -> String {
    format!(
        r#"
(function() {{
  const root = document.getElementById("rb-container");
  const out = document.getElementById("rb-hover-val");
  if (!root || !out) return;

  root.addEventListener("mousemove", (e) => {{
    const t = e.target;
    if (!t || !t.classList || !t.classList.contains("rb-bar")) return;
    out.textContent = t.getAttribute("data-count") || "";
  }});

  root.addEventListener("mouseleave", () => {{
    out.textContent = "{HOVER_PLACEHOLDER}";
  }});
}})();

(function() {{
  const wrap = document.getElementById("rb-chartwrap");
  const chart = document.getElementById("rb-chart");
  if (!wrap || !chart) return;

  function recompute() {{
    const w = chart.clientWidth;
    const n = {bars};
    const gap = {gap};
    const totalGap = gap * (n - 1);

    let bar = Math.floor(Math.max(0, w - totalGap) / n);
    bar = Math.max({bar_min}, Math.min({bar_max}, bar));

    wrap.style.setProperty("--rb-bar-w", bar + "px");
    wrap.style.setProperty("--rb-gap", gap + "px");
  }}

  recompute();
  window.addEventListener("resize", recompute);
}})();
"#,
        bars = layout.bars.len().max(1),
        gap = s.bar_gap_px,
        bar_min = s.bar_min_px,
        bar_max = s.bar_max_px,
    )
}
