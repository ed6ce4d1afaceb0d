//! Fixed-position HTML panels drawn over the map
use itertools::Itertools;

use super::color::{COLOR_STOPS, OVERFLOW_COLOR, Rgb};
use crate::utils::escape_html;

/// One legend row per color band, generated from the same table the markers use
pub fn legend_html() -> String {
    let mut labels = vec![];
    let mut lower: Option<f64> = None;

    for stop in &COLOR_STOPS {
        let label = match lower {
            None => format!("&lt; {}", stop.upper),
            Some(lower) => format!("{lower}-{}", stop.upper),
        };
        labels.push((stop.fill.swatch(), label));
        lower = Some(stop.upper);
    }
    if let Some(lower) = lower {
        labels.push((OVERFLOW_COLOR, format!("&gt; {lower}")));
    }

    let rows = labels
        .iter()
        .map(|(color, label)| format!("    {}{label}", swatch(*color)))
        .join("<br>\n");

    format!(
        r#"<div class="legend" style="
    position: fixed;
    bottom: 30px; left: 30px; width: 160px;
    background: rgba(255,255,255,0.7);
    z-index:9999; font-size:13px;
    padding: 10px 14px 8px 14px; border-radius:12px;
    box-shadow: 1px 1px 6px #bbb;
">
<b style="font-size:14px;">Travel time (min)</b><br>
<div style="margin-top:8px;">
{rows}
</div>
</div>"#
    )
}

fn swatch(color: Rgb) -> String {
    format!(
        r#"<span class="swatch" style="display:inline-block; width:14px; height:14px; background:{color}; border-radius:50%; margin-right:8px; border:1px solid {color};"></span> "#
    )
}

pub fn attribution_html(text: &str) -> String {
    format!(
        r#"<div class="attribution-panel" style="
    position: fixed;
    bottom: 30px; right: 30px; width: 260px;
    background: rgba(255,255,255,0.7);
    z-index:9999; font-size:12px;
    padding: 8px 10px; border-radius:10px;
    box-shadow: 1px 1px 6px #bbb;
">
{}
</div>"#,
        escape_html(text)
    )
}
