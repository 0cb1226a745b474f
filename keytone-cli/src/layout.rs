//! Generate an HTML/SVG picture of the keypad: each key's legend plus
//! what pressing it does.

use keytone_core::{action_for, Action, BuzzerAction, LedState, COLS, KEYPAD, ROWS};

/// Key unit size in SVG pixels.
const U: f64 = 64.0;
/// Gap between keys.
const GAP: f64 = 10.0;
/// Step: key + gap.
const S: f64 = U + GAP;
/// Key corner radius.
const R: f64 = 8.0;
/// Margin around the keypad body.
const MARGIN: f64 = 20.0;
/// Space above the keys for the title.
const TITLE_H: f64 = 36.0;

/// Short description and CSS class for a key's action.
fn describe(action: &Action) -> (&'static str, &'static str) {
    match (action.leds, action.buzzer) {
        (_, BuzzerAction::Melody) => ("melody", "melody"),
        (_, BuzzerAction::Beep { .. }) => ("red+beep", "beep"),
        (Some(LedState::RED), _) => ("red", "red"),
        (Some(LedState::GREEN), _) => ("green", "green"),
        (Some(LedState::BLUE), _) => ("blue", "blue"),
        (Some(LedState::ALL), _) => ("all", "all"),
        _ => ("off", "idle"),
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render the key grid as an SVG group.
fn render_keys() -> String {
    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<g transform="translate({MARGIN}, {})">"#,
        MARGIN + TITLE_H
    ));

    for (row, keys) in KEYPAD.rows().iter().enumerate() {
        for (col, &key) in keys.iter().enumerate() {
            let (label, class) = describe(&action_for(Some(key)));
            let x = col as f64 * S;
            let y = row as f64 * S;

            svg.push_str(&format!(
                r#"<rect x="{x}" y="{y}" width="{U}" height="{U}" rx="{R}" class="key {class}"/>"#
            ));
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" class="legend">{}</text>"#,
                x + U / 2.0,
                y + U / 2.0 - 6.0,
                html_escape(&key.to_string()),
            ));
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" class="action">{}</text>"#,
                x + U / 2.0,
                y + U - 12.0,
                label,
            ));
        }
    }

    svg.push_str("</g>");
    svg
}

/// Generate the complete HTML document with inline SVG.
pub fn generate_html() -> String {
    let grid_w = COLS as f64 * S - GAP;
    let grid_h = ROWS as f64 * S - GAP;
    let total_width = grid_w + 2.0 * MARGIN;
    let total_height = grid_h + TITLE_H + 2.0 * MARGIN;

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Keypad Layout</title>
<style>
  body {{
    background: #1a1a2e;
    color: #eee;
    font-family: system-ui, -apple-system, sans-serif;
    display: flex;
    justify-content: center;
    padding: 2em;
  }}
  .body {{
    fill: #0d1117;
    stroke: #30365e;
    stroke-width: 2;
  }}
  .key {{
    fill: #16213e;
    stroke: #0f3460;
    stroke-width: 1.5;
  }}
  .key:hover {{
    stroke: #e94560;
  }}
  .key.red {{ stroke: #e94560; stroke-width: 2.5; }}
  .key.green {{ stroke: #3fb950; stroke-width: 2.5; }}
  .key.blue {{ stroke: #58a6ff; stroke-width: 2.5; }}
  .key.all {{ stroke: #f0f6fc; stroke-width: 2.5; }}
  .key.beep {{ fill: #2d1b4e; stroke: #e94560; stroke-width: 2.5; }}
  .key.melody {{ fill: #2d1b4e; stroke: #d2a8ff; stroke-width: 2.5; }}
  .key.idle {{ stroke-dasharray: 3 3; }}
  .legend {{
    fill: #eee;
    font-family: "JetBrains Mono", "Fira Code", monospace;
    font-size: 22px;
    text-anchor: middle;
    dominant-baseline: middle;
    pointer-events: none;
  }}
  .action {{
    fill: #8b949e;
    font-size: 10px;
    text-anchor: middle;
    pointer-events: none;
  }}
  .title {{
    fill: #e94560;
    font-size: 16px;
    font-weight: bold;
  }}
</style>
</head>
<body>
<svg width="{total_width}" height="{total_height}" xmlns="http://www.w3.org/2000/svg">
<rect x="1" y="1" width="{}" height="{}" rx="{R}" class="body"/>
<text x="{MARGIN}" y="{}" class="title">4x4 Keypad</text>
"#,
        total_width - 2.0,
        total_height - 2.0,
        MARGIN + TITLE_H / 2.0,
    );

    html.push_str(&render_keys());
    html.push_str("\n</svg>\n</body>\n</html>\n");
    html
}
