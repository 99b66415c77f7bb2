use crate::models::{DateWindow, Mode};
use crate::table::escape_html;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Stats,
    Rankings,
}

impl PageKind {
    fn results_id(self) -> &'static str {
        match self {
            PageKind::Stats => "results",
            PageKind::Rankings => "rankingResults",
        }
    }

    fn form_id(self) -> &'static str {
        match self {
            PageKind::Stats => "searchForm",
            PageKind::Rankings => "rankingForm",
        }
    }
}

/// Everything the page shell needs; `results` is already rendered HTML.
pub struct PageView<'a> {
    pub kind: PageKind,
    pub mode: Mode,
    pub window: &'a DateWindow,
    pub nickname: &'a str,
    pub board_slug: Option<&'a str>,
    /// Path prefix of the board pages, empty for the unscoped ones.
    pub base_path: &'a str,
    pub results: &'a str,
}

pub fn render_page(view: &PageView<'_>) -> String {
    let (title, subtitle) = match view.kind {
        PageKind::Stats => (
            "Betting stats",
            "Look up a nickname's betting record per month or per day.",
        ),
        PageKind::Rankings => ("Betting rankings", "Top bettors for a month or a single day."),
    };
    let board = view
        .board_slug
        .map(|slug| format!("<span class=\"board\">Board: {}</span>", escape_html(slug)))
        .unwrap_or_default();

    let nav = render_nav(view);
    let fields = render_fields(view);
    fill_template(
        PAGE_HTML,
        &[
            ("TITLE", title),
            ("SUBTITLE", subtitle),
            ("BOARD", board.as_str()),
            ("NAV", nav.as_str()),
            ("FORM_ID", view.kind.form_id()),
            ("FIELDS", fields.as_str()),
            ("RESULTS_ID", view.kind.results_id()),
            ("RESULTS", view.results),
        ],
    )
}

/// Substitutes `{{KEY}}` placeholders in one pass, so inserted values are
/// never scanned for placeholders themselves.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };
        let key = &after[..close];
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..open + close + 4]),
        }
        rest = &after[close + 2..];
    }
    out.push_str(rest);
    out
}

fn render_nav(view: &PageView<'_>) -> String {
    let base = escape_html(view.base_path);
    let stats_href = if base.is_empty() { "/".to_string() } else { base.clone() };
    let (stats_class, rankings_class) = match view.kind {
        PageKind::Stats => ("tab active", "tab"),
        PageKind::Rankings => ("tab", "tab active"),
    };
    format!(
        "<a class=\"{stats_class}\" href=\"{stats_href}\">Stats</a>\
         <a class=\"{rankings_class}\" href=\"{base}/rankings\">Rankings</a>"
    )
}

fn render_fields(view: &PageView<'_>) -> String {
    let input_type = view.window.granularity().input_type();
    let mut html = String::from("<select name=\"select\">");
    for mode in [Mode::MonthlyBetting, Mode::DailyBetting] {
        let selected = if mode == view.mode { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{}\"{selected}>{}</option>",
            mode.value(),
            mode.label()
        ));
    }
    html.push_str("</select>");

    html.push_str(&format!(
        "<input id=\"startDate\" name=\"startDate\" type=\"{input_type}\" value=\"{}\" />",
        escape_html(&view.window.start_value())
    ));
    if view.kind == PageKind::Stats {
        html.push_str(&format!(
            "<input id=\"endDate\" name=\"endDate\" type=\"{input_type}\" value=\"{}\" />",
            escape_html(&view.window.end_value())
        ));
        html.push_str(&format!(
            "<input id=\"nickname\" name=\"nickname\" type=\"text\" placeholder=\"Nickname\" value=\"{}\" />",
            escape_html(view.nickname)
        ));
    }
    html.push_str("<input type=\"hidden\" name=\"reset\" value=\"\" />");
    html.push_str("<button id=\"searchBtn\" type=\"submit\">Search</button>");
    html
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      flex-direction: column;
      gap: 6px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    .subtitle {
      margin: 0;
      color: #5f5c57;
    }

    .board {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    nav {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
      width: fit-content;
    }

    .tab {
      border-radius: 999px;
      padding: 8px 14px;
      font-weight: 600;
      color: #6b645d;
      text-decoration: none;
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
    }

    form {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
    }

    select,
    input {
      border: 1px solid rgba(47, 72, 88, 0.2);
      border-radius: 12px;
      padding: 10px 12px;
      font: inherit;
      background: white;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 10px 22px;
      font: inherit;
      font-weight: 600;
      color: white;
      background: var(--accent);
      cursor: pointer;
    }

    table {
      width: 100%;
      border-collapse: collapse;
      background: white;
      border-radius: 16px;
      overflow: hidden;
    }

    th,
    td {
      padding: 10px 12px;
      text-align: right;
      border-bottom: 1px solid rgba(47, 72, 88, 0.08);
    }

    th:first-child,
    td:first-child,
    td:nth-child(2) {
      text-align: left;
    }

    th {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.08em;
      color: #8b857d;
    }

    @media (max-width: 600px) {
      .app {
        padding: 28px 22px;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>{{TITLE}}</h1>
      <p class="subtitle">{{SUBTITLE}}</p>
      {{BOARD}}
    </header>

    <nav>{{NAV}}</nav>

    <form id="{{FORM_ID}}" method="get" action="">{{FIELDS}}</form>

    <section id="{{RESULTS_ID}}">{{RESULTS}}</section>
  </main>

  <script>
    // Mode changes reload the page with that mode's default window.
    const form = document.getElementById('{{FORM_ID}}');
    const select = form.querySelector('select[name=select]');
    select.addEventListener('change', () => {
      form.elements.reset.value = '1';
      form.submit();
    });
  </script>
</body>
</html>
"#;
