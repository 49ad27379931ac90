use std::fmt::Write;

use dashboard_domain::{
    format_number, AnomalyReport, CompressionReport, Dashboard, DashboardRenderer, Panel, PanelBody,
    PreviewTable,
};

use crate::services::chart_svg::render_chart;
use crate::utils::escape_html;

/// Server-side HTML page with inline SVG charts and a GET form for the controls.
#[derive(Default)]
pub struct HtmlDashboardRenderer;

impl HtmlDashboardRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl DashboardRenderer for HtmlDashboardRenderer {
    fn render_html(&self, dashboard: &Dashboard) -> String {
        render_dashboard(dashboard)
    }
}

pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let title = escape_html(&dashboard.title);
    let file = escape_html(&dashboard.file);
    let range = match (dashboard.start, dashboard.end) {
        (Some(start), Some(end)) => format!("{} to {}", start, end),
        _ => "no timestamps".to_string(),
    };
    let notices: String = dashboard
        .notices
        .iter()
        .map(|notice| format!("<div class=\"notice\">{}</div>", escape_html(notice)))
        .collect();
    let panels: String = dashboard.panels.iter().map(render_panel).collect();
    let compression = dashboard
        .compression
        .as_ref()
        .map(render_compression)
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1" />
<title>{title} · {file}</title>
<style>
:root {{
  --bg: #0b1220;
  --card: #ffffff;
  --ink: #0f172a;
  --muted: #64748b;
  --border: #e2e8f0;
  --shadow: rgba(15, 23, 42, 0.14);
  --accent: #2563eb;
  --high: #dc2626;
}}
* {{ box-sizing: border-box; }}
body {{
  margin: 0;
  font-family: "IBM Plex Sans", "Source Sans 3", sans-serif;
  background: radial-gradient(circle at top, #1e293b 0%, #0f172a 55%, #0b1220 100%);
  color: #e2e8f0;
}}
.page {{ max-width: 1200px; margin: 0 auto; padding: 32px 20px 48px; }}
.hero {{
  background: linear-gradient(135deg, rgba(37,99,235,0.18), rgba(15,23,42,0.95));
  border-radius: 20px;
  padding: 28px;
  box-shadow: 0 18px 40px rgba(15, 23, 42, 0.35);
}}
.hero h1 {{ margin: 0 0 6px; font-size: 28px; letter-spacing: 0.01em; }}
.hero p {{ margin: 0; color: var(--muted); font-size: 14px; }}
.controls {{
  display: flex;
  flex-wrap: wrap;
  gap: 12px;
  align-items: end;
  margin-top: 18px;
}}
.controls label {{
  display: flex;
  flex-direction: column;
  gap: 4px;
  font-size: 11px;
  text-transform: uppercase;
  letter-spacing: 0.12em;
  color: var(--muted);
}}
.controls select, .controls input, .controls button {{
  border: 1px solid var(--border);
  border-radius: 10px;
  padding: 8px 10px;
  font-size: 14px;
  font-family: inherit;
}}
.controls button {{ background: var(--accent); color: white; border: none; cursor: pointer; }}
.card {{
  background: rgba(255,255,255,0.96);
  color: var(--ink);
  padding: 16px 18px;
  border-radius: 14px;
  box-shadow: 0 8px 20px rgba(15, 23, 42, 0.12);
  margin-top: 18px;
  overflow-x: auto;
}}
.card h2 {{ margin: 0 0 12px; font-size: 18px; }}
.card .label {{
  font-size: 11px;
  text-transform: uppercase;
  letter-spacing: 0.12em;
  color: var(--muted);
}}
.card.failed {{ border-left: 4px solid var(--high); }}
.card.failed p {{ color: var(--high); margin: 0; }}
.notice {{
  margin-top: 12px;
  padding: 10px 14px;
  border-radius: 10px;
  background: rgba(245, 158, 11, 0.15);
  color: #fbbf24;
  font-size: 13px;
}}
.table {{ width: 100%; border-collapse: collapse; font-size: 13px; }}
.table thead th {{
  text-align: left;
  font-size: 11px;
  letter-spacing: 0.12em;
  text-transform: uppercase;
  color: var(--muted);
  background: #f1f5f9;
  padding: 10px 12px;
}}
.table tbody td {{ padding: 8px 12px; border-bottom: 1px solid var(--border); }}
.table tbody tr:nth-child(even) {{ background: #f8fafc; }}
.table .count {{ text-align: right; font-variant-numeric: tabular-nums; }}
.chart text {{ font-size: 12px; fill: #334155; }}
.chart .chart-title {{ font-size: 16px; font-weight: 600; fill: var(--ink); }}
.chart .axis {{ stroke: #94a3b8; }}
.chart .grid {{ stroke: #e2e8f0; }}
.chart .slice {{ stroke: #ffffff; stroke-width: 1; }}
.empty {{ color: var(--muted); }}
.footer {{ margin-top: 16px; color: var(--muted); font-size: 12px; }}
</style>
</head>
<body>
<div class="page">
  <section class="hero">
    <h1>{title}</h1>
    <p>{file} · {range} · {rows} rows in range</p>
    <form class="controls" method="get" action="/">
      <label>Dataset{file_select}</label>
      {date_inputs}
      <label>Interval{interval_select}</label>
      <button type="submit">Apply</button>
    </form>
  </section>
  {notices}
  <section class="card">
    <h2>Sample Data</h2>
    {sample}
  </section>
  {panels}
  {compression}
  <div class="footer">Anomalies are keys whose count exceeds mean + 2 standard deviations.</div>
</div>
</body>
</html>
"#,
        title = title,
        file = file,
        range = escape_html(&range),
        rows = dashboard.total_rows,
        file_select = render_file_select(dashboard),
        date_inputs = render_date_inputs(dashboard),
        interval_select = render_interval_select(dashboard),
        notices = notices,
        sample = render_table(&dashboard.sample),
        panels = panels,
        compression = compression,
    )
}

fn render_file_select(dashboard: &Dashboard) -> String {
    let mut out = String::from("<select name=\"file\">");
    for name in &dashboard.datasets {
        let selected = if *name == dashboard.file { " selected" } else { "" };
        let name = escape_html(name);
        let _ = write!(out, "<option value=\"{name}\"{selected}>{name}</option>");
    }
    out.push_str("</select>");
    out
}

fn render_date_inputs(dashboard: &Dashboard) -> String {
    let Some(bounds) = &dashboard.bounds else {
        return String::new();
    };
    let start = dashboard.start.unwrap_or(bounds.min);
    let end = dashboard.end.unwrap_or(bounds.max);
    format!(
        "<label>Start date<input type=\"date\" name=\"start\" value=\"{start}\" min=\"{min}\" max=\"{max}\" /></label>\
         <label>End date<input type=\"date\" name=\"end\" value=\"{end}\" min=\"{min}\" max=\"{max}\" /></label>",
        min = bounds.min,
        max = bounds.max,
    )
}

fn render_interval_select(dashboard: &Dashboard) -> String {
    let mut out = String::from("<select name=\"interval\">");
    for width in &dashboard.intervals {
        let selected = if *width == dashboard.interval { " selected" } else { "" };
        let _ = write!(
            out,
            "<option value=\"{}\"{}>{}</option>",
            width.code(),
            selected,
            width.label()
        );
    }
    out.push_str("</select>");
    out
}

fn render_table(table: &PreviewTable) -> String {
    if table.columns.is_empty() {
        return "<p class=\"empty\">No columns.</p>".to_string();
    }
    let mut out = String::from("<table class=\"table\"><thead><tr>");
    for column in &table.columns {
        let _ = write!(out, "<th>{}</th>", escape_html(column));
    }
    out.push_str("</tr></thead><tbody>");
    for row in &table.rows {
        out.push_str("<tr>");
        for cell in row {
            let _ = write!(out, "<td>{}</td>", escape_html(cell));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    if table.rows.is_empty() {
        out.push_str("<p class=\"empty\">No rows in the selected range.</p>");
    }
    out
}

fn render_panel(panel: &Panel) -> String {
    let heading = escape_html(&panel.heading);
    match &panel.body {
        PanelBody::Chart(chart) => format!(
            "<section class=\"card panel\"><h2>{}</h2>{}</section>",
            heading,
            render_chart(chart)
        ),
        PanelBody::Anomalies(report) => format!(
            "<section class=\"card panel\"><h2>{}</h2>{}</section>",
            heading,
            render_anomalies(report)
        ),
        PanelBody::Failed { message } => format!(
            "<section class=\"card panel failed\"><h2>{}</h2><p>{}</p></section>",
            heading,
            escape_html(message)
        ),
    }
}

fn render_anomalies(report: &AnomalyReport) -> String {
    let stat = |value: Option<f64>| value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "n/a".to_string());
    let mut out = format!(
        "<p class=\"label\">{} keys · mean {} · stddev {} · threshold {}</p>",
        report.keys_considered,
        stat(report.mean),
        stat(report.stddev),
        stat(report.threshold),
    );
    if report.flagged.is_empty() {
        out.push_str("<p class=\"empty\">No anomalies detected.</p>");
        return out;
    }
    let _ = write!(
        out,
        "<table class=\"table\"><thead><tr><th>{}</th><th class=\"count\">Count</th></tr></thead><tbody>",
        escape_html(&report.key_column)
    );
    for flagged in &report.flagged {
        let _ = write!(
            out,
            "<tr><td>{}</td><td class=\"count\">{}</td></tr>",
            escape_html(&flagged.key),
            format_number(flagged.count)
        );
    }
    out.push_str("</tbody></table>");
    out
}

fn render_compression(report: &CompressionReport) -> String {
    let mut out = format!(
        "<section class=\"card\"><h2>Memory</h2><p class=\"label\">{} bytes before · {} bytes after</p>",
        report.bytes_before, report.bytes_after
    );
    if !report.downcasts.is_empty() || !report.dates_converted.is_empty() {
        out.push_str("<table class=\"table\"><thead><tr><th>Column</th><th>From</th><th>To</th></tr></thead><tbody>");
        for downcast in &report.downcasts {
            let _ = write!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&downcast.column),
                downcast.from,
                downcast.to
            );
        }
        for column in &report.dates_converted {
            let _ = write!(
                out,
                "<tr><td>{}</td><td>text</td><td>datetime</td></tr>",
                escape_html(column)
            );
        }
        out.push_str("</tbody></table>");
    }
    out.push_str("</section>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_domain::{BucketWidth, Chart, ChartKind, DateBounds, FlaggedKey};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
    }

    fn dashboard() -> Dashboard {
        Dashboard {
            title: "Network Analysis Dashboard".to_string(),
            file: "honeypot_log_2023_04_27.csv".to_string(),
            datasets: vec![
                "dionaea_ews_log.csv".to_string(),
                "honeypot_log_2023_04_27.csv".to_string(),
            ],
            bounds: Some(DateBounds {
                min: date("2023-04-27"),
                max: date("2023-04-28"),
            }),
            start: Some(date("2023-04-27")),
            end: Some(date("2023-04-28")),
            interval: BucketWidth::OneHour,
            intervals: vec![BucketWidth::FiveMinutes, BucketWidth::OneHour],
            total_rows: 10,
            sample: PreviewTable {
                columns: vec!["src_ip".to_string(), "login".to_string()],
                rows: vec![vec!["<b>1.1.1.1</b>".to_string(), "Fail".to_string()]],
            },
            compression: Some(CompressionReport::default()),
            notices: vec!["category mapping unavailable".to_string()],
            panels: vec![
                Panel {
                    heading: "Login Rates".to_string(),
                    body: PanelBody::Chart(
                        Chart::new(ChartKind::Pie, "Login Rates", "", "").with_points(
                            "count",
                            vec![("Fail".to_string(), 7.0), ("Success".to_string(), 3.0)],
                        ),
                    ),
                },
                Panel {
                    heading: "Anomalies".to_string(),
                    body: PanelBody::Anomalies(AnomalyReport {
                        key_column: "src_ip".to_string(),
                        keys_considered: 10,
                        mean: Some(10.9),
                        stddev: Some(31.3),
                        threshold: Some(73.5),
                        flagged: vec![FlaggedKey {
                            key: "9.9.9.9".to_string(),
                            count: 100.0,
                        }],
                    }),
                },
                Panel {
                    heading: "Top Ports".to_string(),
                    body: PanelBody::Failed {
                        message: "column not found: dest_port".to_string(),
                    },
                },
            ],
        }
    }

    #[test]
    fn page_carries_controls_panels_and_notices() {
        let html = HtmlDashboardRenderer::new().render_html(&dashboard());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Network Analysis Dashboard</h1>"));
        assert!(html.contains(
            "<option value=\"honeypot_log_2023_04_27.csv\" selected>honeypot_log_2023_04_27.csv</option>"
        ));
        assert!(html.contains("<option value=\"1H\" selected>1 hour</option>"));
        assert!(html.contains("name=\"start\" value=\"2023-04-27\""));
        assert!(html.contains("category mapping unavailable"));
        assert_eq!(html.matches("<svg").count(), 1);
        assert!(html.contains("9.9.9.9"));
        assert!(html.contains("card panel failed"));
        assert!(html.contains("column not found: dest_port"));
    }

    #[test]
    fn cell_text_is_escaped() {
        let html = render_dashboard(&dashboard());
        assert!(html.contains("&lt;b&gt;1.1.1.1&lt;/b&gt;"));
        assert!(!html.contains("<b>1.1.1.1</b>"));
    }

    #[test]
    fn no_bounds_hides_date_inputs() {
        let mut page = dashboard();
        page.bounds = None;
        page.start = None;
        page.end = None;
        let html = render_dashboard(&page);
        assert!(!html.contains("name=\"start\""));
        assert!(html.contains("no timestamps"));
    }
}
