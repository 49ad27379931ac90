// Inline SVG drawing for bar, line and pie charts

use std::f64::consts::PI;
use std::fmt::Write;

use dashboard_domain::{format_number, Chart, ChartKind};

use crate::utils::escape_html;

/// Plotly's qualitative "Vivid" sequence.
pub const VIVID: [&str; 11] = [
    "rgb(229,134,6)",
    "rgb(93,105,177)",
    "rgb(82,188,163)",
    "rgb(153,201,69)",
    "rgb(204,97,176)",
    "rgb(36,121,108)",
    "rgb(218,165,27)",
    "rgb(47,138,196)",
    "rgb(118,78,159)",
    "rgb(237,100,90)",
    "rgb(165,170,153)",
];

const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 96.0;
const MAX_X_TICKS: usize = 8;

pub fn color(index: usize) -> &'static str {
    VIVID[index % VIVID.len()]
}

pub fn render_chart(chart: &Chart) -> String {
    let (w, h) = (f64::from(chart.width), f64::from(chart.height));
    let mut svg = format!(
        "<svg class=\"chart chart-{kind}\" viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\" \
         xmlns=\"http://www.w3.org/2000/svg\" role=\"img\">\
         <title>{title}</title>\
         <text class=\"chart-title\" x=\"{tx}\" y=\"28\" text-anchor=\"middle\">{title}</text>",
        kind = chart.kind,
        title = escape_html(&chart.title),
        tx = w / 2.0,
    );
    if chart.is_empty() {
        let _ = write!(
            svg,
            "<text class=\"empty\" x=\"{}\" y=\"{}\" text-anchor=\"middle\">No data in range</text>",
            w / 2.0,
            h / 2.0
        );
    } else {
        match chart.kind {
            ChartKind::Bar => draw_bars(&mut svg, chart, w, h),
            ChartKind::Line => draw_lines(&mut svg, chart, w, h),
            ChartKind::Pie => draw_pie(&mut svg, chart, w, h),
        }
    }
    svg.push_str("</svg>");
    svg
}

/// Upper bound of the value axis, never zero.
fn axis_max(chart: &Chart) -> f64 {
    let max = chart.max_value();
    if max <= 0.0 {
        1.0
    } else {
        max * 1.1
    }
}

fn draw_axes(svg: &mut String, chart: &Chart, w: f64, h: f64, y_max: f64) {
    let bottom = h - MARGIN_BOTTOM;
    let right = w - MARGIN_RIGHT;
    let _ = write!(
        svg,
        "<line class=\"axis\" x1=\"{l}\" y1=\"{t}\" x2=\"{l}\" y2=\"{b}\" />\
         <line class=\"axis\" x1=\"{l}\" y1=\"{b}\" x2=\"{r}\" y2=\"{b}\" />",
        l = MARGIN_LEFT,
        t = MARGIN_TOP,
        b = bottom,
        r = right,
    );
    for step in 0..=4 {
        let value = y_max * f64::from(step) / 4.0;
        let y = bottom - (bottom - MARGIN_TOP) * f64::from(step) / 4.0;
        let _ = write!(
            svg,
            "<line class=\"grid\" x1=\"{l}\" y1=\"{y:.1}\" x2=\"{r}\" y2=\"{y:.1}\" />\
             <text class=\"tick\" x=\"{tx}\" y=\"{ty:.1}\" text-anchor=\"end\">{label}</text>",
            l = MARGIN_LEFT,
            r = right,
            tx = MARGIN_LEFT - 6.0,
            ty = y + 4.0,
            label = format_number(value.round()),
        );
    }
    let _ = write!(
        svg,
        "<text class=\"axis-label\" x=\"{x}\" y=\"{y}\" text-anchor=\"middle\">{xl}</text>\
         <text class=\"axis-label\" x=\"16\" y=\"{my}\" text-anchor=\"middle\" \
         transform=\"rotate(-90 16 {my})\">{yl}</text>",
        x = (MARGIN_LEFT + right) / 2.0,
        y = h - 12.0,
        my = (MARGIN_TOP + bottom) / 2.0,
        xl = escape_html(&chart.x_label),
        yl = escape_html(&chart.y_label),
    );
}

fn draw_bars(svg: &mut String, chart: &Chart, w: f64, h: f64) {
    let y_max = axis_max(chart);
    draw_axes(svg, chart, w, h, y_max);
    let Some(series) = chart.series.first() else {
        return;
    };
    let bottom = h - MARGIN_BOTTOM;
    let plot_h = bottom - MARGIN_TOP;
    let band = (w - MARGIN_LEFT - MARGIN_RIGHT) / chart.categories.len() as f64;
    let bar_w = band * 0.7;

    for (i, (category, value)) in chart.categories.iter().zip(&series.values).enumerate() {
        let bar_h = plot_h * value / y_max;
        let x = MARGIN_LEFT + band * i as f64 + (band - bar_w) / 2.0;
        let y = bottom - bar_h;
        let cx = x + bar_w / 2.0;
        let label = escape_html(category);
        let _ = write!(
            svg,
            "<rect class=\"bar\" x=\"{x:.1}\" y=\"{y:.1}\" width=\"{bar_w:.1}\" height=\"{bar_h:.1}\" \
             fill=\"{fill}\"><title>{label}: {value}</title></rect>\
             <text class=\"bar-value\" x=\"{cx:.1}\" y=\"{vy:.1}\" text-anchor=\"middle\">{value}</text>\
             <text class=\"tick\" x=\"{cx:.1}\" y=\"{ly:.1}\" text-anchor=\"end\" \
             transform=\"rotate(-35 {cx:.1} {ly:.1})\">{label}</text>",
            fill = color(i),
            value = format_number(*value),
            vy = y - 4.0,
            ly = bottom + 14.0,
        );
    }
}

fn draw_lines(svg: &mut String, chart: &Chart, w: f64, h: f64) {
    let y_max = axis_max(chart);
    draw_axes(svg, chart, w, h, y_max);
    let bottom = h - MARGIN_BOTTOM;
    let plot_w = w - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = bottom - MARGIN_TOP;
    let n = chart.categories.len();
    let x_at = |i: usize| {
        if n <= 1 {
            MARGIN_LEFT + plot_w / 2.0
        } else {
            MARGIN_LEFT + plot_w * i as f64 / (n - 1) as f64
        }
    };

    let stride = n.div_ceil(MAX_X_TICKS).max(1);
    for i in (0..n).step_by(stride) {
        let x = x_at(i);
        let _ = write!(
            svg,
            "<text class=\"tick\" x=\"{x:.1}\" y=\"{y:.1}\" text-anchor=\"end\" \
             transform=\"rotate(-35 {x:.1} {y:.1})\">{label}</text>",
            y = bottom + 14.0,
            label = escape_html(&chart.categories[i]),
        );
    }

    for (s, series) in chart.series.iter().enumerate() {
        let stroke = color(s);
        let points: Vec<(f64, f64)> = series
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| (x_at(i), bottom - plot_h * v / y_max))
            .collect();
        let path = points
            .iter()
            .map(|(x, y)| format!("{:.1},{:.1}", x, y))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = write!(
            svg,
            "<polyline class=\"line\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"2\" points=\"{path}\" />"
        );
        for ((x, y), (category, value)) in points.iter().zip(chart.categories.iter().zip(&series.values)) {
            let _ = write!(
                svg,
                "<circle class=\"marker\" cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"3.5\" fill=\"{stroke}\">\
                 <title>{name} {category}: {value}</title></circle>",
                name = escape_html(&series.name),
                category = escape_html(category),
                value = format_number(*value),
            );
        }
    }
    draw_legend(
        svg,
        chart.series.iter().map(|s| s.name.clone()).collect(),
        w - MARGIN_RIGHT - 140.0,
        MARGIN_TOP,
    );
}

fn draw_pie(svg: &mut String, chart: &Chart, w: f64, h: f64) {
    let Some(series) = chart.series.first() else {
        return;
    };
    let total = chart.total();
    let (cx, cy) = (w * 0.4, h / 2.0 + 12.0);
    let radius = (h - MARGIN_TOP * 2.0).min(w * 0.6) / 2.0;

    if total <= 0.0 {
        let _ = write!(
            svg,
            "<circle class=\"slice\" cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{radius:.1}\" fill=\"{}\" />",
            VIVID[VIVID.len() - 1]
        );
    }

    let mut angle = -PI / 2.0;
    let mut legend = Vec::with_capacity(series.values.len());
    for (i, (category, value)) in chart.categories.iter().zip(&series.values).enumerate() {
        let share = if total > 0.0 { value / total } else { 0.0 };
        legend.push(format!("{} ({:.1}%)", category, share * 100.0));
        if share <= 0.0 {
            continue;
        }
        let title = format!(
            "<title>{}: {} ({:.1}%)</title>",
            escape_html(category),
            format_number(*value),
            share * 100.0
        );
        if share >= 1.0 {
            let _ = write!(
                svg,
                "<circle class=\"slice\" cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{radius:.1}\" fill=\"{}\">{title}</circle>",
                color(i)
            );
            continue;
        }
        let sweep = share * 2.0 * PI;
        let (x1, y1) = (cx + radius * angle.cos(), cy + radius * angle.sin());
        angle += sweep;
        let (x2, y2) = (cx + radius * angle.cos(), cy + radius * angle.sin());
        let large = if sweep > PI { 1 } else { 0 };
        let _ = write!(
            svg,
            "<path class=\"slice\" d=\"M {cx:.1} {cy:.1} L {x1:.2} {y1:.2} A {radius:.1} {radius:.1} 0 {large} 1 {x2:.2} {y2:.2} Z\" \
             fill=\"{}\">{title}</path>",
            color(i)
        );
    }
    draw_legend(svg, legend, cx + radius + 32.0, MARGIN_TOP + 16.0);
}

fn draw_legend(svg: &mut String, names: Vec<String>, x: f64, y: f64) {
    for (i, name) in names.iter().enumerate() {
        let row = y + 20.0 * i as f64;
        let _ = write!(
            svg,
            "<rect class=\"legend-swatch\" x=\"{x:.1}\" y=\"{sy:.1}\" width=\"12\" height=\"12\" fill=\"{fill}\" />\
             <text class=\"legend\" x=\"{tx:.1}\" y=\"{ty:.1}\">{label}</text>",
            sy = row - 10.0,
            fill = color(i),
            tx = x + 18.0,
            ty = row,
            label = escape_html(name),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> Chart {
        Chart::new(ChartKind::Bar, "Top <IPs>", "IP Address", "Jumlah").with_points(
            "count",
            vec![("10.0.0.3".to_string(), 4.0), ("10.0.0.4".to_string(), 2.0)],
        )
    }

    #[test]
    fn bars_get_one_colour_per_category_and_value_labels() {
        let svg = render_chart(&bar());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<rect class=\"bar\"").count(), 2);
        assert!(svg.contains(VIVID[0]));
        assert!(svg.contains(VIVID[1]));
        assert!(svg.contains(">4</text>"));
        assert!(svg.contains("Top &lt;IPs&gt;"));
        assert!(!svg.contains("<IPs>"));
    }

    #[test]
    fn pie_uses_fixed_canvas_and_single_slice_circle() {
        let chart = Chart::new(ChartKind::Pie, "Login Rates", "", "")
            .with_points("count", vec![("Fail".to_string(), 7.0)]);
        let svg = render_chart(&chart);
        assert!(svg.contains("width=\"800\" height=\"600\""));
        assert!(svg.contains("<circle class=\"slice\""));
        assert!(svg.contains("Fail (100.0%)"));
    }

    #[test]
    fn line_draws_markers_per_point() {
        let chart = Chart::new(ChartKind::Line, "Trend", "Time", "Count").with_points(
            "count",
            vec![
                ("2023-04-27 10:00:00".to_string(), 1.0),
                ("2023-04-27 10:05:00".to_string(), 0.0),
                ("2023-04-27 10:10:00".to_string(), 3.0),
            ],
        );
        let svg = render_chart(&chart);
        assert_eq!(svg.matches("<circle class=\"marker\"").count(), 3);
        assert_eq!(svg.matches("<polyline").count(), 1);
    }

    #[test]
    fn empty_chart_says_so() {
        let chart = Chart::new(ChartKind::Bar, "Nothing", "", "");
        assert!(render_chart(&chart).contains("No data in range"));
    }
}
