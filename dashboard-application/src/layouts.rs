// Dashboard layouts
// Built-in pages for the known honeypot logs, plus file-supplied overrides

use std::collections::HashMap;

use dashboard_domain::{
    Aggregation, BucketWidth, ChartKind, Derivation, Layout, PanelSpec, PlotRequest, RowFilter,
    SeriesSplit, DEFAULT_TOP_N,
};

pub const HONEYPOT_LOG: &str = "honeypot_log_2023_04_27.csv";
pub const DIONAEA_LOG: &str = "dionaea_log_compress.csv";
pub const DIONAEA_EWS_LOG: &str = "dionaea_ews_log.csv";

const SUB_DAILY: [BucketWidth; 7] = [
    BucketWidth::FiveMinutes,
    BucketWidth::FifteenMinutes,
    BucketWidth::ThirtyMinutes,
    BucketWidth::OneHour,
    BucketWidth::ThreeHours,
    BucketWidth::SixHours,
    BucketWidth::TwelveHours,
];

const HALF_HOUR_TO_WEEK: [BucketWidth; 7] = [
    BucketWidth::ThirtyMinutes,
    BucketWidth::OneHour,
    BucketWidth::ThreeHours,
    BucketWidth::SixHours,
    BucketWidth::TwelveHours,
    BucketWidth::OneDay,
    BucketWidth::OneWeek,
];

/// Layouts keyed by dataset file name.
#[derive(Debug, Clone)]
pub struct LayoutCatalog {
    layouts: HashMap<String, Layout>,
}

impl Default for LayoutCatalog {
    fn default() -> Self {
        Self::builtin("dionaea_log_category.csv", "id")
    }
}

impl LayoutCatalog {
    /// The three honeypot pages. `mapping_file` and `join_key` feed the
    /// category join of the dionaea page.
    pub fn builtin(mapping_file: &str, join_key: &str) -> Self {
        let layouts = [
            honeypot_layout(),
            dionaea_layout(mapping_file, join_key),
            dionaea_ews_layout(),
        ]
        .into_iter()
        .map(|layout| (layout.file.clone(), layout))
        .collect();
        Self { layouts }
    }

    /// Applies `top_n` to every plot still using the stock default.
    pub fn with_default_top_n(mut self, top_n: usize) -> Self {
        for layout in self.layouts.values_mut() {
            for panel in &mut layout.panels {
                if let PanelSpec::Plot { request, .. } = panel {
                    if request.top_n == DEFAULT_TOP_N {
                        request.top_n = top_n;
                    }
                }
            }
        }
        self
    }

    /// Layouts with the same file name replace existing ones.
    pub fn with_overrides(mut self, overrides: Vec<Layout>) -> Self {
        for layout in overrides {
            self.layouts.insert(layout.file.clone(), layout);
        }
        self
    }

    pub fn get(&self, file: &str) -> Option<&Layout> {
        self.layouts.get(file)
    }

    /// Known layout for `file`, or the generic sample-plus-trend page.
    pub fn resolve(&self, file: &str) -> Layout {
        self.get(file)
            .cloned()
            .unwrap_or_else(|| generic_layout(file))
    }

    pub fn files(&self) -> Vec<String> {
        let mut files: Vec<String> = self.layouts.keys().cloned().collect();
        files.sort();
        files
    }
}

fn plot(heading: &str, request: PlotRequest) -> PanelSpec {
    PanelSpec::Plot {
        heading: heading.to_string(),
        only: None,
        request,
    }
}

fn trend(heading: &str, title: &str, split: Option<SeriesSplit>) -> PanelSpec {
    PanelSpec::Trend {
        heading: heading.to_string(),
        title: title.to_string(),
        split,
    }
}

fn honeypot_layout() -> Layout {
    let login_by_ip = |outcome: &str, heading: &str, title: &str| PanelSpec::Plot {
        heading: heading.to_string(),
        only: Some(RowFilter {
            column: "login".to_string(),
            equals: outcome.to_string(),
        }),
        request: PlotRequest::count_by("source_address", title, "IP Address", "Jumlah"),
    };

    Layout {
        file: HONEYPOT_LOG.to_string(),
        derive: Vec::new(),
        intervals: SUB_DAILY.to_vec(),
        panels: vec![
            plot(
                "Honeypot Types",
                PlotRequest::count_by(
                    "honeypot",
                    "Frequency of Honeypot Types",
                    "Honeypot Types",
                    "Frequency",
                ),
            ),
            trend(
                "Login Attempts Over Time",
                "Login Attempts Over Time",
                Some(SeriesSplit {
                    column: "login".to_string(),
                    series: vec!["Success".to_string(), "Fail".to_string()],
                }),
            ),
            plot(
                "Login Rates",
                PlotRequest::count_by("login", "Login Rates by Status", "Status Login", "Jumlah")
                    .chart(ChartKind::Pie),
            ),
            login_by_ip("Success", "Login Success by IP", "Login Success by IP"),
            login_by_ip("Fail", "Login Failed by IP", "Login Failed by IP"),
            plot(
                "Top 10 Source Address",
                PlotRequest {
                    group_by: vec!["source_address".to_string(), "target_address".to_string()],
                    aggregations: vec![Aggregation::count("target_address")],
                    rename: "target_address".to_string(),
                    ..PlotRequest::count_by(
                        "source_address",
                        "Top 10 Source Address",
                        "IP Address",
                        "Jumlah",
                    )
                },
            ),
        ],
    }
}

fn dionaea_layout(mapping_file: &str, join_key: &str) -> Layout {
    let category_pie = |column: &str, label: &str| {
        let title = format!("Rate of Login Attempts by {}", column);
        plot(
            &title,
            PlotRequest::count_by(column, title.clone(), label, "Jumlah").chart(ChartKind::Pie),
        )
    };

    Layout {
        file: DIONAEA_LOG.to_string(),
        derive: vec![Derivation::JoinMapping {
            file: mapping_file.to_string(),
            key: join_key.to_string(),
            columns: vec![
                "type".to_string(),
                "protocol".to_string(),
                "transport".to_string(),
            ],
        }],
        intervals: HALF_HOUR_TO_WEEK.to_vec(),
        panels: vec![
            plot(
                "Top 10 Source Address",
                PlotRequest::count_by("src_ip", "Top 10 Source IP Address", "IP Address", "Jumlah"),
            ),
            trend(
                "Trend of Attempts Over Time",
                "Login Attempts Over Time",
                None,
            ),
            plot(
                "Top 10 Username",
                PlotRequest::count_by("username", "Top 10 Username", "Username", "Jumlah"),
            ),
            plot(
                "Top 10 Password",
                PlotRequest::count_by("password", "Top 10 Password", "Password", "Jumlah"),
            ),
            category_pie("type", "Type"),
            category_pie("protocol", "Protocol"),
            category_pie("transport", "Transport"),
            plot(
                "Total Attempts each destination ip",
                PlotRequest::count_by(
                    "dst_ip",
                    "Total Attempts each destination ip",
                    "IP Address",
                    "Jumlah",
                ),
            ),
        ],
    }
}

fn dionaea_ews_layout() -> Layout {
    Layout {
        file: DIONAEA_EWS_LOG.to_string(),
        derive: vec![
            Derivation::AsText {
                column: "src_port".to_string(),
            },
            Derivation::AsText {
                column: "dest_port".to_string(),
            },
        ],
        intervals: HALF_HOUR_TO_WEEK.to_vec(),
        panels: vec![
            plot(
                "Total Access by Source Port",
                PlotRequest::count_by(
                    "src_port",
                    "Total Access by Source Port",
                    "Source Port",
                    "Jumlah",
                ),
            ),
            plot(
                "Total Access by Destination Port",
                PlotRequest::count_by(
                    "dest_port",
                    "Total Access by Destination Port",
                    "Destination Port",
                    "Jumlah",
                ),
            ),
            plot(
                "Total Access by Source IP",
                PlotRequest::count_by("src_ip", "Total Access by Source IP", "Source IP", "Jumlah"),
            ),
            trend("Total Access Over Time", "Total Access Over Time", None),
            PanelSpec::Anomalies {
                heading: "Anomaly Detection".to_string(),
                key_column: "src_ip".to_string(),
            },
        ],
    }
}

fn generic_layout(file: &str) -> Layout {
    Layout {
        file: file.to_string(),
        derive: Vec::new(),
        intervals: BucketWidth::ALL.to_vec(),
        panels: vec![trend("Attempts Over Time", "Attempts Over Time", None)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_pages_cover_known_files() {
        let catalog = LayoutCatalog::default();
        assert_eq!(
            catalog.files(),
            vec![DIONAEA_EWS_LOG, DIONAEA_LOG, HONEYPOT_LOG]
        );

        let honeypot = catalog.resolve(HONEYPOT_LOG);
        assert_eq!(honeypot.panels.len(), 6);
        assert_eq!(honeypot.default_interval(), BucketWidth::FiveMinutes);
        assert!(!honeypot.intervals.contains(&BucketWidth::OneDay));

        let ews = catalog.resolve(DIONAEA_EWS_LOG);
        assert_eq!(ews.default_interval(), BucketWidth::ThirtyMinutes);
        assert!(matches!(ews.panels.last(), Some(PanelSpec::Anomalies { .. })));
    }

    #[test]
    fn top_sources_group_by_both_addresses() {
        let honeypot = LayoutCatalog::default().resolve(HONEYPOT_LOG);
        let Some(PanelSpec::Plot { request, .. }) = honeypot.panels.last() else {
            panic!("expected plot panel");
        };
        assert_eq!(request.group_by, vec!["source_address", "target_address"]);
        assert_eq!(request.x, "source_address");
        assert_eq!(request.rename, "target_address");
        assert_eq!(request.aggregations, vec![Aggregation::count("target_address")]);
    }

    #[test]
    fn default_top_n_reaches_builtin_plots() {
        let catalog = LayoutCatalog::default().with_default_top_n(5);
        let layout = catalog.resolve(DIONAEA_LOG);
        let Some(PanelSpec::Plot { request, .. }) = layout.panels.first() else {
            panic!("expected plot panel");
        };
        assert_eq!(request.top_n, 5);
    }

    #[test]
    fn overrides_replace_and_unknown_files_get_generic_page() {
        let custom = Layout {
            file: HONEYPOT_LOG.to_string(),
            derive: Vec::new(),
            intervals: vec![BucketWidth::OneDay],
            panels: Vec::new(),
        };
        let catalog = LayoutCatalog::default().with_overrides(vec![custom.clone()]);
        assert_eq!(catalog.resolve(HONEYPOT_LOG), custom);

        let generic = catalog.resolve("cowrie.csv");
        assert_eq!(generic.file, "cowrie.csv");
        assert!(matches!(generic.panels.as_slice(), [PanelSpec::Trend { .. }]));
    }
}
