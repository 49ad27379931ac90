// One-shot CLI commands sharing the server's application state

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use dashboard_application::queries::{anomaly_queries, dashboard_queries};
use dashboard_application::AppState;
use dashboard_domain::{AnomalyQuery, DashboardParams, DashboardQuery};

#[derive(Debug, Clone, Default)]
pub struct RenderArgs {
    pub file: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub interval: Option<String>,
    pub output: Option<PathBuf>,
}

/// Renders one dashboard page to `output`, or stdout when unset.
pub async fn render(state: &AppState, args: RenderArgs) -> Result<()> {
    let params = DashboardParams::try_from(DashboardQuery {
        file: Some(args.file),
        start: args.start,
        end: args.end,
        interval: args.interval,
    })?;
    let html = dashboard_queries::render_dashboard_html(state, params).await?;
    match args.output {
        Some(path) => {
            fs::write(&path, &html)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), bytes = html.len(), "dashboard written");
        }
        None => write_stdout(&html).await?,
    }
    Ok(())
}

/// Prints the anomaly report for one dataset as JSON.
pub async fn anomalies(state: &AppState, file: String, column: Option<String>) -> Result<()> {
    let report = anomaly_queries::find_anomalies(
        state,
        AnomalyQuery {
            file: Some(file),
            column,
            ..Default::default()
        },
    )
    .await?;
    let json = serde_json::to_string_pretty(&report)?;
    write_stdout(&json).await
}

async fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}
