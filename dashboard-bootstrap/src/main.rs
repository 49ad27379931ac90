use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use dashboard_bootstrap::commands::{self, RenderArgs};
use dashboard_bootstrap::context::AppContext;
use dashboard_bootstrap::lifecycle;
use dashboard_infrastructure::CONFIG_ENV;

#[derive(Parser, Debug)]
#[command(name = "honeydash")]
#[command(about = "Honeypot log dashboard", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Emit log records as JSON lines instead of plain text
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard over HTTP (default)
    Serve,
    /// Render one dashboard page to HTML
    Render {
        #[arg(long)]
        file: String,
        /// First day to include, YYYY-MM-DD
        #[arg(long)]
        start: Option<String>,
        /// Last day to include, YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,
        /// Trend interval, e.g. "1 hour" or 1H
        #[arg(long)]
        interval: Option<String>,
        /// Output path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print anomalous keys of one dataset as JSON
    Anomalies {
        #[arg(long)]
        file: String,
        /// Column to group by; defaults to anomaly_column from config
        #[arg(long)]
        column: Option<String>,
    },
}

fn init_logging(log_dir: Option<&PathBuf>, json: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let plain = (!json).then(|| fmt::layer().with_writer(std::io::stderr));
    let structured = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(structured);
    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "honeydash.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_plain = (!json).then(|| fmt::layer().with_ansi(false).with_writer(writer.clone()));
            let file_structured = json.then(|| fmt::layer().json().with_writer(writer));
            registry.with(file_plain).with(file_structured).init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(args.log_dir.as_ref(), args.log_json);

    if let Some(config) = args.config {
        std::env::set_var(CONFIG_ENV, config);
    }

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => lifecycle::run_standalone().await,
        Command::Render {
            file,
            start,
            end,
            interval,
            output,
        } => {
            let context = AppContext::new().await?;
            commands::render(
                &context.state,
                RenderArgs {
                    file,
                    start,
                    end,
                    interval,
                    output,
                },
            )
            .await
        }
        Command::Anomalies { file, column } => {
            let context = AppContext::new().await?;
            commands::anomalies(&context.state, file, column).await
        }
    }
}
