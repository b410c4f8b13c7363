use std::process::ExitCode;

use flores_calendars::config::Config;
use flores_calendars::handler::run_workflow;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const LOG_FORMAT_ENV: &str = "FLORES_LOG_FORMAT";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let compact = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("compact"));
    let _ = if compact {
        tracing_subscriber::fmt().compact().with_env_filter(filter).with_target(false).try_init()
    } else {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .with_target(false)
            .with_ansi(false)
            .try_init()
    };
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let path = Config::locate(std::env::args().nth(1));
    let config = match Config::load(&path) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, path = %path.display(), "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    // Workflows run one after another: upstreams are hit serially and only
    // one writer ever touches the classification cache.
    let mut summaries: Vec<String> = Vec::new();
    for workflow in config.workflows.clone() {
        let config = config.clone();
        let handle = tokio::task::spawn_blocking(move || run_workflow(&config, workflow));
        match handle.await {
            Ok(summary) => {
                info!(workflow = ?workflow, summary = %summary, "Workflow finished");
                summaries.push(summary);
            }
            Err(e) => summaries.push(format!("{:?} task join error: {}", workflow, e)),
        }
    }

    let summary = if summaries.is_empty() {
        "No workflows executed".to_string()
    } else {
        summaries.join("; ")
    };
    info!(summary = %summary, "Run complete");
    ExitCode::SUCCESS
}

