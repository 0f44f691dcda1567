mod cli;
mod logging;
mod ui;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Command};
use jobwatch::config::JobwatchConfig;
use jobwatch::power::{read_power_state, reset_host};
use jobwatch::remote::RestClient;
use jobwatch::tracking::{TrackingReport, track_job, wait_until_responsive};
use ui::Progress;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => JobwatchConfig::load_from(path)?,
        None => JobwatchConfig::load()?,
    };
    logging::init(if cli.verbose { "debug" } else { config.log_level.as_str() });
    config.validate().context("invalid configuration")?;

    let client = RestClient::new(
        config.base_url.clone(),
        config.username.clone(),
        config.password.clone(),
        config.validate_certs,
        config.timeout(),
    )
    .context("failed to build HTTP client")?;

    let succeeded = match cli.command {
        Command::Track {
            uri,
            dialect,
            max_wait,
            poll_interval,
        } => {
            let mut policy = config.polling_policy();
            if let Some(secs) = max_wait {
                policy.max_wait = Duration::from_secs(secs);
            }
            if let Some(secs) = poll_interval {
                policy.poll_interval = Duration::from_secs(secs);
            }

            let started_at = Utc::now();
            let progress = Progress::start(&format!("Tracking {uri}"));
            let result = track_job(&client, &uri, &dialect.classification(), &policy).await;
            progress.finish_tracking(&result);
            if cli.verbose {
                progress.print_report(&TrackingReport::from_result(&uri, &result, started_at));
            }
            !result.failed
        }
        Command::ResetHost {
            reset_type,
            system,
            power,
        } => {
            let power_uri = power.unwrap_or_else(|| system.clone());
            let progress = Progress::start(&format!("{reset_type} on {system}"));
            let outcome = reset_host(
                &client,
                reset_type.as_str(),
                &system,
                &power_uri,
                config.power_policy(),
            )
            .await;
            progress.finish_reset(&outcome);
            outcome.success
        }
        Command::PowerState { power } => {
            let state = read_power_state(&client, &power)
                .await
                .with_context(|| format!("failed to read power state from {power}"))?;
            ui::print_power_state(state);
            true
        }
        Command::WaitReady { uri } => {
            let progress = Progress::start(&format!("Waiting for {uri}"));
            let waited = wait_until_responsive(&client, &uri, &config.polling_policy()).await;
            progress.finish_wait(waited);
            waited.is_some()
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
