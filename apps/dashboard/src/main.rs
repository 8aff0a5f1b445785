use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    fetcher::report_url, ClientConfig, DashboardClient, DashboardEvent, ExperimentDraft,
    HttpDataFetcher,
};
use shared::domain::{ExperimentId, RunId};
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    StreamExt,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

mod config;
mod render;

#[derive(Parser, Debug)]
#[command(name = "bench-dashboard", about = "Terminal view of vector search benchmark runs")]
struct Args {
    /// Benchmark API base URL.
    #[arg(long)]
    server_url: Option<String>,
    /// Seconds between run refreshes while watching.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List experiments.
    Experiments,
    /// Create an experiment with the default vector and optimizer settings.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        dataset_id: String,
        #[arg(long)]
        connection_id: String,
    },
    /// Start a run and show the experiment's runs afterwards.
    Trigger { experiment_id: ExperimentId },
    /// Follow an experiment's runs until interrupted.
    Watch {
        experiment_id: ExperimentId,
        /// Trigger a run before watching.
        #[arg(long)]
        trigger: bool,
    },
    /// Show a single run.
    Run { run_id: RunId },
    /// Print the report link for an experiment.
    ReportUrl { experiment_id: ExperimentId },
    /// Check the server health endpoint.
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings();
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(secs) = args.poll_interval_secs {
        settings.poll_interval_secs = secs;
    }

    let fetcher = HttpDataFetcher::new(&settings.server_url)
        .with_context(|| format!("invalid server url '{}'", settings.server_url))?;
    let base_url = fetcher.base_url().clone();
    info!(server_url = %base_url, poll_interval_secs = settings.poll_interval_secs, "dashboard: starting");

    let client = DashboardClient::new(
        Arc::new(fetcher),
        ClientConfig {
            poll_interval: settings.poll_interval(),
        },
    );

    let result = run_command(&client, &base_url, args.command).await;
    client.shutdown();
    result
}

async fn run_command(client: &DashboardClient, base_url: &Url, command: Command) -> Result<()> {
    match command {
        Command::Experiments => {
            client
                .refresh_experiments()
                .await
                .context("failed to load experiments")?;
            print!("{}", render::experiments_table(&client.experiments().await));
        }
        Command::Create {
            name,
            dataset_id,
            connection_id,
        } => {
            client.open_create_form().await;
            client
                .edit_draft(|draft| *draft = ExperimentDraft::new(name, dataset_id, connection_id))
                .await;
            let created = client
                .mutations()
                .create_experiment()
                .await
                .context("failed to create experiment")?;
            println!("created experiment {} ({})", created.name, created.id);
            print!("{}", render::experiments_table(&client.experiments().await));
        }
        Command::Trigger { experiment_id } => {
            client.select_experiment(Some(experiment_id)).await;
            let run = client
                .mutations()
                .trigger_run(experiment_id)
                .await
                .context("failed to trigger run")?;
            println!("triggered run {} ({})", run.id, run.status);
            print!("{}", render::runs_table(client.runs().await.as_ref()));
        }
        Command::Watch {
            experiment_id,
            trigger,
        } => watch(client, experiment_id, trigger).await?,
        Command::Run { run_id } => {
            let run = client
                .get_run(run_id)
                .await
                .with_context(|| format!("failed to load run {run_id}"))?;
            print!("{}", render::run_details(&run));
        }
        Command::ReportUrl { experiment_id } => {
            println!("{}", report_url(base_url, experiment_id));
        }
        Command::Health => {
            let health = client.health().await.context("health check failed")?;
            if !health.is_ok() {
                bail!("server reported status '{}'", health.status);
            }
            println!("server is healthy");
        }
    }
    Ok(())
}

async fn watch(client: &DashboardClient, experiment_id: ExperimentId, trigger: bool) -> Result<()> {
    let mut events = BroadcastStream::new(client.subscribe_events());

    client.select_experiment(Some(experiment_id)).await;
    if trigger {
        // Failure surfaces as a Notice on the stream below.
        let _ = client.mutations().trigger_run(experiment_id).await;
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                signal.context("failed to listen for ctrl-c")?;
                info!(experiment_id = %experiment_id, "watch: interrupted");
                break;
            }
            event = events.next() => match event {
                Some(Ok(DashboardEvent::RunsUpdated { experiment_id: updated, .. })) if updated == experiment_id => {
                    print!("{}", render::runs_table(client.runs().await.as_ref()));
                }
                Some(Ok(DashboardEvent::PollFailed { kind, message, .. })) => {
                    warn!(experiment_id = %experiment_id, ?kind, %message, "watch: refresh failed; showing last good runs");
                }
                Some(Ok(DashboardEvent::RunTriggered(run))) => {
                    println!("triggered run {} ({})", run.id, run.status);
                }
                Some(Ok(DashboardEvent::Notice(notice))) => eprintln!("{}", notice.message),
                Some(Ok(_)) => {}
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    warn!(skipped, "watch: event stream lagged");
                }
                None => break,
            }
        }
    }

    client.shutdown();
    Ok(())
}
