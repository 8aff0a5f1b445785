use std::{sync::Arc, time::Duration};

use shared::{
    domain::{ExperimentId, RunId},
    protocol::{Experiment, HealthResponse, Run},
};
use tokio::sync::broadcast;
use tracing::{info, warn};

mod context;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod form;
pub mod mutation;
pub mod polling;
pub mod selection;
pub mod stores;
pub mod view;

pub use context::RefreshOutcome;
pub use error::{FetchError, FetchErrorKind, MutationError};
pub use events::{DashboardEvent, Notice, NoticeCategory, NoticeContext};
pub use fetcher::{DataFetcher, HttpDataFetcher};
pub use form::{CreateExperimentForm, DraftError, ExperimentDraft};
pub use mutation::MutationCoordinator;
pub use polling::{PollingController, DEFAULT_POLL_INTERVAL};
pub use selection::SelectionTag;
pub use stores::RunSnapshot;

use context::SyncContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Keeps locally rendered experiment/run state in step with the server.
///
/// Dropping the client (or calling [`DashboardClient::shutdown`]) cancels
/// polling. In-flight requests are left to finish and their results are
/// discarded if the selection no longer matches.
pub struct DashboardClient {
    ctx: Arc<SyncContext>,
    polling: PollingController,
    mutations: MutationCoordinator,
}

impl DashboardClient {
    pub fn new(fetcher: Arc<dyn DataFetcher>, config: ClientConfig) -> Self {
        let ctx = Arc::new(SyncContext::new(fetcher));
        Self {
            polling: PollingController::new(config.poll_interval),
            mutations: MutationCoordinator::new(Arc::clone(&ctx)),
            ctx,
        }
    }

    pub fn connect(server_url: &str, config: ClientConfig) -> Result<Self, FetchError> {
        let fetcher = HttpDataFetcher::new(server_url)?;
        Ok(Self::new(Arc::new(fetcher), config))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DashboardEvent> {
        self.ctx.subscribe()
    }

    pub fn polling(&self) -> &PollingController {
        &self.polling
    }

    pub fn mutations(&self) -> &MutationCoordinator {
        &self.mutations
    }

    /// Replaces the experiment list with the server's. A failure leaves the
    /// previous list in place.
    pub async fn refresh_experiments(&self) -> Result<usize, FetchError> {
        match self.ctx.refresh_experiments().await {
            Ok(count) => Ok(count),
            Err(err) => {
                warn!(error = %err, "experiments: refresh failed");
                self.ctx.emit(DashboardEvent::Notice(Notice::from_mutation_error(
                    NoticeContext::LoadExperiments,
                    &MutationError::from(err.clone()),
                )));
                Err(err)
            }
        }
    }

    pub async fn experiments(&self) -> Vec<Experiment> {
        self.ctx.experiments.snapshot().await
    }

    pub async fn experiment(&self, experiment_id: ExperimentId) -> Option<Experiment> {
        self.ctx.experiments.get(experiment_id).await
    }

    pub async fn selected_experiment(&self) -> Option<ExperimentId> {
        self.ctx.selection.selected().await
    }

    /// Runs of the selected experiment as last fetched. `None` until the
    /// first fetch for the current selection lands.
    pub async fn runs(&self) -> Option<RunSnapshot> {
        self.ctx.runs.snapshot().await
    }

    /// Points polling at `experiment_id`, or stops it for `None`.
    ///
    /// Selecting a different experiment clears the run store, cancels the old
    /// timer and starts a new one with an immediate fetch. Re-selecting the
    /// current experiment keeps the timer and only fetches once.
    pub async fn select_experiment(&self, experiment_id: Option<ExperimentId>) {
        let mut selection = self.ctx.selection.write().await;
        let change = selection.select(experiment_id);

        if change.experiment_changed() {
            self.ctx.runs.clear().await;
            match change.tag {
                Some(tag) => self.polling.start(tag, Arc::clone(&self.ctx)),
                None => {
                    self.polling.stop();
                }
            }
            drop(selection);
            info!(
                previous = ?change.previous.map(|id| id.to_string()),
                current = ?change.current.map(|id| id.to_string()),
                "selection: changed"
            );
            self.ctx.emit(DashboardEvent::SelectionChanged(change.current));
            return;
        }
        drop(selection);

        if let Some(tag) = change.tag {
            let ctx = Arc::clone(&self.ctx);
            tokio::spawn(async move {
                if let Err(err) = ctx.refresh_runs(tag).await {
                    warn!(
                        experiment_id = %tag.experiment_id,
                        error = %err,
                        "selection: refresh on reselect failed"
                    );
                }
            });
        }
    }

    pub async fn form(&self) -> CreateExperimentForm {
        self.ctx.form.lock().await.clone()
    }

    pub async fn open_create_form(&self) {
        self.ctx.form.lock().await.open();
        self.ctx.emit(DashboardEvent::FormChanged { open: true });
    }

    pub async fn cancel_create_form(&self) {
        self.ctx.form.lock().await.cancel();
        self.ctx.emit(DashboardEvent::FormChanged { open: false });
    }

    pub async fn edit_draft(&self, edit: impl FnOnce(&mut ExperimentDraft)) {
        edit(self.ctx.form.lock().await.draft_mut());
    }

    pub async fn get_run(&self, run_id: RunId) -> Result<Run, FetchError> {
        self.ctx.fetcher.get_run(run_id).await
    }

    pub async fn health(&self) -> Result<HealthResponse, FetchError> {
        self.ctx.fetcher.health().await
    }

    /// Teardown of the owning view; equivalent to clearing the selection as
    /// far as polling is concerned.
    pub fn shutdown(&self) {
        self.polling.stop();
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
