use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use crate::{
    error::FetchError,
    events::DashboardEvent,
    fetcher::DataFetcher,
    form::CreateExperimentForm,
    selection::{SelectionStore, SelectionTag},
    stores::{ExperimentStore, RunStore},
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { count: usize },
    /// The selection moved on while the fetch was in flight.
    Discarded,
}

/// State shared by the facade, the polling task and the mutation path.
pub(crate) struct SyncContext {
    pub(crate) fetcher: Arc<dyn DataFetcher>,
    pub(crate) selection: SelectionStore,
    pub(crate) experiments: ExperimentStore,
    pub(crate) runs: RunStore,
    pub(crate) form: Mutex<CreateExperimentForm>,
    events: broadcast::Sender<DashboardEvent>,
}

impl SyncContext {
    pub(crate) fn new(fetcher: Arc<dyn DataFetcher>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            fetcher,
            selection: SelectionStore::default(),
            experiments: ExperimentStore::default(),
            runs: RunStore::default(),
            form: Mutex::new(CreateExperimentForm::default()),
            events,
        }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: DashboardEvent) {
        // No receivers is fine: nothing is rendering right now.
        let _ = self.events.send(event);
    }

    pub(crate) async fn is_current(&self, tag: SelectionTag) -> bool {
        self.selection.read().await.is_current(tag)
    }

    pub(crate) async fn refresh_experiments(&self) -> Result<usize, FetchError> {
        let experiments = self.fetcher.list_experiments().await?;
        let count = experiments.len();
        self.experiments.replace(experiments).await;
        info!(count, "experiments: store replaced");
        self.emit(DashboardEvent::ExperimentsUpdated { count });
        Ok(count)
    }

    pub(crate) async fn refresh_runs(&self, tag: SelectionTag) -> Result<RefreshOutcome, FetchError> {
        let runs = self.fetcher.list_runs(tag.experiment_id).await?;
        let count = runs.len();
        if !self.runs.replace_if_current(&self.selection, tag, runs).await {
            debug!(
                experiment_id = %tag.experiment_id,
                epoch = tag.epoch,
                "runs: discarding result for stale selection"
            );
            return Ok(RefreshOutcome::Discarded);
        }
        debug!(experiment_id = %tag.experiment_id, count, "runs: store replaced");
        self.emit(DashboardEvent::RunsUpdated {
            experiment_id: tag.experiment_id,
            count,
        });
        Ok(RefreshOutcome::Applied { count })
    }
}
