//! Last-fetched server state. Both stores are replaced wholesale, never merged.

use shared::{
    domain::ExperimentId,
    protocol::{Experiment, Run},
};
use tokio::sync::RwLock;

use crate::selection::{SelectionStore, SelectionTag};

#[derive(Debug, Default)]
pub struct ExperimentStore {
    experiments: RwLock<Option<Vec<Experiment>>>,
}

impl ExperimentStore {
    /// Server order is kept as-is.
    pub async fn snapshot(&self) -> Vec<Experiment> {
        self.experiments.read().await.clone().unwrap_or_default()
    }

    pub async fn is_loaded(&self) -> bool {
        self.experiments.read().await.is_some()
    }

    pub async fn get(&self, experiment_id: ExperimentId) -> Option<Experiment> {
        self.experiments
            .read()
            .await
            .as_ref()?
            .iter()
            .find(|experiment| experiment.id == experiment_id)
            .cloned()
    }

    pub(crate) async fn replace(&self, experiments: Vec<Experiment>) {
        *self.experiments.write().await = Some(experiments);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSnapshot {
    pub experiment_id: ExperimentId,
    pub runs: Vec<Run>,
}

#[derive(Debug, Default)]
pub struct RunStore {
    snapshot: RwLock<Option<RunSnapshot>>,
}

impl RunStore {
    pub async fn snapshot(&self) -> Option<RunSnapshot> {
        self.snapshot.read().await.clone()
    }

    pub async fn runs(&self) -> Vec<Run> {
        self.snapshot
            .read()
            .await
            .as_ref()
            .map(|snapshot| snapshot.runs.clone())
            .unwrap_or_default()
    }

    /// Applies `runs` only while `tag` is still the current selection.
    ///
    /// The selection read guard is held across the write so a concurrent
    /// selection change cannot slip in between the check and the store.
    pub(crate) async fn replace_if_current(
        &self,
        selection: &SelectionStore,
        tag: SelectionTag,
        runs: Vec<Run>,
    ) -> bool {
        let selection = selection.read().await;
        if !selection.is_current(tag) {
            return false;
        }
        *self.snapshot.write().await = Some(RunSnapshot {
            experiment_id: tag.experiment_id,
            runs,
        });
        true
    }

    pub(crate) async fn clear(&self) {
        *self.snapshot.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::{RunId, RunStatus};
    use uuid::Uuid;

    fn run(experiment_id: ExperimentId, n: u128) -> Run {
        Run {
            id: RunId(Uuid::from_u128(n)),
            experiment_id,
            status: RunStatus::Running,
            start_time: None,
            end_time: None,
            metrics: None,
        }
    }

    #[tokio::test]
    async fn stale_tag_is_not_applied() {
        let selection = SelectionStore::default();
        let runs = RunStore::default();
        let a = ExperimentId(Uuid::from_u128(1));
        let b = ExperimentId(Uuid::from_u128(2));

        let tag_a = selection.write().await.select(Some(a)).tag.expect("tag");
        let tag_b = selection.write().await.select(Some(b)).tag.expect("tag");

        assert!(!runs.replace_if_current(&selection, tag_a, vec![run(a, 10)]).await);
        assert!(runs.snapshot().await.is_none());

        assert!(runs.replace_if_current(&selection, tag_b, vec![run(b, 20)]).await);
        let snapshot = runs.snapshot().await.expect("snapshot");
        assert_eq!(snapshot.experiment_id, b);
        assert_eq!(snapshot.runs, vec![run(b, 20)]);
    }

    #[tokio::test]
    async fn experiment_lookup_uses_latest_list() {
        let store = ExperimentStore::default();
        assert!(!store.is_loaded().await);
        assert!(store.snapshot().await.is_empty());
        store.replace(Vec::new()).await;
        assert!(store.is_loaded().await);
        assert!(store.get(ExperimentId(Uuid::nil())).await.is_none());
    }
}
