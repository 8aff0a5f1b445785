//! User-initiated writes and the refetches that follow them.

use std::sync::Arc;

use shared::{
    domain::ExperimentId,
    protocol::{Experiment, Run},
};
use tracing::{info, warn};

use crate::{
    context::SyncContext,
    error::MutationError,
    events::{DashboardEvent, Notice, NoticeContext},
};

/// Create and trigger do not exclude each other, and duplicate create
/// submissions are allowed to race.
pub struct MutationCoordinator {
    ctx: Arc<SyncContext>,
}

impl MutationCoordinator {
    pub(crate) fn new(ctx: Arc<SyncContext>) -> Self {
        Self { ctx }
    }

    /// Submits the creation form's current draft.
    ///
    /// On success the form closes and the experiment list is refetched in
    /// full; the draft is cleared unless it was edited while the request was
    /// in flight. On failure the draft is left untouched.
    pub async fn create_experiment(&self) -> Result<Experiment, MutationError> {
        let draft = self.ctx.form.lock().await.draft().clone();

        let created = match draft.to_request() {
            Ok(request) => self
                .ctx
                .fetcher
                .create_experiment(&request)
                .await
                .map_err(MutationError::from),
            Err(err) => Err(MutationError::from(err)),
        };

        let experiment = match created {
            Ok(experiment) => experiment,
            Err(err) => {
                warn!(error = %err, "mutation: create experiment failed");
                let notice = Notice::from_mutation_error(NoticeContext::CreateExperiment, &err);
                let open = {
                    let mut form = self.ctx.form.lock().await;
                    form.rejected(notice.message.clone());
                    form.is_open()
                };
                self.ctx.emit(DashboardEvent::FormChanged { open });
                self.ctx.emit(DashboardEvent::Notice(notice));
                return Err(err);
            }
        };

        info!(experiment_id = %experiment.id, name = %experiment.name, "mutation: experiment created");
        self.ctx.form.lock().await.submitted(&draft);
        self.ctx.emit(DashboardEvent::FormChanged { open: false });
        self.ctx
            .emit(DashboardEvent::ExperimentCreated(experiment.clone()));

        if let Err(err) = self.ctx.refresh_experiments().await {
            warn!(error = %err, "mutation: experiment list refetch after create failed");
            self.ctx.emit(DashboardEvent::Notice(Notice::from_mutation_error(
                NoticeContext::LoadExperiments,
                &MutationError::from(err),
            )));
        }

        Ok(experiment)
    }

    /// Triggers a run and, when `experiment_id` is the current selection,
    /// refetches its runs once without waiting for the next poll tick.
    pub async fn trigger_run(&self, experiment_id: ExperimentId) -> Result<Run, MutationError> {
        let run = match self.ctx.fetcher.trigger_run(experiment_id).await {
            Ok(run) => run,
            Err(err) => {
                let err = MutationError::from(err);
                warn!(experiment_id = %experiment_id, error = %err, "mutation: trigger run failed");
                self.ctx.emit(DashboardEvent::Notice(Notice::from_mutation_error(
                    NoticeContext::TriggerRun,
                    &err,
                )));
                return Err(err);
            }
        };

        info!(experiment_id = %experiment_id, run_id = %run.id, "mutation: run triggered");
        self.ctx.emit(DashboardEvent::RunTriggered(run.clone()));

        match self.ctx.selection.tag().await {
            Some(tag) if tag.experiment_id == experiment_id => {
                if let Err(err) = self.ctx.refresh_runs(tag).await {
                    warn!(
                        experiment_id = %experiment_id,
                        error = %err,
                        "mutation: run refetch after trigger failed"
                    );
                }
            }
            _ => {
                info!(
                    experiment_id = %experiment_id,
                    "mutation: triggered experiment is not selected; skipping run refetch"
                );
            }
        }

        Ok(run)
    }

    pub async fn trigger_selected_run(&self) -> Result<Run, MutationError> {
        let Some(experiment_id) = self.ctx.selection.selected().await else {
            return Err(MutationError::NoSelection);
        };
        self.trigger_run(experiment_id).await
    }
}
