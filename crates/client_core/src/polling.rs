//! Repeating run refresh scoped to the current selection.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use shared::domain::ExperimentId;
use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{context::SyncContext, events::DashboardEvent, selection::SelectionTag};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

enum PollingState {
    Idle,
    Active {
        experiment_id: ExperimentId,
        timer: JoinHandle<()>,
    },
}

pub struct PollingController {
    period: Duration,
    state: Mutex<PollingState>,
}

impl PollingController {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            state: Mutex::new(PollingState::Idle),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn active_experiment(&self) -> Option<ExperimentId> {
        match &*self.lock() {
            PollingState::Idle => None,
            PollingState::Active { experiment_id, .. } => Some(*experiment_id),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active_experiment().is_some()
    }

    /// Cancels any armed timer, fetches once right away, then re-fetches
    /// every period. Ticks do not wait for earlier fetches to resolve.
    pub(crate) fn start(&self, tag: SelectionTag, ctx: Arc<SyncContext>) {
        let mut state = self.lock();
        cancel(&mut state);

        spawn_tick(Arc::clone(&ctx), tag);

        let period = self.period;
        let timer = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                // An abort that lands while this task is mid-poll is only seen
                // at the next await.
                if !ctx.is_current(tag).await {
                    debug!(experiment_id = %tag.experiment_id, "polling: selection moved on; timer exiting");
                    break;
                }
                spawn_tick(Arc::clone(&ctx), tag);
            }
        });

        info!(
            experiment_id = %tag.experiment_id,
            period_ms = period.as_millis() as u64,
            "polling: started"
        );
        *state = PollingState::Active {
            experiment_id: tag.experiment_id,
            timer,
        };
    }

    /// Idempotent; stopping an idle controller does nothing.
    pub fn stop(&self) -> bool {
        cancel(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, PollingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        self.stop();
    }
}

fn cancel(state: &mut PollingState) -> bool {
    match std::mem::replace(state, PollingState::Idle) {
        PollingState::Idle => false,
        PollingState::Active {
            experiment_id,
            timer,
        } => {
            timer.abort();
            info!(experiment_id = %experiment_id, "polling: stopped");
            true
        }
    }
}

fn spawn_tick(ctx: Arc<SyncContext>, tag: SelectionTag) {
    tokio::spawn(async move {
        if !ctx.is_current(tag).await {
            debug!(experiment_id = %tag.experiment_id, "polling: skipping fetch for stale selection");
            return;
        }
        if let Err(err) = ctx.refresh_runs(tag).await {
            if !ctx.is_current(tag).await {
                debug!(
                    experiment_id = %tag.experiment_id,
                    error = %err,
                    "polling: ignoring failure for stale selection"
                );
                return;
            }
            warn!(
                experiment_id = %tag.experiment_id,
                error = %err,
                "polling: run fetch failed; keeping last good runs"
            );
            ctx.emit(DashboardEvent::PollFailed {
                experiment_id: tag.experiment_id,
                kind: err.kind(),
                message: err.to_string(),
            });
        }
    });
}
