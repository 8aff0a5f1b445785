//! Change notifications for whatever renders the stores.

use shared::{
    domain::ExperimentId,
    protocol::{Experiment, Run},
};

use crate::error::{FetchErrorKind, MutationError};

#[derive(Debug, Clone)]
pub enum DashboardEvent {
    ExperimentsUpdated {
        count: usize,
    },
    SelectionChanged(Option<ExperimentId>),
    RunsUpdated {
        experiment_id: ExperimentId,
        count: usize,
    },
    /// Informational only; the run store keeps its last good contents.
    PollFailed {
        experiment_id: ExperimentId,
        kind: FetchErrorKind,
        message: String,
    },
    FormChanged {
        open: bool,
    },
    ExperimentCreated(Experiment),
    RunTriggered(Run),
    Notice(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeContext {
    LoadExperiments,
    CreateExperiment,
    TriggerRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeCategory {
    Validation,
    Transport,
    Server,
    Malformed,
}

/// A user-visible failure message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub context: NoticeContext,
    pub category: NoticeCategory,
    pub message: String,
}

impl Notice {
    pub fn from_mutation_error(context: NoticeContext, err: &MutationError) -> Self {
        let category = match err {
            MutationError::Draft(_) | MutationError::NoSelection => NoticeCategory::Validation,
            MutationError::Fetch(fetch) => match fetch.kind() {
                FetchErrorKind::Network => NoticeCategory::Transport,
                FetchErrorKind::Server => NoticeCategory::Server,
                FetchErrorKind::Malformed => NoticeCategory::Malformed,
                FetchErrorKind::Validation => NoticeCategory::Validation,
            },
        };
        let action = match context {
            NoticeContext::LoadExperiments => "Failed to load experiments",
            NoticeContext::CreateExperiment => "Failed to create experiment",
            NoticeContext::TriggerRun => "Failed to trigger run",
        };
        Self {
            context,
            category,
            message: format!("{action}: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::FetchError, form::DraftError};

    #[test]
    fn server_failure_becomes_server_notice() {
        let err = MutationError::Fetch(FetchError::Server {
            status: 404,
            message: "Dataset not found".into(),
        });
        let notice = Notice::from_mutation_error(NoticeContext::CreateExperiment, &err);
        assert_eq!(notice.category, NoticeCategory::Server);
        assert_eq!(
            notice.message,
            "Failed to create experiment: server responded with status 404: Dataset not found"
        );
    }

    #[test]
    fn draft_and_transport_failures_are_categorized() {
        let draft = MutationError::Draft(DraftError::Missing("name"));
        assert_eq!(
            Notice::from_mutation_error(NoticeContext::CreateExperiment, &draft).category,
            NoticeCategory::Validation
        );
        let network = MutationError::Fetch(FetchError::Network("connection refused".into()));
        assert_eq!(
            Notice::from_mutation_error(NoticeContext::TriggerRun, &network).category,
            NoticeCategory::Transport
        );
    }
}
