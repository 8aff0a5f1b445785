use shared::domain::ExperimentId;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Identifies which selection a run fetch was issued for.
///
/// The epoch moves whenever the selected experiment changes, so A -> B -> A
/// yields a tag that differs from the first A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionTag {
    pub experiment_id: ExperimentId,
    pub epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    pub previous: Option<ExperimentId>,
    pub current: Option<ExperimentId>,
    pub tag: Option<SelectionTag>,
}

impl SelectionChange {
    pub fn experiment_changed(&self) -> bool {
        self.previous != self.current
    }
}

#[derive(Debug, Default)]
pub struct SelectionState {
    selected: Option<ExperimentId>,
    epoch: u64,
}

impl SelectionState {
    pub fn selected(&self) -> Option<ExperimentId> {
        self.selected
    }

    pub fn tag(&self) -> Option<SelectionTag> {
        self.selected.map(|experiment_id| SelectionTag {
            experiment_id,
            epoch: self.epoch,
        })
    }

    pub fn is_current(&self, tag: SelectionTag) -> bool {
        self.tag() == Some(tag)
    }

    /// Overwrites unconditionally. Re-selecting the same id keeps the epoch.
    pub fn select(&mut self, experiment_id: Option<ExperimentId>) -> SelectionChange {
        let previous = self.selected;
        if previous != experiment_id {
            self.epoch += 1;
        }
        self.selected = experiment_id;
        SelectionChange {
            previous,
            current: experiment_id,
            tag: self.tag(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SelectionStore {
    state: RwLock<SelectionState>,
}

impl SelectionStore {
    pub async fn selected(&self) -> Option<ExperimentId> {
        self.state.read().await.selected()
    }

    pub async fn tag(&self) -> Option<SelectionTag> {
        self.state.read().await.tag()
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, SelectionState> {
        self.state.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, SelectionState> {
        self.state.write().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn id(n: u128) -> ExperimentId {
        ExperimentId(Uuid::from_u128(n))
    }

    #[test]
    fn reselecting_same_experiment_keeps_tag() {
        let mut state = SelectionState::default();
        let first = state.select(Some(id(1)));
        let again = state.select(Some(id(1)));
        assert!(first.experiment_changed());
        assert!(!again.experiment_changed());
        assert_eq!(first.tag, again.tag);
    }

    #[test]
    fn returning_to_an_earlier_experiment_gets_a_fresh_tag() {
        let mut state = SelectionState::default();
        let a = state.select(Some(id(1))).tag.expect("tag");
        state.select(Some(id(2)));
        let a_again = state.select(Some(id(1))).tag.expect("tag");
        assert_eq!(a.experiment_id, a_again.experiment_id);
        assert_ne!(a, a_again);
        assert!(!state.is_current(a));
        assert!(state.is_current(a_again));
    }

    #[test]
    fn clearing_selection_has_no_tag() {
        let mut state = SelectionState::default();
        let a = state.select(Some(id(1))).tag.expect("tag");
        let cleared = state.select(None);
        assert_eq!(cleared.previous, Some(id(1)));
        assert!(cleared.tag.is_none());
        assert!(!state.is_current(a));
    }
}
