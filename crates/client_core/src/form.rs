//! Creation form state and the fixed experiment defaults it submits with.

use serde_json::{Map, Value};
use shared::{
    domain::{ConnectionId, DatasetId, Distance},
    protocol::{CreateExperimentRequest, VectorConfig},
};
use thiserror::Error;

// Not user-editable yet; every experiment is created with these.
pub const DEFAULT_VECTOR_SIZE: u32 = 1536;
pub const DEFAULT_DISTANCE: Distance = Distance::Cosine;
pub const DEFAULT_INDEXING_THRESHOLD: u64 = 20_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{field} is not a valid UUID: '{value}'")]
    InvalidId { field: &'static str, value: String },
}

/// Free-form text the operator typed into the creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExperimentDraft {
    pub name: String,
    pub dataset_id: String,
    pub connection_id: String,
}

impl ExperimentDraft {
    pub fn new(
        name: impl Into<String>,
        dataset_id: impl Into<String>,
        connection_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dataset_id: dataset_id.into(),
            connection_id: connection_id.into(),
        }
    }

    pub fn to_request(&self) -> Result<CreateExperimentRequest, DraftError> {
        let name = required("name", &self.name)?;
        let dataset_id = required("dataset_id", &self.dataset_id)?;
        let connection_id = required("connection_id", &self.connection_id)?;

        let dataset_id: DatasetId = dataset_id.parse().map_err(|_| DraftError::InvalidId {
            field: "dataset_id",
            value: dataset_id.to_string(),
        })?;
        let connection_id: ConnectionId =
            connection_id.parse().map_err(|_| DraftError::InvalidId {
                field: "connection_id",
                value: connection_id.to_string(),
            })?;

        Ok(CreateExperimentRequest {
            name: name.to_string(),
            dataset_id,
            connection_id,
            optimizer_config: default_optimizer_config(),
            vector_config: default_vector_config(),
        })
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, DraftError> {
    let value = value.trim();
    if value.is_empty() {
        Err(DraftError::Missing(field))
    } else {
        Ok(value)
    }
}

pub fn default_optimizer_config() -> Map<String, Value> {
    let mut config = Map::new();
    config.insert(
        "indexing_threshold".into(),
        Value::from(DEFAULT_INDEXING_THRESHOLD),
    );
    config
}

pub fn default_vector_config() -> VectorConfig {
    VectorConfig {
        size: DEFAULT_VECTOR_SIZE,
        distance: DEFAULT_DISTANCE,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateExperimentForm {
    open: bool,
    draft: ExperimentDraft,
    last_error: Option<String>,
}

impl CreateExperimentForm {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn draft(&self) -> &ExperimentDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ExperimentDraft {
        &mut self.draft
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Reopening keeps whatever was typed before a cancel.
    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn cancel(&mut self) {
        self.open = false;
        self.last_error = None;
    }

    /// Closes the form. Edits made after `sent` was submitted are kept.
    pub(crate) fn submitted(&mut self, sent: &ExperimentDraft) {
        self.open = false;
        if &self.draft == sent {
            self.draft = ExperimentDraft::default();
        }
        self.last_error = None;
    }

    /// Records the failure without reopening a form cancelled in the meantime.
    pub(crate) fn rejected(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }
}
