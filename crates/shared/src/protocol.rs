use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::{ConnectionId, DatasetId, Distance, ExperimentId, RunId, RunStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorConfig {
    pub size: u32,
    pub distance: Distance,
}

impl VectorConfig {
    /// The same config in the free-form shape experiments are read back with.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("size".into(), Value::from(self.size));
        map.insert("distance".into(), Value::from(self.distance.as_str()));
        map
    }
}

/// An experiment as listed by the server.
///
/// `vector_config` is kept as stored. Besides the single-vector
/// `{size, distance}` form the server accepts any spelling of the distance
/// and multi-vector `{vectors: {name: {...}}}` configs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub id: ExperimentId,
    pub name: String,
    pub dataset_id: DatasetId,
    pub connection_id: ConnectionId,
    #[serde(default)]
    pub optimizer_config: Map<String, Value>,
    #[serde(default)]
    pub vector_config: Map<String, Value>,
}

impl Experiment {
    pub fn vector_size(&self) -> Option<u64> {
        self.vector_config.get("size").and_then(Value::as_u64)
    }

    pub fn vector_distance(&self) -> Option<&str> {
        self.vector_config.get("distance").and_then(Value::as_str)
    }

    /// Vector names of a multi-vector config, empty otherwise.
    pub fn named_vectors(&self) -> Vec<&str> {
        self.vector_config
            .get("vectors")
            .and_then(Value::as_object)
            .map(|vectors| vectors.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateExperimentRequest {
    pub name: String,
    pub dataset_id: DatasetId,
    pub connection_id: ConnectionId,
    pub optimizer_config: Map<String, Value>,
    pub vector_config: VectorConfig,
}

/// Benchmark results reported once a run finishes. Keys the client does not
/// know about are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p95_latency: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RunMetrics {
    pub fn is_empty(&self) -> bool {
        self.f1.is_none() && self.p95_latency.is_none() && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub experiment_id: ExperimentId,
    pub status: RunStatus,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub end_time: Option<DateTime<Utc>>,
    /// `None` covers a missing field, `null` and `{}` alike.
    #[serde(default, deserialize_with = "non_empty_metrics")]
    pub metrics: Option<RunMetrics>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

fn non_empty_metrics<'de, D>(deserializer: D) -> Result<Option<RunMetrics>, D::Error>
where
    D: Deserializer<'de>,
{
    let metrics = Option::<RunMetrics>::deserialize(deserializer)?;
    Ok(metrics.filter(|metrics| !metrics.is_empty()))
}

// The API stores timestamps without an offset in some backends; those are UTC.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}
