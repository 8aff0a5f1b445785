use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

id_newtype!(ExperimentId);
id_newtype!(RunId);
id_newtype!(DatasetId);
id_newtype!(ConnectionId);

/// Lifecycle of a benchmark run. Transitions are driven by the server only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    #[serde(alias = "CREATED")]
    Pending,
    Running,
    Completed,
    Failed,
    Canceled,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Canceled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vector similarity metric, spelled the way the vector database expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Distance {
    #[serde(alias = "COSINE", alias = "cosine")]
    Cosine,
    #[serde(alias = "EUCLID", alias = "euclid")]
    Euclid,
    #[serde(alias = "DOT", alias = "dot")]
    Dot,
    #[serde(alias = "MANHATTAN", alias = "manhattan")]
    Manhattan,
}

impl Distance {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cosine => "Cosine",
            Self::Euclid => "Euclid",
            Self::Dot => "Dot",
            Self::Manhattan => "Manhattan",
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_status_is_read_as_pending() {
        let status: RunStatus = serde_json::from_str("\"CREATED\"").expect("status");
        assert_eq!(status, RunStatus::Pending);
        assert_eq!(
            serde_json::to_string(&RunStatus::Pending).expect("json"),
            "\"PENDING\""
        );
    }

    #[test]
    fn only_finished_statuses_are_terminal() {
        assert!(!RunStatus::Pending.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(RunStatus::Canceled.is_terminal());
    }

    #[test]
    fn distance_accepts_other_casings() {
        let distance: Distance = serde_json::from_str("\"COSINE\"").expect("distance");
        assert_eq!(distance, Distance::Cosine);
        assert_eq!(
            serde_json::to_string(&Distance::Dot).expect("json"),
            format!("\"{}\"", Distance::Dot)
        );
    }

    #[test]
    fn ids_parse_with_surrounding_whitespace() {
        let raw = "  6f1c2a8e-6a43-4b55-9a0e-6a4a4f0d9b11 ";
        let id: ExperimentId = raw.parse().expect("uuid");
        assert_eq!(id.to_string(), raw.trim());
        assert!("not-a-uuid".parse::<DatasetId>().is_err());
    }
}
