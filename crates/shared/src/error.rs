use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body returned by the benchmark API on non-2xx responses.
///
/// `detail` is either a plain message or a list of validation entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: Value,
}

impl ErrorBody {
    pub fn message(&self) -> String {
        match &self.detail {
            Value::String(message) => message.clone(),
            Value::Array(entries) => entries
                .iter()
                .map(|entry| {
                    entry
                        .get("msg")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| entry.to_string())
                })
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_detail_is_used_verbatim() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"detail":"Dataset not found"}"#).expect("body");
        assert_eq!(body.message(), "Dataset not found");
    }

    #[test]
    fn validation_detail_joins_messages() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"detail":[{"loc":["body","dataset_id"],"msg":"value is not a valid uuid"},{"msg":"field required"}]}"#,
        )
        .expect("body");
        assert_eq!(body.message(), "value is not a valid uuid; field required");
    }
}
