use radcore::telemetry::MetricsSnapshot;
use radcore::Measurement;
use serde::{Deserialize, Serialize};

/// Reply to a successful mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationReply {
    pub status: String,
    pub point_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<Measurement>,
}

impl MutationReply {
    pub fn ok(point_count: usize, record: Option<Measurement>) -> Self {
        Self {
            status: "ok".into(),
            point_count,
            record,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReply {
    pub status: String,
    pub reason: String,
}

impl ErrorReply {
    pub fn new(reason: String) -> Self {
        Self {
            status: "error".into(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub point_count: usize,
    pub pending_click: bool,
    pub metrics: MetricsSnapshot,
    pub version: &'static str,
}
