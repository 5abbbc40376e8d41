use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::aggregate::Dashboard;
use crate::record::SubscriptionRecord;

pub const SCHEMA_VERSION: &str = "subtrack.v1";

#[derive(Debug, Clone, Serialize, Default)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
    /// Sequence number of the load request that produced the data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_seq: Option<u64>,
}

/// What a command hands to the presenter.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Report<'a> {
    Summary(&'a Dashboard),
    Upcoming {
        as_of: NaiveDate,
        window_days: u32,
        records: &'a [SubscriptionRecord],
    },
    Actions {
        records: &'a [SubscriptionRecord],
    },
    List {
        records: &'a [SubscriptionRecord],
    },
}

impl Report<'_> {
    pub fn op(&self) -> &'static str {
        match self {
            Report::Summary(_) => "summary",
            Report::Upcoming { .. } => "upcoming",
            Report::Actions { .. } => "actions",
            Report::List { .. } => "ls",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub schema_version: &'static str,
    pub time: DateTime<Utc>,
    pub request_id: Uuid,
    pub op: &'static str,
    pub result: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Envelope {
    pub fn result<T: Serialize>(op: &'static str, result: &T, meta: Option<Meta>) -> Result<Self, serde_json::Error> {
        let res_val = serde_json::to_value(result)?;
        Ok(Envelope {
            schema_version: SCHEMA_VERSION,
            time: Utc::now(),
            request_id: Uuid::new_v4(),
            op,
            result: res_val,
            meta,
        })
    }
}
