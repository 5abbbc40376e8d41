// Wire types for the Notion database query endpoint, and the mapping from a
// result page to a SubscriptionRecord.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{BillingCycle, Status, SubscriptionRecord};

pub const PROP_NAME: &str = "Name";
pub const PROP_COST: &str = "Cost";
pub const PROP_CURRENCY: &str = "Currency";
pub const PROP_BILLING_CYCLE: &str = "Billing Cycle";
pub const PROP_NEXT_RENEWAL: &str = "Next Renewal";
pub const PROP_CATEGORY: &str = "Category";
pub const PROP_STATUS: &str = "Status";
pub const PROP_ACTION_NEEDED: &str = "Action Needed";
pub const PROP_NOTES: &str = "Notes";

#[derive(Debug, Clone, Serialize)]
pub struct QueryBody {
    pub filter: PropertyFilter,
    pub sorts: Vec<PropertySort>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyFilter {
    pub property: &'static str,
    pub select: SelectCondition,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectCondition {
    pub does_not_equal: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertySort {
    pub property: &'static str,
    pub direction: &'static str,
}

impl QueryBody {
    /// Everything not cancelled, soonest renewal first.
    pub fn live_by_renewal() -> Self {
        QueryBody {
            filter: PropertyFilter {
                property: PROP_STATUS,
                select: SelectCondition { does_not_equal: "Cancelled" },
            },
            sorts: vec![PropertySort { property: PROP_NEXT_RENEWAL, direction: "ascending" }],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

impl Default for ApiErrorBody {
    fn default() -> Self {
        Self { code: None, message: "unknown error".to_string() }
    }
}

impl Page {
    /// Missing, null, empty or oddly-typed properties fall back to the record defaults.
    pub fn to_record(&self) -> SubscriptionRecord {
        let mut rec = SubscriptionRecord::new(self.id.clone());
        if let Some(name) = self.first_text(PROP_NAME, "title") {
            rec.name = name;
        }
        if let Some(cost) = self.prop(PROP_COST).and_then(|p| p.get("number")).and_then(Value::as_f64) {
            // costs are never negative
            rec.cost = cost.max(0.0);
        }
        if let Some(currency) = self.select_name(PROP_CURRENCY) {
            rec.currency = currency;
        }
        if let Some(cycle) = self.select_name(PROP_BILLING_CYCLE) {
            rec.billing_cycle = BillingCycle::from(cycle);
        }
        if let Some(start) = self
            .prop(PROP_NEXT_RENEWAL)
            .and_then(|p| p.get("date"))
            .and_then(|d| d.get("start"))
            .and_then(Value::as_str)
        {
            rec.next_renewal = start.to_string();
        }
        if let Some(category) = self.select_name(PROP_CATEGORY) {
            rec.category = category;
        }
        if let Some(status) = self.select_name(PROP_STATUS) {
            rec.status = Status::from(status);
        }
        if let Some(flag) = self.prop(PROP_ACTION_NEEDED).and_then(|p| p.get("checkbox")).and_then(Value::as_bool) {
            rec.action_needed = flag;
        }
        if let Some(notes) = self.first_text(PROP_NOTES, "rich_text") {
            rec.notes = notes;
        }
        rec
    }

    fn prop(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    fn select_name(&self, name: &str) -> Option<String> {
        self.prop(name)?
            .get("select")?
            .get("name")?
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn first_text(&self, name: &str, kind: &str) -> Option<String> {
        self.prop(name)?
            .get(kind)?
            .as_array()?
            .first()?
            .get("plain_text")?
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}
