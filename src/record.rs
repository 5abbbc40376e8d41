use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::util::time::parse_date_str;

pub const DEFAULT_NAME: &str = "Untitled";
pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_CATEGORY: &str = "Other";

/// How often a subscription bills. Unrecognized cycles are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
    Other(String),
}

impl BillingCycle {
    pub fn as_str(&self) -> &str {
        match self {
            BillingCycle::Monthly => "Monthly",
            BillingCycle::Yearly => "Yearly",
            BillingCycle::Other(s) => s,
        }
    }
}

impl From<String> for BillingCycle {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Monthly" => BillingCycle::Monthly,
            "Yearly" => BillingCycle::Yearly,
            _ => BillingCycle::Other(s),
        }
    }
}

impl From<&str> for BillingCycle {
    fn from(s: &str) -> Self { BillingCycle::from(s.to_string()) }
}

impl From<BillingCycle> for String {
    fn from(c: BillingCycle) -> Self { c.as_str().to_string() }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Lifecycle state of a subscription. Unrecognized states are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    #[default]
    Active,
    Trial,
    Cancelled,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Active => "Active",
            Status::Trial => "Trial",
            Status::Cancelled => "Cancelled",
            Status::Other(s) => s,
        }
    }
}

impl From<String> for Status {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Active" => Status::Active,
            "Trial" => Status::Trial,
            "Cancelled" => Status::Cancelled,
            _ => Status::Other(s),
        }
    }
}

impl From<&str> for Status {
    fn from(s: &str) -> Self { Status::from(s.to_string()) }
}

impl From<Status> for String {
    fn from(s: Status) -> Self { s.as_str().to_string() }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// One subscription entry, as normalized by the data source.
///
/// `next_renewal` keeps the raw date string; an empty string means the
/// renewal date is unknown. Use [`SubscriptionRecord::renewal_date`] to read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: String,
    pub name: String,
    pub cost: f64,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    pub next_renewal: String,
    pub category: String,
    pub status: Status,
    pub action_needed: bool,
    pub notes: String,
}

impl SubscriptionRecord {
    /// A record with every field at its default, keyed by `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: DEFAULT_NAME.to_string(),
            cost: 0.0,
            currency: DEFAULT_CURRENCY.to_string(),
            billing_cycle: BillingCycle::default(),
            next_renewal: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            status: Status::default(),
            action_needed: false,
            notes: String::new(),
        }
    }

    pub fn renewal_date(&self) -> Option<NaiveDate> {
        parse_date_str(&self.next_renewal)
    }
}
