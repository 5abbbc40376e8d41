use std::sync::atomic::{AtomicU64, Ordering};

use crate::notion::{FetchError, SubscriptionSource};
use crate::record::SubscriptionRecord;

/// Identity of one load request. Later tickets always compare greater.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(&self) -> u64 { self.0 }
}

#[derive(Debug)]
pub enum LoadOutcome {
    Fresh { ticket: Ticket, records: Vec<SubscriptionRecord> },
    Failed { ticket: Ticket, error: FetchError },
    /// A newer request already settled; this response was dropped.
    Stale { ticket: Ticket, newest: u64 },
}

/// Runs fetches against a source and applies last-write-wins by request
/// sequence, so an older response that resolves late never replaces a newer one.
pub struct Loader<S> {
    source: S,
    issued: AtomicU64,
    settled: AtomicU64,
}

impl<S: SubscriptionSource> Loader<S> {
    pub fn new(source: S) -> Self {
        Self { source, issued: AtomicU64::new(0), settled: AtomicU64::new(0) }
    }

    #[cfg(test)]
    pub fn source(&self) -> &S { &self.source }

    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub async fn load(&self, ticket: Ticket) -> LoadOutcome {
        let res = self.source.fetch_records().await;
        self.settle(ticket, res)
    }

    /// Issue a ticket and load with it.
    pub async fn load_next(&self) -> LoadOutcome {
        let ticket = self.begin();
        self.load(ticket).await
    }

    fn settle(&self, ticket: Ticket, res: Result<Vec<SubscriptionRecord>, FetchError>) -> LoadOutcome {
        let prev = self.settled.fetch_max(ticket.0, Ordering::SeqCst);
        if prev > ticket.0 {
            return LoadOutcome::Stale { ticket, newest: prev };
        }
        match res {
            Ok(records) => LoadOutcome::Fresh { ticket, records },
            Err(error) => LoadOutcome::Failed { ticket, error },
        }
    }
}
