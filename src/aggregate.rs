// Derived views over a list of subscription records. Everything here is pure:
// no I/O, no clock reads, and inputs are only borrowed.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::record::{BillingCycle, Status, SubscriptionRecord};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Monthly-equivalent contribution of a single record.
/// Unknown cycles pass through unchanged.
pub fn monthly_contribution(rec: &SubscriptionRecord) -> f64 {
    match rec.billing_cycle {
        BillingCycle::Yearly => rec.cost / 12.0,
        BillingCycle::Monthly | BillingCycle::Other(_) => rec.cost,
    }
}

pub fn normalize_monthly_cost(records: &[SubscriptionRecord]) -> f64 {
    records.iter().map(monthly_contribution).sum()
}

pub fn annual_projection(monthly_cost: f64) -> f64 {
    monthly_cost * 12.0
}

/// Records renewing within `[now, now + window_days]`, both ends inclusive,
/// in input order. Records without a parseable renewal date never qualify.
pub fn upcoming_within_window(
    records: &[SubscriptionRecord],
    window_days: u32,
    now: NaiveDate,
) -> Vec<&SubscriptionRecord> {
    // saturate at the calendar's end instead of overflowing
    let cutoff = now
        .checked_add_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MAX);
    records
        .iter()
        .filter(|r| matches!(r.renewal_date(), Some(d) if d >= now && d <= cutoff))
        .collect()
}

pub fn partition_action_needed<'a, I>(records: I) -> Vec<&'a SubscriptionRecord>
where
    I: IntoIterator<Item = &'a SubscriptionRecord>,
{
    records.into_iter().filter(|r| r.action_needed).collect()
}

pub fn count_active(records: &[SubscriptionRecord]) -> usize {
    records.iter().filter(|r| r.status == Status::Active).count()
}

/// The full record list together with every aggregate the dashboard shows.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub as_of: NaiveDate,
    pub window_days: u32,
    pub monthly_cost: f64,
    pub yearly_cost: f64,
    pub active_count: usize,
    pub upcoming: Vec<SubscriptionRecord>,
    pub action_needed: Vec<SubscriptionRecord>,
    pub records: Vec<SubscriptionRecord>,
}

impl Dashboard {
    pub fn compute(records: Vec<SubscriptionRecord>, window_days: u32, now: NaiveDate) -> Self {
        let monthly_cost = normalize_monthly_cost(&records);
        let upcoming = upcoming_within_window(&records, window_days, now)
            .into_iter()
            .cloned()
            .collect();
        let action_needed = partition_action_needed(&records)
            .into_iter()
            .cloned()
            .collect();
        Dashboard {
            as_of: now,
            window_days,
            monthly_cost,
            yearly_cost: annual_projection(monthly_cost),
            active_count: count_active(&records),
            upcoming,
            action_needed,
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn priced(id: &str, cost: f64, cycle: &str) -> SubscriptionRecord {
        let mut r = SubscriptionRecord::new(id);
        r.cost = cost;
        r.billing_cycle = BillingCycle::from(cycle);
        r
    }

    fn renewing(id: &str, next: &str) -> SubscriptionRecord {
        let mut r = SubscriptionRecord::new(id);
        r.next_renewal = next.to_string();
        r
    }

    fn ids(recs: &[&SubscriptionRecord]) -> Vec<String> {
        recs.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn monthly_cost_of_nothing_is_zero() {
        assert_eq!(normalize_monthly_cost(&[]), 0.0);
    }

    #[test]
    fn yearly_costs_are_spread_over_twelve_months() {
        assert_eq!(normalize_monthly_cost(&[priced("a", 12.0, "Yearly")]), 1.0);
        let mixed = [priced("a", 10.0, "Monthly"), priced("b", 120.0, "Yearly")];
        assert_eq!(normalize_monthly_cost(&mixed), 20.0);
    }

    #[test]
    fn unknown_cycles_pass_through() {
        let recs = [priced("a", 7.5, "Weekly"), priced("b", 2.5, "Monthly")];
        assert_eq!(normalize_monthly_cost(&recs), 10.0);
    }

    #[test]
    fn annual_projection_matches_monthly_total() {
        let recs = [
            priced("a", 9.99, "Monthly"),
            priced("b", 99.0, "Yearly"),
            priced("c", 4.0, "Quarterly"),
        ];
        let monthly = normalize_monthly_cost(&recs);
        assert_eq!(annual_projection(monthly), monthly * 12.0);
        assert_eq!(annual_projection(0.0), 0.0);
    }

    #[test]
    fn upcoming_window_examples() {
        let now = date(2024, 1, 1);
        let recs = [
            renewing("soon", "2024-01-15"),
            renewing("later", "2024-02-05"),
            renewing("past", "2023-12-31"),
            renewing("local", "2024-01-15T09:00:00.000"),
        ];
        let got = upcoming_within_window(&recs, 30, now);
        assert_eq!(ids(&got), vec!["soon", "local"]);
    }

    #[test]
    fn upcoming_window_endpoints_are_inclusive() {
        let now = date(2024, 1, 1);
        let recs = [
            renewing("today", "2024-01-01"),
            renewing("cutoff", "2024-01-31"),
            renewing("after", "2024-02-01"),
            renewing("stamped", "2024-01-31T18:00:00.000+00:00"),
        ];
        let got = upcoming_within_window(&recs, 30, now);
        assert_eq!(ids(&got), vec!["today", "cutoff", "stamped"]);

        let zero = upcoming_within_window(&recs, 0, now);
        assert_eq!(ids(&zero), vec!["today"]);
    }

    #[test]
    fn unknown_renewal_dates_never_qualify() {
        let now = date(2024, 1, 1);
        let recs = [renewing("blank", ""), renewing("junk", "soon-ish"), renewing("ok", "2024-01-02")];
        for window in [0, 1, 30, 365, u32::MAX] {
            let got = upcoming_within_window(&recs, window, now);
            assert!(got.iter().all(|r| r.id != "blank" && r.id != "junk"));
        }
    }

    #[test]
    fn upcoming_is_an_ordered_subsequence_within_bounds() {
        let now = date(2024, 3, 10);
        let recs = [
            renewing("e", "2024-04-01"),
            renewing("a", "2024-03-10"),
            renewing("x", "2024-01-01"),
            renewing("c", "2024-03-20"),
            renewing("y", ""),
            renewing("b", "2024-03-11"),
        ];
        let window = 30;
        let got = upcoming_within_window(&recs, window, now);
        assert_eq!(ids(&got), vec!["e", "a", "c", "b"]);

        let cutoff = now + Days::new(u64::from(window));
        for r in &got {
            let d = r.renewal_date().unwrap();
            assert!(now <= d && d <= cutoff);
            assert!(recs.iter().any(|orig| std::ptr::eq(orig, *r)));
        }
    }

    #[test]
    fn huge_window_does_not_overflow() {
        let now = date(2024, 1, 1);
        let recs = [renewing("far", "9999-12-31")];
        assert_eq!(upcoming_within_window(&recs, u32::MAX, now).len(), 1);
    }

    #[test]
    fn action_needed_is_ordered_and_idempotent() {
        let mut a = SubscriptionRecord::new("a");
        a.action_needed = true;
        let b = SubscriptionRecord::new("b");
        let mut c = SubscriptionRecord::new("c");
        c.action_needed = true;
        let recs = vec![a, b, c];

        let once = partition_action_needed(&recs);
        assert_eq!(ids(&once), vec!["a", "c"]);
        let twice = partition_action_needed(once.iter().copied());
        assert_eq!(ids(&twice), ids(&once));
    }

    #[test]
    fn count_active_ignores_other_statuses() {
        let mut recs: Vec<SubscriptionRecord> = (0..5).map(|i| SubscriptionRecord::new(format!("r{i}"))).collect();
        recs[3].status = Status::Trial;
        recs[4].status = Status::Cancelled;
        assert_eq!(count_active(&recs), 3);
        assert_eq!(count_active(&[]), 0);
    }

    #[test]
    fn dashboard_bundles_every_aggregate() {
        let now = date(2024, 1, 1);
        let mut netflix = priced("n", 15.0, "Monthly");
        netflix.next_renewal = "2024-01-10".into();
        let mut domain = priced("d", 24.0, "Yearly");
        domain.action_needed = true;
        domain.status = Status::Trial;
        domain.next_renewal = "2024-06-01".into();

        let dash = Dashboard::compute(vec![netflix, domain], 30, now);
        assert_eq!(dash.monthly_cost, 17.0);
        assert_eq!(dash.yearly_cost, 204.0);
        assert_eq!(dash.active_count, 1);
        assert_eq!(dash.upcoming.len(), 1);
        assert_eq!(dash.upcoming[0].id, "n");
        assert_eq!(dash.action_needed.len(), 1);
        assert_eq!(dash.action_needed[0].id, "d");
        assert_eq!(dash.records.len(), 2);
        assert_eq!(dash.window_days, 30);
    }
}
