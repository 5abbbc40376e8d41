use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Args;
use tokio::sync::mpsc;

use crate::aggregate::{self, Dashboard, DEFAULT_WINDOW_DAYS};
use crate::loader::{LoadOutcome, Loader};
use crate::notion::SubscriptionSource;
use crate::output::Emitter;
use crate::output::types::{Meta, Report};
use crate::record::SubscriptionRecord;
use crate::telemetry::{self};
use crate::telemetry::ops::report::Phase as ReportPhase;
use crate::telemetry::ops::watch::Phase as WatchPhase;

/// subtrack summary/upcoming
#[derive(Args, Debug)]
pub struct WindowCmd {
    /// Renewal window in days, counted from today (inclusive)
    #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
    pub days: u32,
}

/// subtrack watch
#[derive(Args, Debug)]
pub struct WatchCmd {
    /// Seconds between reloads
    #[arg(long, default_value_t = 300)]
    pub interval: u64,
    #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
    pub days: u32,
    /// Stop after this many renders (runs until Ctrl-C when omitted)
    #[arg(long)]
    pub count: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Summary { days: u32 },
    Upcoming { days: u32 },
    Actions,
    List,
}

impl View {
    fn name(&self) -> &'static str {
        match self {
            View::Summary { .. } => "summary",
            View::Upcoming { .. } => "upcoming",
            View::Actions => "actions",
            View::List => "ls",
        }
    }
}

/// How a failed load is retried: a fixed number of automatic attempts,
/// then (on a terminal) a single yes/no prompt per failure.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub retries: u32,
    pub interactive: bool,
}

impl RetryPolicy {
    pub fn from_terminal(retries: u32) -> Self {
        Self { retries, interactive: io::stdin().is_terminal() && io::stderr().is_terminal() }
    }
}

pub struct Session<S> {
    pub loader: Loader<S>,
    pub emitter: Emitter,
    pub today: Option<NaiveDate>,
    pub retry: RetryPolicy,
}

impl<S: SubscriptionSource> Session<S> {
    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

pub async fn run<S: SubscriptionSource>(session: &Session<S>, view: View, w: &mut dyn Write) -> Result<()> {
    let log = telemetry::report();
    let _g = log.root_span_kv([("view", view.name().to_string())]).entered();

    let started = Instant::now();
    let (records, seq) = load_with_retry(session).await?;
    let meta = Meta { duration_ms: Some(started.elapsed().as_millis()), request_seq: Some(seq) };
    log.loaded(records.len(), seq, started.elapsed().as_millis());

    let today = session.today();
    let _s = log.span(&ReportPhase::Aggregate).entered();
    match view {
        View::Summary { days } => {
            let dash = Dashboard::compute(records, days, today);
            log.totals(&dash);
            emit(session, &Report::Summary(&dash), meta, w)
        }
        View::Upcoming { days } => {
            let upcoming: Vec<SubscriptionRecord> = aggregate::upcoming_within_window(&records, days, today)
                .into_iter()
                .cloned()
                .collect();
            log.info(format!("📅 {} renewals in the next {} days", upcoming.len(), days));
            emit(session, &Report::Upcoming { as_of: today, window_days: days, records: &upcoming }, meta, w)
        }
        View::Actions => {
            let actions: Vec<SubscriptionRecord> = aggregate::partition_action_needed(&records)
                .into_iter()
                .cloned()
                .collect();
            log.info(format!("🔔 {} subscriptions need action", actions.len()));
            emit(session, &Report::Actions { records: &actions }, meta, w)
        }
        View::List => emit(session, &Report::List { records: &records }, meta, w),
    }
}

fn emit<S>(session: &Session<S>, report: &Report<'_>, meta: Meta, w: &mut dyn Write) -> Result<()> {
    let log = telemetry::report();
    let _s = log.span(&ReportPhase::Render).entered();
    session.emitter.emit_to(report, Some(meta), w).context("write output")
}

async fn load_with_retry<S: SubscriptionSource>(session: &Session<S>) -> Result<(Vec<SubscriptionRecord>, u64)> {
    let log = telemetry::report();
    let mut attempt: u32 = 0;
    loop {
        let outcome = {
            let _s = log.span_kv(&ReportPhase::Fetch, [("attempt", attempt.to_string())]).entered();
            session.loader.load_next().await
        };
        match outcome {
            LoadOutcome::Fresh { ticket, records } => return Ok((records, ticket.seq())),
            LoadOutcome::Failed { ticket, error } => {
                log.error_kv("❌ Failed to load subscriptions", [
                    ("seq", ticket.seq().to_string()),
                    ("kind", error.kind().to_string()),
                    ("error", error.to_string()),
                ]);
                if attempt < session.retry.retries {
                    attempt += 1;
                    continue;
                }
                if session.retry.interactive && ask_retry().await? {
                    attempt += 1;
                    continue;
                }
                return Err(anyhow::Error::new(error).context("Failed to load subscriptions"));
            }
            // loads here never overlap, but a stale answer is simply ignored
            LoadOutcome::Stale { ticket, newest } => {
                log.debug(format!("dropping stale response #{} (newest #{})", ticket.seq(), newest));
            }
        }
    }
}

async fn ask_retry() -> Result<bool> {
    tokio::task::spawn_blocking(|| -> Result<bool> {
        let mut err = io::stderr();
        write!(err, "Try again? [y/N] ")?;
        err.flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    })
    .await
    .context("retry prompt")?
}

/// Reload on a timer and re-render the summary. Reloads may overlap when the
/// source is slow; only the newest settled response is rendered.
pub async fn watch<S>(session: Session<S>, cmd: WatchCmd, w: &mut dyn Write) -> Result<()>
where
    S: SubscriptionSource + 'static,
{
    let log = telemetry::watch();
    let _g = log.root_span_kv([
        ("interval", cmd.interval.to_string()),
        ("days", cmd.days.to_string()),
        ("count", format!("{:?}", cmd.count)),
    ]).entered();

    let Session { loader, emitter, today, .. } = session;
    let loader = Arc::new(loader);
    let (tx, mut rx) = mpsc::unbounded_channel::<(LoadOutcome, Instant)>();
    let mut ticker = tokio::time::interval(Duration::from_secs(cmd.interval.max(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut rendered: u32 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let _s = log.span(&WatchPhase::Tick).entered();
                let ticket = loader.begin();
                log.debug(format!("reload #{}", ticket.seq()));
                let l = loader.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let started = Instant::now();
                    let outcome = l.load(ticket).await;
                    let _ = tx.send((outcome, started));
                });
            }
            Some((outcome, started)) = rx.recv() => {
                let _s = log.span(&WatchPhase::Settle).entered();
                match outcome {
                    LoadOutcome::Fresh { ticket, records } => {
                        let elapsed = started.elapsed().as_millis();
                        log.loaded(records.len(), ticket.seq(), elapsed);
                        let now = today.unwrap_or_else(|| Local::now().date_naive());
                        let dash = Dashboard::compute(records, cmd.days, now);
                        let meta = Meta { duration_ms: Some(elapsed), request_seq: Some(ticket.seq()) };
                        let _r = log.span(&WatchPhase::Render).entered();
                        if rendered > 0 {
                            emitter.separate(w).context("write output")?;
                        }
                        emitter.emit_to(&Report::Summary(&dash), Some(meta), w).context("write output")?;
                        rendered += 1;
                        if cmd.count.is_some_and(|n| rendered >= n) {
                            break;
                        }
                    }
                    LoadOutcome::Failed { ticket, error } => {
                        log.warn_kv("⚠️ Failed to load subscriptions; retrying on next tick", [
                            ("seq", ticket.seq().to_string()),
                            ("kind", error.kind().to_string()),
                            ("error", error.to_string()),
                        ]);
                    }
                    LoadOutcome::Stale { ticket, newest } => {
                        log.debug(format!("dropping stale response #{} (newest #{})", ticket.seq(), newest));
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log.info("👋 Stopping watch");
                break;
            }
        }
    }
    Ok(())
}
