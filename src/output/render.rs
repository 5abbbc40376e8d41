// Plain-text dashboard: summary cards, the action list and the subscription table.
// Formatting only; every number shown comes precomputed from the Dashboard.

use std::io::{self, Write};

use crate::aggregate::Dashboard;
use crate::record::{Status, SubscriptionRecord};

use super::types::Report;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Success,
    Info,
    Warning,
    Neutral,
}

impl Tone {
    fn ansi(&self) -> &'static str {
        match self {
            Tone::Success => "\x1b[32m",
            Tone::Info => "\x1b[36m",
            Tone::Warning => "\x1b[33m",
            Tone::Neutral => "\x1b[2m",
        }
    }
}

pub fn status_tone(status: &Status) -> Tone {
    match status {
        Status::Active => Tone::Success,
        Status::Trial => Tone::Info,
        Status::Cancelled | Status::Other(_) => Tone::Neutral,
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Style {
    pub color: bool,
}

impl Style {
    fn paint(&self, tone: Tone, s: &str) -> String {
        if self.color { format!("{}{}\x1b[0m", tone.ansi(), s) } else { s.to_string() }
    }
}

pub fn render_report(report: &Report<'_>, style: Style, w: &mut dyn Write) -> io::Result<()> {
    match report {
        Report::Summary(dash) => render_summary(dash, style, w),
        Report::Upcoming { as_of, window_days, records } => {
            writeln!(w, "Due Soon ({}) — next {} days from {}", records.len(), window_days, as_of)?;
            render_table(records, style, w)
        }
        Report::Actions { records } => {
            render_actions(records, style, w)?;
            if records.is_empty() {
                writeln!(w, "Nothing needs attention.")?;
            }
            Ok(())
        }
        Report::List { records } => {
            writeln!(w, "All Subscriptions ({})", records.len())?;
            render_table(records, style, w)
        }
    }
}

fn render_summary(dash: &Dashboard, style: Style, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "Subscription Tracker — as of {}", dash.as_of)?;
    writeln!(w, "Never miss a renewal")?;
    writeln!(w)?;

    let cards = [
        ("Monthly", money(dash.monthly_cost, 2), format!("{} equivalent", display_currency(&dash.records))),
        ("Yearly", money(dash.yearly_cost, 0), "Projected cost".to_string()),
        ("Active", dash.active_count.to_string(), "Subscriptions".to_string()),
        ("Due Soon", dash.upcoming.len().to_string(), format!("Next {} days", dash.window_days)),
    ];
    let value_w = cards.iter().map(|(_, v, _)| v.chars().count()).max().unwrap_or(0);
    for (label, value, caption) in &cards {
        writeln!(w, "  {:<10}{:>vw$}   {}", label, value, caption, vw = value_w)?;
    }
    writeln!(w)?;

    if !dash.action_needed.is_empty() {
        render_actions(&dash.action_needed, style, w)?;
        writeln!(w)?;
    }

    writeln!(w, "All Subscriptions ({})", dash.records.len())?;
    render_table(&dash.records, style, w)
}

fn render_actions(records: &[SubscriptionRecord], style: Style, w: &mut dyn Write) -> io::Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    writeln!(w, "{}", style.paint(Tone::Warning, "! Action Required"))?;
    for r in records {
        let price = format!("{} {}", plain_money(r.cost), r.billing_cycle);
        if r.notes.is_empty() {
            writeln!(w, "  - {}  ({})", r.name, price)?;
        } else {
            writeln!(w, "  - {}  ({})  {}", r.name, price, r.notes)?;
        }
    }
    Ok(())
}

fn render_table(records: &[SubscriptionRecord], style: Style, w: &mut dyn Write) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(w, "  (none)");
    }
    let header = ["Service", "Category", "Cost", "Status", "Next Renewal"];
    let rows: Vec<[String; 5]> = records
        .iter()
        .map(|r| {
            [
                r.name.clone(),
                r.category.clone(),
                format!("{} {}", plain_money(r.cost), r.billing_cycle),
                format!("[{}]", r.status),
                if r.next_renewal.is_empty() { "—".to_string() } else { r.next_renewal.clone() },
            ]
        })
        .collect();

    let mut widths = header.map(|h| h.chars().count());
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let head: Vec<String> = header.iter().enumerate().map(|(i, h)| pad(h, widths[i])).collect();
    writeln!(w, "  {}", head.join("  ").trim_end())?;
    for (row, rec) in rows.iter().zip(records) {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let padded = pad(cell, widths[i]);
                // pad first so escape codes don't skew the column
                if i == 3 { style.paint(status_tone(&rec.status), &padded) } else { padded }
            })
            .collect();
        writeln!(w, "  {}", cells.join("  ").trim_end())?;
    }
    Ok(())
}

fn pad(s: &str, width: usize) -> String {
    let n = s.chars().count();
    format!("{}{}", s, " ".repeat(width.saturating_sub(n)))
}

fn money(amount: f64, decimals: usize) -> String {
    format!("${:.*}", decimals, amount)
}

// Record costs are shown as entered: 15 -> "$15", 11.99 -> "$11.99".
fn plain_money(amount: f64) -> String {
    format!("${}", amount)
}

/// Single currency code when every record agrees, otherwise "mixed currency".
fn display_currency(records: &[SubscriptionRecord]) -> String {
    let mut codes = records.iter().map(|r| r.currency.as_str());
    match codes.next() {
        None => crate::record::DEFAULT_CURRENCY.to_string(),
        Some(first) if codes.all(|c| c == first) => first.to_string(),
        Some(_) => "mixed currency".to_string(),
    }
}
