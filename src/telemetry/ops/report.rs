use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Report;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Fetch, Aggregate, Render }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Fetch => "fetch",
        Phase::Aggregate => "aggregate",
        Phase::Render => "render",
    }}
    fn span(&self) -> Span { match self {
        Phase::Fetch => info_span!("fetch"),
        Phase::Aggregate => info_span!("aggregate"),
        Phase::Render => info_span!("render"),
    }}
}

impl OpMarker for Report {
    const NAME: &'static str = "report";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("report") }
}
