use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Watch;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Tick, Settle, Render }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::Tick => "tick", Phase::Settle => "settle", Phase::Render => "render" } }
    fn span(&self) -> Span { match self { Phase::Tick => info_span!("tick"), Phase::Settle => info_span!("settle"), Phase::Render => info_span!("render") } }
}

impl OpMarker for Watch {
    const NAME: &'static str = "watch";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("watch") }
}
