use std::io::{self, Write};

use super::config::{OutputConfig, OutputFormat};
use super::render::{render_report, Style};
use super::types::{Envelope, Meta, Report};

pub trait Presenter: Send + Sync {
    fn emit(&self, report: &Report<'_>, meta: Option<Meta>, w: &mut dyn Write) -> io::Result<()>;
    /// Whether each emitted report is a single machine-readable line.
    fn line_delimited(&self) -> bool { false }
}

pub struct JsonPresenter { pub pretty: bool }
impl Presenter for JsonPresenter {
    fn emit(&self, report: &Report<'_>, meta: Option<Meta>, w: &mut dyn Write) -> io::Result<()> {
        let env = Envelope::result(report.op(), report, meta).map_err(to_io)?;
        if self.pretty { serde_json::to_writer_pretty(&mut *w, &env).map_err(to_io)? } else { serde_json::to_writer(&mut *w, &env).map_err(to_io)? }
        writeln!(w)
    }

    fn line_delimited(&self) -> bool { !self.pretty }
}

pub struct TextPresenter { pub style: Style }
impl Presenter for TextPresenter {
    fn emit(&self, report: &Report<'_>, _meta: Option<Meta>, w: &mut dyn Write) -> io::Result<()> {
        render_report(report, self.style, w)
    }
}

pub struct Emitter {
    presenter: Box<dyn Presenter>,
}

impl Emitter {
    pub fn from_config(cfg: OutputConfig) -> Self {
        let presenter: Box<dyn Presenter> = match cfg.format {
            OutputFormat::Json => Box::new(JsonPresenter { pretty: cfg.pretty }),
            OutputFormat::Text => Box::new(TextPresenter { style: Style { color: cfg.color } }),
        };
        Emitter { presenter }
    }

    /// Blank line between successive reports, for human-readable output only.
    pub fn separate(&self, w: &mut dyn Write) -> io::Result<()> {
        if self.presenter.line_delimited() { Ok(()) } else { writeln!(w) }
    }

    pub fn emit_to(&self, report: &Report<'_>, meta: Option<Meta>, w: &mut dyn Write) -> io::Result<()> {
        self.presenter.emit(report, meta, w)?;
        w.flush()
    }
}

fn to_io(e: serde_json::Error) -> io::Error { io::Error::other(e) }
