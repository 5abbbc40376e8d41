pub mod config;
pub mod ctx;
pub mod ops;

use ctx::LogCtx;

// Factory helpers, one per command family
pub fn report() -> LogCtx<ops::report::Report> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn watch() -> LogCtx<ops::watch::Watch> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
