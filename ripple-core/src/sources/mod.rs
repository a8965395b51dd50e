//! Root producers of an observable chain

mod create;
mod event_source;
mod interval;
mod just;

pub(crate) use create::Create;
pub(crate) use event_source::EventSource;
pub(crate) use interval::Interval;
pub(crate) use just::{Just, Terminal};
