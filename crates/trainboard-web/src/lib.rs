#![forbid(unsafe_code)]

//! Browser host boundary for trainboard.
//!
//! # Role in trainboard
//! `trainboard-web` is the only crate a browser host talks to. It turns the
//! DOM's two drag vocabularies (native drag-and-drop and raw touch) plus
//! layout measurements into engine calls, and answers with what the host must
//! do next.
//!
//! # Primary responsibilities
//! - **Input parsing**: [`input::parse_host_event`] decodes one JSON event.
//! - **Routing**: [`session::WebSession`] owns the builder and both gesture
//!   sources and returns a [`session::HostResponse`] per event.
//! - **Logging**: [`logging::init`] installs a `tracing` subscriber.
//!
//! # How it fits in the system
//! Everything stateful lives in `trainboard-schedule`; this crate holds no
//! rules of its own beyond the wire format.

pub mod input;
pub mod logging;
pub mod session;

pub use input::{HostClock, HostEvent, InputParseError, LayoutSnapshot, parse_host_event};
pub use session::{HostResponse, HostTimer, PreviewView, WebSession};
