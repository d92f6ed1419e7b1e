//! Middleware layer.
//!
//! Cross-cutting concerns that wrap every dispatched request. The server
//! applies them in a fixed order around route lookup and the handler call;
//! there is no user-configurable stack.
//!
//! - [`trace`]: per-request span with method and path, plus one event with
//!   status and latency when the response is ready

mod trace;

pub(crate) use trace::trace;
