//! # persona
//!
//! A small people API on a minimal hyper framework.
//!
//! ## The framework half
//!
//! - Radix-tree routing, one tree per method, via [`matchit`]
//! - HTTP/1.1 and HTTP/2 through hyper, graceful shutdown on SIGTERM / Ctrl-C
//! - Buffered request bodies with JSON, URL-encoded and multipart decoding
//! - Declarative validation: every input type owns a [`validation::Schema`],
//!   and every violation in a request comes back in one `422`
//!
//! ## The API half
//!
//! Person, location, login, contact and upload routes; see [`api`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use persona::{Config, Server, api};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), persona::Error> {
//!     let config = Config::load()?;
//!     Server::bind(config.socket_addr()?).serve(api::app(&config)).await
//! }
//! ```

mod error;
mod handler;
mod middleware;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod config;
pub mod health;
pub mod logging;
pub mod multipart;
pub mod query;
pub mod validation;

pub use config::Config;
pub use error::{ApiError, Error};
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::{Server, shutdown_signal};
pub use status::Status;
