//! How route handlers are stored and called.
//!
//! The router keeps handlers of many concrete types in one table, so each is
//! hidden behind `dyn ErasedHandler` and stored as an `Arc`:
//!
//! ```text
//! async fn home(req: Request) -> Json<Value> { … }   ← user writes this
//!        ↓ router.get("/", home)
//! home.into_boxed_handler()                          ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(home))                          ← stored as BoxedHandler
//!        ↓
//! handler.call(req) at request time                  ← one vtable dispatch
//!        ↓
//! Box::pin(async { home(req).await.into_response() })
//! ```
//!
//! Closures qualify too, which is how handlers receive shared collaborators:
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use persona::{Request, Response, Router};
//! let greeting = Arc::new(String::from("hi"));
//! Router::new().get("/", move |_req: Request| {
//!     let greeting = Arc::clone(&greeting);
//!     async move { Response::text(greeting.as_str().to_owned()) }
//! });
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// The future every stored handler returns, whatever its concrete type.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Object-safe face of a handler. Hidden rather than crate-private because
/// [`Handler::into_boxed_handler`] names it.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler:
///
/// ```text
/// Fn(Request) -> impl Future<Output = impl IntoResponse>
/// ```
///
/// Sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Holds a concrete handler `F` and bridges it to [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
