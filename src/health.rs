//! Health-check handlers.
//!
//! | Probe | Path | Answers |
//! |---|---|---|
//! | Liveness | `/healthz` | the process can serve HTTP at all |
//! | Readiness | `/readyz` | the app finished startup and may take traffic |
//!
//! The app registers both next to its own routes; neither touches request
//! data, so they never fail validation.

use serde_json::json;

use crate::{Json, Request};

/// Always `200 {"status": "ok"}`.
pub async fn liveness(_req: Request) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// `200 {"status": "ready"}`. Routes and the people registry are built before
/// the listener binds, so a process that answers is ready.
pub async fn readiness(_req: Request) -> Json<serde_json::Value> {
    Json(json!({ "status": "ready" }))
}
