//! The people API: routes, models and the id registry.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET  | `/` | [`routes::home`] |
//! | POST | `/person/new` | [`routes::create_person`] |
//! | GET  | `/person/detail` | [`routes::show_person`] (deprecated) |
//! | GET  | `/person/detail/{person_id}` | [`routes::show_person_by_id`] |
//! | PUT  | `/person/{person_id}` | [`routes::update_person`] |
//! | POST | `/login` | [`routes::login`] |
//! | POST | `/contact` | [`routes::contact`] |
//! | POST | `/post-image` | [`routes::post_image`] |
//! | POST | `/post-images` | [`routes::post_images`] |
//! | GET  | `/healthz`, `/readyz` | [`health`](crate::health) |

pub mod models;
pub mod people;
pub mod routes;

use std::sync::Arc;

use crate::config::Config;
use crate::health;
use crate::request::Request;
use crate::router::Router;

use people::{InMemoryPeople, PeopleRepository};

/// Builds the router with the registry and body limit from `config`.
pub fn app(config: &Config) -> Router {
    router(Arc::new(InMemoryPeople::new(config.people.known_ids.iter().copied())))
        .with_body_limit(config.server.max_body_bytes)
}

/// Builds the router around any registry.
pub fn router(people: Arc<dyn PeopleRepository>) -> Router {
    Router::new()
        .get("/", routes::home)
        .post("/person/new", routes::create_person)
        .get("/person/detail", routes::show_person)
        .get("/person/detail/{person_id}", move |req: Request| {
            routes::show_person_by_id(req, Arc::clone(&people))
        })
        .put("/person/{person_id}", routes::update_person)
        .post("/login", routes::login)
        .post("/contact", routes::contact)
        .post("/post-image", routes::post_image)
        .post("/post-images", routes::post_images)
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness)
}
