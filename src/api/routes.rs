//! Route handlers.
//!
//! Each handler pulls its inputs through the shared validators, folds every
//! violation into one [`ValidationErrors`], and only then does its work.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::api::models::{
    ContactForm, Location, LoginForm, LoginOut, Person, PersonDetailQuery, PersonIdPath,
    UploadReport,
};
use crate::api::people::PeopleRepository;
use crate::error::ApiError;
use crate::multipart::Part;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;
use crate::validation::{ValidationErrors, from_json, from_text};

pub const PERSON_NOT_FOUND: &str = "This person does not exist";

/// `GET /`
pub async fn home(_req: Request) -> Json<Value> {
    Json(json!({ "Hello": "World!" }))
}

/// `POST /person/new`: validate a person and echo it back without the password.
pub async fn create_person(req: Request) -> Result<Response, ApiError> {
    let mut errors = ValidationErrors::new();
    let body = req.json()?;
    let person: Option<Person> = from_json("body", Some(&body), &mut errors);
    let person = person.ok_or(errors)?;
    Ok((Status::Created, Json(person.public())).into_response())
}

/// `GET /person/detail?name=..&age=..`
///
/// Deprecated but still served; responses carry a `deprecation` header.
/// Without `name` the key is `"null"`.
pub async fn show_person(req: Request) -> Result<Response, ApiError> {
    let query = req.query();
    let mut errors = ValidationErrors::new();
    let detail: Option<PersonDetailQuery> = from_text("query", |k| query.get(k), &mut errors);
    let detail = detail.ok_or(errors)?;

    let key = detail.name.unwrap_or_else(|| "null".to_owned());
    let body = Json(json!({ key: detail.age })).into_response();
    Ok(body.with_header("deprecation", "true"))
}

/// `GET /person/detail/{person_id}`
///
/// The id is validated (`> 0`) before the registry is asked, so an id the
/// registry holds but the constraint rejects (`0`) answers `422`, not `200`.
pub async fn show_person_by_id(
    req: Request,
    people: Arc<dyn PeopleRepository>,
) -> Result<Json<Value>, ApiError> {
    let person_id = person_id(&req, &mut ValidationErrors::new())?;
    if !people.exists(person_id) {
        return Err(ApiError::NotFound(PERSON_NOT_FOUND.to_owned()));
    }
    Ok(Json(json!({ person_id.to_string(): "Succeed!" })))
}

/// `PUT /person/{person_id}` with body `{"person": {..}, "location": {..}}`.
///
/// Answers both objects merged into one mapping, password included.
pub async fn update_person(req: Request) -> Result<Json<Map<String, Value>>, ApiError> {
    let mut errors = ValidationErrors::new();
    let id_ok = person_id(&req, &mut errors).is_ok();

    let body = match req.json() {
        Ok(body) => body,
        Err(body_errors) => {
            errors.extend(body_errors);
            return Err(errors.into());
        }
    };
    let person: Option<Person> = from_json("body.person", body.get("person"), &mut errors);
    let location: Option<Location> = from_json("body.location", body.get("location"), &mut errors);

    let (Some(person), Some(location), true) = (person, location, id_ok) else {
        return Err(errors.into());
    };

    merge([serde_json::to_value(&person), serde_json::to_value(&location)]).map(Json)
}

/// Flattens serialized objects into one map, later keys winning. Anything
/// that failed to serialize, or is not an object, is an internal error.
fn merge<const N: usize>(
    parts: [serde_json::Result<Value>; N],
) -> Result<Map<String, Value>, ApiError> {
    let mut merged = Map::new();
    for part in parts {
        match part {
            Ok(Value::Object(fields)) => merged.extend(fields),
            Ok(other) => {
                return Err(ApiError::Internal(format!("expected an object, got {other}")));
            }
            Err(e) => return Err(ApiError::Internal(e.to_string())),
        }
    }
    Ok(merged)
}

/// `POST /login`: the password must be present and is otherwise ignored.
pub async fn login(req: Request) -> Result<Json<LoginOut>, ApiError> {
    let form = req.form()?;
    let mut errors = ValidationErrors::new();
    let login: Option<LoginForm> = from_text("form", |k| form.get(k), &mut errors);
    let login = login.ok_or(errors)?;
    Ok(Json(LoginOut::new(login.username)))
}

/// `POST /contact`: answers the caller's `User-Agent`, or `null`.
pub async fn contact(req: Request) -> Result<Json<Option<String>>, ApiError> {
    let form = req.form()?;
    let mut errors = ValidationErrors::new();
    let contact: Option<ContactForm> = from_text("form", |k| form.get(k), &mut errors);
    let contact = contact.ok_or(errors)?;

    let ads = req.cookie("ads");
    debug!(email = %contact.email, ads = ?ads, "contact form received");
    Ok(Json(req.header("user-agent").map(str::to_owned)))
}

/// `POST /post-image`: one file in field `image`.
pub async fn post_image(req: Request) -> Result<Json<UploadReport>, ApiError> {
    let parts = req.multipart()?;
    let image = files_named(&parts, "image")
        .next()
        .ok_or_else(|| ValidationErrors::single("form.image", "field required"))?;
    Ok(Json(UploadReport::from_part(image)))
}

/// `POST /post-images`: any number of files in field `images`, reported in
/// upload order.
pub async fn post_images(req: Request) -> Result<Json<Vec<UploadReport>>, ApiError> {
    let parts = req.multipart()?;
    let reports: Vec<UploadReport> =
        files_named(&parts, "images").map(UploadReport::from_part).collect();
    if reports.is_empty() {
        return Err(ValidationErrors::single("form.images", "field required").into());
    }
    Ok(Json(reports))
}

/// Validates the `person_id` path parameter. Violations are appended to
/// `errors`; the returned error carries everything collected so far.
fn person_id(req: &Request, errors: &mut ValidationErrors) -> Result<i64, ApiError> {
    let path: Option<PersonIdPath> = from_text("path", |k| req.param(k), errors);
    path.map(|p| p.person_id).ok_or_else(|| errors.clone().into())
}

fn files_named<'a>(parts: &'a [Part], name: &'a str) -> impl Iterator<Item = &'a Part> + 'a {
    parts.iter().filter(move |p| p.is_file() && p.name == name)
}
