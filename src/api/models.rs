//! Request and response models with their validation schemas.

use serde::{Deserialize, Serialize};

use crate::multipart::Part;
use crate::validation::{Field, Rule, Schema, Validated};

// ── Enumerations ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HairColor {
    White,
    Brown,
    Black,
    Red,
    Blonde,
}

impl HairColor {
    pub const NAMES: &'static [&'static str] = &["white", "brown", "black", "red", "blonde"];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Country {
    Colombia,
    Argentina,
    Brazil,
    UnitedStates,
    Mexico,
    Spain,
}

impl Country {
    pub const NAMES: &'static [&'static str] =
        &["colombia", "argentina", "brazil", "united_states", "mexico", "spain"];
}

// ── Person ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub age: u8,
    pub email: String,
    #[serde(default)]
    pub hair_color: Option<HairColor>,
    #[serde(default)]
    pub is_married: Option<bool>,
    pub password: String,
}

static PERSON: Schema = Schema::new(&[
    Field::required("first_name", Rule::text(1, 50)),
    Field::required("last_name", Rule::text(1, 50)),
    Field::required("age", Rule::int(0, 120)),
    Field::required("email", Rule::Email),
    Field::optional("hair_color", Rule::OneOf(HairColor::NAMES)),
    Field::optional("is_married", Rule::Boolean),
    Field::required("password", Rule::min_len(8)),
]);

impl Validated for Person {
    fn schema() -> &'static Schema { &PERSON }
}

impl Person {
    /// The response shape: everything but the password.
    pub fn public(&self) -> PersonOut<'_> {
        PersonOut {
            first_name: &self.first_name,
            last_name: &self.last_name,
            age: self.age,
            email: &self.email,
            hair_color: self.hair_color,
            is_married: self.is_married,
        }
    }
}

/// A [`Person`] without its password.
#[derive(Debug, Serialize)]
pub struct PersonOut<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub age: u8,
    pub email: &'a str,
    pub hair_color: Option<HairColor>,
    pub is_married: Option<bool>,
}

// ── Location ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub country: Country,
}

static LOCATION: Schema = Schema::new(&[
    Field::required("city", Rule::TEXT),
    Field::required("state", Rule::TEXT),
    Field::required("country", Rule::OneOf(Country::NAMES)),
]);

impl Validated for Location {
    fn schema() -> &'static Schema { &LOCATION }
}

// ── Query and path inputs ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PersonDetailQuery {
    #[serde(default)]
    pub name: Option<String>,
    pub age: String,
}

static PERSON_DETAIL_QUERY: Schema = Schema::new(&[
    Field::optional("name", Rule::text(1, 50)),
    Field::required("age", Rule::TEXT),
]);

impl Validated for PersonDetailQuery {
    fn schema() -> &'static Schema { &PERSON_DETAIL_QUERY }
}

#[derive(Debug, Deserialize)]
pub struct PersonIdPath {
    pub person_id: i64,
}

static PERSON_ID_PATH: Schema = Schema::new(&[Field::required("person_id", Rule::positive())]);

impl Validated for PersonIdPath {
    fn schema() -> &'static Schema { &PERSON_ID_PATH }
}

// ── Forms ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

static LOGIN_FORM: Schema = Schema::new(&[
    Field::required("username", Rule::text(1, 20)),
    Field::required("password", Rule::min_len(1)),
]);

impl Validated for LoginForm {
    fn schema() -> &'static Schema { &LOGIN_FORM }
}

#[derive(Debug, Serialize)]
pub struct LoginOut {
    pub username: String,
    pub message: String,
}

impl LoginOut {
    pub const DEFAULT_MESSAGE: &'static str = "Login successful";

    pub fn new(username: String) -> Self {
        Self { username, message: Self::DEFAULT_MESSAGE.to_owned() }
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
}

static CONTACT_FORM: Schema = Schema::new(&[
    Field::required("first_name", Rule::text(1, 30)),
    Field::required("last_name", Rule::text(1, 30)),
    Field::required("email", Rule::Email),
    Field::required("message", Rule::min_len(20)),
]);

impl Validated for ContactForm {
    fn schema() -> &'static Schema { &CONTACT_FORM }
}

// ── Uploads ───────────────────────────────────────────────────────────────────

/// What the upload routes report about one file. The bytes themselves are
/// dropped with the request.
#[derive(Debug, PartialEq, Serialize)]
pub struct UploadReport {
    pub filename: String,
    #[serde(rename = "content-type")]
    pub content_type: Option<String>,
    pub size_in_kb: f64,
}

impl UploadReport {
    pub fn from_part(part: &Part) -> Self {
        Self {
            filename: part.filename.clone().unwrap_or_default(),
            content_type: part.content_type.clone(),
            size_in_kb: kilobytes(part.size()),
        }
    }
}

/// `bytes / 1024`, rounded to two decimals. Exact halves go to the even
/// neighbour, so 128 bytes is `0.12` and 384 bytes is `0.38`.
pub fn kilobytes(bytes: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let kb = bytes as f64 / 1024.0;
    (kb * 100.0).round_ties_even() / 100.0
}
