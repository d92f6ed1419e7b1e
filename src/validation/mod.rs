//! Declarative input validation.
//!
//! Each input type owns a static [`Schema`]: an ordered list of [`Field`]s,
//! each a name, a [`Rule`] and a required flag. One shared routine walks the
//! schema against the raw input (a JSON object or string lookups from a
//! query string, form or path) and collects every violation before the typed
//! value is built, so a handler either gets a fully valid value or the caller
//! gets a `422` listing all offending fields.
//!
//! ```rust
//! use persona::validation::{Field, Rule, Schema, Validated};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Signup { name: String, age: i64 }
//!
//! static SIGNUP: Schema = Schema::new(&[
//!     Field::required("name", Rule::text(1, 50)),
//!     Field::required("age", Rule::int(0, 120)),
//! ]);
//!
//! impl Validated for Signup {
//!     fn schema() -> &'static Schema { &SIGNUP }
//! }
//! ```

mod rules;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;

pub use rules::{Rule, is_valid_email};

// ── Errors ────────────────────────────────────────────────────────────────────

/// One violated constraint. `field` is the dotted location, e.g. `body.age`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every violation found in one request. Serializes as `{"errors": [...]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self { Self::default() }

    /// Shorthand for a single-violation error.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError { field: field.into(), message: message.into() });
    }

    pub fn extend(&mut self, other: Self) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool { self.errors.is_empty() }
    pub fn len(&self) -> usize { self.errors.len() }
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> { self.errors.iter() }
}

impl IntoResponse for ValidationErrors {
    fn into_response(self) -> Response {
        (Status::UnprocessableContent, Json(self)).into_response()
    }
}

// ── Schema ────────────────────────────────────────────────────────────────────

/// One named field and its constraint.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    pub name: &'static str,
    pub rule: Rule,
    pub required: bool,
}

impl Field {
    pub const fn required(name: &'static str, rule: Rule) -> Self {
        Self { name, rule, required: true }
    }

    pub const fn optional(name: &'static str, rule: Rule) -> Self {
        Self { name, rule, required: false }
    }
}

/// The declared shape of one input type.
#[derive(Debug)]
pub struct Schema {
    fields: &'static [Field],
}

impl Schema {
    pub const fn new(fields: &'static [Field]) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &'static [Field] { self.fields }

    /// Checks a JSON value, which must be an object. `null` counts as absent.
    pub fn check_json(&self, loc: &str, value: &Value, errors: &mut ValidationErrors) {
        let Some(object) = value.as_object() else {
            errors.push(loc, "value is not a valid object");
            return;
        };
        for field in self.fields {
            match object.get(field.name) {
                None | Some(Value::Null) => {
                    if field.required {
                        errors.push(path(loc, field.name), "field required");
                    }
                }
                Some(v) => {
                    if let Err(message) = field.rule.check_json(v) {
                        errors.push(path(loc, field.name), message);
                    }
                }
            }
        }
    }

    /// Checks string-valued inputs reached through `lookup`.
    pub fn check_text<'a>(
        &self,
        loc: &str,
        lookup: impl Fn(&str) -> Option<&'a str>,
        errors: &mut ValidationErrors,
    ) {
        for field in self.fields {
            match lookup(field.name) {
                None => {
                    if field.required {
                        errors.push(path(loc, field.name), "field required");
                    }
                }
                Some(raw) => {
                    if let Err(message) = field.rule.check_text(raw) {
                        errors.push(path(loc, field.name), message);
                    }
                }
            }
        }
    }
}

fn path(loc: &str, name: &str) -> String {
    format!("{loc}.{name}")
}

// ── Typed construction ────────────────────────────────────────────────────────

/// An input type with a declared [`Schema`].
pub trait Validated: DeserializeOwned {
    fn schema() -> &'static Schema;
}

/// Validates `value` against `T`'s schema and deserializes it. Violations are
/// appended to `errors` and `None` is returned; an absent value is reported as
/// a missing `loc`.
pub fn from_json<T: Validated>(
    loc: &str,
    value: Option<&Value>,
    errors: &mut ValidationErrors,
) -> Option<T> {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        errors.push(loc, "field required");
        return None;
    };
    let before = errors.len();
    T::schema().check_json(loc, value, errors);
    if errors.len() > before {
        return None;
    }
    deserialize(loc, value.clone(), errors)
}

/// Validates string inputs against `T`'s schema, coerces each present field
/// to the JSON type its rule expects, and deserializes the result.
pub fn from_text<'a, T: Validated>(
    loc: &str,
    lookup: impl Fn(&str) -> Option<&'a str>,
    errors: &mut ValidationErrors,
) -> Option<T> {
    let before = errors.len();
    T::schema().check_text(loc, &lookup, errors);
    if errors.len() > before {
        return None;
    }
    let object: Map<String, Value> = T::schema()
        .fields()
        .iter()
        .filter_map(|f| lookup(f.name).map(|raw| (f.name.to_owned(), f.rule.coerce(raw))))
        .collect();
    deserialize(loc, Value::Object(object), errors)
}

fn deserialize<T: DeserializeOwned>(
    loc: &str,
    value: Value,
    errors: &mut ValidationErrors,
) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            errors.push(loc, e.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Probe {
        name: String,
        age: i64,
        #[serde(default)]
        likes_tea: Option<bool>,
    }

    static PROBE: Schema = Schema::new(&[
        Field::required("name", Rule::text(1, 5)),
        Field::required("age", Rule::int(0, 120)),
        Field::optional("likes_tea", Rule::Boolean),
    ]);

    impl Validated for Probe {
        fn schema() -> &'static Schema { &PROBE }
    }

    #[test]
    fn collects_every_violation() {
        let mut errors = ValidationErrors::new();
        let out: Option<Probe> =
            from_json("body", Some(&json!({ "name": "toolong", "likes_tea": "x" })), &mut errors);
        assert!(out.is_none());
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["body.name", "body.age", "body.likes_tea"]);
    }

    #[test]
    fn null_optional_is_absent() {
        let mut errors = ValidationErrors::new();
        let out: Option<Probe> = from_json(
            "body",
            Some(&json!({ "name": "ana", "age": 3, "likes_tea": null })),
            &mut errors,
        );
        assert!(errors.is_empty());
        assert_eq!(out, Some(Probe { name: "ana".into(), age: 3, likes_tea: None }));
    }

    #[test]
    fn missing_value_is_reported_at_its_location() {
        let mut errors = ValidationErrors::new();
        let out: Option<Probe> = from_json("body.person", None, &mut errors);
        assert!(out.is_none());
        assert_eq!(errors, ValidationErrors::single("body.person", "field required"));
    }

    #[test]
    fn non_object_is_rejected() {
        let mut errors = ValidationErrors::new();
        let _: Option<Probe> = from_json("body", Some(&json!([1, 2])), &mut errors);
        assert_eq!(errors, ValidationErrors::single("body", "value is not a valid object"));
    }

    #[test]
    fn text_inputs_are_coerced() {
        let pairs = [("name", "ana"), ("age", "30"), ("likes_tea", "false")];
        let lookup = |k: &str| pairs.iter().find(|(n, _)| *n == k).map(|(_, v)| *v);
        let mut errors = ValidationErrors::new();
        let out: Option<Probe> = from_text("query", lookup, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(out, Some(Probe { name: "ana".into(), age: 30, likes_tea: Some(false) }));
    }

    #[test]
    fn serializes_as_errors_list() {
        let errors = ValidationErrors::single("path.person_id", "ensure this value is greater than 0");
        let res = errors.into_response();
        assert_eq!(res.status_code(), 422);
        let body: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(
            body,
            json!({ "errors": [{ "field": "path.person_id",
                                 "message": "ensure this value is greater than 0" }] })
        );
    }
}
