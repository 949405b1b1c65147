//! Schemas: declarative descriptions of an expected data shape.
//!
//! Parsing and rule checking are delegated to `serde` (shape) and
//! `validator` (field rules). A schema turns a raw JSON value into a typed
//! value or a list of [`FieldError`]s, one per offending field.
//!
//! ```ignore
//! #[derive(Deserialize, Serialize, Validate)]
//! struct Greeting {
//!     #[validate(length(min = 1))]
//!     name: String,
//! }
//!
//! let route = create_route()
//!     .input(validated::<Greeting>())
//!     .output(typed::<String>())
//!     .handler(|g: Greeting| async move { Ok::<_, anyhow::Error>(format!("Hello, {}!", g.name)) });
//! ```

use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::response::FieldError;

/// Key `validator` uses for struct-level (schema function) errors.
const STRUCT_LEVEL_KEY: &str = "__all__";

const REQUIRED_MESSAGE: &str = "This field is required";
const UNKNOWN_FIELD_MESSAGE: &str = "Unknown field";

/// Upper bound on deserialization passes while collecting shape errors.
const MAX_SHAPE_PASSES: usize = 128;

/// Parses raw JSON into a typed value, reporting field-level errors.
pub trait Schema: Send + Sync + 'static {
    type Output: Send + 'static;

    fn parse(&self, value: Value) -> Result<Self::Output, Vec<FieldError>>;
}

// ---------------------------------------------------------------------------
// Any
// ---------------------------------------------------------------------------

/// Accepts every value unchanged. Default for unset builder slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct Any;

impl Schema for Any {
    type Output = Value;

    fn parse(&self, value: Value) -> Result<Value, Vec<FieldError>> {
        Ok(value)
    }
}

pub fn any() -> Any {
    Any
}

// ---------------------------------------------------------------------------
// Typed
// ---------------------------------------------------------------------------

/// Shape check through `serde` deserialization into `T`.
///
/// Every missing, unknown or mistyped field is reported under its full
/// path, not just the first one serde trips over.
pub struct Typed<T>(PhantomData<fn() -> T>);

impl<T> Typed<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Typed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Typed<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Typed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Typed<{}>", std::any::type_name::<T>())
    }
}

impl<T> Schema for Typed<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = T;

    fn parse(&self, value: Value) -> Result<T, Vec<FieldError>> {
        deserialize_all(value).map_err(|shape| into_field_errors(shape.errors))
    }
}

pub fn typed<T>() -> Typed<T> {
    Typed::new()
}

// ---------------------------------------------------------------------------
// Validated
// ---------------------------------------------------------------------------

/// [`Typed`] followed by `validator` rules declared on `T`.
///
/// Rules still run when some fields have shape errors; a rule violation is
/// only dropped when its field already carries a shape error.
pub struct Validated<T>(PhantomData<fn() -> T>);

impl<T> Validated<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Validated<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Validated<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Validated<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validated<{}>", std::any::type_name::<T>())
    }
}

impl<T> Schema for Validated<T>
where
    T: DeserializeOwned + Validate + Send + 'static,
{
    type Output = T;

    fn parse(&self, value: Value) -> Result<T, Vec<FieldError>> {
        match deserialize_all::<T>(value) {
            Ok(data) => match data.validate() {
                Ok(()) => Ok(data),
                Err(errors) => Err(field_errors(&errors)),
            },
            Err(ShapeErrors {
                mut errors,
                repaired,
            }) => {
                if let Some(Err(rule_errors)) = repaired.map(|data| data.validate()) {
                    let mut rules = Vec::new();
                    flatten(&rule_errors, &[], &mut rules);
                    rules.retain(|rule| !errors.iter().any(|shape| rule.path.starts_with(&shape.path)));
                    errors.extend(rules);
                }
                Err(into_field_errors(errors))
            }
        }
    }
}

pub fn validated<T>() -> Validated<T> {
    Validated::new()
}

// ---------------------------------------------------------------------------
// Field paths
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Segment {
    Key(String),
    Index(usize),
}

type FieldPath = Vec<Segment>;

/// An error located by path; the empty path is the whole body.
#[derive(Debug)]
struct PathError {
    path: FieldPath,
    message: String,
}

/// `address.city`, `items[1].label`; `None` for the whole body.
fn render(path: &[Segment]) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let mut out = String::new();
    for segment in path {
        match segment {
            Segment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            Segment::Index(index) => {
                let _ = write!(out, "[{index}]");
            }
        }
    }
    Some(out)
}

/// Order by path (list indices numerically) and render.
fn into_field_errors(mut errors: Vec<PathError>) -> Vec<FieldError> {
    errors.sort_by(|a, b| a.path.cmp(&b.path));
    errors
        .into_iter()
        .map(|error| FieldError {
            field: render(&error.path),
            message: error.message,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Shape errors
// ---------------------------------------------------------------------------

struct ShapeErrors<T> {
    errors: Vec<PathError>,
    /// The input with every offending value patched, when patching got far
    /// enough to produce a `T`.
    repaired: Option<T>,
}

enum Repair {
    Remove,
    Replace,
}

struct Failure {
    path: FieldPath,
    message: String,
    repair: Repair,
}

/// Deserialize `value`, recording each error under its path and patching
/// the offending value so the next pass can reach the remaining fields.
///
/// Errors at or below an already recorded path are patched silently.
fn deserialize_all<T: DeserializeOwned>(value: Value) -> Result<T, ShapeErrors<T>> {
    let mut working = value;
    let mut errors: Vec<PathError> = Vec::new();
    let mut attempts: HashMap<FieldPath, usize> = HashMap::new();

    for _ in 0..MAX_SHAPE_PASSES {
        let result: Result<T, _> = serde_path_to_error::deserialize(working.clone());
        let err = match result {
            Ok(data) if errors.is_empty() => return Ok(data),
            Ok(data) => {
                return Err(ShapeErrors {
                    errors,
                    repaired: Some(data),
                })
            }
            Err(err) => err,
        };

        let failure = classify(&err);
        if !errors.iter().any(|e| failure.path.starts_with(&e.path)) {
            errors.push(PathError {
                path: failure.path.clone(),
                message: failure.message,
            });
        }

        let patched = match failure.repair {
            Repair::Remove => remove_at(&mut working, &failure.path),
            Repair::Replace => {
                let tried = attempts.entry(failure.path.clone()).or_insert(0);
                let candidate = placeholder(*tried);
                *tried += 1;
                candidate.is_some_and(|v| set_at(&mut working, &failure.path, v))
            }
        };
        if !patched {
            break;
        }
    }

    Err(ShapeErrors {
        errors,
        repaired: None,
    })
}

fn classify(err: &serde_path_to_error::Error<serde_json::Error>) -> Failure {
    let mut path: FieldPath = err
        .path()
        .iter()
        .filter_map(|segment| match segment {
            serde_path_to_error::Segment::Seq { index } => Some(Segment::Index(*index)),
            serde_path_to_error::Segment::Map { key } => Some(Segment::Key(key.clone())),
            serde_path_to_error::Segment::Enum { variant } => Some(Segment::Key(variant.clone())),
            serde_path_to_error::Segment::Unknown => None,
        })
        .collect();
    let message = err.inner().to_string();

    // Missing fields are reported against their struct.
    if let Some(field) = backticked(&message, "missing field `") {
        path.push(Segment::Key(field.to_string()));
        return Failure {
            path,
            message: REQUIRED_MESSAGE.to_string(),
            repair: Repair::Replace,
        };
    }
    if let Some(field) = backticked(&message, "unknown field `") {
        let key = Segment::Key(field.to_string());
        if path.last() != Some(&key) {
            path.push(key);
        }
        return Failure {
            path,
            message: UNKNOWN_FIELD_MESSAGE.to_string(),
            repair: Repair::Remove,
        };
    }
    Failure {
        path,
        message,
        repair: Repair::Replace,
    }
}

fn backticked<'a>(message: &'a str, prefix: &str) -> Option<&'a str> {
    message.strip_prefix(prefix)?.split('`').next()
}

/// Stand-ins tried in turn for a missing or mistyped value.
fn placeholder(attempt: usize) -> Option<Value> {
    let value = match attempt {
        0 => Value::Null,
        1 => Value::String(String::new()),
        2 => Value::from(0),
        3 => Value::Bool(false),
        4 => Value::Array(Vec::new()),
        5 => Value::Object(Map::new()),
        _ => return None,
    };
    Some(value)
}

fn slot<'a>(root: &'a mut Value, path: &[Segment]) -> Option<&'a mut Value> {
    path.iter().try_fold(root, |node, segment| match segment {
        Segment::Key(key) => node.as_object_mut()?.get_mut(key),
        Segment::Index(index) => node.as_array_mut()?.get_mut(*index),
    })
}

fn set_at(root: &mut Value, path: &[Segment], value: Value) -> bool {
    let Some((last, parent)) = path.split_last() else {
        *root = value;
        return true;
    };
    let Some(parent) = slot(root, parent) else {
        return false;
    };
    match last {
        Segment::Key(key) => match parent.as_object_mut() {
            Some(map) => {
                map.insert(key.clone(), value);
                true
            }
            None => false,
        },
        Segment::Index(index) => match parent.as_array_mut().and_then(|items| items.get_mut(*index)) {
            Some(item) => {
                *item = value;
                true
            }
            None => false,
        },
    }
}

fn remove_at(root: &mut Value, path: &[Segment]) -> bool {
    let Some((Segment::Key(key), parent)) = path.split_last() else {
        return false;
    };
    slot(root, parent)
        .and_then(Value::as_object_mut)
        .is_some_and(|map| map.remove(key).is_some())
}

// ---------------------------------------------------------------------------
// Rule errors
// ---------------------------------------------------------------------------

/// Flatten `validator` errors into one [`FieldError`] per violated field,
/// ordered by field path.
///
/// Nested structs produce dotted paths (`address.city`), lists produce
/// indexed paths (`items[1].label`). When a field breaks several rules only
/// the first is reported.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    flatten(errors, &[], &mut out);
    into_field_errors(out)
}

fn flatten(errors: &ValidationErrors, prefix: &[Segment], out: &mut Vec<PathError>) {
    for (field, kind) in errors.errors() {
        let name = field.to_string();
        let mut path = prefix.to_vec();
        if name != STRUCT_LEVEL_KEY {
            path.push(Segment::Key(name));
        }

        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(first) = list.first() {
                    out.push(PathError {
                        path,
                        message: describe(first),
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    let mut item = path.clone();
                    item.push(Segment::Index(*index));
                    flatten(inner, &item, out);
                }
            }
        }
    }
}

/// Human-readable message for a rule violation.
fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    let min = error.params.get("min");
    let max = error.params.get("max");

    match &*error.code {
        "required" => REQUIRED_MESSAGE.to_string(),
        "email" => "Must be a valid email address".to_string(),
        "url" => "Must be a valid URL".to_string(),
        "length" => match (error.params.get("equal"), min, max) {
            (Some(equal), _, _) => format!("Must have a length of exactly {equal}"),
            (None, Some(min), Some(max)) => format!("Must have a length between {min} and {max}"),
            (None, Some(min), None) => format!("Must have a length of at least {min}"),
            (None, None, Some(max)) => format!("Must have a length of at most {max}"),
            (None, None, None) => "Has an invalid length".to_string(),
        },
        "range" => match (min, max) {
            (Some(min), Some(max)) => format!("Must be between {min} and {max}"),
            (Some(min), None) => format!("Must be at least {min}"),
            (None, Some(max)) => format!("Must be at most {max}"),
            (None, None) => "Is out of range".to_string(),
        },
        code => format!("Failed the `{code}` check"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
