use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::fmt;
use validator::{Validate, ValidationErrors};

use crate::middleware::logging::{to_response, ApiError};

//non-empty, no surrounding whitespace
pub static NON_BLANK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S(.*\S)?$").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    Body,
    Params,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Body => write!(f, "body"),
            Location::Params => write!(f, "params"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamError {
    pub param: String,
    pub reason: String,
    pub location: Location,
}

pub fn format_param_errors(errors: &[ParamError]) -> String {
    let mut message = String::from("The parameters are not formatted properly\n\n");
    for error in errors {
        message.push_str(&format!(
            "- Parameter: **{}** - Reason: *{}* - Location: *{}*\n\n",
            error.param, error.reason, error.location
        ));
    }
    message
}

/// Flattens validator output into one entry per failed rule, sorted by field name.
pub fn param_errors(errors: &ValidationErrors, location: Location) -> Vec<ParamError> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.to_string().cmp(&b.to_string()));

    fields
        .into_iter()
        .flat_map(|(field, failures)| {
            failures.iter().map(move |failure| ParamError {
                param: field.to_string(),
                reason: failure
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| "Invalid value".into()),
                location,
            })
        })
        .collect()
}

pub fn unprocessable(errors: Vec<ParamError>) -> Response {
    let message = format_param_errors(&errors);
    to_response(
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": message
            })),
        ),
        Err(ApiError::ValidationFail(
            errors
                .iter()
                .map(|error| format!("{} ({})", error.param, error.location))
                .collect::<Vec<_>>()
                .join(", "),
        )),
    )
}

pub fn validate_params<T: Validate>(value: &T) -> Result<(), Response> {
    value
        .validate()
        .map_err(|errors| unprocessable(param_errors(&errors, Location::Params)))
}

/// Names the body fields serde could not read.
///
/// Each field is deserialized on its own, so its type error surfaces before any
/// missing-field error from the rest of the struct.
pub fn rejected_fields<T: DeserializeOwned>(
    object: &Map<String, Value>,
    err: &serde_json::Error,
) -> Vec<ParamError> {
    let mut params: Vec<String> = object
        .iter()
        .filter(|(key, value)| {
            let single = Map::from_iter([((*key).clone(), (*value).clone())]);
            serde_json::from_value::<T>(Value::Object(single))
                .err()
                .is_some_and(|err| missing_field(&err).is_none())
        })
        .map(|(key, _)| key.clone())
        .collect();

    if params.is_empty() {
        params.push(missing_field(err).unwrap_or_else(|| "body".into()));
    }
    params.sort();

    params
        .into_iter()
        .map(|param| ParamError {
            param,
            reason: "Invalid value".into(),
            location: Location::Body,
        })
        .collect()
}

fn missing_field(err: &serde_json::Error) -> Option<String> {
    err.to_string()
        .strip_prefix("missing field `")?
        .split('`')
        .next()
        .map(str::to_owned)
}

/// JSON body extractor that answers 422 instead of the framework's rejections.
///
/// A missing or non-object body is read as `{}` so absent fields are reported by name.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let object = match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(object)) => object,
            _ => Map::new(),
        };

        let payload: T = serde_json::from_value(Value::Object(object.clone()))
            .map_err(|err| unprocessable(rejected_fields::<T>(&object, &err)))?;

        payload
            .validate()
            .map_err(|errors| unprocessable(param_errors(&errors, Location::Body)))?;

        Ok(Self(payload))
    }
}
