use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use trexa_core::Error;

pub trait ErrorToResponse: Serialize {
    fn to_response(&self, code: StatusCode) -> Response {
        let mut r = Json(self).into_response();
        *r.status_mut() = code;
        r
    }
}

#[derive(Serialize)]
pub struct JsonError {
    message: String,
}

impl JsonError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl ErrorToResponse for JsonError {}

/// `{status: "error", message}` body used by the indexing and graph routes.
#[derive(Serialize)]
pub struct StatusError {
    status: &'static str,
    message: String,
}

impl StatusError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { status: "error", message: message.into() }
    }
}

impl ErrorToResponse for StatusError {}

pub fn status_code(err: &Error) -> StatusCode {
    match err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::UnsupportedFormat(_) | Error::InvalidConfig(_) => StatusCode::BAD_REQUEST,
        Error::NotInitialized => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
