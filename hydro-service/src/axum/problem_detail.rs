use crate::utils::{serde_status_code, serde_uri};
use axum::{
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, Default)]
pub struct ProblemConfig {
    pub include_internal: bool,
}

#[derive(Debug, Serialize)]
pub struct Problem {
    #[serde(rename = "status", serialize_with = "serde_status_code::serialize")]
    status: StatusCode,
    #[serde(rename = "type")]
    ty: &'static str,
    #[serde(rename = "instance", serialize_with = "serde_uri::serialize_opt")]
    instance: Option<Uri>,
    #[serde(rename = "detail")]
    detail: JsonValue,
}

impl Problem {
    pub fn new(status: StatusCode, ty: &'static str) -> Self {
        Problem {
            status,
            ty,
            instance: None,
            detail: JsonValue::Null,
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized")
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found")
    }

    pub fn internal_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "server_error")
    }

    pub fn with_type(self, ty: &'static str) -> Self {
        Self { ty, ..self }
    }

    pub fn with_instance<I: Into<Uri>>(self, instance: I) -> Self {
        Self {
            instance: Some(instance.into()),
            ..self
        }
    }

    pub fn with_detail<S: Serialize>(self, detail: S) -> Self {
        let detail = serde_json::to_value(detail).unwrap_or_else(|err| JsonValue::String(format!("{err}")));
        Self { detail, ..self }
    }

    pub fn with_detail_msg<S: ToString>(self, detail: S) -> Self {
        Self {
            detail: JsonValue::String(detail.to_string()),
            ..self
        }
    }

    pub fn with_confidential<FL, FF>(self, config: &ProblemConfig, minimal: FL, full: FF) -> Self
    where
        FL: FnOnce(Self) -> Self,
        FF: FnOnce(Self) -> Self,
    {
        if config.include_internal {
            full(self)
        } else {
            minimal(self)
        }
    }
}

/// Implementation of a Problem Details response for HTTP APIs, as defined
/// in [RFC-7807](https://datatracker.ietf.org/doc/html/rfc7807).
impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(&self)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}
