use std::borrow::Cow;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use poshpoule_api_types::ErrorResponse;

use crate::application::error::ErrorReport;
use crate::infra::store::StoreError;

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const DUPLICATE: &str = "duplicate";
    pub const NOT_FOUND: &str = "not_found";
    pub const CONFLICT: &str = "conflict";
    pub const STORAGE: &str = "storage_error";
}

const SOURCE: &str = "infra::http::api";

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: Cow<'static, str>,
    report: ErrorReport,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: impl Into<Cow<'static, str>>,
        detail: Option<String>,
    ) -> Self {
        let message = message.into();
        let report = ErrorReport::from_message(
            SOURCE,
            status,
            format!("{code}: {}", detail.as_deref().unwrap_or(&message)),
        );
        Self {
            status,
            code,
            message,
            report,
        }
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, None)
    }

    pub fn invalid_input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::INVALID_INPUT, message, None)
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message, None)
    }

    /// Clients see a generic message; the full cause chain goes to the log.
    pub fn storage(err: &StoreError) -> Self {
        let (status, code, message) = if err.is_conflict() {
            (
                StatusCode::CONFLICT,
                codes::CONFLICT,
                "Data changed while the request was processed; retry",
            )
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::STORAGE,
                "Internal server error",
            )
        };
        Self {
            status,
            code,
            message: Cow::Borrowed(message),
            report: ErrorReport::from_error(SOURCE, status, err),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message.into_owned(),
            code: Some(self.code.to_string()),
        };
        let mut response = (self.status, Json(body)).into_response();
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(super::NO_STORE),
        );
        // Attach a structured report so shared logging middleware can emit rich diagnostics.
        self.report.attach(&mut response);
        response
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            codes::BAD_REQUEST,
            "Request body must be valid JSON",
            Some(rejection.body_text()),
        )
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            codes::BAD_REQUEST,
            "Invalid query parameters",
            Some(rejection.body_text()),
        )
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            codes::BAD_REQUEST,
            "Invalid path parameter",
            Some(rejection.body_text()),
        )
    }
}
