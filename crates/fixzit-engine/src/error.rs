use crate::config::ConfigError;
use crate::engines::dispatch::AssignmentError;
use crate::engines::souq::buybox::BuyBoxError;
use crate::engines::souq::feed::FeedImportError;
use crate::engines::souq::repricer::RepricerError;
use crate::telemetry::TelemetryError;
use crate::tenancy::TenantScopeError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Repricer(RepricerError),
    BuyBox(BuyBoxError),
    Assignment(AssignmentError),
    Feed(FeedImportError),
    Tenant(TenantScopeError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Repricer(err) => write!(f, "repricer error: {}", err),
            AppError::BuyBox(err) => write!(f, "buy box error: {}", err),
            AppError::Assignment(err) => write!(f, "assignment error: {}", err),
            AppError::Feed(err) => write!(f, "feed import error: {}", err),
            AppError::Tenant(err) => write!(f, "tenant scope error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Repricer(err) => Some(err),
            AppError::BuyBox(err) => Some(err),
            AppError::Assignment(err) => Some(err),
            AppError::Feed(err) => Some(err),
            AppError::Tenant(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Feed(_) => StatusCode::BAD_REQUEST,
            AppError::Tenant(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Repricer(_)
            | AppError::BuyBox(_)
            | AppError::Assignment(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<RepricerError> for AppError {
    fn from(value: RepricerError) -> Self {
        Self::Repricer(value)
    }
}

impl From<AssignmentError> for AppError {
    fn from(value: AssignmentError) -> Self {
        Self::Assignment(value)
    }
}

impl From<FeedImportError> for AppError {
    fn from(value: FeedImportError) -> Self {
        Self::Feed(value)
    }
}

impl From<BuyBoxError> for AppError {
    fn from(value: BuyBoxError) -> Self {
        Self::BuyBox(value)
    }
}

impl From<TenantScopeError> for AppError {
    fn from(value: TenantScopeError) -> Self {
        Self::Tenant(value)
    }
}
