use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use mongodb::bson::document::ValueAccessError;
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;
use tracing::error;

#[derive(Debug, Serialize)]
pub enum ErrorKind {
    UnknownError,
    ConfigReadError,
    ConfigParseError,
    NotFound,
    InternalServer,
    BodyParsing,
    UnAuthorized,
    Forbidden,
    Conflict,
    BadRequest,
    AccountOrPassword,
    AccountNotActive,
    AccountUnassigned,
    AlreadyProcessed,
    ParseError,
    MongoDbValueAccessError,
    MongoDbBsonSerError,
    MongoDbOperateError,
    IOError,
    ReqwestError,
    OssError,
}

#[derive(Debug, Serialize)]
pub struct Error {
    kind: ErrorKind,
    details: Option<String>,
    #[serde(skip)]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    #[inline]
    pub fn new(
        kind: ErrorKind,
        details: impl Into<String>,
        source: impl StdError + 'static + Send + Sync,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
            details: Some(details.into()),
        }
    }

    #[inline]
    pub fn with_kind(kind: ErrorKind) -> Self {
        Self {
            kind,
            source: None,
            details: None,
        }
    }

    #[inline]
    pub fn with_details(kind: ErrorKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            source: None,
            details: Some(details.into()),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    #[inline]
    pub fn internal(error: impl StdError + 'static + Send + Sync) -> Self {
        Self {
            kind: ErrorKind::InternalServer,
            details: Some(error.to_string()),
            source: Some(Box::new(error)),
        }
    }

    #[inline]
    pub fn internal_with_details(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::InternalServer, details)
    }

    #[inline]
    pub fn config_read() -> Self {
        Self::with_kind(ErrorKind::ConfigReadError)
    }

    #[inline]
    pub fn unauthorized(
        error: impl StdError + 'static + Send + Sync,
        details: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::UnAuthorized, details, error)
    }

    #[inline]
    pub fn unauthorized_with_details(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::UnAuthorized, details)
    }

    #[inline]
    pub fn forbidden(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::Forbidden, details)
    }

    #[inline]
    pub fn conflict(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::Conflict, details)
    }

    #[inline]
    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::BadRequest, details)
    }

    #[inline]
    pub fn not_found() -> Self {
        Self::with_kind(ErrorKind::NotFound)
    }

    #[inline]
    pub fn not_found_with_details(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::NotFound, details)
    }

    #[inline]
    pub fn account_or_pwd() -> Self {
        Self::with_kind(ErrorKind::AccountOrPassword)
    }

    #[inline]
    pub fn account_not_active() -> Self {
        Self::with_kind(ErrorKind::AccountNotActive)
    }

    #[inline]
    pub fn account_unassigned() -> Self {
        Self::with_kind(ErrorKind::AccountUnassigned)
    }

    #[inline]
    pub fn already_processed(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::AlreadyProcessed, details)
    }

    #[inline]
    pub fn oss(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::OssError, details)
    }

    #[inline]
    pub fn body_parsing(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::BodyParsing, details)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{:?}: {}", self.kind, details),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status_code = match self.kind {
            ErrorKind::BodyParsing | ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::UnAuthorized | ErrorKind::AccountOrPassword => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden | ErrorKind::AccountNotActive | ErrorKind::AccountUnassigned => {
                StatusCode::FORBIDDEN
            }
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict | ErrorKind::AlreadyProcessed => StatusCode::CONFLICT,
            ErrorKind::UnknownError
            | ErrorKind::ConfigReadError
            | ErrorKind::ConfigParseError
            | ErrorKind::InternalServer
            | ErrorKind::ParseError
            | ErrorKind::MongoDbValueAccessError
            | ErrorKind::MongoDbBsonSerError
            | ErrorKind::MongoDbOperateError
            | ErrorKind::IOError
            | ErrorKind::ReqwestError
            | ErrorKind::OssError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!("http request api error: {:?}", self);

        // never leak internals on 5xx responses
        let body = if status_code.is_server_error() {
            Self::with_details(ErrorKind::InternalServer, "internal server error")
        } else {
            self
        };
        (status_code, Json(body)).into_response()
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::new(ErrorKind::IOError, value.to_string(), value)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(value: serde_yaml::Error) -> Self {
        Self::new(ErrorKind::ConfigParseError, value.to_string(), value)
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::new(ErrorKind::ReqwestError, value.to_string(), value)
    }
}

impl From<ValueAccessError> for Error {
    fn from(value: ValueAccessError) -> Self {
        Self::new(ErrorKind::MongoDbValueAccessError, value.to_string(), value)
    }
}

impl From<mongodb::bson::ser::Error> for Error {
    fn from(value: mongodb::bson::ser::Error) -> Self {
        Self::new(ErrorKind::MongoDbBsonSerError, value.to_string(), value)
    }
}

impl From<mongodb::bson::de::Error> for Error {
    fn from(value: mongodb::bson::de::Error) -> Self {
        Self::new(ErrorKind::ParseError, value.to_string(), value)
    }
}

impl From<mongodb::error::Error> for Error {
    fn from(value: mongodb::error::Error) -> Self {
        Self::new(ErrorKind::MongoDbOperateError, value.to_string(), value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::new(ErrorKind::ParseError, value.to_string(), value)
    }
}
