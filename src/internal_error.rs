use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use rocket::serde::json::Json;
use serde::Serialize;
use thiserror::Error;

use std::sync::PoisonError;

#[derive(Debug, Error)]
pub enum InternalError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("store lock poisoned: {0}")]
    Lock(String),

    #[error("configuration error: {0}")]
    Config(#[from] rocket::figment::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl InternalError {
    pub fn invalid_argument(what: impl Into<String>) -> InternalError {
        InternalError::InvalidArgument(what.into())
    }

    pub fn task_not_found(id: &str) -> InternalError {
        InternalError::NotFound {
            kind: "task",
            id: id.to_string(),
        }
    }

    pub fn category_not_found(id: &str) -> InternalError {
        InternalError::NotFound {
            kind: "category",
            id: id.to_string(),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            InternalError::InvalidArgument(_) => Status::BadRequest,
            InternalError::NotFound { .. } => Status::NotFound,
            _ => Status::InternalServerError,
        }
    }
}

impl<T> From<PoisonError<T>> for InternalError {
    fn from(e: PoisonError<T>) -> InternalError {
        InternalError::Lock(e.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl<'r> Responder<'r, 'static> for InternalError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status == Status::InternalServerError {
            tracing::error!(error = %self, uri = %request.uri(), "request failed");
        } else {
            tracing::warn!(error = %self, uri = %request.uri(), "request rejected");
        }

        let body = Json(ErrorBody {
            error: self.to_string(),
        });

        Response::build_from(body.respond_to(request)?)
            .status(status)
            .ok()
    }
}

pub type InternalResult<T> = Result<T, InternalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(
            InternalError::invalid_argument("empty title").status(),
            Status::BadRequest
        );
        assert_eq!(InternalError::task_not_found("t1").status(), Status::NotFound);
        assert_eq!(
            InternalError::Lock("poisoned".to_string()).status(),
            Status::InternalServerError
        );
    }

    #[test]
    fn not_found_names_the_missing_id() {
        let e = InternalError::category_not_found("work");
        assert_eq!(e.to_string(), "category not found: work");
    }
}
