use hyper::StatusCode;
use utils::http::RouteError;

use crate::database::StoreError;
use crate::service::ServiceError;

pub type Result<T, E = RouteError<ApiError>> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
	#[error("failed to read request body: {0}")]
	Body(#[from] Box<dyn std::error::Error + Send + Sync>),
	#[error("failed to parse json: {0}")]
	Json(#[from] serde_json::Error),
	#[error("storage failure: {0}")]
	Storage(#[from] StoreError),
}

impl From<ServiceError> for RouteError<ApiError> {
	#[track_caller]
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::Validation(message) => (StatusCode::BAD_REQUEST, message).into(),
			ServiceError::Storage(err) => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error", err).into(),
		}
	}
}
