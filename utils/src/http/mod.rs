use std::fmt::{Debug, Display};
use std::panic::Location;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use serde_json::json;

pub mod ext;
pub mod router;

/// Builds a JSON response from anything that renders as JSON text.
#[macro_export]
macro_rules! make_response {
	($status:expr, $body:expr) => {
		$crate::http::json_response($status, $body.to_string())
	};
}

#[doc(hidden)]
pub fn json_response<B: From<Bytes>>(status: StatusCode, body: String) -> hyper::Response<B> {
	let mut resp = hyper::Response::new(B::from(Bytes::from(body)));
	*resp.status_mut() = status;
	resp.headers_mut().insert(
		http::header::CONTENT_TYPE,
		http::HeaderValue::from_static("application/json"),
	);
	resp
}

/// Router error handler that logs the failure in the span it was raised
/// from and renders the prepared response.
pub async fn error_handler<E: std::error::Error + 'static, B: From<Bytes>>(
	req: hyper::Request<()>,
	err: RouteError<E, B>,
) -> hyper::Response<B> {
	let location = err.location();

	err.span().in_scope(|| match err.should_log() {
		ShouldLog::Yes => {
			tracing::error!(path = %req.uri(), method = %req.method(), location = %location, error = ?err, "http error")
		}
		ShouldLog::Debug => {
			tracing::debug!(path = %req.uri(), method = %req.method(), location = %location, error = ?err, "http error")
		}
		ShouldLog::No => (),
	});

	err.response()
}

/// An error returned from a route handler, carrying the response to send
/// and optionally the error that caused it.
pub struct RouteError<E, B: From<Bytes> = Full<Bytes>> {
	source: Option<E>,
	location: &'static Location<'static>,
	span: tracing::Span,
	response: hyper::Response<B>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShouldLog {
	Yes,
	Debug,
	No,
}

impl<E, B: From<Bytes>> RouteError<E, B> {
	#[track_caller]
	fn new(status: StatusCode, message: &str, source: Option<E>) -> Self {
		Self {
			source,
			span: tracing::Span::current(),
			location: Location::caller(),
			response: make_response!(status, json!({ "message": message, "success": false })),
		}
	}

	pub fn span(&self) -> &tracing::Span {
		&self.span
	}

	pub fn location(&self) -> &'static Location<'static> {
		self.location
	}

	pub fn source_error(&self) -> Option<&E> {
		self.source.as_ref()
	}

	pub fn status(&self) -> StatusCode {
		self.response.status()
	}

	pub fn response(self) -> hyper::Response<B> {
		self.response
	}

	/// Server errors are always logged, client errors only when they carry
	/// a source.
	pub fn should_log(&self) -> ShouldLog {
		if self.response.status().is_server_error() {
			ShouldLog::Yes
		} else if self.source.is_some() {
			ShouldLog::Debug
		} else {
			ShouldLog::No
		}
	}

	pub fn with_source(mut self, source: Option<E>) -> Self {
		self.source = source;
		self
	}

	pub fn with_location(mut self, location: &'static Location<'static>) -> Self {
		self.location = location;
		self
	}
}

impl<E, S: AsRef<str>, B: From<Bytes>> From<(StatusCode, S)> for RouteError<E, B> {
	#[track_caller]
	fn from((status, message): (StatusCode, S)) -> Self {
		Self::new(status, message.as_ref(), None)
	}
}

impl<E, S: AsRef<str>, T, B: From<Bytes>> From<(StatusCode, S, T)> for RouteError<E, B>
where
	T: Into<E>,
{
	#[track_caller]
	fn from((status, message, source): (StatusCode, S, T)) -> Self {
		Self::new(status, message.as_ref(), Some(source.into()))
	}
}

impl<E: Debug, B: From<Bytes>> Debug for RouteError<E, B> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.source {
			Some(err) => write!(f, "RouteError({}): {:?}", self.status(), err),
			None => write!(f, "RouteError({}): unknown source", self.status()),
		}
	}
}

impl<E: Display, B: From<Bytes>> Display for RouteError<E, B> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.source {
			Some(err) => write!(f, "{}: {}", self.status(), err),
			None => write!(f, "{}", self.status()),
		}
	}
}

impl<E: std::error::Error + 'static, B: From<Bytes>> std::error::Error for RouteError<E, B> {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		self.source.as_ref().map(|err| err as _)
	}
}
