use http::header::{self, InvalidHeaderValue};
use http::HeaderValue;

use super::{Middleware, NextFn};
use crate::http::router::builder::RouterBuilder;

#[derive(Clone)]
pub struct CorsOptions<B> {
	/// Allowed request headers, `*` mirrors whatever the preflight asks for
	pub allow_headers: Vec<String>,
	/// Allowed methods
	pub allow_methods: Vec<String>,
	/// Allowed origins, `*` allows any origin
	pub allow_origin: Vec<String>,
	/// Headers the browser may expose to scripts
	pub expose_headers: Vec<String>,
	/// Preflight cache lifetime
	pub max_age_seconds: Option<u64>,
	/// Send `Access-Control-Allow-Credentials: true`
	pub allow_credentials: bool,

	// Body of the preflight response
	pub default_response: fn() -> B,
}

impl<B: Default> Default for CorsOptions<B> {
	fn default() -> Self {
		Self {
			allow_headers: Vec::new(),
			allow_methods: Vec::new(),
			allow_origin: Vec::new(),
			expose_headers: Vec::new(),
			max_age_seconds: None,
			allow_credentials: false,
			default_response: || B::default(),
		}
	}
}

impl<B: Default> CorsOptions<B> {
	/// Allows the given origins with credentials, any header and the usual
	/// REST verbs.
	pub fn with_origins(origins: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self {
			allow_headers: vec!["*".to_string()],
			allow_methods: ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"]
				.into_iter()
				.map(String::from)
				.collect(),
			allow_origin: origins.into_iter().map(Into::into).collect(),
			max_age_seconds: Some(600),
			allow_credentials: true,
			..Default::default()
		}
	}
}

pub struct CorsMiddleware<B> {
	allow_origins: fnv::FnvHashSet<String>,
	allow_methods: Option<HeaderValue>,
	allow_headers: Option<HeaderValue>,
	mirror_headers: bool,
	expose_headers: Option<HeaderValue>,
	max_age: Option<HeaderValue>,
	allow_credentials: bool,
	default_response: fn() -> B,
}

fn join_header(values: &[String]) -> Result<Option<HeaderValue>, InvalidHeaderValue> {
	if values.is_empty() {
		return Ok(None);
	}

	values.join(", ").parse().map(Some)
}

impl<B> CorsMiddleware<B> {
	pub fn new(options: &CorsOptions<B>) -> Result<Self, InvalidHeaderValue> {
		let mirror_headers = options.allow_headers.iter().any(|h| h == "*");

		Ok(Self {
			allow_origins: options.allow_origin.iter().map(|s| s.trim().to_lowercase()).collect(),
			allow_methods: join_header(&options.allow_methods)?,
			allow_headers: if mirror_headers {
				None
			} else {
				join_header(&options.allow_headers)?
			},
			mirror_headers,
			expose_headers: join_header(&options.expose_headers)?,
			max_age: options.max_age_seconds.map(HeaderValue::from),
			allow_credentials: options.allow_credentials,
			default_response: options.default_response,
		})
	}

	fn origin_allowed(&self, origin: &str) -> bool {
		self.allow_origins.contains("*") || self.allow_origins.contains(&origin.to_lowercase())
	}
}

#[async_trait::async_trait]
impl<I: Send + 'static, O: Send + 'static, E: Send + 'static> Middleware<I, O, E> for CorsMiddleware<O> {
	async fn handle(&self, req: hyper::Request<I>, next: NextFn<I, O, E>) -> Result<hyper::Response<O>, E> {
		let origin = req.headers().get(header::ORIGIN).cloned();
		let request_headers = req.headers().get(header::ACCESS_CONTROL_REQUEST_HEADERS).cloned();

		let mut resp = next(req).await?;

		let Some(origin) = origin else {
			return Ok(resp);
		};

		let allowed = origin.to_str().map(|o| self.origin_allowed(o)).unwrap_or(false);
		if !allowed {
			return Ok(resp);
		}

		let headers = resp.headers_mut();
		headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
		headers.append(header::VARY, HeaderValue::from_static("Origin"));

		if self.allow_credentials {
			headers.insert(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
		}

		if let Some(methods) = &self.allow_methods {
			headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, methods.clone());
		}

		match (&self.allow_headers, request_headers) {
			(Some(allow), _) => {
				headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, allow.clone());
			}
			(None, Some(requested)) if self.mirror_headers => {
				headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested);
			}
			_ => {}
		}

		if let Some(expose) = &self.expose_headers {
			headers.insert(header::ACCESS_CONTROL_EXPOSE_HEADERS, expose.clone());
		}

		if let Some(max_age) = &self.max_age {
			headers.insert(header::ACCESS_CONTROL_MAX_AGE, max_age.clone());
		}

		Ok(resp)
	}

	fn extend(&self, builder: RouterBuilder<I, O, E>) -> RouterBuilder<I, O, E> {
		let func = self.default_response;
		builder.options("/*", move |_| async move {
			let mut resp = hyper::Response::new(func());
			*resp.status_mut() = hyper::StatusCode::NO_CONTENT;
			Ok(resp)
		})
	}
}
