use std::ops::RangeInclusive;
use std::sync::Arc;

use binary_helper::global::RequestGlobalExt;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::form_urlencoded;
use utils::http::ext::{OptionExt, ResultExt};
use utils::http::router::builder::RouterBuilder;
use utils::http::router::ext::RequestExt;
use utils::http::router::Router;
use utils::http::RouteError;
use utils::make_response;

use super::error::{ApiError, Result};
use super::Body;
use crate::database::SortField;
use crate::global::{ApiGlobal, ApiState};
use crate::service::{CreatePrompt, SearchParams, UpdatePrompt, MAX_LIMIT};

/// Largest accepted request body.
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

pub fn routes<G: ApiGlobal>(_: &Arc<G>) -> RouterBuilder<Incoming, Body, RouteError<ApiError>> {
	Router::builder()
		.post("/", create::<G>)
		.get("/", search::<G>)
		.get("/tags/all", list_tags::<G>)
		.get("/:id", get::<G>)
		.put("/:id", update::<G>)
		.delete("/:id", delete::<G>)
}

async fn create<G: ApiGlobal>(req: Request<Incoming>) -> Result<Response<Body>> {
	let global = req.get_global::<G, _>()?;

	let input: CreatePrompt = read_json(req.into_body()).await?;
	let prompt = global.prompt_service().create(input).await?;

	json_response(StatusCode::CREATED, &prompt)
}

async fn search<G: ApiGlobal>(req: Request<Incoming>) -> Result<Response<Body>> {
	let global = req.get_global::<G, _>()?;

	let params = search_params(req.uri().query())?;
	let result = global.prompt_service().search(params).await?;

	json_response(StatusCode::OK, &result)
}

async fn list_tags<G: ApiGlobal>(req: Request<Incoming>) -> Result<Response<Body>> {
	let global = req.get_global::<G, _>()?;

	let tags = global.prompt_service().list_tags().await?;

	json_response(StatusCode::OK, &tags)
}

async fn get<G: ApiGlobal>(req: Request<Incoming>) -> Result<Response<Body>> {
	let global = req.get_global::<G, _>()?;
	let id = prompt_id(&req)?;

	let prompt = global
		.prompt_service()
		.get(id)
		.await?
		.map_err_route((StatusCode::NOT_FOUND, "prompt not found"))?;

	json_response(StatusCode::OK, &prompt)
}

async fn update<G: ApiGlobal>(req: Request<Incoming>) -> Result<Response<Body>> {
	let global = req.get_global::<G, _>()?;
	let id = prompt_id(&req)?;

	let input: UpdatePrompt = read_json(req.into_body()).await?;
	let prompt = global
		.prompt_service()
		.update(id, input)
		.await?
		.map_err_route((StatusCode::NOT_FOUND, "prompt not found"))?;

	json_response(StatusCode::OK, &prompt)
}

async fn delete<G: ApiGlobal>(req: Request<Incoming>) -> Result<Response<Body>> {
	let global = req.get_global::<G, _>()?;
	let id = prompt_id(&req)?;

	if !global.prompt_service().delete(id).await? {
		return Err((StatusCode::NOT_FOUND, "prompt not found").into());
	}

	let mut resp = Response::new(Body::default());
	*resp.status_mut() = StatusCode::NO_CONTENT;
	Ok(resp)
}

/// Any integer is a well-formed id. Ids are `SERIAL`, so one outside the
/// `i32` range cannot exist.
fn prompt_id(req: &Request<Incoming>) -> Result<i32> {
	let id = req
		.param("id")
		.and_then(|id| id.parse::<i64>().ok())
		.map_err_route((StatusCode::BAD_REQUEST, "invalid prompt id"))?;

	i32::try_from(id).map_ignore_err_route((StatusCode::NOT_FOUND, "prompt not found"))
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Result<Response<Body>> {
	let body = serde_json::to_string(value)
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to serialize response"))?;

	Ok(make_response!(status, body))
}

/// Reads at most [`MAX_BODY_SIZE`] bytes of `body` and decodes them as JSON.
pub(crate) async fn read_json<T, B>(body: B) -> Result<T>
where
	T: DeserializeOwned,
	B: hyper::body::Body,
	B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
	let body = Limited::new(body, MAX_BODY_SIZE)
		.collect()
		.await
		.map_err(|err| -> RouteError<ApiError> {
			if err.downcast_ref::<LengthLimitError>().is_some() {
				(StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into()
			} else {
				(StatusCode::BAD_REQUEST, "failed to read request body", err).into()
			}
		})?
		.to_bytes();

	serde_json::from_slice(&body).map_err_route((StatusCode::BAD_REQUEST, "invalid json body"))
}

fn parse_bounded(value: &str, range: RangeInclusive<i64>, message: &'static str) -> Result<i64> {
	value
		.parse::<i64>()
		.ok()
		.filter(|value| range.contains(value))
		.map_err_route((StatusCode::BAD_REQUEST, message))
}

/// Parses the search query string. `tags` may be repeated, and the
/// bracketed `tags[]` form is accepted as well. Unknown keys are ignored.
pub(crate) fn search_params(query: Option<&str>) -> Result<SearchParams> {
	let mut params = SearchParams::default();

	for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
		match &*key {
			"query" => params.query = Some(value.into_owned()),
			"tags" | "tags[]" => params.tags.push(value.into_owned()),
			"limit" => params.limit = parse_bounded(&value, 1..=MAX_LIMIT, "limit must be between 1 and 100")?,
			"offset" => params.offset = parse_bounded(&value, 0..=i64::MAX, "offset must not be negative")?,
			"sort_by" => params.sort_by = SortField::from_name(&value),
			"sort_order" => {
				params.sort_order = value
					.parse()
					.map_ignore_err_route((StatusCode::BAD_REQUEST, "sort_order must be asc or desc"))?
			}
			_ => {}
		}
	}

	Ok(params)
}
