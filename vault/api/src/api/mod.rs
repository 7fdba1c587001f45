use std::convert::Infallible;
use std::sync::Arc;

use binary_helper::global::{GlobalConfig, GlobalCtx, RequestGlobalExt};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::json;
use tokio::net::TcpSocket;
use tokio::select;
use utils::http::router::error::RouterError;
use utils::http::router::middleware::{CorsMiddleware, CorsOptions};
use utils::http::router::Router;
use utils::http::RouteError;
use utils::make_response;

use self::error::{ApiError, Result};
use crate::config::ApiConfig;
use crate::global::{ApiGlobal, ApiState};

pub mod error;
pub mod prompts;

pub type Body = Full<Bytes>;

pub fn routes<G: ApiGlobal>(global: &Arc<G>) -> anyhow::Result<Router<Incoming, Body, RouteError<ApiError>>> {
	let config = global.config::<ApiConfig>();
	let cors = CorsMiddleware::new(&CorsOptions::with_origins(config.cors_origins()))?;

	Ok(Router::builder()
		.data(Arc::downgrade(global))
		.middleware(cors)
		.get("/", index::<G>)
		.get("/health", health::<G>)
		.scope("/api/prompts", prompts::routes(global))
		.error_handler(utils::http::error_handler::<ApiError, _>)
		.build())
}

async fn index<G: ApiGlobal>(req: Request<Incoming>) -> Result<Response<Body>> {
	let global = req.get_global::<G, _>()?;

	Ok(make_response!(
		StatusCode::OK,
		json!({
			"message": format!("Welcome to {}", global.config::<ApiConfig>().title),
			"version": global.service_version(),
		})
	))
}

async fn health<G: ApiGlobal>(req: Request<Incoming>) -> Result<Response<Body>> {
	let global = req.get_global::<G, _>()?;

	Ok(make_response!(
		StatusCode::OK,
		json!({
			"status": "healthy",
			"service": global.service_name(),
		})
	))
}

pub async fn run<G: ApiGlobal>(global: Arc<G>) -> anyhow::Result<()> {
	let config = global.config::<ApiConfig>();

	tracing::info!("listening on {}", config.bind_address);
	let socket = if config.bind_address.is_ipv6() {
		TcpSocket::new_v6()?
	} else {
		TcpSocket::new_v4()?
	};

	socket.set_reuseaddr(true)?;
	socket.bind(config.bind_address)?;
	let listener = socket.listen(1024)?;

	// Connections only hold a weak reference to the global state so that
	// open keep-alive connections do not hold up shutdown.
	let router = Arc::new(routes(&global)?);
	let service = service_fn(move |req| {
		let router = router.clone();
		async move {
			Ok::<_, Infallible>(match router.handle(req).await {
				Ok(resp) => resp,
				Err(RouterError::NotFound) => {
					make_response!(StatusCode::NOT_FOUND, json!({ "message": "not found", "success": false }))
				}
				Err(RouterError::Unhandled(err)) => {
					tracing::error!(error = ?err, "unhandled error");
					make_response!(
						StatusCode::INTERNAL_SERVER_ERROR,
						json!({ "message": "internal server error", "success": false })
					)
				}
			})
		}
	});

	loop {
		select! {
			_ = global.ctx().done() => {
				return Ok(());
			},
			r = listener.accept() => {
				let (socket, addr) = r?;

				let service = service.clone();

				tracing::debug!("accepted connection from {}", addr);

				tokio::spawn(async move {
					http1::Builder::new()
						.serve_connection(TokioIo::new(socket), service)
						.await
						.ok();
				});
			},
		}
	}
}
