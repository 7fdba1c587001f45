use std::sync::{Arc, Weak};
use std::time::Duration;

use anyhow::Context as _;
use bytes::Bytes;
use hyper::StatusCode;
use utils::database::deadpool_postgres::{ManagerConfig, PoolConfig, RecyclingMethod, Runtime, Timeouts};
use utils::database::tokio_postgres::NoTls;
use utils::database::Pool;
use utils::http::RouteError;

use crate::config::DatabaseConfig;

#[macro_export]
macro_rules! impl_global_traits {
	($struct:ty) => {
		impl binary_helper::global::GlobalCtx for $struct {
			#[inline(always)]
			fn ctx(&self) -> &utils::context::Context {
				&self.ctx
			}
		}

		impl binary_helper::global::GlobalDb for $struct {
			#[inline(always)]
			fn db(&self) -> &std::sync::Arc<utils::database::Pool> {
				&self.db
			}
		}

		impl binary_helper::global::GlobalConfig for $struct {}
	};
}

pub trait GlobalCtx {
	fn ctx(&self) -> &utils::context::Context;
}

pub trait GlobalConfig {
	#[inline(always)]
	fn config<C>(&self) -> &C
	where
		Self: GlobalConfigProvider<C>,
	{
		GlobalConfigProvider::provide_config(self)
	}
}

pub trait GlobalConfigProvider<C> {
	fn provide_config(&self) -> &C;
}

pub trait GlobalDb {
	fn db(&self) -> &Arc<Pool>;
}

pub async fn setup_database(config: &DatabaseConfig) -> anyhow::Result<Arc<Pool>> {
	let pg_config = config
		.uri
		.parse::<utils::database::tokio_postgres::Config>()
		.context("invalid database uri")?;

	let manager = utils::database::deadpool_postgres::Manager::from_config(
		pg_config,
		NoTls,
		ManagerConfig {
			recycling_method: RecyclingMethod::Fast,
		},
	);

	let pool = Pool::builder(manager)
		.config(PoolConfig {
			max_size: config.max_connections,
			timeouts: Timeouts {
				wait: config.pool_timeout_ms.map(Duration::from_millis),
				..Default::default()
			},
			..Default::default()
		})
		.runtime(Runtime::Tokio1)
		.build()
		.context("failed to create database pool")?;

	// Fail at startup rather than on the first request.
	pool.get().await.context("failed to connect to database")?;

	Ok(Arc::new(pool))
}

pub trait RequestGlobalExt<E> {
	fn get_global<G: Sync + Send + 'static, B: From<Bytes>>(&self) -> std::result::Result<Arc<G>, RouteError<E, B>>;
}

impl<E, B> RequestGlobalExt<E> for hyper::Request<B> {
	fn get_global<G: Sync + Send + 'static, B2: From<Bytes>>(&self) -> std::result::Result<Arc<G>, RouteError<E, B2>> {
		Ok(self
			.extensions()
			.get::<Weak<G>>()
			.and_then(Weak::upgrade)
			.ok_or((StatusCode::INTERNAL_SERVER_ERROR, "failed to upgrade global state"))?)
	}
}
