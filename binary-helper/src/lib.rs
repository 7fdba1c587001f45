use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use tokio::signal::unix::SignalKind;
use tokio::{select, time};
pub use traits::{Config, Global};
use utils::context::Context;
use utils::signal::SignalHandler;

pub mod config;
pub mod global;
pub mod logging;
pub mod traits;

/// Runs a service process: parses the config, initialises logging, builds
/// the global state and drives `process` until it exits or a shutdown
/// signal arrives.
///
/// After a shutdown signal the global context is cancelled and tasks get 60
/// seconds (or until a second signal) to drop their contexts.
pub async fn bootstrap<C: Config, G: Global<C>, F: Future<Output = anyhow::Result<()>> + Send + 'static>(
	process: impl FnOnce(Arc<G>) -> F,
) -> anyhow::Result<()> {
	let (ctx, handler) = Context::new();

	let config = C::parse()
		.and_then(|mut config| {
			config.pre_hook()?;
			Ok(config)
		})
		.map_err(|err| {
			// Best effort so the parse failure itself gets reported.
			let _ = logging::init("info", Default::default());
			err
		})
		.context("failed to parse config")?;

	logging::init(&config.logging().level, config.logging().mode).context("failed to init logging")?;

	tracing::info!(name = config.name(), "starting up");

	let global = Arc::new(G::new(ctx, config).await.context("failed to create global state")?);

	tracing::debug!("global state created, starting process");

	let process_future = tokio::spawn(process(global));

	let mut signal_handler = SignalHandler::new()
		.with_signal(SignalKind::interrupt())
		.and_then(|handler| handler.with_signal(SignalKind::terminate()))
		.context("failed to register signal handlers")?;

	let result = select! {
		_ = signal_handler.recv() => {
			tracing::info!("shutting down");
			Ok(())
		},
		r = process_future => match r {
			Ok(Ok(())) => {
				tracing::warn!("process exited");
				Ok(())
			}
			Ok(Err(err)) => Err(err),
			Err(err) => Err(anyhow::anyhow!(err).context("process panicked")),
		},
	};

	tracing::info!("waiting for tasks to finish");

	select! {
		_ = time::sleep(Duration::from_secs(60)) => tracing::warn!("force shutting down"),
		_ = signal_handler.recv() => tracing::warn!("force shutting down"),
		_ = handler.cancel() => tracing::info!("shutdown complete"),
	}

	result
}
