use utils::database::Pool;

pub(crate) mod postgres;
mod prompt;
mod store;

pub use postgres::PgPromptStore;
pub use prompt::*;
pub use store::{PromptStore, StoreError};

/// Idempotent schema for the prompts table and its indexes.
pub const SCHEMA: &str = include_str!("../../migrations/0001_prompts.sql");

pub async fn migrate(db: &Pool) -> Result<(), StoreError> {
	let client = db.get().await?;
	client.batch_execute(SCHEMA).await?;

	tracing::info!("database schema applied");

	Ok(())
}
