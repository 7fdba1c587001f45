use std::future::Future;

use utils::database::{deadpool_postgres, tokio_postgres};

use super::{NewPrompt, Prompt, PromptChanges, PromptFilter};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("database pool error: {0}")]
	Pool(#[from] deadpool_postgres::PoolError),
	#[error("database error: {0}")]
	Postgres(#[from] tokio_postgres::Error),
}

/// Persistence for prompts.
///
/// Each mutating operation is atomic: it either fully applies or leaves the
/// store unchanged. A missing id is reported as `None`/`false`, never as an
/// error.
pub trait PromptStore: Send + Sync + 'static {
	fn insert(&self, prompt: NewPrompt) -> impl Future<Output = Result<Prompt, StoreError>> + Send;

	fn get(&self, id: i32) -> impl Future<Output = Result<Option<Prompt>, StoreError>> + Send;

	/// Applies `changes` and refreshes `updated_at`, even when no field
	/// changes.
	fn update(&self, id: i32, changes: PromptChanges) -> impl Future<Output = Result<Option<Prompt>, StoreError>> + Send;

	fn delete(&self, id: i32) -> impl Future<Output = Result<bool, StoreError>> + Send;

	/// Returns one page of matches and the number of matches overall.
	fn search(&self, filter: &PromptFilter) -> impl Future<Output = Result<(Vec<Prompt>, i64), StoreError>> + Send;

	/// Every distinct non-empty tag, sorted ascending.
	fn distinct_tags(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;
}
