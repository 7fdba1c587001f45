use std::sync::Arc;

use utils::database::tokio_postgres::IsolationLevel;
use utils::database::{Pool, QueryBuilder};

use super::{NewPrompt, Prompt, PromptChanges, PromptFilter, PromptStore, StoreError};

const COLUMNS: &str = "id, title, content, tags, created_at, updated_at";

/// [`PromptStore`] backed by the `prompts` table.
///
/// Relevance ranking and tag overlap are left to postgres: `search_vector`
/// is a generated `tsvector` column and `tags` a `TEXT[]` column.
#[derive(Clone)]
pub struct PgPromptStore {
	db: Arc<Pool>,
}

impl PgPromptStore {
	pub fn new(db: Arc<Pool>) -> Self {
		Self { db }
	}
}

impl PromptStore for PgPromptStore {
	async fn insert(&self, prompt: NewPrompt) -> Result<Prompt, StoreError> {
		Ok(insert_query(prompt).build_query_as().fetch_one(&self.db).await?)
	}

	async fn get(&self, id: i32) -> Result<Option<Prompt>, StoreError> {
		Ok(utils::database::query(format!("SELECT {COLUMNS} FROM prompts WHERE id = $1"))
			.bind(id)
			.build_query_as()
			.fetch_optional(&self.db)
			.await?)
	}

	async fn update(&self, id: i32, changes: PromptChanges) -> Result<Option<Prompt>, StoreError> {
		let mut client = self.db.get().await?;
		let tx = client.transaction().await?;

		if !lock_row(&tx, id).await? {
			return Ok(None);
		}

		let prompt = update_query(id, changes).build_query_as().fetch_one(&tx).await?;

		tx.commit().await?;

		Ok(Some(prompt))
	}

	async fn delete(&self, id: i32) -> Result<bool, StoreError> {
		let mut client = self.db.get().await?;
		let tx = client.transaction().await?;

		if !lock_row(&tx, id).await? {
			return Ok(false);
		}

		utils::database::query("DELETE FROM prompts WHERE id = $1")
			.bind(id)
			.build()
			.execute(&tx)
			.await?;

		tx.commit().await?;

		Ok(true)
	}

	async fn search(&self, filter: &PromptFilter) -> Result<(Vec<Prompt>, i64), StoreError> {
		let mut client = self.db.get().await?;
		// The page and the total are read from the same snapshot.
		let tx = client
			.build_transaction()
			.isolation_level(IsolationLevel::RepeatableRead)
			.read_only(true)
			.start()
			.await?;

		let prompts = search_query(filter).build_query_as::<Prompt>().fetch_all(&tx).await?;
		let total = count_query(filter)
			.build_query_single_scalar::<i64>()
			.fetch_one(&tx)
			.await?;

		tx.commit().await?;

		Ok((prompts, total))
	}

	async fn distinct_tags(&self) -> Result<Vec<String>, StoreError> {
		Ok(utils::database::query(
			"SELECT DISTINCT tag FROM prompts, unnest(tags) AS tag WHERE tag <> '' ORDER BY tag",
		)
		.build_query_single_scalar::<String>()
		.fetch_all(&self.db)
		.await?)
	}
}

async fn lock_row(tx: &utils::database::deadpool_postgres::Transaction<'_>, id: i32) -> Result<bool, StoreError> {
	Ok(utils::database::query("SELECT id FROM prompts WHERE id = $1 FOR UPDATE")
		.bind(id)
		.build_query_single_scalar::<i32>()
		.fetch_optional(tx)
		.await?
		.is_some())
}

pub(crate) fn insert_query(prompt: NewPrompt) -> QueryBuilder<'static> {
	let mut qb = utils::database::query("INSERT INTO prompts (title, content, tags) VALUES (");
	qb.separated(", ")
		.push_bind(prompt.title)
		.push_bind(prompt.content)
		.push_bind(prompt.tags);
	qb.push(format!(") RETURNING {COLUMNS}"));
	qb
}

pub(crate) fn update_query(id: i32, changes: PromptChanges) -> QueryBuilder<'static> {
	let mut qb = utils::database::query("UPDATE prompts SET ");

	let mut set = qb.separated(", ");
	if let Some(title) = changes.title {
		set.push("title = ").push_bind_unseparated(title);
	}
	if let Some(content) = changes.content {
		set.push("content = ").push_bind_unseparated(content);
	}
	if let Some(tags) = changes.tags {
		set.push("tags = ").push_bind_unseparated(tags);
	}
	set.push("updated_at = NOW()");

	qb.push(" WHERE id = ").push_bind(id).push(format!(" RETURNING {COLUMNS}"));
	qb
}

/// Appends the `WHERE` clause shared by the page and count queries and
/// returns the placeholder index of the full-text query, if any.
fn push_filters(qb: &mut QueryBuilder<'_>, filter: &PromptFilter) -> Option<usize> {
	let mut keyword = " WHERE ";
	let mut text_param = None;

	if let Some(text) = &filter.full_text {
		qb.push(keyword)
			.push("search_vector @@ plainto_tsquery('english', ")
			.push_bind(text.clone())
			.push(")");
		text_param = Some(qb.param_count());
		keyword = " AND ";
	}

	if let Some(tags) = &filter.tags {
		qb.push(keyword).push("tags && ").push_bind(tags.clone());
	}

	text_param
}

pub(crate) fn search_query(filter: &PromptFilter) -> QueryBuilder<'static> {
	let mut qb = utils::database::query(format!("SELECT {COLUMNS} FROM prompts"));

	match push_filters(&mut qb, filter) {
		Some(text) => {
			qb.push(format!(
				" ORDER BY ts_rank(search_vector, plainto_tsquery('english', ${text})) DESC, id DESC"
			));
		}
		None => {
			let order = filter.sort_order.as_sql();
			qb.push(format!(" ORDER BY {} {order}, id {order}", filter.sort_by.column()));
		}
	}

	qb.push(" LIMIT ").push_bind(filter.limit).push(" OFFSET ").push_bind(filter.offset);
	qb
}

pub(crate) fn count_query(filter: &PromptFilter) -> QueryBuilder<'static> {
	let mut qb = utils::database::query("SELECT COUNT(*) FROM prompts");
	push_filters(&mut qb, filter);
	qb
}
