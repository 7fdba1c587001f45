use serde::{Deserialize, Serialize};

use super::ServiceError;
use crate::database::{NewPrompt, Prompt, PromptChanges, PromptFilter, PromptStore, SortField, SortOrder};

pub const MAX_TITLE_LENGTH: usize = 255;
pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreatePrompt {
	pub title: String,
	pub content: String,
	#[serde(default)]
	pub tags: Option<Vec<String>>,
}

/// Partial update, absent and `null` fields are left as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpdatePrompt {
	pub title: Option<String>,
	pub content: Option<String>,
	pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
	pub query: Option<String>,
	pub tags: Vec<String>,
	pub limit: i64,
	pub offset: i64,
	pub sort_by: SortField,
	pub sort_order: SortOrder,
}

impl Default for SearchParams {
	fn default() -> Self {
		Self {
			query: None,
			tags: Vec::new(),
			limit: DEFAULT_LIMIT,
			offset: 0,
			sort_by: SortField::default(),
			sort_order: SortOrder::default(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
	pub prompts: Vec<Prompt>,
	pub total: i64,
	pub limit: i64,
	pub offset: i64,
	pub has_more: bool,
}

/// Lower-cases and trims every tag, dropping the ones left empty.
///
/// Order and duplicates are preserved.
pub fn normalize_tags<S: AsRef<str>>(tags: impl IntoIterator<Item = S>) -> Vec<String> {
	tags.into_iter()
		.map(|tag| tag.as_ref().trim().to_lowercase())
		.filter(|tag| !tag.is_empty())
		.collect()
}

fn validate_title(title: &str) -> Result<String, ServiceError> {
	let title = title.trim();

	if title.is_empty() {
		return Err(ServiceError::validation("title must not be empty"));
	}

	if title.chars().count() > MAX_TITLE_LENGTH {
		return Err(ServiceError::validation(format!(
			"title must be at most {MAX_TITLE_LENGTH} characters"
		)));
	}

	Ok(title.to_owned())
}

fn validate_content(content: &str) -> Result<String, ServiceError> {
	let content = content.trim();

	if content.is_empty() {
		return Err(ServiceError::validation("content must not be empty"));
	}

	Ok(content.to_owned())
}

impl SearchParams {
	/// Turns raw parameters into a store filter: a blank query is dropped,
	/// the page window is clamped into range.
	///
	/// Supplied tags are lower-cased and trimmed but blanks are kept, so a
	/// list of only blank tags matches nothing.
	pub fn into_filter(self) -> PromptFilter {
		let full_text = self
			.query
			.map(|query| query.trim().to_owned())
			.filter(|query| !query.is_empty());

		let tags = self
			.tags
			.iter()
			.map(|tag| tag.trim().to_lowercase())
			.collect::<Vec<_>>();

		PromptFilter {
			full_text,
			tags: (!tags.is_empty()).then_some(tags),
			sort_by: self.sort_by,
			sort_order: self.sort_order,
			limit: self.limit.clamp(1, MAX_LIMIT),
			offset: self.offset.max(0),
		}
	}
}

/// Validation and orchestration on top of a [`PromptStore`].
pub struct PromptService<S> {
	store: S,
}

impl<S: PromptStore> PromptService<S> {
	pub fn new(store: S) -> Self {
		Self { store }
	}

	pub fn store(&self) -> &S {
		&self.store
	}

	pub async fn create(&self, input: CreatePrompt) -> Result<Prompt, ServiceError> {
		let prompt = NewPrompt {
			title: validate_title(&input.title)?,
			content: validate_content(&input.content)?,
			tags: normalize_tags(input.tags.unwrap_or_default()),
		};

		let prompt = self.store.insert(prompt).await?;

		tracing::info!(id = prompt.id, "created prompt");

		Ok(prompt)
	}

	pub async fn get(&self, id: i32) -> Result<Option<Prompt>, ServiceError> {
		Ok(self.store.get(id).await?)
	}

	/// Returns `None` when no prompt has this id. Inputs are validated
	/// before the store is touched.
	pub async fn update(&self, id: i32, input: UpdatePrompt) -> Result<Option<Prompt>, ServiceError> {
		let changes = PromptChanges {
			title: input.title.as_deref().map(validate_title).transpose()?,
			content: input.content.as_deref().map(validate_content).transpose()?,
			tags: input.tags.map(normalize_tags),
		};

		let prompt = self.store.update(id, changes).await?;

		if let Some(prompt) = &prompt {
			tracing::info!(id = prompt.id, "updated prompt");
		}

		Ok(prompt)
	}

	pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
		let deleted = self.store.delete(id).await?;

		if deleted {
			tracing::info!(id, "deleted prompt");
		}

		Ok(deleted)
	}

	pub async fn search(&self, params: SearchParams) -> Result<SearchResult, ServiceError> {
		let filter = params.into_filter();

		tracing::debug!(
			query = filter.full_text.as_deref(),
			tags = ?filter.tags,
			limit = filter.limit,
			offset = filter.offset,
			"searching prompts"
		);

		let (prompts, total) = self.store.search(&filter).await?;

		Ok(SearchResult {
			has_more: filter.offset.saturating_add(filter.limit) < total,
			prompts,
			total,
			limit: filter.limit,
			offset: filter.offset,
		})
	}

	pub async fn list_tags(&self) -> Result<Vec<String>, ServiceError> {
		Ok(self.store.distinct_tags().await?)
	}
}
