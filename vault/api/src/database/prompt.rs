use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, postgres_from_row::FromRow)]
pub struct Prompt {
	pub id: i32,
	pub title: String,
	pub content: String,
	pub tags: Vec<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// A validated prompt ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrompt {
	pub title: String,
	pub content: String,
	pub tags: Vec<String>,
}

/// Validated field changes, `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptChanges {
	pub title: Option<String>,
	pub content: Option<String>,
	pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
	Id,
	Title,
	Content,
	Tags,
	#[default]
	CreatedAt,
	UpdatedAt,
}

impl SortField {
	/// Unknown names fall back to `created_at`.
	pub fn from_name(name: &str) -> Self {
		match name {
			"id" => Self::Id,
			"title" => Self::Title,
			"content" => Self::Content,
			"tags" => Self::Tags,
			"updated_at" => Self::UpdatedAt,
			_ => Self::CreatedAt,
		}
	}

	pub fn column(self) -> &'static str {
		match self {
			Self::Id => "id",
			Self::Title => "title",
			Self::Content => "content",
			Self::Tags => "tags",
			Self::CreatedAt => "created_at",
			Self::UpdatedAt => "updated_at",
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
	Asc,
	#[default]
	Desc,
}

impl SortOrder {
	pub fn as_sql(self) -> &'static str {
		match self {
			Self::Asc => "ASC",
			Self::Desc => "DESC",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("sort order must be asc or desc")]
pub struct InvalidSortOrder;

impl std::str::FromStr for SortOrder {
	type Err = InvalidSortOrder;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"asc" => Ok(Self::Asc),
			"desc" => Ok(Self::Desc),
			_ => Err(InvalidSortOrder),
		}
	}
}

/// What a search reads from the store.
///
/// When `full_text` is set results are ordered by relevance and the sort
/// field is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptFilter {
	pub full_text: Option<String>,
	pub tags: Option<Vec<String>>,
	pub sort_by: SortField,
	pub sort_order: SortOrder,
	pub limit: i64,
	pub offset: i64,
}

impl Default for PromptFilter {
	fn default() -> Self {
		Self {
			full_text: None,
			tags: None,
			sort_by: SortField::default(),
			sort_order: SortOrder::default(),
			limit: 20,
			offset: 0,
		}
	}
}
