use crate::database::postgres::{count_query, insert_query, search_query, update_query};
use crate::database::{NewPrompt, PromptChanges, PromptFilter, SortField, SortOrder, SCHEMA};

const COLUMNS: &str = "id, title, content, tags, created_at, updated_at";

#[test]
fn test_insert_query() {
	let qb = insert_query(NewPrompt {
		title: "Greet".to_string(),
		content: "Hello".to_string(),
		tags: vec!["demo".to_string()],
	});

	assert_eq!(
		qb.sql(),
		format!("INSERT INTO prompts (title, content, tags) VALUES ($1, $2, $3) RETURNING {COLUMNS}")
	);
	assert_eq!(qb.param_count(), 3);
}

#[test]
fn test_update_query() {
	let qb = update_query(
		7,
		PromptChanges {
			title: Some("Greet".to_string()),
			tags: Some(vec![]),
			..Default::default()
		},
	);

	assert_eq!(
		qb.sql(),
		format!("UPDATE prompts SET title = $1, tags = $2, updated_at = NOW() WHERE id = $3 RETURNING {COLUMNS}")
	);
	assert_eq!(qb.param_count(), 3);

	let qb = update_query(7, PromptChanges::default());
	assert_eq!(
		qb.sql(),
		format!("UPDATE prompts SET updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}")
	);
}

#[test]
fn test_search_query_sorted() {
	let filter = PromptFilter {
		sort_by: SortField::Title,
		sort_order: SortOrder::Asc,
		..Default::default()
	};

	assert_eq!(
		search_query(&filter).sql(),
		format!("SELECT {COLUMNS} FROM prompts ORDER BY title ASC, id ASC LIMIT $1 OFFSET $2")
	);
	assert_eq!(count_query(&filter).sql(), "SELECT COUNT(*) FROM prompts");
}

#[test]
fn test_search_query_tags() {
	let filter = PromptFilter {
		tags: Some(vec!["a".to_string(), "b".to_string()]),
		..Default::default()
	};

	assert_eq!(
		search_query(&filter).sql(),
		format!("SELECT {COLUMNS} FROM prompts WHERE tags && $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3")
	);
	assert_eq!(count_query(&filter).sql(), "SELECT COUNT(*) FROM prompts WHERE tags && $1");
}

#[test]
fn test_search_query_full_text() {
	let filter = PromptFilter {
		full_text: Some("hello".to_string()),
		tags: Some(vec!["demo".to_string()]),
		sort_by: SortField::Title,
		sort_order: SortOrder::Asc,
		..Default::default()
	};

	let qb = search_query(&filter);
	assert_eq!(
		qb.sql(),
		format!(
			"SELECT {COLUMNS} FROM prompts WHERE search_vector @@ plainto_tsquery('english', $1) AND tags && $2 \
			 ORDER BY ts_rank(search_vector, plainto_tsquery('english', $1)) DESC, id DESC LIMIT $3 OFFSET $4"
		)
	);
	assert_eq!(qb.param_count(), 4);

	let qb = count_query(&filter);
	assert_eq!(
		qb.sql(),
		"SELECT COUNT(*) FROM prompts WHERE search_vector @@ plainto_tsquery('english', $1) AND tags && $2"
	);
	assert_eq!(qb.param_count(), 2);
}

#[test]
fn test_schema_is_idempotent() {
	for statement in ["CREATE TABLE", "CREATE INDEX"] {
		for (idx, _) in SCHEMA.match_indices(statement) {
			assert!(
				SCHEMA[idx..].starts_with(&format!("{statement} IF NOT EXISTS")),
				"{statement} without IF NOT EXISTS"
			);
		}
	}
}
