use std::time::Duration;

use utils::prelude::FutureTimeout;

use super::store::{BrokenStore, MemoryPromptStore};
use crate::database::{SortField, SortOrder};
use crate::service::{normalize_tags, CreatePrompt, PromptService, SearchParams, ServiceError, UpdatePrompt};

fn service() -> PromptService<MemoryPromptStore> {
	PromptService::new(MemoryPromptStore::default())
}

fn new_prompt(title: &str, content: &str, tags: &[&str]) -> CreatePrompt {
	CreatePrompt {
		title: title.to_string(),
		content: content.to_string(),
		tags: Some(tags.iter().map(|t| t.to_string()).collect()),
	}
}

fn tags(tags: &[&str]) -> Vec<String> {
	tags.iter().map(|t| t.to_string()).collect()
}

#[test]
fn test_normalize_tags() {
	assert_eq!(normalize_tags(["Greeting", " Demo ", "  ", "demo"]), tags(&["greeting", "demo", "demo"]));
	assert!(normalize_tags(Vec::<String>::new()).is_empty());
}

#[test]
fn test_search_params_into_filter() {
	let filter = SearchParams {
		query: Some("   ".to_string()),
		tags: tags(&[" ", ""]),
		limit: 1000,
		offset: -5,
		..Default::default()
	}
	.into_filter();

	assert_eq!(filter.full_text, None);
	assert_eq!(filter.tags, Some(tags(&["", ""])));
	assert_eq!(filter.limit, 100);
	assert_eq!(filter.offset, 0);

	let filter = SearchParams::default().into_filter();
	assert_eq!(filter.tags, None);

	let filter = SearchParams {
		query: Some(" hello ".to_string()),
		tags: tags(&["Demo"]),
		limit: 0,
		..Default::default()
	}
	.into_filter();

	assert_eq!(filter.full_text.as_deref(), Some("hello"));
	assert_eq!(filter.tags, Some(tags(&["demo"])));
	assert_eq!(filter.limit, 1);
}

#[tokio::test]
async fn test_create_normalizes_input() {
	let service = service();

	let prompt = service
		.create(new_prompt("  Greet ", "Hello {name}\n", &["Greeting", " Demo "]))
		.timeout(Duration::from_secs(2))
		.await
		.unwrap()
		.unwrap();

	assert_eq!(prompt.title, "Greet");
	assert_eq!(prompt.content, "Hello {name}");
	assert_eq!(prompt.tags, tags(&["greeting", "demo"]));
	assert_eq!(prompt.created_at, prompt.updated_at);

	let other = service.create(new_prompt("Other", "text", &[])).await.unwrap();
	assert_ne!(other.id, prompt.id);

	let untagged = service
		.create(CreatePrompt {
			title: "No tags".to_string(),
			content: "text".to_string(),
			tags: None,
		})
		.await
		.unwrap();
	assert!(untagged.tags.is_empty());
}

#[tokio::test]
async fn test_create_validation() {
	let service = service();

	let err = service.create(new_prompt("   ", "content", &[])).await.unwrap_err();
	assert!(matches!(err, ServiceError::Validation(ref msg) if msg == "title must not be empty"));

	let err = service.create(new_prompt("title", " \n\t", &[])).await.unwrap_err();
	assert!(matches!(err, ServiceError::Validation(ref msg) if msg == "content must not be empty"));

	let err = service.create(new_prompt(&"a".repeat(256), "content", &[])).await.unwrap_err();
	assert!(matches!(err, ServiceError::Validation(_)));

	// 255 characters is still fine, even when multi-byte.
	let prompt = service.create(new_prompt(&"é".repeat(255), "content", &[])).await.unwrap();
	assert_eq!(prompt.title.chars().count(), 255);

	let (page, total) = crate::database::PromptStore::search(service.store(), &Default::default())
		.await
		.unwrap();
	assert_eq!(total, 1);
	assert_eq!(page.len(), 1);
}

#[tokio::test]
async fn test_update() {
	let service = service();
	let prompt = service.create(new_prompt("Greet", "Hello", &["demo"])).await.unwrap();

	let updated = service
		.update(
			prompt.id,
			UpdatePrompt {
				content: Some(" Hello there ".to_string()),
				tags: Some(tags(&["A", "b "])),
				..Default::default()
			},
		)
		.await
		.unwrap()
		.unwrap();

	assert_eq!(updated.title, "Greet");
	assert_eq!(updated.content, "Hello there");
	assert_eq!(updated.tags, tags(&["a", "b"]));
	assert_eq!(updated.created_at, prompt.created_at);
	assert!(updated.updated_at >= prompt.updated_at);

	let err = service
		.update(
			prompt.id,
			UpdatePrompt {
				title: Some(" ".to_string()),
				..Default::default()
			},
		)
		.await
		.unwrap_err();
	assert!(matches!(err, ServiceError::Validation(_)));

	// A rejected update leaves the record untouched.
	assert_eq!(service.get(prompt.id).await.unwrap(), Some(updated));

	assert!(service.update(9999, UpdatePrompt::default()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_update_bumps_updated_at() {
	let service = service();
	let prompt = service.create(new_prompt("Greet", "Hello", &["demo"])).await.unwrap();

	tokio::time::sleep(Duration::from_millis(5)).await;

	let updated = service.update(prompt.id, UpdatePrompt::default()).await.unwrap().unwrap();

	assert!(updated.updated_at > prompt.updated_at);
	assert_eq!(updated.title, prompt.title);
	assert_eq!(updated.content, prompt.content);
	assert_eq!(updated.tags, prompt.tags);
	assert_eq!(updated.created_at, prompt.created_at);
}

#[tokio::test]
async fn test_delete() {
	let service = service();
	let prompt = service.create(new_prompt("Greet", "Hello", &[])).await.unwrap();

	assert!(!service.delete(9999).await.unwrap());
	assert!(service.delete(prompt.id).await.unwrap());
	assert!(service.get(prompt.id).await.unwrap().is_none());
	assert!(!service.delete(prompt.id).await.unwrap());
}

#[tokio::test]
async fn test_search_by_tags() {
	let service = service();
	let greet = service
		.create(new_prompt("Greet", "Hello {name}", &["Greeting", " Demo "]))
		.await
		.unwrap();
	let other = service.create(new_prompt("Other", "text", &["a"])).await.unwrap();
	service.create(new_prompt("Third", "text", &["c"])).await.unwrap();

	let result = service
		.search(SearchParams {
			tags: tags(&["DEMO"]),
			..Default::default()
		})
		.await
		.unwrap();
	assert_eq!(result.prompts, vec![greet.clone()]);

	let result = service
		.search(SearchParams {
			tags: tags(&["missing"]),
			..Default::default()
		})
		.await
		.unwrap();
	assert!(result.prompts.is_empty());
	assert_eq!(result.total, 0);

	let result = service
		.search(SearchParams {
			tags: tags(&["a", "demo"]),
			sort_by: SortField::Id,
			sort_order: SortOrder::Asc,
			..Default::default()
		})
		.await
		.unwrap();
	assert_eq!(result.prompts, vec![greet, other]);
}

#[tokio::test]
async fn test_search_with_blank_tags_matches_nothing() {
	let service = service();
	service.create(new_prompt("Tagged", "text", &["x"])).await.unwrap();
	service.create(new_prompt("Untagged", "text", &[])).await.unwrap();

	let result = service
		.search(SearchParams {
			tags: tags(&["  "]),
			..Default::default()
		})
		.await
		.unwrap();

	assert_eq!(result.total, 0);
	assert!(result.prompts.is_empty());
}

#[tokio::test]
async fn test_search_offset_at_upper_bound() {
	let service = service();
	service.create(new_prompt("Greet", "Hello", &[])).await.unwrap();

	let result = service
		.search(SearchParams {
			offset: i64::MAX,
			..Default::default()
		})
		.await
		.unwrap();

	assert_eq!(result.offset, i64::MAX);
	assert_eq!(result.total, 1);
	assert!(result.prompts.is_empty());
	assert!(!result.has_more);
}

#[tokio::test]
async fn test_search_by_relevance_ignores_sort() {
	let service = service();
	let once = service.create(new_prompt("Greet", "hello world", &[])).await.unwrap();
	let twice = service.create(new_prompt("Hello", "hello again", &[])).await.unwrap();
	service.create(new_prompt("Bye", "goodbye", &[])).await.unwrap();

	let result = service
		.search(SearchParams {
			query: Some("hello".to_string()),
			sort_by: SortField::Title,
			sort_order: SortOrder::Asc,
			..Default::default()
		})
		.await
		.unwrap();

	assert_eq!(result.total, 2);
	assert_eq!(result.prompts, vec![twice, once]);
}

#[tokio::test]
async fn test_search_pagination() {
	let service = service();
	for i in 0..45 {
		service
			.create(new_prompt(&format!("prompt {i}"), "content", &[]))
			.await
			.unwrap();
	}

	let search = |limit, offset| {
		service.search(SearchParams {
			limit,
			offset,
			..Default::default()
		})
	};

	let first = search(20, 0).await.unwrap();
	let second = search(20, 20).await.unwrap();
	let both = search(40, 0).await.unwrap();

	assert_eq!(first.total, 45);
	assert!(first.has_more);
	assert!(first.prompts.iter().all(|p| !second.prompts.contains(p)));
	assert_eq!([first.prompts, second.prompts].concat(), both.prompts);

	let last = search(20, 40).await.unwrap();
	assert_eq!(last.prompts.len(), 5);
	assert!(!last.has_more);

	let past_end = search(20, 100).await.unwrap();
	assert!(past_end.prompts.is_empty());
	assert_eq!(past_end.total, 45);
	assert!(!past_end.has_more);
}

#[tokio::test]
async fn test_search_sorting() {
	let service = service();
	let b = service.create(new_prompt("b", "content", &[])).await.unwrap();
	let a = service.create(new_prompt("a", "content", &[])).await.unwrap();
	let c = service.create(new_prompt("c", "content", &[])).await.unwrap();

	let result = service
		.search(SearchParams {
			sort_by: SortField::Title,
			sort_order: SortOrder::Asc,
			..Default::default()
		})
		.await
		.unwrap();
	assert_eq!(result.prompts, vec![a.clone(), b.clone(), c.clone()]);

	let result = service
		.search(SearchParams {
			sort_by: SortField::Id,
			..Default::default()
		})
		.await
		.unwrap();
	assert_eq!(result.prompts, vec![c, a, b]);
}

#[tokio::test]
async fn test_list_tags() {
	let service = service();
	service.create(new_prompt("one", "content", &["Zeta", "alpha"])).await.unwrap();
	service.create(new_prompt("two", "content", &["alpha", "beta"])).await.unwrap();

	assert_eq!(service.list_tags().await.unwrap(), tags(&["alpha", "beta", "zeta"]));
}

#[tokio::test]
async fn test_storage_errors() {
	let service = PromptService::new(BrokenStore);

	let err = service.create(new_prompt("title", "content", &[])).await.unwrap_err();
	assert!(matches!(err, ServiceError::Storage(_)));

	// Validation runs before the store is reached.
	let err = service.create(new_prompt("", "content", &[])).await.unwrap_err();
	assert!(matches!(err, ServiceError::Validation(_)));

	assert!(matches!(service.list_tags().await.unwrap_err(), ServiceError::Storage(_)));
}
