use std::{path::PathBuf, sync::Arc};

use tempfile::TempDir;

use hindsight_domain::{SearchContext, SearchLevel};
use hindsight_providers::search::{ConversationMeta, SearchMatch};
use hindsight_service::{Providers, RecallOptions, RecallService};
use hindsight_testkit::providers::{FakeEmbedding, FakeGrader, FakeSearch};

fn search_match(id: &str, relevance: f32, excerpt: &str) -> SearchMatch {
	SearchMatch {
		conversation: ConversationMeta {
			id: Some(id.to_string()),
			created_at: Some("2026-01-18T14:00:00Z".to_string()),
			updated_at: None,
		},
		relevance_score: Some(relevance),
		matching_excerpts: vec![excerpt.to_string()],
		insights: Vec::new(),
	}
}

fn service_with_semantic(home: &TempDir, semantic: Arc<FakeSearch>) -> RecallService {
	let cfg = hindsight_testkit::test_config(home.path());
	let providers = Providers::new(
		Arc::new(FakeEmbedding::new()),
		semantic,
		Arc::new(FakeSearch::new(Vec::new())),
		Arc::new(FakeGrader::approving(&["stub it without"])),
	);

	RecallService::with_providers(cfg, providers)
}

fn prose(topic: &str) -> String {
	format!(
		"we moved the {topic} handling behind a trait seam so the tests can stub it without \
		 touching the live backend at all"
	)
}

fn project_context(query: &str) -> SearchContext {
	SearchContext::Project {
		repo_path: PathBuf::from("/workspace/repo"),
		query: query.to_string(),
		file_patterns: None,
	}
}

fn branch_context() -> SearchContext {
	SearchContext::Branch {
		repo_path: PathBuf::from("/workspace/repo"),
		branch: "feat/recall".to_string(),
		base_branch: Some("main".to_string()),
		changed_files: vec!["src/pipeline.rs".to_string()],
		recent_commits: Some("tighten stage logging".to_string()),
	}
}

fn file_context() -> SearchContext {
	SearchContext::File {
		repo_path: PathBuf::from("/workspace/repo"),
		file_path: "src/pipeline.rs".to_string(),
		diff: Some("+fn resolve_options() {}".to_string()),
		symbols: Some(vec!["resolve_options".to_string()]),
	}
}

#[tokio::test]
async fn project_level_scales_the_candidate_fetch() {
	let home = tempfile::tempdir().expect("temp home");
	let semantic = Arc::new(FakeSearch::new(vec![search_match("c1", 0.9, &prose("scaling"))]));
	let service = service_with_semantic(&home, semantic.clone());

	service
		.recall(&project_context("candidate scaling"), &RecallOptions::default())
		.await
		.expect("recall");

	// 80 candidates scaled by 1.5 for project scope, then multiplied by 3.
	let options = semantic.last_options().expect("semantic search ran");

	assert_eq!(options.limit, 360);
	assert_eq!(options.max_candidates, 360);
}

#[tokio::test]
async fn file_level_halves_the_candidate_fetch() {
	let home = tempfile::tempdir().expect("temp home");
	let semantic = Arc::new(FakeSearch::new(vec![search_match("c1", 0.9, &prose("halving"))]));
	let service = service_with_semantic(&home, semantic.clone());

	service.recall(&file_context(), &RecallOptions::default()).await.expect("recall");

	let options = semantic.last_options().expect("semantic search ran");

	assert_eq!(options.limit, 120);
	assert_eq!(options.max_candidates, 120);
}

#[tokio::test]
async fn runs_every_level_sequentially_and_keys_results_by_level() {
	let home = tempfile::tempdir().expect("temp home");
	let semantic = Arc::new(FakeSearch::new(vec![
		search_match("c1", 0.9, &prose("first topic")),
		search_match("c2", 0.85, &prose("second topic")),
	]));
	let service = service_with_semantic(&home, semantic.clone());
	let contexts =
		vec![project_context("multi level recall"), branch_context(), file_context()];
	let results = service
		.recall_multi_level(&contexts, &RecallOptions::default())
		.await
		.expect("multi-level recall");

	assert_eq!(results.len(), 3);
	assert_eq!(semantic.calls(), 3);

	for level in [SearchLevel::Project, SearchLevel::Branch, SearchLevel::File] {
		let result = results.get(&level).expect("every level present");

		assert_eq!(result.insights.len(), 2);
		assert_eq!(result.stats.total, 2);
		assert!(result.insights.len() <= 6);
	}
}

#[tokio::test]
async fn reranker_options_follow_the_configuration() {
	let home = tempfile::tempdir().expect("temp home");
	let semantic = Arc::new(FakeSearch::new(vec![search_match("c1", 0.9, &prose("reranking"))]));
	let service = service_with_semantic(&home, semantic.clone());

	service.recall(&branch_context(), &RecallOptions::default()).await.expect("recall");

	let options = semantic.last_options().expect("semantic search ran");

	assert_eq!(options.reranker_model.as_deref(), Some("bge-reranker-v2-m3"));
	assert_eq!(options.reranker_top_k, Some(20));
	assert_eq!(options.reranker_batch_size, Some(8));

	let no_rerank = RecallOptions { use_reranker: Some(false), ..RecallOptions::default() };

	service.recall(&branch_context(), &no_rerank).await.expect("recall");

	let options = semantic.last_options().expect("semantic search ran");

	assert!(options.reranker_model.is_none());
	assert!(options.reranker_top_k.is_none());
}
