use std::{path::Path, time::Duration};

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

/// Request knobs shared by the semantic and keyword search backends.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
	pub limit: u32,
	pub max_candidates: u32,
	pub reranker_model: Option<String>,
	pub reranker_top_k: Option<u32>,
	pub reranker_batch_size: Option<u32>,
	pub normalize: bool,
	pub cache: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationMeta {
	#[serde(default)]
	pub id: Option<String>,
	#[serde(default)]
	pub created_at: Option<String>,
	#[serde(default)]
	pub updated_at: Option<String>,
}

/// One ranked conversation returned by a search backend, carrying the
/// excerpts that matched the query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchMatch {
	#[serde(default)]
	pub conversation: ConversationMeta,
	#[serde(default)]
	pub relevance_score: Option<f32>,
	#[serde(default)]
	pub matching_excerpts: Vec<String>,
	#[serde(default)]
	pub insights: Vec<String>,
}

pub async fn search(
	cfg: &hindsight_config::SearchProviderConfig,
	corpus_root: &Path,
	query: &str,
	options: &SearchOptions,
) -> Result<Vec<SearchMatch>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let mut body = serde_json::json!({
		"corpus_root": corpus_root,
		"query": query,
		"limit": options.limit,
		"max_candidates": options.max_candidates,
		"normalize": options.normalize,
		"cache": options.cache,
	});

	if let Some(model) = options.reranker_model.as_deref() {
		body["reranker_model"] = Value::from(model);
	}
	if let Some(top_k) = options.reranker_top_k {
		body["reranker_top_k"] = Value::from(top_k);
	}
	if let Some(batch_size) = options.reranker_batch_size {
		body["reranker_batch_size"] = Value::from(batch_size);
	}

	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_search_response(json)
}

fn parse_search_response(json: Value) -> Result<Vec<SearchMatch>> {
	let results = json
		.get("results")
		.cloned()
		.ok_or_else(|| eyre::eyre!("Search response is missing results array."))?;

	serde_json::from_value(results)
		.map_err(|err| eyre::eyre!("Search response has malformed results: {err}."))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_matches_with_partial_metadata() {
		let json = serde_json::json!({
			"results": [
				{
					"conversation": { "id": "c1", "created_at": "2026-01-05T09:00:00Z" },
					"relevance_score": 0.82,
					"matching_excerpts": ["We fixed the retry loop."],
					"insights": ["retry fix"]
				},
				{
					"matching_excerpts": ["Orphan excerpt without metadata."]
				}
			]
		});
		let parsed = parse_search_response(json).expect("parse failed");

		assert_eq!(parsed.len(), 2);
		assert_eq!(parsed[0].conversation.id.as_deref(), Some("c1"));
		assert_eq!(parsed[0].relevance_score, Some(0.82));
		assert!(parsed[1].conversation.id.is_none());
		assert!(parsed[1].relevance_score.is_none());
	}

	#[test]
	fn rejects_missing_results_array() {
		assert!(parse_search_response(serde_json::json!({ "items": [] })).is_err());
	}
}
