//! Candidate retrieval. Over-fetches from the semantic index so the
//! downstream filters have enough material left after rejection, and merges
//! in a literal keyword search when the query carries machine structure.

use std::path::Path;

use time::format_description::well_known::Rfc3339;
use tracing::warn;

use hindsight_domain::{Insight, structured};
use hindsight_providers::search::{SearchMatch, SearchOptions};

use crate::{RecallService, pipeline::ResolvedOptions};

const UNKNOWN_CONVERSATION_ID: &str = "unknown";

impl RecallService {
	/// Fetches raw candidates for one query. Backend failures degrade to an
	/// empty list; this function never errors.
	pub(crate) async fn fetch_candidates(
		&self,
		corpus_root: &Path,
		query: &str,
		options: &ResolvedOptions,
	) -> Vec<Insight> {
		let normalized = query.trim();

		if normalized.is_empty() {
			return Vec::new();
		}

		let overfetch = options.max_candidates * options.candidate_multiplier;
		let mut semantic_options = SearchOptions {
			limit: overfetch,
			max_candidates: overfetch,
			reranker_model: None,
			reranker_top_k: None,
			reranker_batch_size: None,
			normalize: true,
			cache: true,
		};

		if options.use_reranker {
			semantic_options.reranker_model = Some(self.cfg.search.reranker_model.clone());
			semantic_options.reranker_top_k = Some(self.cfg.search.reranker_top_k);
			semantic_options.reranker_batch_size = Some(self.cfg.search.reranker_batch_size);
		}

		let keyword_matches = if structured::looks_like_structured_query(normalized) {
			let keyword_options = SearchOptions {
				limit: options.limit as u32,
				max_candidates: options.limit as u32,
				reranker_model: None,
				reranker_top_k: None,
				reranker_batch_size: None,
				normalize: true,
				cache: true,
			};

			match self
				.providers
				.keyword
				.search(&self.cfg.providers.keyword, corpus_root, normalized, &keyword_options)
				.await
			{
				Ok(matches) => matches,
				Err(err) => {
					warn!(error = %err, "Keyword search failed; continuing with semantic results only.");

					Vec::new()
				},
			}
		} else {
			Vec::new()
		};

		let semantic_matches = match self
			.providers
			.semantic
			.search(&self.cfg.providers.semantic, corpus_root, normalized, &semantic_options)
			.await
		{
			Ok(matches) => matches,
			Err(err) => {
				warn!(error = %err, "Semantic search failed; returning no candidates.");

				return Vec::new();
			},
		};

		convert_matches_to_insights(merge_search_results(keyword_matches, semantic_matches))
	}
}

/// Merges keyword results ahead of semantic ones, dropping entries that share
/// a conversation and leading excerpt.
pub(crate) fn merge_search_results(
	primary: Vec<SearchMatch>,
	secondary: Vec<SearchMatch>,
) -> Vec<SearchMatch> {
	let mut seen = std::collections::HashSet::new();
	let mut merged = Vec::with_capacity(primary.len() + secondary.len());

	for entry in primary.into_iter().chain(secondary) {
		let conversation_id =
			entry.conversation.id.clone().unwrap_or_else(|| UNKNOWN_CONVERSATION_ID.to_string());
		let excerpt_key = entry
			.matching_excerpts
			.first()
			.cloned()
			.unwrap_or_else(|| entry.relevance_score.unwrap_or(0.0).to_string());

		if seen.insert((conversation_id, excerpt_key)) {
			merged.push(entry);
		}
	}

	merged
}

/// Flattens matches into one insight per non-blank excerpt, filling in the
/// defaults for missing metadata.
pub(crate) fn convert_matches_to_insights(matches: Vec<SearchMatch>) -> Vec<Insight> {
	let now = time::OffsetDateTime::now_utc()
		.format(&Rfc3339)
		.unwrap_or_else(|_| String::new());
	let mut out = Vec::new();

	for entry in matches {
		let conversation_id =
			entry.conversation.id.clone().unwrap_or_else(|| UNKNOWN_CONVERSATION_ID.to_string());
		let timestamp = entry
			.conversation
			.created_at
			.clone()
			.or_else(|| entry.conversation.updated_at.clone())
			.unwrap_or_else(|| now.clone());
		let relevance = entry.relevance_score.unwrap_or(0.0);

		for excerpt in entry.matching_excerpts {
			if excerpt.trim().is_empty() {
				continue;
			}

			out.push(Insight {
				conversation_id: conversation_id.clone(),
				timestamp: timestamp.clone(),
				relevance,
				excerpt,
				insights: entry.insights.clone(),
			});
		}
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use hindsight_providers::search::ConversationMeta;

	fn search_match(id: Option<&str>, score: Option<f32>, excerpts: &[&str]) -> SearchMatch {
		SearchMatch {
			conversation: ConversationMeta {
				id: id.map(str::to_string),
				created_at: Some("2026-01-20T10:00:00Z".to_string()),
				updated_at: None,
			},
			relevance_score: score,
			matching_excerpts: excerpts.iter().map(|s| s.to_string()).collect(),
			insights: vec!["noted".to_string()],
		}
	}

	#[test]
	fn merge_prefers_first_occurrence() {
		let keyword = vec![search_match(Some("c1"), Some(0.9), &["same excerpt"])];
		let semantic = vec![
			search_match(Some("c1"), Some(0.4), &["same excerpt"]),
			search_match(Some("c2"), Some(0.5), &["other excerpt"]),
		];
		let merged = merge_search_results(keyword, semantic);

		assert_eq!(merged.len(), 2);
		assert_eq!(merged[0].relevance_score, Some(0.9));
	}

	#[test]
	fn merge_keeps_distinct_excerpts_from_one_conversation() {
		let semantic = vec![
			search_match(Some("c1"), Some(0.6), &["first excerpt"]),
			search_match(Some("c1"), Some(0.5), &["second excerpt"]),
		];

		assert_eq!(merge_search_results(Vec::new(), semantic).len(), 2);
	}

	#[test]
	fn conversion_flattens_and_skips_blank_excerpts() {
		let matches = vec![search_match(Some("c1"), Some(0.7), &["keep one", "  ", "keep two"])];
		let insights = convert_matches_to_insights(matches);

		assert_eq!(insights.len(), 2);
		assert!(insights.iter().all(|insight| insight.conversation_id == "c1"));
		assert!(insights.iter().all(|insight| insight.relevance == 0.7));
	}

	#[test]
	fn conversion_defaults_missing_metadata() {
		let insights =
			convert_matches_to_insights(vec![search_match(None, None, &["some excerpt"])]);

		assert_eq!(insights[0].conversation_id, "unknown");
		assert_eq!(insights[0].relevance, 0.0);
	}
}
