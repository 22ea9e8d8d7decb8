//! Episode-based re-ranking. Summaries of past conversations are matched
//! against the query and contribute a per-conversation score boost; the boost
//! re-orders results but never filters them.

use std::{collections::HashMap, path::Path};

use tracing::warn;

use hindsight_domain::scoring;
use hindsight_episodes::EpisodeSummary;

use crate::RecallService;

/// How many episodes to keep relative to the requested result limit.
const EPISODE_MATCH_MULTIPLIER: usize = 4;

impl RecallService {
	/// Builds a map of conversation id to boost (the maximum importance among
	/// that conversation's matching episodes). Every failure path — missing
	/// store, malformed store, embedding error — degrades to an empty map.
	pub(crate) async fn conversation_boosts(
		&self,
		project_root: &Path,
		query: &str,
		limit: usize,
	) -> HashMap<String, f32> {
		if query.trim().is_empty() {
			return HashMap::new();
		}

		let episodes = match hindsight_episodes::read_episodes(&self.cfg.store.home_dir) {
			Ok(episodes) => episodes,
			Err(err) => {
				warn!(error = %err, "Episode store unreadable; skipping episode boosts.");

				return HashMap::new();
			},
		};

		if episodes.is_empty() {
			return HashMap::new();
		}

		let matched =
			self.rank_episodes(project_root, query, episodes, limit * EPISODE_MATCH_MULTIPLIER).await;
		let mut boosts: HashMap<String, f32> = HashMap::new();

		for episode in matched {
			let importance = episode.importance.unwrap_or(0.0);
			let entry = boosts.entry(episode.conversation_id).or_insert(0.0);

			if importance > *entry {
				*entry = importance;
			}
		}

		boosts
	}

	/// Ranks episodes by cosine similarity between the query and each
	/// episode's summary text, keeping the top `keep`.
	async fn rank_episodes(
		&self,
		project_root: &Path,
		query: &str,
		episodes: Vec<EpisodeSummary>,
		keep: usize,
	) -> Vec<EpisodeSummary> {
		let mut inputs = Vec::with_capacity(episodes.len() + 1);

		inputs.push(query.to_string());
		inputs.extend(episodes.iter().map(EpisodeSummary::document_text));

		let embeddings = match self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, project_root, &inputs, true, true)
			.await
		{
			Ok(embeddings) => embeddings,
			Err(err) => {
				warn!(error = %err, "Episode embedding failed; skipping episode boosts.");

				return Vec::new();
			},
		};

		if embeddings.len() != inputs.len() {
			warn!(
				expected = inputs.len(),
				received = embeddings.len(),
				"Episode embedding count mismatch; skipping episode boosts."
			);

			return Vec::new();
		}

		let mut iter = embeddings.into_iter();
		let Some(query_vector) = iter.next() else {
			return Vec::new();
		};
		let mut scored: Vec<(EpisodeSummary, f32)> = episodes
			.into_iter()
			.zip(iter)
			.map(|(episode, vector)| {
				let score = scoring::cosine_similarity(&query_vector, &vector);

				(episode, score)
			})
			.collect();

		scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
		scored.truncate(keep);

		scored.into_iter().map(|(episode, _)| episode).collect()
	}
}
