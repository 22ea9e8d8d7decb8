//! The recall pipeline. Stage order is fixed: gateway → quality filter →
//! boilerplate filter → relevance split → [LLM grading] → dedup →
//! episode-boost re-sort → truncate. The low-relevance split is discarded in
//! every branch; stage counters never increase left to right.

use std::cmp::Ordering;

use tracing::info;
use uuid::Uuid;

use hindsight_domain::{FilterStats, Insight, SearchContext, dedup, quality, scoring};

use crate::{RecallService, ServiceError, ServiceResult, grading};

/// Output of one pipeline invocation at one scope level.
#[derive(Debug, Clone)]
pub struct LevelResult {
	pub insights: Vec<Insight>,
	pub stats: FilterStats,
}

/// Per-call overrides; anything unset falls back to the configured defaults.
#[derive(Debug, Clone, Default)]
pub struct RecallOptions {
	pub limit: Option<usize>,
	pub max_candidates: Option<u32>,
	pub candidate_multiplier: Option<u32>,
	pub use_reranker: Option<bool>,
	pub min_relevance: Option<f32>,
	pub skip_grading: bool,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedOptions {
	pub(crate) limit: usize,
	pub(crate) max_candidates: u32,
	pub(crate) candidate_multiplier: u32,
	pub(crate) use_reranker: bool,
	pub(crate) min_relevance: f32,
	pub(crate) grading_enabled: bool,
	pub(crate) grading_parallel: bool,
}

impl RecallService {
	/// Runs the full pipeline for one search context and returns the surviving
	/// insights plus per-stage counters. Backend failures degrade to fewer (or
	/// zero) insights; only invalid per-call overrides produce an error.
	pub async fn recall(
		&self,
		context: &SearchContext,
		options: &RecallOptions,
	) -> ServiceResult<LevelResult> {
		let resolved = self.resolve_options(context, options)?;
		let trace_id = Uuid::new_v4();
		let query = context.to_query();
		let corpus_root = context.repo_path();

		info!(
			trace_id = %trace_id,
			level = context.level().as_str(),
			query = %query,
			"Recall search started."
		);

		let raw = self.fetch_candidates(corpus_root, &query, &resolved).await;
		let mut stats = FilterStats { total: raw.len(), ..FilterStats::default() };

		let valid: Vec<Insight> =
			raw.into_iter().filter(|insight| quality::is_valid_excerpt(&insight.excerpt)).collect();

		stats.after_quality = valid.len();

		let (conversational, _removed) =
			self.boilerplate().filter(self, corpus_root, valid).await;

		stats.after_boilerplate = conversational.len();

		// The low split is dropped in both branches; only high-relevance
		// excerpts can reach the output.
		let high: Vec<Insight> = conversational
			.into_iter()
			.filter(|insight| insight.relevance >= resolved.min_relevance)
			.collect();

		stats.after_score = high.len();

		let graded = if resolved.grading_enabled {
			grading::grade_insights(
				self.providers.grader.clone(),
				&self.cfg.providers.grader,
				&query,
				high,
				resolved.grading_parallel,
			)
			.await
		} else {
			high
		};

		stats.after_llm_grade = Some(graded.len());

		let mut ranked = dedup::deduplicate(graded);

		stats.after_dedup = ranked.len();

		if !ranked.is_empty() {
			let boosts = self.conversation_boosts(corpus_root, &query, resolved.limit).await;

			if !boosts.is_empty() {
				ranked.sort_by(|a, b| {
					let a_score =
						scoring::blended_score(a.relevance, boost_for(&boosts, &a.conversation_id));
					let b_score =
						scoring::blended_score(b.relevance, boost_for(&boosts, &b.conversation_id));

					b_score.partial_cmp(&a_score).unwrap_or(Ordering::Equal)
				});
			}
		}

		ranked.truncate(resolved.limit);

		stats.final_count = ranked.len();

		log_filtering(trace_id, context, &stats, resolved.min_relevance);

		Ok(LevelResult { insights: ranked, stats })
	}

	fn resolve_options(
		&self,
		context: &SearchContext,
		options: &RecallOptions,
	) -> ServiceResult<ResolvedOptions> {
		if options.max_candidates == Some(0) {
			return Err(ServiceError::InvalidRequest {
				message: "max_candidates override must be greater than zero.".to_string(),
			});
		}
		if options.candidate_multiplier == Some(0) {
			return Err(ServiceError::InvalidRequest {
				message: "candidate_multiplier override must be greater than zero.".to_string(),
			});
		}

		let search = &self.cfg.search;
		let base_candidates = options.max_candidates.unwrap_or(search.max_candidates);
		let max_candidates = scale_candidates_for_level(context, base_candidates, search.project_scale);

		Ok(ResolvedOptions {
			limit: options.limit.unwrap_or(search.limit),
			max_candidates,
			candidate_multiplier: options
				.candidate_multiplier
				.unwrap_or(search.candidate_multiplier),
			use_reranker: options.use_reranker.unwrap_or(search.use_reranker),
			min_relevance: options.min_relevance.unwrap_or(self.cfg.grading.min_relevance),
			grading_enabled: self.cfg.grading.enabled && !options.skip_grading,
			grading_parallel: self.cfg.grading.parallel,
		})
	}
}

/// Project scope widens the fetch (relevance is diffuse repo-wide); file
/// scope narrows it (one file rarely needs the full candidate pool).
fn scale_candidates_for_level(
	context: &SearchContext,
	base_candidates: u32,
	project_scale: f32,
) -> u32 {
	match context {
		SearchContext::Project { .. } =>
			((base_candidates as f32 * project_scale) as u32).max(1),
		SearchContext::Branch { .. } => base_candidates,
		SearchContext::File { .. } => (base_candidates / 2).max(1),
	}
}

fn boost_for(boosts: &std::collections::HashMap<String, f32>, conversation_id: &str) -> f32 {
	boosts.get(conversation_id).copied().unwrap_or(0.0)
}

fn log_filtering(
	trace_id: Uuid,
	context: &SearchContext,
	stats: &FilterStats,
	min_relevance: f32,
) {
	let quality_filtered = stats.total - stats.after_quality;
	let boilerplate_filtered = stats.after_quality - stats.after_boilerplate;
	let score_filtered = stats.after_boilerplate - stats.after_score;
	let grade_filtered =
		stats.after_llm_grade.map(|after| stats.after_score - after).unwrap_or(0);
	let duplicate_filtered =
		stats.after_llm_grade.unwrap_or(stats.after_score) - stats.after_dedup;

	info!(
		trace_id = %trace_id,
		level = context.level().as_str(),
		total = stats.total,
		after_quality = stats.after_quality,
		after_boilerplate = stats.after_boilerplate,
		after_score = stats.after_score,
		after_llm_grade = stats.after_llm_grade,
		after_dedup = stats.after_dedup,
		final_count = stats.final_count,
		min_relevance,
		quality_filtered,
		boilerplate_filtered,
		score_filtered,
		grade_filtered,
		duplicate_filtered,
		"Recall filtering complete."
	);
}
