//! Multi-level orchestration: one pipeline invocation per scope level, run
//! sequentially so resource use stays bounded and log ordering stays
//! deterministic.

use std::collections::HashMap;

use tracing::info;

use hindsight_domain::{SearchContext, SearchLevel};

use crate::{LevelResult, RecallOptions, RecallService, ServiceResult};

impl RecallService {
	/// Runs the full pipeline once per context, in caller order, and returns
	/// the per-level results keyed by scope level.
	pub async fn recall_multi_level(
		&self,
		contexts: &[SearchContext],
		options: &RecallOptions,
	) -> ServiceResult<HashMap<SearchLevel, LevelResult>> {
		let levels: Vec<&str> =
			contexts.iter().map(|context| context.level().as_str()).collect();

		info!(levels = %levels.join(" -> "), "Multi-level recall search started.");

		let mut results = HashMap::with_capacity(contexts.len());

		for context in contexts {
			let result = self.recall(context, options).await?;

			log_level_result(context.level(), &result);
			results.insert(context.level(), result);
		}

		log_summary(&results);

		Ok(results)
	}
}

fn log_level_result(level: SearchLevel, result: &LevelResult) {
	let stats = &result.stats;
	let filter_rate = if stats.total > 0 {
		((stats.total - stats.final_count) * 100) / stats.total
	} else {
		0
	};

	info!(
		level = level.as_str(),
		insights = result.insights.len(),
		candidates = stats.total,
		final_count = stats.final_count,
		filter_rate_pct = filter_rate,
		"Level recall complete."
	);
}

fn log_summary(results: &HashMap<SearchLevel, LevelResult>) {
	let total_insights: usize = results.values().map(|result| result.insights.len()).sum();
	let total_candidates: usize = results.values().map(|result| result.stats.total).sum();
	let mut breakdown: Vec<String> = results
		.iter()
		.map(|(level, result)| format!("{}: {}", level.as_str(), result.insights.len()))
		.collect();

	breakdown.sort();

	info!(
		total_insights,
		total_candidates,
		levels = results.len(),
		breakdown = %breakdown.join(", "),
		"Multi-level recall complete."
	);
}
