//! Embedding-based boilerplate rejection. A small fixed set of canonical
//! non-informative phrasings is embedded once per process; excerpts that land
//! too close to any seed are dropped.
//!
//! The filter is fail-open: the first embedding-service error disables it for
//! the remainder of the process and every excerpt passes through untouched.

use std::{
	path::Path,
	sync::atomic::{AtomicBool, Ordering},
};

use tokio::sync::OnceCell;
use tracing::{info, warn};

use hindsight_domain::{Insight, scoring, text};

const BOILERPLATE_SEEDS: [&str; 8] = [
	"<system>Focus on summarizing repository context and keep instructions short.",
	"<environment_context>Working directory: /workspace/repo sandbox_mode: workspace-write network_access: disabled</environment_context>",
	"# Contributor guide instructions for this task require you to enumerate files before running commands.",
	"Tool output: command completed successfully with exit code 0.",
	"You are coordinating multiple agents. Respond with JSON describing the plan.",
	"Sandbox env vars: SANDBOX=seatbelt SANDBOX_NETWORK_DISABLED=1",
	"1. Inspect repository status; 2. List directories; 3. Review the README and contributor guide before acting.",
	"1. Inventory tooling and available recipes. 2. Verify the toolchain. 3. Read the contributor guide before editing.",
];

/// Process-scoped filter state: seed vectors are computed at most once behind
/// a single-flight cell, and `disabled` latches on the first provider error.
pub struct BoilerplateFilter {
	seeds: OnceCell<Option<Vec<Vec<f32>>>>,
	disabled: AtomicBool,
}

impl Default for BoilerplateFilter {
	fn default() -> Self {
		Self::new()
	}
}

impl BoilerplateFilter {
	pub fn new() -> Self {
		Self { seeds: OnceCell::new(), disabled: AtomicBool::new(false) }
	}

	pub fn is_disabled(&self) -> bool {
		self.disabled.load(Ordering::SeqCst)
	}

	/// Drops excerpts whose maximum seed similarity reaches the threshold.
	/// Returns the survivors and the removal count.
	pub(crate) async fn filter(
		&self,
		service: &crate::RecallService,
		project_root: &Path,
		insights: Vec<Insight>,
	) -> (Vec<Insight>, usize) {
		if insights.is_empty() {
			return (insights, 0);
		}

		let threshold = service.cfg.boilerplate.threshold;
		let max_chars = service.cfg.boilerplate.max_excerpt_chars;
		let Some(seeds) = self.seed_vectors(service, project_root).await else {
			return (insights, 0);
		};

		if seeds.is_empty() {
			return (insights, 0);
		}

		let batch: Vec<String> = insights
			.iter()
			.map(|insight| {
				text::truncate_graphemes(&text::normalize_whitespace(&insight.excerpt), max_chars)
					.to_string()
			})
			.collect();
		let Some(vectors) = self.embed_texts(service, project_root, &batch).await else {
			return (insights, 0);
		};

		let total = insights.len();
		let mut kept = Vec::with_capacity(total);
		let mut removed = 0;

		for (idx, insight) in insights.into_iter().enumerate() {
			let Some(vector) = vectors.get(idx) else {
				kept.push(insight);

				continue;
			};
			let max_similarity = seeds
				.iter()
				.map(|seed| scoring::dot(vector, seed))
				.fold(f32::NEG_INFINITY, f32::max);

			if max_similarity.is_finite() && max_similarity >= threshold {
				removed += 1;
			} else {
				kept.push(insight);
			}
		}

		if removed > 0 {
			info!(removed, total, threshold, "Boilerplate filter removed excerpts.");
		}

		(kept, removed)
	}

	/// Seed vectors, computed once per process. `None` means the filter is
	/// disabled.
	async fn seed_vectors(
		&self,
		service: &crate::RecallService,
		project_root: &Path,
	) -> Option<&Vec<Vec<f32>>> {
		let seeds: Vec<String> = BOILERPLATE_SEEDS.iter().map(|seed| seed.to_string()).collect();

		self.seeds
			.get_or_init(|| async { self.embed_texts(service, project_root, &seeds).await })
			.await
			.as_ref()
	}

	/// Embeds a batch, or returns `None` and latches the disabled flag on the
	/// first provider failure.
	async fn embed_texts(
		&self,
		service: &crate::RecallService,
		project_root: &Path,
		texts: &[String],
	) -> Option<Vec<Vec<f32>>> {
		if self.is_disabled() || texts.is_empty() {
			return None;
		}

		match service
			.providers
			.embedding
			.embed(&service.cfg.providers.embedding, project_root, texts, true, false)
			.await
		{
			Ok(vectors) => Some(vectors),
			Err(err) => {
				self.disabled.store(true, Ordering::SeqCst);

				warn!(
					error = %err,
					"Boilerplate filter disabled for this process (embedding unavailable)."
				);

				None
			},
		}
	}
}
