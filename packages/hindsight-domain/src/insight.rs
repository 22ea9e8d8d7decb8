use serde::{Deserialize, Serialize};

/// A scored excerpt of a past conversation believed relevant to the current
/// query. Transient: created per pipeline call, never persisted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
	pub conversation_id: String,
	/// RFC 3339 timestamp of the source conversation, passed through from the
	/// transcript store.
	pub timestamp: String,
	/// Semantic-search relevance in [0, 1].
	pub relevance: f32,
	pub excerpt: String,
	pub insights: Vec<String>,
}

/// Per-stage survivor counts for one pipeline invocation. Counts are
/// non-increasing left to right by construction.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FilterStats {
	pub total: usize,
	pub after_quality: usize,
	pub after_boilerplate: usize,
	pub after_score: usize,
	pub after_llm_grade: Option<usize>,
	pub after_dedup: usize,
	#[serde(rename = "final")]
	pub final_count: usize,
}

/// Structured verdict returned by the LLM relevance grader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingDecision {
	pub is_relevant: bool,
	pub reasoning: String,
}
