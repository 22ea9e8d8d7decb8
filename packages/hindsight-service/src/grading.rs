//! LLM relevance grading. Only high-scoring survivors reach this stage, and
//! every verdict defaults to reject when the classifier fails to answer in
//! the strict schema.

use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{info, warn};

use hindsight_config::GraderProviderConfig;
use hindsight_domain::{GradingDecision, Insight, text};

use crate::GraderProvider;

const GRADING_SCHEMA_NAME: &str = "RecallGrading";
const MAX_GRADED_EXCERPT_CHARS: usize = 400;

const GRADER_INSTRUCTIONS: &str = "You are a STRICT filter for conversation excerpts. Only approve excerpts with SPECIFIC technical details.

REJECT excerpts containing:
- Greetings and pleasantries
- Thinking markers (**, ##, <thinking>)
- JSON objects or structured data dumps
- Generic phrases (\"Context from past work\", \"working on this\", etc.)
- Metadata and system information
- Boilerplate text
- Task or checklist instructions (\"1.\", \"2.\", \"Plan:\")
- Contributor-guide guidance, sandbox instructions, or environment descriptions
- Tool output summaries or command transcript blocks

APPROVE ONLY excerpts with:
- Specific code/file references (file paths, function names, variable names)
- Technical decisions and rationale
- Error messages and debugging details
- Implementation specifics and algorithms
- Architecture patterns and design choices

Return a JSON object with:
- is_relevant: boolean indicating if this excerpt should be kept
- reasoning: brief 1-2 sentence explanation of your decision";

fn grading_schema() -> Value {
	serde_json::json!({
		"type": "object",
		"properties": {
			"is_relevant": {
				"type": "boolean",
				"description": "True if the excerpt contains specific technical details relevant to the work context"
			},
			"reasoning": {
				"type": "string",
				"description": "Brief explanation (1-2 sentences) of why the excerpt was approved or rejected"
			}
		},
		"required": ["is_relevant", "reasoning"],
		"additionalProperties": false
	})
}

fn grading_prompt(context: &str, excerpt: &str) -> String {
	let excerpt = text::truncate_graphemes(excerpt, MAX_GRADED_EXCERPT_CHARS);

	format!(
		"Context: {context}\n\nExcerpt to grade:\n\"\"\"\n{excerpt}\n\"\"\"\n\nEvaluate whether \
		 this excerpt contains specific technical details relevant to the work context."
	)
}

/// Grades a high-scoring group and returns the approved insights in their
/// input order. In parallel mode one classification call is issued per
/// candidate and the verdicts are re-associated by input index, never by
/// completion order.
pub(crate) async fn grade_insights(
	grader: Arc<dyn GraderProvider>,
	cfg: &GraderProviderConfig,
	context: &str,
	insights: Vec<Insight>,
	parallel: bool,
) -> Vec<Insight> {
	if insights.is_empty() {
		return Vec::new();
	}

	let total = insights.len();
	let mut verdicts = vec![false; total];

	if parallel {
		let mut tasks = JoinSet::new();

		for (idx, insight) in insights.iter().enumerate() {
			let grader = grader.clone();
			let cfg = cfg.clone();
			let prompt = grading_prompt(context, &insight.excerpt);

			tasks.spawn(async move { (idx, grade_one(grader, &cfg, &prompt).await) });
		}

		while let Some(joined) = tasks.join_next().await {
			match joined {
				Ok((idx, approved)) => verdicts[idx] = approved,
				Err(err) => {
					warn!(error = %err, "Grading task failed; treating its candidate as rejected.");
				},
			}
		}
	} else {
		for (idx, insight) in insights.iter().enumerate() {
			let prompt = grading_prompt(context, &insight.excerpt);

			verdicts[idx] = grade_one(grader.clone(), cfg, &prompt).await;
		}
	}

	let approved: Vec<Insight> = insights
		.into_iter()
		.zip(verdicts)
		.filter(|(_, approved)| *approved)
		.map(|(insight, _)| insight)
		.collect();

	info!(
		total,
		approved = approved.len(),
		rejected = total - approved.len(),
		"LLM grading complete."
	);

	approved
}

/// One classification call. Provider failures and malformed structured output
/// both default to reject.
async fn grade_one(
	grader: Arc<dyn GraderProvider>,
	cfg: &GraderProviderConfig,
	prompt: &str,
) -> bool {
	let raw = match grader
		.classify(cfg, GRADER_INSTRUCTIONS, GRADING_SCHEMA_NAME, &grading_schema(), prompt)
		.await
	{
		Ok(raw) => raw,
		Err(err) => {
			warn!(error = %err, "Grading call failed; rejecting the candidate.");

			return false;
		},
	};

	match serde_json::from_value::<GradingDecision>(raw) {
		Ok(decision) => decision.is_relevant,
		Err(err) => {
			warn!(error = %err, "Grading returned no structured output; defaulting to reject.");

			false
		},
	}
}
