//! Heuristic classifier that rejects boilerplate, system, and instructional
//! text before any model-based filtering runs.
//!
//! The policy is an ordered list of named predicates: cheap hard rejects
//! first, then four strong signal combinations that reject on their own, then
//! an ensemble of eight weak signals that rejects when at least two fire.

use regex::Regex;

const MIN_EXCERPT_CHARS: usize = 20;
const WEAK_SIGNAL_REJECT_COUNT: usize = 2;
const MAX_ANGLE_TAGS: usize = 3;

/// Pure validity check for a conversation excerpt. Deterministic, no side
/// effects.
pub fn is_valid_excerpt(excerpt: &str) -> bool {
	let trimmed = excerpt.trim();

	if trimmed.chars().count() < MIN_EXCERPT_CHARS {
		return false;
	}
	if ends_with_percentage_marker(trimmed) {
		return false;
	}
	if looks_like_file_json(trimmed) {
		return false;
	}
	if angle_tag_count(trimmed) > MAX_ANGLE_TAGS {
		return false;
	}

	let features = TextFeatures::compute(trimmed);

	if features.raw_token_count == 0 {
		return false;
	}
	if features.is_strong_reject() {
		return false;
	}

	features.weak_signal_count() < WEAK_SIGNAL_REJECT_COUNT
}

/// Tool outputs often end with a progress marker like "(89%)" or "(130%)".
fn ends_with_percentage_marker(trimmed: &str) -> bool {
	Regex::new(r"\(\d{2,3}%\)\s*$").map(|re| re.is_match(trimmed)).unwrap_or(false)
}

/// Structured dumps from file tooling: a JSON object carrying a "file" key.
fn looks_like_file_json(trimmed: &str) -> bool {
	trimmed.starts_with('{') && trimmed.contains("\"file\"")
}

fn angle_tag_count(trimmed: &str) -> usize {
	Regex::new(r"<[^>]+>").map(|re| re.find_iter(trimmed).count()).unwrap_or(0)
}

/// Statistical signals over tokens and lines of a trimmed excerpt.
#[derive(Debug)]
struct TextFeatures {
	raw_token_count: usize,
	line_count: usize,
	uppercase_ratio: f32,
	snake_token_count: usize,
	underscore_ratio: f32,
	heading_ratio: f32,
	bullet_ratio: f32,
	numbered_ratio: f32,
	enumerated_ratio: f32,
	colon_label_ratio: f32,
	initial_title_case_run: usize,
	repeated_token_ratio: f32,
	tagged_block_wrap: bool,
}

impl TextFeatures {
	fn compute(trimmed: &str) -> Self {
		let lines: Vec<&str> =
			trimmed.lines().map(str::trim).filter(|line| !line.is_empty()).collect();
		let raw_tokens: Vec<&str> = trimmed.split_whitespace().collect();
		let raw_token_count = raw_tokens.len();
		let line_count = lines.len().max(1);

		let uppercase_tokens = raw_tokens.iter().filter(|token| is_uppercase_token(token)).count();
		let snake_token_count = raw_tokens.iter().filter(|token| token.contains('_')).count();
		let heading_lines = lines.iter().filter(|line| is_heading_line(line)).count();
		let bullet_lines = lines.iter().filter(|line| is_bullet_line(line)).count();
		let numbered_lines = lines.iter().filter(|line| is_numbered_line(line)).count();
		let colon_label_lines = lines.iter().filter(|line| is_colon_label_line(line)).count();

		let mut frequencies = std::collections::HashMap::new();

		for token in &raw_tokens {
			*frequencies.entry(token.to_lowercase()).or_insert(0_usize) += 1;
		}

		let most_common = frequencies.values().copied().max().unwrap_or(0);
		let denom = raw_token_count.max(1) as f32;

		Self {
			raw_token_count,
			line_count: lines.len(),
			uppercase_ratio: uppercase_tokens as f32 / denom,
			snake_token_count,
			underscore_ratio: snake_token_count as f32 / denom,
			heading_ratio: heading_lines as f32 / line_count as f32,
			bullet_ratio: bullet_lines as f32 / line_count as f32,
			numbered_ratio: numbered_lines as f32 / line_count as f32,
			enumerated_ratio: (bullet_lines + numbered_lines) as f32 / line_count as f32,
			colon_label_ratio: colon_label_lines as f32 / line_count as f32,
			initial_title_case_run: initial_title_case_run(&raw_tokens),
			repeated_token_ratio: most_common as f32 / denom,
			tagged_block_wrap: is_system_tagged_block(trimmed),
		}
	}

	/// Any one of these combinations is decisive on its own.
	fn is_strong_reject(&self) -> bool {
		let heavy_snake_case = self.snake_token_count >= 2 && self.underscore_ratio > 0.15;
		let heading_dominated_short = self.heading_ratio > 0.6 && self.line_count <= 4;
		let long_title_case_opening =
			self.initial_title_case_run >= 3 && self.raw_token_count <= 20;
		let heavily_enumerated = self.enumerated_ratio > 0.6 && self.line_count >= 3;

		heavy_snake_case || heading_dominated_short || long_title_case_opening || heavily_enumerated
	}

	/// Count of the eight weak metadata signals that fire.
	fn weak_signal_count(&self) -> usize {
		[
			self.uppercase_ratio > 0.45,
			self.underscore_ratio > 0.2,
			self.bullet_ratio > 0.7,
			self.colon_label_ratio > 0.6 || (self.line_count <= 2 && self.colon_label_ratio > 0.0),
			self.initial_title_case_run >= 3,
			self.repeated_token_ratio > 0.45 && self.raw_token_count > 15,
			self.numbered_ratio > 0.5,
			self.tagged_block_wrap,
		]
		.iter()
		.filter(|fired| **fired)
		.count()
	}
}

fn is_uppercase_token(token: &str) -> bool {
	let alphabetic: String = token.chars().filter(|ch| ch.is_ascii_alphabetic()).collect();

	alphabetic.len() >= 3 && alphabetic.chars().all(|ch| ch.is_ascii_uppercase())
}

fn is_heading_line(line: &str) -> bool {
	let hashes = line.chars().take_while(|ch| *ch == '#').count();

	(1..=6).contains(&hashes) && line[hashes..].starts_with(' ')
}

fn is_bullet_line(line: &str) -> bool {
	let rest = line.trim_start();

	(rest.starts_with('-') || rest.starts_with('*')) && rest[1..].starts_with(' ')
}

fn is_numbered_line(line: &str) -> bool {
	let rest = line.trim_start();
	let digits = rest.chars().take_while(char::is_ascii_digit).count();

	digits > 0 && matches!(rest[digits..].chars().next(), Some(')' | '.'))
}

/// A short "Label:" prefix, e.g. "Status: done" or "approval_policy: never".
fn is_colon_label_line(line: &str) -> bool {
	let Some(colon) = line.find(':') else {
		return false;
	};

	if colon == 0 || colon > 24 {
		return false;
	}

	line[..colon].chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, ' ' | '_' | '-'))
}

/// Length of the leading run of Title-Case or ALL-CAPS tokens, which marks
/// agent-name banners like "Branch Intent Analyst".
fn initial_title_case_run(raw_tokens: &[&str]) -> usize {
	let mut run = 0;

	for token in raw_tokens {
		let cleaned: String = token.chars().filter(|ch| ch.is_ascii_alphabetic()).collect();

		if cleaned.is_empty() {
			break;
		}

		let mut chars = cleaned.chars();
		let first_upper = chars.next().map(|ch| ch.is_ascii_uppercase()).unwrap_or(false);
		let rest_lower = chars.as_str().chars().all(|ch| ch.is_ascii_lowercase());
		let is_title_case = first_upper && rest_lower;
		let is_all_caps =
			cleaned.len() >= 2 && cleaned.chars().all(|ch| ch.is_ascii_uppercase());

		if is_title_case || is_all_caps {
			run += 1;
		} else {
			break;
		}
	}

	run
}

/// Whole excerpt wrapped in one matching tag pair whose name reads like
/// injected context, e.g. `<environment_context>…</environment_context>`.
fn is_system_tagged_block(trimmed: &str) -> bool {
	let Some(rest) = trimmed.strip_prefix('<') else {
		return false;
	};
	let Some(end) = rest.find('>') else {
		return false;
	};
	let name = &rest[..end];

	if name.is_empty()
		|| !name
			.chars()
			.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-'))
	{
		return false;
	}

	let closing = format!("</{name}>");

	if !trimmed.to_lowercase().ends_with(&closing.to_lowercase()) {
		return false;
	}

	let lowered = name.to_lowercase();

	name.contains('_')
		|| lowered.contains("system")
		|| lowered.contains("context")
		|| lowered.contains("env")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_short_excerpts() {
		assert!(!is_valid_excerpt("too short"));
		assert!(!is_valid_excerpt("   "));
	}

	#[test]
	fn accepts_conversational_prose() {
		assert!(is_valid_excerpt(
			"We refactored the auth module to use async/await and moved token refresh into a \
			 background task so request handlers never block."
		));
	}

	#[test]
	fn is_deterministic_across_calls() {
		let excerpt = "We traced the flaky test to a shared temp dir between parallel runs.";

		let first = is_valid_excerpt(excerpt);

		for _ in 0..10 {
			assert_eq!(is_valid_excerpt(excerpt), first);
		}
	}

	#[test]
	fn rejects_trailing_percentage_marker() {
		assert!(!is_valid_excerpt("Compressing objects and writing them to disk (89%)"));
	}

	#[test]
	fn rejects_json_with_file_key() {
		assert!(!is_valid_excerpt(r#"{"file": "src/main.rs", "line": 42, "severity": "warn"}"#));
	}

	#[test]
	fn rejects_tag_heavy_excerpts() {
		assert!(!is_valid_excerpt(
			"<a>one</a> <b>two</b> some text in between that is long enough to pass"
		));
	}

	#[test]
	fn rejects_heavy_snake_case() {
		assert!(!is_valid_excerpt(
			"approval_policy sandbox_mode network_access disabled per workspace settings"
		));
	}

	#[test]
	fn rejects_heading_dominated_short_text() {
		assert!(!is_valid_excerpt("# Workspace Guide\n## Core Expectations\nFollow the rules."));
	}

	#[test]
	fn rejects_long_title_case_opening() {
		assert!(!is_valid_excerpt("Branch Intent Analyst Coordinating Automated Review Sessions"));
	}

	#[test]
	fn rejects_heavily_enumerated_text() {
		assert!(!is_valid_excerpt(
			"1. Inspect repository status\n2. List directories\n3. Review instructions first"
		));
	}

	#[test]
	fn rejects_when_two_weak_signals_fire() {
		// Uppercase-heavy tokens plus a colon label in a two-line excerpt; no
		// single strong combination applies.
		assert!(!is_valid_excerpt("mode: STRICT SANDBOX FAIL GUARD VALUE"));
	}

	#[test]
	fn single_weak_signal_is_not_enough() {
		assert!(is_valid_excerpt(
			"Note: the retry loop backs off exponentially, so transient index failures recover \
			 without dropping any queued conversation batches."
		));
	}

	#[test]
	fn rejects_system_tagged_block() {
		assert!(!is_valid_excerpt(
			"<environment_context>Working directory: /repo sandbox disabled and logging \
			 verbose</environment_context>"
		));
	}

	#[test]
	fn accepts_prose_mentioning_identifiers() {
		assert!(is_valid_excerpt(
			"The fix was to call flush_index() before rotate_segments, otherwise the reader \
			 observed a stale manifest on startup."
		));
	}
}
