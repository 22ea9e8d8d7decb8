//! Detects queries that carry machine-generated structure (stack traces,
//! hashes, ids). Such queries benefit from a literal keyword search merged
//! with the semantic results.

use regex::Regex;

const MIN_SEVERITY_TOKENS: usize = 3;
const MIN_SEVERITY_QUERY_CHARS: usize = 50;
const MIN_STACK_FRAME_TOKENS: usize = 2;

pub fn looks_like_structured_query(text: &str) -> bool {
	if text.trim().is_empty() {
		return false;
	}

	let signatures = [
		r"(?i)traceback \(most recent call last\)",
		r"(?i)exception in thread",
		r"(?i)java\.lang\.",
		r"(?i)org\.junit",
		r"(?i)at\s+org\.",
		r"(?i)AssertionError:",
		r"(?i)panic!|thread '.+' panicked",
		r"(?i)FAIL\s+\S+\s+\(",
		r"(?i)(?:error|fail|fatal):",
		r"(?i)Caused by:",
		r"(?i)\bundefined reference to\b",
	];

	for pattern in signatures {
		if Regex::new(pattern).map(|re| re.is_match(text)).unwrap_or(false) {
			return true;
		}
	}

	if matches_pattern(text, r"(?i)\b[0-9a-f]{32,}\b") {
		return true;
	}
	if matches_pattern(
		text,
		r"(?i)\b[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}\b",
	) {
		return true;
	}
	if count_matches(text, r"(?i)\bat\s+\S+\s*\(|\b\S+\.\w+:\d+") >= MIN_STACK_FRAME_TOKENS {
		return true;
	}

	count_matches(text, r"(?i)\b(?:fail|error|panic|assert|fatal)\b") >= MIN_SEVERITY_TOKENS
		&& text.chars().count() > MIN_SEVERITY_QUERY_CHARS
}

fn matches_pattern(text: &str, pattern: &str) -> bool {
	Regex::new(pattern).map(|re| re.is_match(text)).unwrap_or(false)
}

fn count_matches(text: &str, pattern: &str) -> usize {
	Regex::new(pattern).map(|re| re.find_iter(text).count()).unwrap_or(0)
}
