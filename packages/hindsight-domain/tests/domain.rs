use hindsight_domain::{
	Insight, dedup, quality, scoring, structured,
	text,
};

fn insight(excerpt: &str, relevance: f32) -> Insight {
	Insight {
		conversation_id: "conv".to_string(),
		timestamp: "2026-02-01T12:00:00Z".to_string(),
		relevance,
		excerpt: excerpt.to_string(),
		insights: Vec::new(),
	}
}

#[test]
fn short_excerpts_never_validate() {
	assert!(!quality::is_valid_excerpt("too short"));
}

#[test]
fn shared_prefix_duplicates_collapse_to_the_best_copy() {
	let prefix = "We moved the session cache behind a trait so the test suite can stub expiry \
	              without touching redis"
		.to_string();
	let out = dedup::deduplicate(vec![
		insight(&format!("{prefix} (first pass)"), 0.6),
		insight(&format!("{prefix} (second pass)"), 0.9),
	]);

	assert_eq!(out.len(), 1);
	assert_eq!(out[0].relevance, 0.9);
}

#[test]
fn java_exception_queries_are_structured() {
	assert!(structured::looks_like_structured_query(
		"Exception in thread \"main\" java.lang.NullPointerException at \
		 com.foo.Bar.baz(Bar.java:42)"
	));
}

#[test]
fn blended_ordering_reduces_to_relevance_without_boosts() {
	let scores = [0.9_f32, 0.5, 0.7];
	let mut blended: Vec<f32> =
		scores.iter().map(|score| scoring::blended_score(*score, 0.0)).collect();

	blended.sort_by(|a, b| b.partial_cmp(a).expect("finite scores"));

	assert_eq!(blended, vec![0.9, 0.7, 0.5]);
}

#[test]
fn fingerprints_are_stable_under_formatting_noise() {
	let noisy = "Fix:\tthe   indexer\nnow retries on timeout";
	let clean = "fix: the indexer now retries on timeout";

	assert_eq!(dedup::fingerprint(noisy), dedup::fingerprint(clean));
	assert_eq!(
		text::normalize_whitespace(noisy).to_lowercase(),
		clean.to_string()
	);
}
