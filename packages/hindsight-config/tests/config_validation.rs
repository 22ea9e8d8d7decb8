use std::fs;

use toml::Value;

use hindsight_config::Config;

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_with<F>(mutate: F) -> String
where
	F: FnOnce(&mut toml::Table),
{
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let root = value.as_table_mut().expect("Sample config must be a table.");

	mutate(root);

	toml::to_string(&value).expect("Failed to render sample config.")
}

fn load_payload(payload: &str) -> hindsight_config::Result<Config> {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let path = dir.path().join("config.toml");

	fs::write(&path, payload).expect("Failed to write test config.");

	hindsight_config::load(&path)
}

fn assert_validation_error(payload: String, needle: &str) {
	let err = load_payload(&payload).expect_err("Expected a validation error.");
	let message = err.to_string();

	assert!(message.contains(needle), "Unexpected error message: {message}");
}

#[test]
fn sample_config_loads() {
	let cfg = load_payload(SAMPLE_CONFIG_TOML).expect("Sample config must load.");

	assert_eq!(cfg.search.limit, 6);
	assert_eq!(cfg.search.max_candidates, 80);
	assert_eq!(cfg.search.candidate_multiplier, 3);
	assert_eq!(cfg.grading.min_relevance, 0.7);
	assert_eq!(cfg.boilerplate.threshold, 0.8);
}

#[test]
fn tunable_sections_default_when_absent() {
	let payload = sample_with(|root| {
		root.remove("search");
		root.remove("grading");
		root.remove("boilerplate");
	});
	let cfg = load_payload(&payload).expect("Config without tunables must load.");

	assert_eq!(cfg.search.limit, 6);
	assert_eq!(cfg.search.max_candidates, 80);
	assert!(cfg.search.use_reranker);
	assert_eq!(cfg.search.reranker_top_k, 20);
	assert_eq!(cfg.search.reranker_batch_size, 8);
	assert!(cfg.grading.enabled);
	assert!(cfg.grading.parallel);
	assert_eq!(cfg.boilerplate.max_excerpt_chars, 512);
}

#[test]
fn rejects_zero_candidate_multiplier() {
	let payload = sample_with(|root| {
		let search = root.get_mut("search").and_then(Value::as_table_mut).expect("[search]");

		search.insert("candidate_multiplier".to_string(), Value::Integer(0));
	});

	assert_validation_error(payload, "search.candidate_multiplier must be greater than zero.");
}

#[test]
fn rejects_out_of_range_min_relevance() {
	let payload = sample_with(|root| {
		let grading = root.get_mut("grading").and_then(Value::as_table_mut).expect("[grading]");

		grading.insert("min_relevance".to_string(), Value::Float(1.5));
	});

	assert_validation_error(payload, "grading.min_relevance must be in the range 0.0-1.0.");
}

#[test]
fn rejects_zero_boilerplate_threshold() {
	let payload = sample_with(|root| {
		let boilerplate =
			root.get_mut("boilerplate").and_then(Value::as_table_mut).expect("[boilerplate]");

		boilerplate.insert("threshold".to_string(), Value::Float(0.0));
	});

	assert_validation_error(payload, "boilerplate.threshold must be greater than zero");
}

#[test]
fn rejects_project_scale_below_one() {
	let payload = sample_with(|root| {
		let search = root.get_mut("search").and_then(Value::as_table_mut).expect("[search]");

		search.insert("project_scale".to_string(), Value::Float(0.5));
	});

	assert_validation_error(payload, "search.project_scale must be a finite number of at least 1.0.");
}

#[test]
fn rejects_empty_provider_api_key() {
	let payload = sample_with(|root| {
		let grader = root
			.get_mut("providers")
			.and_then(Value::as_table_mut)
			.and_then(|providers| providers.get_mut("grader"))
			.and_then(Value::as_table_mut)
			.expect("[providers.grader]");

		grader.insert("api_key".to_string(), Value::String("  ".to_string()));
	});

	assert_validation_error(payload, "Provider grader api_key must be non-empty.");
}

#[test]
fn rejects_missing_reranker_model_when_enabled() {
	let payload = sample_with(|root| {
		let search = root.get_mut("search").and_then(Value::as_table_mut).expect("[search]");

		search.insert("reranker_model".to_string(), Value::String(String::new()));
	});

	assert_validation_error(
		payload,
		"search.reranker_model must be non-empty when search.use_reranker is true.",
	);
}
