use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

/// Runs one structured classification call. `schema` is attached as a strict
/// JSON-schema response format; the decoded JSON object is returned as-is and
/// left to the caller to interpret (the caller owns the fail-closed default).
pub async fn classify(
	cfg: &hindsight_config::GraderProviderConfig,
	instructions: &str,
	schema_name: &str,
	schema: &Value,
	prompt: &str,
) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [
			{ "role": "system", "content": instructions },
			{ "role": "user", "content": prompt },
		],
		"response_format": {
			"type": "json_schema",
			"json_schema": {
				"name": schema_name,
				"strict": true,
				"schema": schema,
			},
		},
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_classifier_json(json)
}

fn parse_classifier_json(json: Value) -> Result<Value> {
	if let Some(content) = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
	{
		let parsed: Value = serde_json::from_str(content)
			.map_err(|_| eyre::eyre!("Classifier content is not valid JSON."))?;

		return Ok(parsed);
	}

	if json.is_object() {
		return Ok(json);
	}

	Err(eyre::eyre!("Classifier response is missing JSON content."))
}
