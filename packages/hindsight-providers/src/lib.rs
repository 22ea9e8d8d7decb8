pub mod embedding;
pub mod grader;
pub mod search;

use color_eyre::{Result, eyre};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName};
use serde_json::{Map, Value};

/// Bearer auth plus any per-provider default headers from the config.
fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();
	let bearer = format!("Bearer {api_key}");

	headers.insert(AUTHORIZATION, bearer.parse()?);

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(eyre::eyre!("Provider default_headers values must be strings."));
		};
		let name = HeaderName::from_bytes(key.as_bytes())?;

		headers.insert(name, raw.parse()?);
	}

	Ok(headers)
}
