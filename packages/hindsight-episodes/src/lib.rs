//! Read-only access to the episode summary store: an append-only JSON array
//! maintained by an external summarizer under the memory home directory.

mod error;

pub use error::{Error, Result};

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

/// File name of the episode store inside the memory home directory.
pub const EPISODES_FILENAME: &str = "episodes.json";

/// One summarized past conversation. The on-disk field names are camelCase —
/// the store format is owned by the external producer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeSummary {
	pub conversation_id: String,
	pub episode_id: String,
	pub timestamp: String,
	pub summary: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key_decisions: Option<Vec<String>>,
	/// Expected in [0, 1]; the producer owns the range. Not clamped here.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub importance: Option<f32>,
}

impl EpisodeSummary {
	/// Text embedded for similarity ranking: the summary plus its key
	/// decisions, one per line.
	pub fn document_text(&self) -> String {
		let mut out = self.summary.clone();

		for decision in self.key_decisions.iter().flatten() {
			out.push('\n');
			out.push_str(decision);
		}

		out
	}
}

/// Reads every episode under `home_dir`. A missing store file is an empty
/// corpus, not an error; a store that is valid JSON but not an array is
/// treated as empty.
pub fn read_episodes(home_dir: &Path) -> Result<Vec<EpisodeSummary>> {
	let path = home_dir.join(EPISODES_FILENAME);
	let raw = match fs::read_to_string(&path) {
		Ok(raw) => raw,
		Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
		Err(err) => return Err(Error::ReadStore { path, source: err }),
	};
	let value: serde_json::Value = serde_json::from_str(&raw)
		.map_err(|err| Error::ParseStore { path: path.clone(), source: err })?;

	if !value.is_array() {
		return Ok(Vec::new());
	}

	serde_json::from_value(value).map_err(|err| Error::ParseStore { path, source: err })
}
