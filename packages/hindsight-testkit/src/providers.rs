//! Scripted provider fakes implementing the service traits.

use std::{
	collections::HashMap,
	path::Path,
	sync::{
		Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use color_eyre::eyre;
use serde_json::Value;

use hindsight_config::{EmbeddingProviderConfig, GraderProviderConfig, SearchProviderConfig};
use hindsight_providers::search::{SearchMatch, SearchOptions};
use hindsight_service::{BoxFuture, EmbeddingProvider, GraderProvider, SearchProvider};

const MOCK_DIMENSIONS: usize = 32;

/// Deterministic embedder. Texts matching a configured substring rule map to
/// that rule's vector; every other distinct text gets its own one-hot axis,
/// so unrelated texts stay orthogonal. `failing()` errors on every call,
/// which is how tests exercise the fail-open paths.
pub struct FakeEmbedding {
	rules: Vec<(String, usize)>,
	assigned: Mutex<HashMap<String, usize>>,
	next_axis: Mutex<usize>,
	fail: bool,
	calls: AtomicUsize,
}

impl FakeEmbedding {
	pub fn new() -> Self {
		Self {
			rules: Vec::new(),
			assigned: Mutex::new(HashMap::new()),
			next_axis: Mutex::new(0),
			fail: false,
			calls: AtomicUsize::new(0),
		}
	}

	pub fn failing() -> Self {
		Self { fail: true, ..Self::new() }
	}

	/// Texts containing `marker` embed to a one-hot vector on `axis`.
	pub fn with_rule(mut self, marker: &str, axis: usize) -> Self {
		self.rules.push((marker.to_string(), axis % MOCK_DIMENSIONS));

		self
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	fn vector_for(&self, text: &str) -> Vec<f32> {
		for (marker, axis) in &self.rules {
			if text.contains(marker.as_str()) {
				return one_hot(*axis);
			}
		}

		let mut assigned = self.assigned.lock().unwrap_or_else(|err| err.into_inner());

		if let Some(&axis) = assigned.get(text) {
			return one_hot(axis);
		}

		let mut next = self.next_axis.lock().unwrap_or_else(|err| err.into_inner());

		while self.rules.iter().any(|(_, axis)| *axis == *next % MOCK_DIMENSIONS) {
			*next += 1;
		}

		let axis = *next % MOCK_DIMENSIONS;

		*next += 1;

		assigned.insert(text.to_string(), axis);

		one_hot(axis)
	}
}

impl Default for FakeEmbedding {
	fn default() -> Self {
		Self::new()
	}
}

impl EmbeddingProvider for FakeEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_project_root: &'a Path,
		texts: &'a [String],
		_normalize: bool,
		_cache: bool,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);

			if self.fail {
				return Err(eyre::eyre!("Embedding backend is unavailable."));
			}

			Ok(texts.iter().map(|text| self.vector_for(text)).collect())
		})
	}
}

fn one_hot(axis: usize) -> Vec<f32> {
	let mut vector = vec![0.0; MOCK_DIMENSIONS];

	vector[axis % MOCK_DIMENSIONS] = 1.0;

	vector
}

/// Scripted search backend returning a fixed result set and recording the
/// options of the most recent request.
pub struct FakeSearch {
	matches: Vec<SearchMatch>,
	fail: bool,
	calls: AtomicUsize,
	last_options: Mutex<Option<SearchOptions>>,
}

impl FakeSearch {
	pub fn new(matches: Vec<SearchMatch>) -> Self {
		Self { matches, fail: false, calls: AtomicUsize::new(0), last_options: Mutex::new(None) }
	}

	pub fn failing() -> Self {
		Self { fail: true, ..Self::new(Vec::new()) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn last_options(&self) -> Option<SearchOptions> {
		self.last_options.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}

impl SearchProvider for FakeSearch {
	fn search<'a>(
		&'a self,
		_cfg: &'a SearchProviderConfig,
		_corpus_root: &'a Path,
		_query: &'a str,
		options: &'a SearchOptions,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SearchMatch>>> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);
			*self.last_options.lock().unwrap_or_else(|err| err.into_inner()) =
				Some(options.clone());

			if self.fail {
				return Err(eyre::eyre!("Search backend is unavailable."));
			}

			Ok(self.matches.clone())
		})
	}
}

/// Scripted grader. Approves prompts containing any approval marker; can be
/// switched to fail outright or to answer outside the schema.
pub struct FakeGrader {
	approve_markers: Vec<String>,
	fail: bool,
	malformed: bool,
	calls: AtomicUsize,
}

impl FakeGrader {
	pub fn approving(markers: &[&str]) -> Self {
		Self {
			approve_markers: markers.iter().map(|marker| marker.to_string()).collect(),
			fail: false,
			malformed: false,
			calls: AtomicUsize::new(0),
		}
	}

	pub fn rejecting() -> Self {
		Self::approving(&[])
	}

	pub fn failing() -> Self {
		Self { fail: true, ..Self::approving(&[]) }
	}

	pub fn malformed() -> Self {
		Self { malformed: true, ..Self::approving(&[]) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl GraderProvider for FakeGrader {
	fn classify<'a>(
		&'a self,
		_cfg: &'a GraderProviderConfig,
		_instructions: &'a str,
		_schema_name: &'a str,
		_schema: &'a Value,
		prompt: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Value>> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);

			if self.fail {
				return Err(eyre::eyre!("Grading backend is unavailable."));
			}
			if self.malformed {
				return Ok(serde_json::json!({ "verdict": "sounds good" }));
			}

			let approved =
				self.approve_markers.iter().any(|marker| prompt.contains(marker.as_str()));

			Ok(serde_json::json!({
				"is_relevant": approved,
				"reasoning": if approved { "Matched an approval marker." } else { "No marker matched." },
			}))
		})
	}
}
