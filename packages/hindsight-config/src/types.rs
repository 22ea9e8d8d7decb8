use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub store: Store,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub grading: Grading,
	#[serde(default)]
	pub boilerplate: Boilerplate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Store {
	/// Directory holding the episode summaries file. Absence of the file is an
	/// empty corpus, not an error.
	pub home_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub semantic: SearchProviderConfig,
	pub keyword: SearchProviderConfig,
	pub grader: GraderProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraderProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	#[serde(default = "default_limit")]
	pub limit: usize,
	#[serde(default = "default_max_candidates")]
	pub max_candidates: u32,
	#[serde(default = "default_candidate_multiplier")]
	pub candidate_multiplier: u32,
	#[serde(default = "default_use_reranker")]
	pub use_reranker: bool,
	#[serde(default = "default_reranker_model")]
	pub reranker_model: String,
	#[serde(default = "default_reranker_top_k")]
	pub reranker_top_k: u32,
	#[serde(default = "default_reranker_batch_size")]
	pub reranker_batch_size: u32,
	/// Over-fetch factor for project-level searches, where relevance is
	/// diffuse across the whole repository.
	#[serde(default = "default_project_scale")]
	pub project_scale: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Grading {
	#[serde(default = "default_grading_enabled")]
	pub enabled: bool,
	#[serde(default = "default_min_relevance")]
	pub min_relevance: f32,
	#[serde(default = "default_grading_parallel")]
	pub parallel: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Boilerplate {
	#[serde(default = "default_boilerplate_threshold")]
	pub threshold: f32,
	#[serde(default = "default_max_excerpt_chars")]
	pub max_excerpt_chars: usize,
}

impl Default for Search {
	fn default() -> Self {
		Self {
			limit: default_limit(),
			max_candidates: default_max_candidates(),
			candidate_multiplier: default_candidate_multiplier(),
			use_reranker: default_use_reranker(),
			reranker_model: default_reranker_model(),
			reranker_top_k: default_reranker_top_k(),
			reranker_batch_size: default_reranker_batch_size(),
			project_scale: default_project_scale(),
		}
	}
}

impl Default for Grading {
	fn default() -> Self {
		Self {
			enabled: default_grading_enabled(),
			min_relevance: default_min_relevance(),
			parallel: default_grading_parallel(),
		}
	}
}

impl Default for Boilerplate {
	fn default() -> Self {
		Self {
			threshold: default_boilerplate_threshold(),
			max_excerpt_chars: default_max_excerpt_chars(),
		}
	}
}

fn default_limit() -> usize {
	6
}

fn default_max_candidates() -> u32 {
	80
}

fn default_candidate_multiplier() -> u32 {
	3
}

fn default_use_reranker() -> bool {
	true
}

fn default_reranker_model() -> String {
	"bge-reranker-v2-m3".to_string()
}

fn default_reranker_top_k() -> u32 {
	20
}

fn default_reranker_batch_size() -> u32 {
	8
}

fn default_project_scale() -> f32 {
	1.5
}

fn default_grading_enabled() -> bool {
	true
}

fn default_min_relevance() -> f32 {
	0.7
}

fn default_grading_parallel() -> bool {
	true
}

fn default_boilerplate_threshold() -> f32 {
	0.8
}

fn default_max_excerpt_chars() -> usize {
	512
}
