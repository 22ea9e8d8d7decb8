pub mod boilerplate;
pub mod episode_boost;
pub mod gateway;
pub mod grading;
pub mod multi_level;
pub mod pipeline;

use std::{future::Future, path::Path, pin::Pin, sync::Arc};

use serde_json::Value;

use hindsight_config::{
	Config, EmbeddingProviderConfig, GraderProviderConfig, SearchProviderConfig,
};
use hindsight_providers::{
	embedding, grader,
	search::{self, SearchMatch, SearchOptions},
};

pub use boilerplate::BoilerplateFilter;
pub use pipeline::{LevelResult, RecallOptions};

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		project_root: &'a Path,
		texts: &'a [String],
		normalize: bool,
		cache: bool,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait SearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a SearchProviderConfig,
		corpus_root: &'a Path,
		query: &'a str,
		options: &'a SearchOptions,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SearchMatch>>>;
}

pub trait GraderProvider
where
	Self: Send + Sync,
{
	fn classify<'a>(
		&'a self,
		cfg: &'a GraderProviderConfig,
		instructions: &'a str,
		schema_name: &'a str,
		schema: &'a Value,
		prompt: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Value>>;
}

#[derive(Debug)]
pub enum ServiceError {
	InvalidRequest { message: String },
	Provider { message: String },
}

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::Provider { message } => write!(f, "Provider error: {message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<color_eyre::Report> for ServiceError {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub semantic: Arc<dyn SearchProvider>,
	pub keyword: Arc<dyn SearchProvider>,
	pub grader: Arc<dyn GraderProvider>,
}

/// Entry point for recall pipelines. Holds the configuration, the provider
/// bundle, and the process-scoped boilerplate filter state.
pub struct RecallService {
	pub cfg: Config,
	pub providers: Providers,
	boilerplate: BoilerplateFilter,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		project_root: &'a Path,
		texts: &'a [String],
		normalize: bool,
		cache: bool,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, project_root, texts, normalize, cache))
	}
}

impl SearchProvider for DefaultProviders {
	fn search<'a>(
		&'a self,
		cfg: &'a SearchProviderConfig,
		corpus_root: &'a Path,
		query: &'a str,
		options: &'a SearchOptions,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SearchMatch>>> {
		Box::pin(search::search(cfg, corpus_root, query, options))
	}
}

impl GraderProvider for DefaultProviders {
	fn classify<'a>(
		&'a self,
		cfg: &'a GraderProviderConfig,
		instructions: &'a str,
		schema_name: &'a str,
		schema: &'a Value,
		prompt: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Value>> {
		Box::pin(grader::classify(cfg, instructions, schema_name, schema, prompt))
	}
}

impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		semantic: Arc<dyn SearchProvider>,
		keyword: Arc<dyn SearchProvider>,
		grader: Arc<dyn GraderProvider>,
	) -> Self {
		Self { embedding, semantic, keyword, grader }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self {
			embedding: provider.clone(),
			semantic: provider.clone(),
			keyword: provider.clone(),
			grader: provider,
		}
	}
}

impl RecallService {
	pub fn new(cfg: Config) -> Self {
		Self { cfg, providers: Providers::default(), boilerplate: BoilerplateFilter::new() }
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers, boilerplate: BoilerplateFilter::new() }
	}

	pub fn boilerplate(&self) -> &BoilerplateFilter {
		&self.boilerplate
	}
}
