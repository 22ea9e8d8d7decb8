mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Boilerplate, Config, EmbeddingProviderConfig, GraderProviderConfig, Grading, Providers, Search,
	SearchProviderConfig, Service, Store,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.store.home_dir.as_os_str().is_empty() {
		return Err(Error::Validation { message: "store.home_dir must be non-empty.".to_string() });
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_candidates == 0 {
		return Err(Error::Validation {
			message: "search.max_candidates must be greater than zero.".to_string(),
		});
	}
	if cfg.search.candidate_multiplier == 0 {
		return Err(Error::Validation {
			message: "search.candidate_multiplier must be greater than zero.".to_string(),
		});
	}
	if cfg.search.reranker_top_k == 0 {
		return Err(Error::Validation {
			message: "search.reranker_top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.search.reranker_batch_size == 0 {
		return Err(Error::Validation {
			message: "search.reranker_batch_size must be greater than zero.".to_string(),
		});
	}
	if !cfg.search.project_scale.is_finite() || cfg.search.project_scale < 1.0 {
		return Err(Error::Validation {
			message: "search.project_scale must be a finite number of at least 1.0.".to_string(),
		});
	}
	if cfg.search.use_reranker && cfg.search.reranker_model.trim().is_empty() {
		return Err(Error::Validation {
			message: "search.reranker_model must be non-empty when search.use_reranker is true."
				.to_string(),
		});
	}
	if !cfg.grading.min_relevance.is_finite()
		|| !(0.0..=1.0).contains(&cfg.grading.min_relevance)
	{
		return Err(Error::Validation {
			message: "grading.min_relevance must be in the range 0.0-1.0.".to_string(),
		});
	}
	if !cfg.boilerplate.threshold.is_finite()
		|| cfg.boilerplate.threshold <= 0.0
		|| cfg.boilerplate.threshold > 1.0
	{
		return Err(Error::Validation {
			message: "boilerplate.threshold must be greater than zero and at most 1.0.".to_string(),
		});
	}
	if cfg.boilerplate.max_excerpt_chars == 0 {
		return Err(Error::Validation {
			message: "boilerplate.max_excerpt_chars must be greater than zero.".to_string(),
		});
	}
	if !cfg.providers.grader.temperature.is_finite() || cfg.providers.grader.temperature < 0.0 {
		return Err(Error::Validation {
			message: "providers.grader.temperature must be zero or greater.".to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("semantic", &cfg.providers.semantic.api_key),
		("keyword", &cfg.providers.keyword.api_key),
		("grader", &cfg.providers.grader.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let trimmed = cfg.search.reranker_model.trim().to_string();

	if trimmed.len() != cfg.search.reranker_model.len() {
		cfg.search.reranker_model = trimmed;
	}
}
