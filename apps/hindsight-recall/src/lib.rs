use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hindsight_domain::{SearchContext, SearchLevel, context::format_file_list, symbols};
use hindsight_service::{RecallOptions, RecallService};

#[derive(Debug, Parser)]
#[command(
	version = hindsight_cli::VERSION,
	rename_all = "kebab",
	styles = hindsight_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Query text to recall against. Building queries from git state is left
	/// to the caller; this binary only takes explicit text.
	#[arg(long, short = 'q', value_name = "TEXT")]
	pub query: String,
	/// Repository root identifying the conversation corpus.
	#[arg(long, value_name = "DIR", default_value = ".")]
	pub repo: PathBuf,
	/// Optional branch name for an additional branch-level pass.
	#[arg(long, value_name = "NAME")]
	pub branch: Option<String>,
	/// Changed files for the branch-level pass.
	#[arg(long = "changed-file", value_name = "PATH")]
	pub changed_files: Vec<String>,
	/// Optional file path for an additional file-level pass.
	#[arg(long, value_name = "PATH")]
	pub file: Option<String>,
	/// Optional diff text for the file-level pass.
	#[arg(long, value_name = "TEXT")]
	pub diff: Option<String>,
	#[arg(long, value_name = "N")]
	pub limit: Option<usize>,
	/// Skip the LLM grading stage.
	#[arg(long)]
	pub no_grading: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = hindsight_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let contexts = build_contexts(&args);
	let options = RecallOptions {
		limit: args.limit,
		skip_grading: args.no_grading,
		..RecallOptions::default()
	};
	let service = RecallService::new(config);
	let results = service.recall_multi_level(&contexts, &options).await?;

	for level in [SearchLevel::Project, SearchLevel::Branch, SearchLevel::File] {
		let Some(result) = results.get(&level) else {
			continue;
		};

		println!("{} level ({} insights):", level.as_str(), result.insights.len());

		for (idx, insight) in result.insights.iter().enumerate() {
			println!(
				"  {}. [{:.2}] {} ({})",
				idx + 1,
				insight.relevance,
				insight.excerpt.split_whitespace().collect::<Vec<_>>().join(" "),
				insight.conversation_id,
			);
		}
	}

	Ok(())
}

fn build_contexts(args: &Args) -> Vec<SearchContext> {
	let mut contexts = vec![SearchContext::Project {
		repo_path: args.repo.clone(),
		query: args.query.clone(),
		file_patterns: None,
	}];

	if let Some(branch) = args.branch.clone() {
		tracing::info!(
			branch = %branch,
			files = %format_file_list(&args.changed_files),
			"Adding branch-level pass."
		);
		contexts.push(SearchContext::Branch {
			repo_path: args.repo.clone(),
			branch,
			base_branch: None,
			changed_files: args.changed_files.clone(),
			recent_commits: None,
		});
	}
	if let Some(file_path) = args.file.clone() {
		let extracted = args.diff.as_deref().map(symbols::extract_key_symbols);
		let symbols = extracted.filter(|names| !names.is_empty());

		contexts.push(SearchContext::File {
			repo_path: args.repo.clone(),
			file_path,
			diff: args.diff.clone(),
			symbols,
		});
	}

	contexts
}
