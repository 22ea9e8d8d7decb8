//! Search scopes and their query projections. Each scope level renders to a
//! text query for the semantic index; the wording is a fixed contract shared
//! with downstream consumers.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::text;

const MAX_DIFF_CHARS: usize = 500;
const MAX_LISTED_FILES: usize = 10;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchLevel {
	Project,
	Branch,
	File,
}

impl SearchLevel {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Project => "project",
			Self::Branch => "branch",
			Self::File => "file",
		}
	}
}

/// Scope of one pipeline invocation. The repo path always identifies the
/// conversation corpus to search; the rest shapes the query text.
#[derive(Debug, Clone)]
pub enum SearchContext {
	Project {
		repo_path: PathBuf,
		query: String,
		file_patterns: Option<Vec<String>>,
	},
	Branch {
		repo_path: PathBuf,
		branch: String,
		base_branch: Option<String>,
		changed_files: Vec<String>,
		recent_commits: Option<String>,
	},
	File {
		repo_path: PathBuf,
		file_path: String,
		diff: Option<String>,
		symbols: Option<Vec<String>>,
	},
}

impl SearchContext {
	pub fn level(&self) -> SearchLevel {
		match self {
			Self::Project { .. } => SearchLevel::Project,
			Self::Branch { .. } => SearchLevel::Branch,
			Self::File { .. } => SearchLevel::File,
		}
	}

	pub fn repo_path(&self) -> &Path {
		match self {
			Self::Project { repo_path, .. }
			| Self::Branch { repo_path, .. }
			| Self::File { repo_path, .. } => repo_path,
		}
	}

	/// Renders the level-specific query text sent to the search backends.
	pub fn to_query(&self) -> String {
		match self {
			Self::Project { query, file_patterns, .. } => {
				let mut out = format!("Project-wide: {query}");

				if let Some(patterns) = file_patterns
					&& !patterns.is_empty()
				{
					out.push_str(&format!("\nScope: {}", patterns.join(", ")));
				}

				out
			},
			Self::Branch { branch, base_branch, changed_files, recent_commits, .. } => {
				let mut out = format!("Branch: {branch}");

				if let Some(base) = base_branch {
					out.push_str(&format!(" (base: {base})"));
				}

				out.push_str(&format!("\nFiles changed: {}", changed_files.join(", ")));

				if let Some(commits) = recent_commits {
					out.push_str(&format!("\nRecent commits: {commits}"));
				}

				out
			},
			Self::File { file_path, diff, symbols, .. } => {
				let mut out = format!("File: {file_path}");

				if let Some(symbols) = symbols
					&& !symbols.is_empty()
				{
					out.push_str(&format!("\nSymbols: {}", symbols.join(", ")));
				}
				if let Some(diff) = diff {
					out.push_str(&format!(
						"\nChanges:\n{}",
						text::truncate_with_ellipsis(diff, MAX_DIFF_CHARS)
					));
				}

				out
			},
		}
	}
}

/// Compact file list for logs: up to ten names, then "... and N more".
pub fn format_file_list(files: &[String]) -> String {
	if files.is_empty() {
		return "(no files)".to_string();
	}
	if files.len() <= MAX_LISTED_FILES {
		return files.join(", ");
	}

	let shown = files[..MAX_LISTED_FILES].join(", ");
	let remaining = files.len() - MAX_LISTED_FILES;

	format!("{shown} ... and {remaining} more")
}
