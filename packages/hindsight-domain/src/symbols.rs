//! Pulls declared identifiers out of a diff so file-level queries can name
//! the symbols being changed instead of raw patch text.

use regex::Regex;

const MAX_SYMBOLS: usize = 5;
const MIN_SYMBOL_CHARS: usize = 3;

/// Scans declaration keywords and returns up to five distinct identifier
/// names, in first-seen order. Returns an empty list when nothing matches.
pub fn extract_key_symbols(diff: &str) -> Vec<String> {
	let Ok(declaration) = Regex::new(
		r"(?:fn|function|class|struct|enum|trait|impl|interface|type|const|let|var|def|export)\s+(\w+)",
	) else {
		return Vec::new();
	};

	let mut out = Vec::new();

	for capture in declaration.captures_iter(diff) {
		let Some(name) = capture.get(1).map(|m| m.as_str()) else {
			continue;
		};

		if name.len() < MIN_SYMBOL_CHARS || is_reserved(name) {
			continue;
		}
		if out.iter().any(|existing| existing == name) {
			continue;
		}

		out.push(name.to_string());

		if out.len() >= MAX_SYMBOLS {
			break;
		}
	}

	out
}

fn is_reserved(name: &str) -> bool {
	matches!(
		name,
		"true" | "false" | "null" | "undefined" | "const" | "let" | "var" | "mut" | "pub"
	)
}
