use unicode_segmentation::UnicodeSegmentation;

/// Collapses every run of whitespace to a single space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
	let mut out = String::with_capacity(text.len());

	for segment in text.split_whitespace() {
		if !out.is_empty() {
			out.push(' ');
		}

		out.push_str(segment);
	}

	out
}

/// Truncates on a grapheme boundary so multi-byte content is never split.
pub fn truncate_graphemes(text: &str, max: usize) -> &str {
	match text.grapheme_indices(true).nth(max) {
		Some((idx, _)) => &text[..idx],
		None => text,
	}
}

/// Truncation with a trailing ellipsis marker when content was dropped.
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
	let truncated = truncate_graphemes(text, max);

	if truncated.len() == text.len() {
		text.to_string()
	} else {
		format!("{truncated}...")
	}
}
