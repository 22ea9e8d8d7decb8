//! Fingerprint-based deduplication. Near-identical excerpts surface many
//! times across a transcript corpus; only the highest-relevance copy is worth
//! keeping.

use std::{cmp::Ordering, collections::HashMap};

use crate::{insight::Insight, text};

const FINGERPRINT_GRAPHEMES: usize = 100;

/// Normalized 100-character prefix of an excerpt, used as the duplicate key.
pub fn fingerprint(excerpt: &str) -> String {
	let prefix = text::truncate_graphemes(excerpt, FINGERPRINT_GRAPHEMES);

	text::normalize_whitespace(&prefix.to_lowercase())
}

/// Collapses insights sharing a fingerprint, keeping the copy with strictly
/// greater relevance (ties keep the earliest seen). The result is sorted by
/// relevance, highest first; equal scores keep first-seen order.
pub fn deduplicate(insights: Vec<Insight>) -> Vec<Insight> {
	let mut kept: Vec<Insight> = Vec::with_capacity(insights.len());
	let mut index_by_fingerprint: HashMap<String, usize> = HashMap::new();

	for insight in insights {
		let key = fingerprint(&insight.excerpt);

		match index_by_fingerprint.get(&key).copied() {
			Some(idx) =>
				if insight.relevance > kept[idx].relevance {
					kept[idx] = insight;
				},
			None => {
				index_by_fingerprint.insert(key, kept.len());
				kept.push(insight);
			},
		}
	}

	kept.sort_by(|a, b| b.relevance.partial_cmp(&a.relevance).unwrap_or(Ordering::Equal));

	kept
}

#[cfg(test)]
mod tests {
	use super::*;

	fn insight(excerpt: &str, relevance: f32) -> Insight {
		Insight {
			conversation_id: "c1".to_string(),
			timestamp: "2026-01-01T00:00:00Z".to_string(),
			relevance,
			excerpt: excerpt.to_string(),
			insights: Vec::new(),
		}
	}

	#[test]
	fn fingerprint_normalizes_case_and_whitespace() {
		assert_eq!(
			fingerprint("We  Fixed\tthe\nRace condition"),
			fingerprint("we fixed the race CONDITION")
		);
	}

	#[test]
	fn fingerprint_ignores_content_past_the_prefix() {
		let shared = "x".repeat(100);

		assert_eq!(fingerprint(&format!("{shared} left")), fingerprint(&format!("{shared} right")));
	}

	#[test]
	fn keeps_highest_relevance_duplicate() {
		let shared = "We refactored the auth module to use async/await across every handler \
		              and every middleware entry point in the router"
			.to_string();
		let out = deduplicate(vec![
			insight(&shared, 0.6),
			insight(&shared, 0.9),
			insight("Updated the database schema for the new tenants table", 0.8),
		]);

		assert_eq!(out.len(), 2);
		assert_eq!(out[0].relevance, 0.9);
		assert_eq!(out[1].relevance, 0.8);
	}

	#[test]
	fn ties_keep_the_earliest_entry() {
		let mut first = insight("Identical excerpt text used for the duplicate tie case", 0.5);

		first.conversation_id = "earliest".to_string();

		let mut second = first.clone();

		second.conversation_id = "latest".to_string();

		let out = deduplicate(vec![first, second]);

		assert_eq!(out.len(), 1);
		assert_eq!(out[0].conversation_id, "earliest");
	}

	#[test]
	fn output_fingerprints_are_unique() {
		let out = deduplicate(vec![
			insight("Alpha excerpt describing the first distinct fix we shipped", 0.4),
			insight("alpha  excerpt Describing the first distinct fix we shipped", 0.7),
			insight("Beta excerpt describing the second distinct fix we shipped", 0.2),
		]);
		let mut keys: Vec<String> = out.iter().map(|entry| fingerprint(&entry.excerpt)).collect();

		keys.sort();
		keys.dedup();

		assert_eq!(keys.len(), out.len());
	}
}
