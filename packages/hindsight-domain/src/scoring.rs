//! Vector similarity and episode-boost blending.

/// Dot product over the shared prefix of two vectors. Sufficient as a
/// similarity measure when both sides are already normalized.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
	a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Cosine similarity over the shared prefix of two vectors; zero-magnitude
/// input yields 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
	let length = a.len().min(b.len());

	if length == 0 {
		return 0.0;
	}

	let mut dot = 0.0;
	let mut mag_a = 0.0;
	let mut mag_b = 0.0;

	for i in 0..length {
		dot += a[i] * b[i];
		mag_a += a[i] * a[i];
		mag_b += b[i] * b[i];
	}

	let denom = mag_a.sqrt() * mag_b.sqrt();

	if denom == 0.0 { 0.0 } else { dot / denom }
}

/// Episode-boosted ranking score. The boost is expected in [0, 1] and is not
/// clamped here; out-of-range importance values flow through unchanged.
pub fn blended_score(relevance: f32, boost: f32) -> f32 {
	relevance + boost / 10.0
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cosine_of_identical_vectors_is_one() {
		let v = [0.6, 0.8];

		assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
	}

	#[test]
	fn cosine_of_orthogonal_vectors_is_zero() {
		assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
	}

	#[test]
	fn cosine_handles_empty_and_zero_vectors() {
		assert_eq!(cosine_similarity(&[], &[1.0]), 0.0);
		assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
	}

	#[test]
	fn cosine_uses_the_shared_prefix_of_mismatched_lengths() {
		let score = cosine_similarity(&[1.0, 0.0, 5.0], &[1.0, 0.0]);

		assert!((score - 1.0).abs() < 1e-6);
	}

	#[test]
	fn blend_adds_a_tenth_of_the_boost() {
		assert!((blended_score(0.5, 1.0) - 0.6).abs() < 1e-6);
		assert!((blended_score(0.5, 0.0) - 0.5).abs() < 1e-6);
	}

	#[test]
	fn blend_does_not_clamp_out_of_range_boosts() {
		assert!((blended_score(0.5, 5.0) - 1.0).abs() < 1e-6);
	}
}
