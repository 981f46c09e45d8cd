/// A sparse vector entry: (term index, weight). Entries are sorted by index.
pub type SparseEntry = (usize, f64);

/// Dot product of two sparse vectors with entries sorted by index.
pub fn sparse_dot(a: &[SparseEntry], b: &[SparseEntry]) -> f64 {
	let mut dot = 0.0;
	let (mut i, mut j) = (0, 0);
	while i < a.len() && j < b.len() {
		let (ia, wa) = a[i];
		let (ib, wb) = b[j];
		match ia.cmp(&ib) {
			std::cmp::Ordering::Less => i += 1,
			std::cmp::Ordering::Greater => j += 1,
			std::cmp::Ordering::Equal => {
				dot += wa * wb;
				i += 1;
				j += 1;
			}
		}
	}
	dot
}

/// Compute the magnitude (L2 norm) of a sparse vector.
pub fn compute_magnitude(entries: &[SparseEntry]) -> f64 {
	entries.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt()
}

/// Cosine similarity using pre-computed magnitudes.
/// Returns 0.0 if either magnitude is zero. Result clamped to [-1.0, 1.0].
pub fn cosine_similarity_with_magnitude(
	a: &[SparseEntry],
	b: &[SparseEntry],
	mag_a: f64,
	mag_b: f64,
) -> f64 {
	let denom = mag_a * mag_b;
	if denom == 0.0 {
		return 0.0;
	}

	let result = sparse_dot(a, b) / denom;
	if !result.is_finite() {
		return 0.0;
	}
	result.clamp(-1.0, 1.0)
}

/// Cosine similarity between two sparse vectors.
pub fn cosine_similarity(a: &[SparseEntry], b: &[SparseEntry]) -> f64 {
	cosine_similarity_with_magnitude(a, b, compute_magnitude(a), compute_magnitude(b))
}
