// ---------------------------------------------------------------------------
// Similarity Ranker -- top-K most similar catalog items for a query item
// ---------------------------------------------------------------------------
//
// Pure functions over the immutable catalog and term-weight matrix. The query
// row is excluded by index, never by score, so an identical item scoring 1.0
// is still returned.
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::catalog::Catalog;
use crate::cosine::cosine_similarity_with_magnitude;
use crate::error::RecommendError;
use crate::vectorizer::{TermWeightMatrix, WeightRow};

/// Number of recommendations returned when the caller does not ask for a count.
pub const DEFAULT_NUM_RESULTS: usize = 3;

/// A recommended item identifier with its cosine score against the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem {
	pub identifier: String,
	pub score: f64,
}

/// Cosine score of `query` against every row, in row order.
pub fn score_rows(query: &WeightRow, matrix: &TermWeightMatrix) -> Vec<f64> {
	matrix
		.rows()
		.iter()
		.map(|row| {
			cosine_similarity_with_magnitude(
				&query.entries,
				&row.entries,
				query.magnitude,
				row.magnitude,
			)
		})
		.collect()
}

/// Rank catalog items by similarity to `query_identifier`.
///
/// Returns an empty list when the identifier is unknown. Fails with
/// [`RecommendError::Config`] when `num_results` is zero.
pub fn rank(
	catalog: &Catalog,
	matrix: &TermWeightMatrix,
	query_identifier: &str,
	num_results: usize,
) -> Result<Vec<ScoredItem>, RecommendError> {
	if num_results < 1 {
		return Err(RecommendError::Config(format!(
			"numResults must be at least 1, got {}",
			num_results
		)));
	}

	let query_idx = match catalog.position(query_identifier) {
		Some(idx) => idx,
		None => {
			tracing::debug!(identifier = query_identifier, "Unknown query identifier");
			return Ok(Vec::new());
		}
	};
	let query = match matrix.row(query_idx) {
		Some(row) => row,
		None => return Ok(Vec::new()),
	};

	let mut scored: Vec<(usize, f64)> = score_rows(query, matrix).into_iter().enumerate().collect();

	// Stable: equal scores keep catalog order.
	scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

	let results: Vec<ScoredItem> = scored
		.into_iter()
		.filter(|&(idx, _)| idx != query_idx)
		.take(num_results)
		.filter_map(|(idx, score)| {
			catalog.get(idx).map(|item| ScoredItem {
				identifier: item.identifier.clone(),
				score,
			})
		})
		.collect();

	tracing::debug!(
		identifier = query_identifier,
		row = query_idx,
		returned = results.len(),
		"Ranked recommendations"
	);
	Ok(results)
}
