// ---------------------------------------------------------------------------
// Engine -- immutable recommendation state built once from a catalog
// ---------------------------------------------------------------------------

use crate::catalog::Catalog;
use crate::error::RecommendError;
use crate::ranker::{rank, ScoredItem};
use crate::vectorizer::{fit_transform, TermWeightMatrix, VectorizerConfig, Vocabulary};

/// Catalog, vocabulary and term-weight matrix. Never mutated after
/// [`Engine::build`] returns, so a shared `&Engine` or `Arc<Engine>` can serve
/// any number of concurrent queries.
#[derive(Debug, Clone)]
pub struct Engine {
	catalog: Catalog,
	vocabulary: Vocabulary,
	matrix: TermWeightMatrix,
	config: VectorizerConfig,
}

impl Engine {
	/// Vectorize the catalog. Fails with [`RecommendError::Data`] for an empty
	/// catalog; no partially built engine is ever returned.
	pub fn build(catalog: Catalog, config: &VectorizerConfig) -> Result<Self, RecommendError> {
		if catalog.is_empty() {
			return Err(RecommendError::Data("catalog is empty".to_string()));
		}

		let vectorized = fit_transform(&catalog.feature_texts(), config)?;
		tracing::info!(
			items = catalog.len(),
			vocabulary = vectorized.vocabulary.len(),
			"Recommendation engine built"
		);

		Ok(Self {
			catalog,
			vocabulary: vectorized.vocabulary,
			matrix: vectorized.matrix,
			config: *config,
		})
	}

	/// Identifiers of the `num_results` items most similar to
	/// `query_identifier`, best first. Unknown identifiers yield an empty list.
	pub fn recommend(
		&self,
		query_identifier: &str,
		num_results: usize,
	) -> Result<Vec<String>, RecommendError> {
		Ok(self
			.recommend_scored(query_identifier, num_results)?
			.into_iter()
			.map(|s| s.identifier)
			.collect())
	}

	/// Same selection as [`Engine::recommend`], keeping the cosine scores.
	pub fn recommend_scored(
		&self,
		query_identifier: &str,
		num_results: usize,
	) -> Result<Vec<ScoredItem>, RecommendError> {
		rank(&self.catalog, &self.matrix, query_identifier, num_results)
	}

	pub fn catalog(&self) -> &Catalog {
		&self.catalog
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	pub fn matrix(&self) -> &TermWeightMatrix {
		&self.matrix
	}

	pub fn config(&self) -> &VectorizerConfig {
		&self.config
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::catalog::Item;
	use crate::ranker::DEFAULT_NUM_RESULTS;

	fn engine(items: &[(&str, &str)]) -> Engine {
		let catalog = Catalog::new(items.iter().map(|(id, f)| Item::new(*id, *f)).collect());
		Engine::build(catalog, &VectorizerConfig::default()).unwrap()
	}

	fn games() -> Engine {
		engine(&[
			("10", "action shooter multiplayer competitive"),
			("20", "action shooter class based multiplayer"),
			("30", "puzzle platformer indie"),
			("40", "indie puzzle adventure story"),
			("50", "racing arcade cars"),
			("60", "racing simulation cars realistic"),
		])
	}

	#[test]
	fn scenario_identical_features_rank_first() {
		let e = engine(&[
			("1", "open world fantasy rpg"),
			("2", "open world fantasy rpg"),
			("3", "racing arcade"),
		]);
		assert_eq!(e.recommend("1", 2).unwrap(), vec!["2", "3"]);
		let scored = e.recommend_scored("1", 2).unwrap();
		assert!(scored[0].score > scored[1].score);
	}

	#[test]
	fn scenario_empty_catalog_is_data_error() {
		let err = Engine::build(Catalog::default(), &VectorizerConfig::default()).unwrap_err();
		assert!(matches!(err, RecommendError::Data(_)));
	}

	#[test]
	fn scenario_zero_results_is_config_error() {
		let err = games().recommend("10", 0).unwrap_err();
		assert!(matches!(err, RecommendError::Config(_)));
	}

	#[test]
	fn scenario_single_item_catalog() {
		let e = engine(&[("only", "open world fantasy rpg")]);
		assert!(e.recommend("only", 3).unwrap().is_empty());
	}

	#[test]
	fn unknown_identifier_is_empty() {
		assert!(games().recommend("no-such-id", 3).unwrap().is_empty());
	}

	#[test]
	fn self_is_never_recommended() {
		let e = games();
		for item in e.catalog().items() {
			let recs = e.recommend(&item.identifier, 5).unwrap();
			assert!(!recs.contains(&item.identifier));
		}
	}

	#[test]
	fn length_equals_num_results_when_enough_items() {
		let e = games();
		for n in 1..=5 {
			assert_eq!(e.recommend("30", n).unwrap().len(), n);
		}
		assert_eq!(e.recommend("30", 50).unwrap().len(), 5);
	}

	#[test]
	fn nearest_neighbours_share_genre() {
		let e = games();
		assert_eq!(e.recommend("10", 1).unwrap(), vec!["20"]);
		assert_eq!(e.recommend("30", 1).unwrap(), vec!["40"]);
		assert_eq!(e.recommend("50", 1).unwrap(), vec!["60"]);
	}

	#[test]
	fn default_count_is_three() {
		let e = games();
		assert_eq!(e.recommend("10", DEFAULT_NUM_RESULTS).unwrap().len(), 3);
	}

	#[test]
	fn repeated_calls_are_identical() {
		let e = games();
		let first = e.recommend_scored("40", 4).unwrap();
		for _ in 0..10 {
			assert_eq!(e.recommend_scored("40", 4).unwrap(), first);
		}
	}

	#[test]
	fn concurrent_calls_agree() {
		let e = Arc::new(games());
		let expected = e.recommend("60", 3).unwrap();
		let handles: Vec<_> = (0..8)
			.map(|_| {
				let e = Arc::clone(&e);
				std::thread::spawn(move || e.recommend("60", 3).unwrap())
			})
			.collect();
		for h in handles {
			assert_eq!(h.join().unwrap(), expected);
		}
	}

	#[test]
	fn matrix_rows_match_catalog_order() {
		let e = games();
		assert_eq!(e.matrix().n_rows(), e.catalog().len());
		assert_eq!(e.matrix().n_columns(), e.vocabulary().len());
	}

	#[test]
	fn engine_is_send_and_sync() {
		fn assert_send_sync<T: Send + Sync>() {}
		assert_send_sync::<Engine>();
	}
}
