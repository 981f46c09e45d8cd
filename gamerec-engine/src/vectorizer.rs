// ---------------------------------------------------------------------------
// Feature Vectorizer -- TF-IDF term-weight matrix over a frozen vocabulary
// ---------------------------------------------------------------------------
//
// weight(t, d) = (count(t, d) / len(d)) * ln(N / df(t))
//
// len(d) counts the tokens of d after stop-word removal. Terms present in
// every document (idf = 0) or in none are never admitted to the vocabulary.
// ---------------------------------------------------------------------------

use std::collections::{BTreeMap, HashMap};

use crate::cosine::{compute_magnitude, SparseEntry};
use crate::error::RecommendError;
use crate::text::analyze;

/// Default vocabulary cap.
pub const DEFAULT_MAX_FEATURES: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorizerConfig {
	/// Maximum vocabulary size; the most document-frequent terms are kept.
	pub max_features: usize,
}

impl Default for VectorizerConfig {
	fn default() -> Self {
		Self {
			max_features: DEFAULT_MAX_FEATURES,
		}
	}
}

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// Term to column index mapping. Indices follow lexical term order.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
	terms: Vec<String>,
	index: HashMap<String, usize>,
	idf: Vec<f64>,
}

impl Vocabulary {
	pub fn len(&self) -> usize {
		self.terms.len()
	}

	pub fn is_empty(&self) -> bool {
		self.terms.is_empty()
	}

	pub fn index_of(&self, term: &str) -> Option<usize> {
		self.index.get(term).copied()
	}

	pub fn term(&self, index: usize) -> Option<&str> {
		self.terms.get(index).map(String::as_str)
	}

	pub fn idf(&self, index: usize) -> Option<f64> {
		self.idf.get(index).copied()
	}

	pub fn terms(&self) -> &[String] {
		&self.terms
	}
}

// ---------------------------------------------------------------------------
// Matrix
// ---------------------------------------------------------------------------

/// One weighted row: sorted non-zero entries plus the row's L2 norm.
#[derive(Debug, Clone, Default)]
pub struct WeightRow {
	pub entries: Vec<SparseEntry>,
	pub magnitude: f64,
}

impl WeightRow {
	fn new(entries: Vec<SparseEntry>) -> Self {
		let magnitude = compute_magnitude(&entries);
		Self { entries, magnitude }
	}

	/// Weight for a term index; 0.0 when the term does not occur.
	pub fn weight(&self, index: usize) -> f64 {
		self.entries
			.binary_search_by_key(&index, |&(i, _)| i)
			.map(|pos| self.entries[pos].1)
			.unwrap_or(0.0)
	}
}

/// Term-weight matrix, one row per document in input order.
#[derive(Debug, Clone, Default)]
pub struct TermWeightMatrix {
	rows: Vec<WeightRow>,
	columns: usize,
}

impl TermWeightMatrix {
	pub fn rows(&self) -> &[WeightRow] {
		&self.rows
	}

	pub fn row(&self, index: usize) -> Option<&WeightRow> {
		self.rows.get(index)
	}

	pub fn n_rows(&self) -> usize {
		self.rows.len()
	}

	pub fn n_columns(&self) -> usize {
		self.columns
	}
}

// ---------------------------------------------------------------------------
// Fit
// ---------------------------------------------------------------------------

/// Output of [`fit_transform`].
#[derive(Debug, Clone)]
pub struct Vectorized {
	pub vocabulary: Vocabulary,
	pub matrix: TermWeightMatrix,
}

/// Learn the vocabulary from `documents` and weight every document against it.
pub fn fit_transform<S: AsRef<str>>(
	documents: &[S],
	config: &VectorizerConfig,
) -> Result<Vectorized, RecommendError> {
	if documents.is_empty() {
		return Err(RecommendError::Data(
			"cannot vectorize an empty corpus".to_string(),
		));
	}
	if config.max_features == 0 {
		return Err(RecommendError::Config(
			"maxFeatures must be at least 1".to_string(),
		));
	}

	let n_docs = documents.len();
	let analyzed: Vec<Vec<String>> = documents.iter().map(|d| analyze(d.as_ref())).collect();

	let doc_freq = document_frequencies(&analyzed);
	let retained = select_terms(&doc_freq, n_docs, config.max_features);

	let mut terms: Vec<String> = retained.into_iter().map(str::to_string).collect();
	terms.sort();

	let index: HashMap<String, usize> = terms
		.iter()
		.enumerate()
		.map(|(i, t)| (t.clone(), i))
		.collect();
	let idf: Vec<f64> = terms
		.iter()
		.map(|t| {
			let df = doc_freq.get(t.as_str()).copied().unwrap_or(0) as f64;
			(n_docs as f64 / df).ln()
		})
		.collect();

	let rows: Vec<WeightRow> = analyzed
		.iter()
		.map(|tokens| weight_row(tokens, &index, &idf))
		.collect();

	tracing::info!(
		documents = n_docs,
		distinct_terms = doc_freq.len(),
		vocabulary = terms.len(),
		max_features = config.max_features,
		"Vectorized corpus"
	);

	Ok(Vectorized {
		matrix: TermWeightMatrix {
			rows,
			columns: terms.len(),
		},
		vocabulary: Vocabulary { terms, index, idf },
	})
}

fn document_frequencies(analyzed: &[Vec<String>]) -> BTreeMap<&str, usize> {
	let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
	for tokens in analyzed {
		let mut seen: Vec<&str> = tokens.iter().map(String::as_str).collect();
		seen.sort_unstable();
		seen.dedup();
		for term in seen {
			*doc_freq.entry(term).or_insert(0) += 1;
		}
	}
	doc_freq
}

/// Drop terms found in every document, then keep the `cap` highest
/// document-frequency terms (ties by lexical order).
fn select_terms<'a>(
	doc_freq: &BTreeMap<&'a str, usize>,
	n_docs: usize,
	cap: usize,
) -> Vec<&'a str> {
	let mut candidates: Vec<(&'a str, usize)> = doc_freq
		.iter()
		.filter(|(_, &df)| df > 0 && df < n_docs)
		.map(|(&t, &df)| (t, df))
		.collect();

	if candidates.len() > cap {
		candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
		candidates.truncate(cap);
	}

	candidates.into_iter().map(|(t, _)| t).collect()
}

fn weight_row(tokens: &[String], index: &HashMap<String, usize>, idf: &[f64]) -> WeightRow {
	if tokens.is_empty() {
		return WeightRow::default();
	}

	let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
	for token in tokens {
		if let Some(&i) = index.get(token) {
			*counts.entry(i).or_insert(0) += 1;
		}
	}

	let len = tokens.len() as f64;
	let entries: Vec<SparseEntry> = counts
		.into_iter()
		.map(|(i, count)| (i, (count as f64 / len) * idf[i]))
		.collect();
	WeightRow::new(entries)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fit(docs: &[&str]) -> Vectorized {
		fit_transform(docs, &VectorizerConfig::default()).unwrap()
	}

	#[test]
	fn empty_corpus_is_data_error() {
		let docs: Vec<&str> = Vec::new();
		let err = fit_transform(&docs[..], &VectorizerConfig::default()).unwrap_err();
		assert!(matches!(err, RecommendError::Data(_)));
	}

	#[test]
	fn zero_max_features_is_config_error() {
		let err = fit_transform(&["a b"][..], &VectorizerConfig { max_features: 0 }).unwrap_err();
		assert!(matches!(err, RecommendError::Config(_)));
	}

	#[test]
	fn vocabulary_excludes_stop_words_and_ubiquitous_terms() {
		let v = fit(&["the open world", "the racing world", "an arcade world"]);
		assert_eq!(v.vocabulary.terms(), &["arcade", "open", "racing"]);
		assert!(v.vocabulary.index_of("world").is_none());
		assert!(v.vocabulary.index_of("the").is_none());
	}

	#[test]
	fn vocabulary_is_lowercased() {
		let v = fit(&["Stealth ACTION", "puzzle"]);
		assert!(v.vocabulary.index_of("stealth").is_some());
		assert!(v.vocabulary.index_of("action").is_some());
		assert!(v.vocabulary.index_of("ACTION").is_none());
	}

	#[test]
	fn weights_follow_tf_idf_formula() {
		let v = fit(&["rpg rpg fantasy", "racing", "rpg strategy"]);
		let n = 3.0f64;
		let rpg = v.vocabulary.index_of("rpg").unwrap();
		let fantasy = v.vocabulary.index_of("fantasy").unwrap();
		let row = v.matrix.row(0).unwrap();

		let expected_rpg = (2.0 / 3.0) * (n / 2.0).ln();
		let expected_fantasy = (1.0 / 3.0) * (n / 1.0).ln();
		assert!((row.weight(rpg) - expected_rpg).abs() < 1e-12);
		assert!((row.weight(fantasy) - expected_fantasy).abs() < 1e-12);
		assert_eq!(row.weight(v.vocabulary.index_of("racing").unwrap()), 0.0);
	}

	#[test]
	fn document_length_counts_tokens_after_stop_words() {
		let v = fit(&["the rpg", "racing"]);
		let rpg = v.vocabulary.index_of("rpg").unwrap();
		let expected = 1.0 * (2.0f64).ln();
		assert!((v.matrix.row(0).unwrap().weight(rpg) - expected).abs() < 1e-12);
	}

	#[test]
	fn cap_keeps_most_frequent_terms_with_lexical_ties() {
		let docs = [
			"zombie horror survival",
			"zombie shooter",
			"alpha beta",
			"gamma",
		];
		let v = fit_transform(&docs[..], &VectorizerConfig { max_features: 3 }).unwrap();
		// zombie (df 2) first, then the lexically smallest df-1 terms.
		assert_eq!(v.vocabulary.terms(), &["alpha", "beta", "zombie"]);
	}

	#[test]
	fn rows_align_with_input_order() {
		let v = fit(&["space sim", "farming sim", "space shooter", "", "nan"]);
		assert_eq!(v.matrix.n_rows(), 5);
		assert_eq!(v.matrix.n_columns(), v.vocabulary.len());
		assert!(v.matrix.row(3).unwrap().entries.is_empty());
		assert_eq!(v.matrix.row(3).unwrap().magnitude, 0.0);
	}

	#[test]
	fn single_document_has_empty_vocabulary() {
		let v = fit(&["open world fantasy rpg"]);
		assert!(v.vocabulary.is_empty());
		assert_eq!(v.matrix.n_rows(), 1);
		assert_eq!(v.matrix.row(0).unwrap().magnitude, 0.0);
	}

	#[test]
	fn idf_is_positive_for_every_retained_term() {
		let v = fit(&["card game", "card battler", "board game"]);
		for i in 0..v.vocabulary.len() {
			assert!(v.vocabulary.idf(i).unwrap() > 0.0);
		}
	}

	#[test]
	fn fitting_is_deterministic() {
		let docs = ["tactics turn based", "turn based rpg", "rpg loot", "loot shooter"];
		let a = fit(&docs);
		let b = fit(&docs);
		assert_eq!(a.vocabulary.terms(), b.vocabulary.terms());
		for (ra, rb) in a.matrix.rows().iter().zip(b.matrix.rows()) {
			assert_eq!(ra.entries, rb.entries);
		}
	}
}
