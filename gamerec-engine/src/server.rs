// ---------------------------------------------------------------------------
// RecommendServer — JSON-RPC dispatcher
// ---------------------------------------------------------------------------
//
// Routes incoming JSON-RPC 2.0 requests (NDJSON over stdin) to the
// recommendation engine. Maps engine outcomes onto distinct responses:
// populated result, item not found, engine unavailable, invalid params.
// ---------------------------------------------------------------------------

use std::io::{self, BufRead};
use std::path::Path;

use crate::catalog::{Catalog, ColumnNames};
use crate::engine::Engine;
use crate::error::RecommendError;
use crate::protocol::*;
use crate::ranker::DEFAULT_NUM_RESULTS;
use crate::transport::NdjsonTransport;
use crate::vectorizer::VectorizerConfig;

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Defaults applied when `engine/initialize` omits a setting.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub columns: ColumnNames,
	pub vectorizer: VectorizerConfig,
}

/// JSON-RPC server owning the (optional) built [`Engine`].
pub struct RecommendServer {
	transport: NdjsonTransport,
	config: ServerConfig,
	engine: Option<Engine>,
}

impl RecommendServer {
	/// Create a server with no engine. Queries answer "unavailable" until a
	/// catalog is loaded.
	pub fn new(transport: NdjsonTransport, config: ServerConfig) -> Self {
		Self {
			transport,
			config,
			engine: None,
		}
	}

	/// Load a catalog file and build the engine with the server defaults.
	pub fn load_catalog(&mut self, path: &Path) -> Result<&Engine, RecommendError> {
		self.engine = None;
		let catalog = Catalog::from_csv_path(path, &self.config.columns)?;
		let engine = Engine::build(catalog, &self.config.vectorizer)?;
		tracing::info!(path = %path.display(), "Catalog loaded");
		Ok(self.engine.insert(engine))
	}

	pub fn engine(&self) -> Option<&Engine> {
		self.engine.as_ref()
	}

	/// Main loop: read JSON-RPC messages from stdin, dispatch to handlers.
	pub fn run(&mut self) -> Result<(), RecommendError> {
		let stdin = io::stdin();
		let reader = stdin.lock();

		for line_result in reader.lines() {
			let line = line_result?;
			if line.trim().is_empty() {
				continue;
			}

			let request: JsonRpcRequest = match serde_json::from_str(&line) {
				Ok(r) => r,
				Err(e) => {
					tracing::error!("Failed to parse request: {}", e);
					continue;
				}
			};

			self.dispatch(request);
		}

		Ok(())
	}

	// ── Dispatch ──────────────────────────────────────────────────────────

	fn dispatch(&mut self, req: JsonRpcRequest) {
		let id = req.id;
		tracing::debug!(id, method = %req.method, "Request");

		let result = match req.method.as_str() {
			"engine/initialize" => self.handle_initialize(req.params),
			"engine/stats" => self.with_engine(handle_stats),
			"engine/recommend" => {
				match self.with_engine(|e| handle_recommend(e, req.params)) {
					Ok(Some(value)) => self.transport.write_response(id, value),
					Ok(None) => self.transport.write_error(
						id,
						ITEM_NOT_FOUND,
						"Item not found",
						Some(serde_json::json!({
							"engineCode": "ITEM_NOT_FOUND",
							"recommendations": [],
						})),
					),
					Err(e) => self.write_engine_error(id, &e),
				}
				return;
			}
			_ => {
				self.transport.write_error(
					id,
					METHOD_NOT_FOUND,
					format!("Unknown method: {}", req.method),
					None,
				);
				return;
			}
		};

		match result {
			Ok(value) => self.transport.write_response(id, value),
			Err(e) => self.write_engine_error(id, &e),
		}
	}

	fn write_engine_error(&self, id: u64, err: &RecommendError) {
		self.transport.write_error(
			id,
			rpc_code(err),
			err.to_string(),
			Some(err.to_json_rpc_error()),
		);
	}

	fn with_engine<T, F>(&self, f: F) -> Result<T, RecommendError>
	where
		F: FnOnce(&Engine) -> Result<T, RecommendError>,
	{
		match &self.engine {
			Some(e) => f(e),
			None => Err(RecommendError::NotInitialized),
		}
	}

	// ── Initialize ────────────────────────────────────────────────────────

	fn handle_initialize(
		&mut self,
		params: serde_json::Value,
	) -> Result<serde_json::Value, RecommendError> {
		let p: InitializeParams = if params.is_null() {
			InitializeParams::default()
		} else {
			parse_params(params)?
		};

		let columns = ColumnNames {
			id: p.id_column.unwrap_or_else(|| self.config.columns.id.clone()),
			features: p
				.features_column
				.unwrap_or_else(|| self.config.columns.features.clone()),
		};
		let vectorizer = VectorizerConfig {
			max_features: p
				.max_features
				.unwrap_or(self.config.vectorizer.max_features),
		};

		// A failed rebuild must not leave the previous engine serving queries.
		self.engine = None;

		let catalog = match (p.catalog_path, p.items) {
			(Some(_), Some(_)) => {
				return Err(RecommendError::InvalidParams(
					"pass either catalogPath or items, not both".to_string(),
				))
			}
			(Some(path), None) => Catalog::from_csv_path(&path, &columns)?,
			(None, Some(items)) => Catalog::from_records(&items, &columns)?,
			(None, None) => {
				return Err(RecommendError::InvalidParams(
					"catalogPath or items is required".to_string(),
				))
			}
		};

		let engine = Engine::build(catalog, &vectorizer).map_err(|e| {
			tracing::error!("Failed to build recommendation engine: {}", e);
			e
		})?;
		let engine = self.engine.insert(engine);
		Ok(serde_json::json!({
			"items": engine.catalog().len(),
			"vocabularySize": engine.vocabulary().len(),
		}))
	}
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_params<T: serde::de::DeserializeOwned>(
	params: serde_json::Value,
) -> Result<T, RecommendError> {
	serde_json::from_value(params)
		.map_err(|e| RecommendError::InvalidParams(e.to_string()))
}

/// JSON-RPC error code for an engine error.
pub fn rpc_code(err: &RecommendError) -> i32 {
	match err {
		RecommendError::NotInitialized => ENGINE_UNAVAILABLE,
		RecommendError::InvalidParams(_) => INVALID_PARAMS,
		RecommendError::Serialization(_) => INTERNAL_ERROR,
		_ => ENGINE_ERROR,
	}
}

/// Accept string or numeric identifiers; reject missing or blank ones.
fn identifier_param(value: Option<serde_json::Value>) -> Result<String, RecommendError> {
	let identifier = match value {
		Some(serde_json::Value::String(s)) => s,
		Some(serde_json::Value::Number(n)) => n.to_string(),
		_ => String::new(),
	};
	if identifier.trim().is_empty() {
		return Err(RecommendError::InvalidParams(
			"Missing identifier in request".to_string(),
		));
	}
	Ok(identifier)
}

// ---------------------------------------------------------------------------
// Free-standing handler functions
// ---------------------------------------------------------------------------

/// `Ok(None)` signals an unknown item.
fn handle_recommend(
	engine: &Engine,
	params: serde_json::Value,
) -> Result<Option<serde_json::Value>, RecommendError> {
	let p: RecommendParams = parse_params(params)?;
	let identifier = identifier_param(p.identifier)?;

	let num_results = p.num_results.unwrap_or(DEFAULT_NUM_RESULTS as i64);
	if num_results < 1 {
		return Err(RecommendError::Config(format!(
			"numResults must be at least 1, got {}",
			num_results
		)));
	}

	let scored = engine.recommend_scored(&identifier, num_results as usize)?;
	if scored.is_empty() {
		return Ok(None);
	}

	let ids: Vec<&str> = scored.iter().map(|s| s.identifier.as_str()).collect();
	let mut body = serde_json::json!({ "recommendations": ids });
	if p.include_scores {
		body["scores"] = serde_json::to_value(&scored)
			.map_err(|e| RecommendError::Serialization(e.to_string()))?;
	}
	Ok(Some(body))
}

fn handle_stats(engine: &Engine) -> Result<serde_json::Value, RecommendError> {
	let stats = StatsResult {
		items: engine.catalog().len(),
		vocabulary_size: engine.vocabulary().len(),
		max_features: engine.config().max_features,
	};
	serde_json::to_value(stats).map_err(|e| RecommendError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::catalog::Item;

	fn engine() -> Engine {
		let catalog = Catalog::new(vec![
			Item::new("1", "open world fantasy rpg"),
			Item::new("2", "open world fantasy rpg"),
			Item::new("3", "racing arcade"),
		]);
		Engine::build(catalog, &VectorizerConfig::default()).unwrap()
	}

	#[test]
	fn recommend_returns_identifiers() {
		let value = handle_recommend(&engine(), json!({ "identifier": "1", "numResults": 2 }))
			.unwrap()
			.unwrap();
		assert_eq!(value["recommendations"], json!(["2", "3"]));
		assert!(value.get("scores").is_none());
	}

	#[test]
	fn recommend_accepts_numeric_identifier() {
		let value = handle_recommend(&engine(), json!({ "identifier": 1 }))
			.unwrap()
			.unwrap();
		assert_eq!(value["recommendations"], json!(["2", "3"]));
	}

	#[test]
	fn recommend_includes_scores_on_request() {
		let value = handle_recommend(
			&engine(),
			json!({ "identifier": "1", "numResults": 1, "includeScores": true }),
		)
		.unwrap()
		.unwrap();
		assert_eq!(value["scores"][0]["identifier"], "2");
		assert!((value["scores"][0]["score"].as_f64().unwrap() - 1.0).abs() < 1e-10);
	}

	#[test]
	fn recommend_unknown_item_is_none() {
		let out = handle_recommend(&engine(), json!({ "identifier": "missing" })).unwrap();
		assert!(out.is_none());
	}

	#[test]
	fn recommend_missing_identifier_is_invalid_params() {
		for params in [json!({}), json!({ "identifier": "  " }), json!({ "identifier": null })] {
			let err = handle_recommend(&engine(), params).unwrap_err();
			assert_eq!(rpc_code(&err), INVALID_PARAMS);
		}
	}

	#[test]
	fn recommend_non_positive_count_is_config_error() {
		for n in [0, -4] {
			let err =
				handle_recommend(&engine(), json!({ "identifier": "1", "numResults": n }))
					.unwrap_err();
			assert!(matches!(err, RecommendError::Config(_)));
			assert_eq!(rpc_code(&err), ENGINE_ERROR);
		}
	}

	#[test]
	fn stats_reports_sizes() {
		let value = handle_stats(&engine()).unwrap();
		assert_eq!(value["items"], 3);
		assert_eq!(value["maxFeatures"], 10_000);
		assert_eq!(value["vocabularySize"], 6);
	}

	#[test]
	fn unavailable_maps_to_distinct_code() {
		assert_eq!(rpc_code(&RecommendError::NotInitialized), ENGINE_UNAVAILABLE);
		assert_eq!(rpc_code(&RecommendError::Data("x".into())), ENGINE_ERROR);
	}
}
