use serde::{Deserialize, Serialize};

// JSON-RPC 2.0 error codes
pub const INTERNAL_ERROR: i32 = -32603;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const ENGINE_ERROR: i32 = -32000;
pub const ENGINE_UNAVAILABLE: i32 = -32003;
pub const ITEM_NOT_FOUND: i32 = -32004;

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
	pub id: u64,
	pub method: String,
	#[serde(default)]
	pub params: serde_json::Value,
}

// ── Params ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
	pub catalog_path: Option<String>,
	pub items: Option<Vec<serde_json::Map<String, serde_json::Value>>>,
	pub id_column: Option<String>,
	pub features_column: Option<String>,
	pub max_features: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendParams {
	pub identifier: Option<serde_json::Value>,
	pub num_results: Option<i64>,
	#[serde(default)]
	pub include_scores: bool,
}

// ── Results ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResult {
	pub items: usize,
	pub vocabulary_size: usize,
	pub max_features: usize,
}
