use std::path::PathBuf;

use clap::Parser;

use crate::catalog::{ColumnNames, DEFAULT_FEATURES_COLUMN, DEFAULT_ID_COLUMN};
use crate::server::ServerConfig;
use crate::vectorizer::{VectorizerConfig, DEFAULT_MAX_FEATURES};

#[derive(Parser, Debug)]
#[command(name = "gamerec-engine", about = "Content-based game recommendation server over JSON-RPC / NDJSON stdio")]
pub struct CliArgs {
	/// Catalog CSV loaded at startup. Without it the engine waits for engine/initialize.
	#[arg(long, env = "GAMEREC_CATALOG")]
	pub catalog: Option<PathBuf>,

	/// Column holding the item identifier
	#[arg(long, default_value = DEFAULT_ID_COLUMN, env = "GAMEREC_ID_COLUMN")]
	pub id_column: String,

	/// Column holding the combined feature text
	#[arg(long, default_value = DEFAULT_FEATURES_COLUMN, env = "GAMEREC_FEATURES_COLUMN")]
	pub features_column: String,

	/// Maximum vocabulary size
	#[arg(long, default_value_t = DEFAULT_MAX_FEATURES, env = "GAMEREC_MAX_FEATURES")]
	pub max_features: usize,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, default_value = "info", env = "GAMEREC_LOG_LEVEL")]
	pub log_level: String,
}

impl CliArgs {
	pub fn server_config(&self) -> ServerConfig {
		ServerConfig {
			columns: ColumnNames {
				id: self.id_column.clone(),
				features: self.features_column.clone(),
			},
			vectorizer: VectorizerConfig {
				max_features: self.max_features,
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_catalog_format() {
		let args = CliArgs::parse_from(["gamerec-engine"]);
		let config = args.server_config();
		assert_eq!(config.columns, ColumnNames::default());
		assert_eq!(config.vectorizer, VectorizerConfig::default());
		assert_eq!(args.log_level, "info");
	}

	#[test]
	fn flags_override_defaults() {
		let args = CliArgs::parse_from([
			"gamerec-engine",
			"--catalog",
			"games.csv",
			"--id-column",
			"id",
			"--max-features",
			"500",
		]);
		assert_eq!(args.catalog, Some(PathBuf::from("games.csv")));
		let config = args.server_config();
		assert_eq!(config.columns.id, "id");
		assert_eq!(config.vectorizer.max_features, 500);
	}
}
