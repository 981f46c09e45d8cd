use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommendError {
	#[error("Data error: {0}")]
	Data(String),
	#[error("Config error: {0}")]
	Config(String),
	#[error("Invalid params: {0}")]
	InvalidParams(String),
	#[error("Engine not initialized: call engine/initialize first")]
	NotInitialized,
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("CSV error: {0}")]
	Csv(#[from] csv::Error),
	#[error("Serialization error: {0}")]
	Serialization(String),
}

impl RecommendError {
	pub fn code(&self) -> &str {
		match self {
			Self::Data(_) => "DATA_ERROR",
			Self::Config(_) => "CONFIG_ERROR",
			Self::InvalidParams(_) => "INVALID_PARAMS",
			Self::NotInitialized => "ENGINE_UNAVAILABLE",
			Self::Io(_) => "IO_ERROR",
			Self::Csv(_) => "CSV_ERROR",
			Self::Serialization(_) => "SERIALIZATION_ERROR",
		}
	}

	pub fn to_json_rpc_error(&self) -> serde_json::Value {
		serde_json::json!({
			"engineCode": self.code(),
			"message": self.to_string(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn codes_are_distinct_per_kind() {
		assert_eq!(RecommendError::Data("empty".into()).code(), "DATA_ERROR");
		assert_eq!(RecommendError::Config("zero".into()).code(), "CONFIG_ERROR");
		assert_eq!(RecommendError::NotInitialized.code(), "ENGINE_UNAVAILABLE");
	}

	#[test]
	fn json_rpc_error_carries_code_and_message() {
		let err = RecommendError::Config("numResults must be at least 1".into());
		let value = err.to_json_rpc_error();
		assert_eq!(value["engineCode"], "CONFIG_ERROR");
		assert_eq!(
			value["message"],
			"Config error: numResults must be at least 1"
		);
	}
}
