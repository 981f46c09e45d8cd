// ---------------------------------------------------------------------------
// Catalog -- ordered, immutable sequence of items loaded at startup
// ---------------------------------------------------------------------------
//
// Items come from a CSV file with a header row or from inline JSON records.
// Feature values are coerced to text: missing or null values become "nan",
// numbers and booleans use their textual form.
// ---------------------------------------------------------------------------

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RecommendError;

/// Text stored for a missing or null field.
pub const MISSING_VALUE: &str = "nan";

pub const DEFAULT_ID_COLUMN: &str = "AppID";
pub const DEFAULT_FEATURES_COLUMN: &str = "combined_features";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
	pub identifier: String,
	pub combined_features: String,
}

impl Item {
	pub fn new(identifier: impl Into<String>, combined_features: impl Into<String>) -> Self {
		Self {
			identifier: identifier.into(),
			combined_features: combined_features.into(),
		}
	}
}

/// Names of the source columns holding the identifier and the feature text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
	pub id: String,
	pub features: String,
}

impl Default for ColumnNames {
	fn default() -> Self {
		Self {
			id: DEFAULT_ID_COLUMN.to_string(),
			features: DEFAULT_FEATURES_COLUMN.to_string(),
		}
	}
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
	items: Vec<Item>,
}

impl Catalog {
	pub fn new(items: Vec<Item>) -> Self {
		Self { items }
	}

	/// Load a catalog from a CSV file with a header row.
	///
	/// Fails with [`RecommendError::Data`] when the identifier column is
	/// missing, or when the feature column is absent (or empty) on every row.
	pub fn from_csv_path<P: AsRef<Path>>(
		path: P,
		columns: &ColumnNames,
	) -> Result<Self, RecommendError> {
		let path = path.as_ref();
		let file = std::fs::File::open(path)?;
		tracing::debug!(path = %path.display(), "Reading catalog CSV");
		Self::from_csv_reader(file, columns)
	}

	pub fn from_csv_reader<R: std::io::Read>(
		reader: R,
		columns: &ColumnNames,
	) -> Result<Self, RecommendError> {
		let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
		let headers = reader.headers()?.clone();

		let id_idx = headers.iter().position(|h| h == columns.id).ok_or_else(|| {
			RecommendError::Data(format!(
				"identifier column '{}' not found; available columns: {:?}",
				columns.id,
				headers.iter().collect::<Vec<_>>()
			))
		})?;
		let features_idx = headers.iter().position(|h| h == columns.features);

		let mut items = Vec::new();
		let mut with_features = 0usize;
		for record in reader.records() {
			let record = record?;
			let identifier = coerce_cell(record.get(id_idx));
			let features = features_idx.and_then(|i| record.get(i));
			if features.is_some_and(|f| !f.is_empty()) {
				with_features += 1;
			}
			items.push(Item::new(identifier, coerce_cell(features)));
		}

		ensure_features_present(&items, with_features, &columns.features)?;
		Ok(Self { items })
	}

	/// Build a catalog from inline JSON records (one object per item).
	pub fn from_records(
		records: &[serde_json::Map<String, serde_json::Value>],
		columns: &ColumnNames,
	) -> Result<Self, RecommendError> {
		let mut items = Vec::with_capacity(records.len());
		let mut with_features = 0usize;
		for record in records {
			let features = record.get(&columns.features);
			if features.is_some_and(|v| !v.is_null()) {
				with_features += 1;
			}
			items.push(Item::new(
				coerce_value(record.get(&columns.id)),
				coerce_value(features),
			));
		}

		ensure_features_present(&items, with_features, &columns.features)?;
		Ok(Self { items })
	}

	pub fn items(&self) -> &[Item] {
		&self.items
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn get(&self, index: usize) -> Option<&Item> {
		self.items.get(index)
	}

	/// Row index of the first item with the given identifier.
	pub fn position(&self, identifier: &str) -> Option<usize> {
		self.items.iter().position(|item| item.identifier == identifier)
	}

	pub fn feature_texts(&self) -> Vec<&str> {
		self.items
			.iter()
			.map(|item| item.combined_features.as_str())
			.collect()
	}
}

fn ensure_features_present(
	items: &[Item],
	with_features: usize,
	column: &str,
) -> Result<(), RecommendError> {
	if !items.is_empty() && with_features == 0 {
		return Err(RecommendError::Data(format!(
			"feature column '{}' is absent on every item",
			column
		)));
	}
	Ok(())
}

fn coerce_cell(cell: Option<&str>) -> String {
	match cell {
		Some(s) if !s.is_empty() => s.to_string(),
		_ => MISSING_VALUE.to_string(),
	}
}

fn coerce_value(value: Option<&serde_json::Value>) -> String {
	match value {
		None | Some(serde_json::Value::Null) => MISSING_VALUE.to_string(),
		Some(serde_json::Value::String(s)) => s.clone(),
		Some(other) => other.to_string(),
	}
}
