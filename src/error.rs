use thiserror::Error;

use crate::store::{FieldId, SymbolId};

/// Failures raised by the storage seam.
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("sqlite error: {0}")]
	Sqlite(#[from] rusqlite::Error),
}

/// Errors produced while chasing typedefs or walking a dotted field path.
#[derive(Debug, Error)]
pub enum ResolveError {
	#[error("symbol id {0} does not exist")]
	SymbolNotFound(SymbolId),

	#[error("symbol '{0}' does not exist")]
	SymbolNameNotFound(String),

	/// A typedef chain revisited a symbol before reaching a concrete definition.
	#[error("typedef cycle detected: {}", format_chain(.chain))]
	Cycle { chain: Vec<SymbolId> },

	#[error("field '{segment}' not found while resolving '{path}'")]
	SegmentNotFound { segment: String, path: String },

	#[error("union arm '{arm}' not found under '{path}'")]
	ArmNotFound { arm: String, path: String },

	#[error("field '{field}' in '{path}' has no type to descend into")]
	UntypedField { field: String, path: String },

	#[error("path '{path}' names no field below its root symbol")]
	EmptyPath { path: String },

	#[error(transparent)]
	Store(#[from] StoreError),
}

fn format_chain(chain: &[SymbolId]) -> String {
	chain
		.iter()
		.map(|id| id.to_string())
		.collect::<Vec<_>>()
		.join(" -> ")
}

/// A problem with a single telemetry or command declaration. The walker
/// reports it and moves on to the next sibling.
#[derive(Debug, Error)]
pub enum ValidationError {
	#[error("declaration is empty")]
	EmptyDeclaration,

	#[error("struct must not be empty")]
	MissingStruct,

	#[error("struct '{0}' could not be found")]
	StructNotFound(String),

	#[error("cc must not be empty")]
	MissingCommandCode,

	#[error("union_select must hold exactly one path, found {0}")]
	UnionSelectShape(usize),

	#[error("union_select could not be resolved: {0}")]
	UnionResolution(ResolveError),

	#[error(
		"union field {parent}/{arm} is already selected by {owner}, not {requested}"
	)]
	SelectionConflict {
		parent: FieldId,
		arm: FieldId,
		owner: String,
		requested: String,
	},
}

/// Fatal errors: any of these aborts the run and rolls back the transaction.
#[derive(Debug, Error)]
pub enum MergeError {
	#[error("failed to read document: {0}")]
	Io(#[from] std::io::Error),

	#[error("failed to parse document: {0}")]
	Document(#[from] serde_yaml::Error),

	#[error("malformed document: {0}")]
	Structural(String),

	#[error("\"{segment}\" is not found in module path '{path}'")]
	ModulePathNotFound { segment: String, path: String },

	#[error("module '{name}' is not present in the modules table")]
	UnknownModule { name: String },

	#[error("module nesting at '{path}' exceeds the limit of {limit}")]
	DepthExceeded { path: String, limit: usize },

	#[error(transparent)]
	Store(#[from] StoreError),
}

impl From<rusqlite::Error> for MergeError {
	fn from(e: rusqlite::Error) -> Self {
		MergeError::Store(StoreError::Sqlite(e))
	}
}

impl MergeError {
	/// Process exit status for the CLI.
	pub fn exit_code(&self) -> i32 {
		match self {
			MergeError::ModulePathNotFound { .. } => 2,
			_ => 1,
		}
	}
}

#[cfg(test)]
#[cfg(feature = "unit-tests")]
mod tests {
	use super::*;

	#[test]
	fn cycle_message_lists_the_chain() {
		let err = ResolveError::Cycle {
			chain: vec![3, 7, 3],
		};
		assert_eq!(err.to_string(), "typedef cycle detected: 3 -> 7 -> 3");
	}

	#[test]
	fn only_path_errors_map_to_exit_code_two() {
		let missing = MergeError::ModulePathNotFound {
			segment: "b".to_string(),
			path: "/a/b".to_string(),
		};
		assert_eq!(missing.exit_code(), 2);
		assert_eq!(missing.to_string(), "\"b\" is not found in module path '/a/b'");

		let unknown = MergeError::UnknownModule {
			name: "nav".to_string(),
		};
		assert_eq!(unknown.exit_code(), 1);
	}
}
