//! Storage seam for the metadata database.
//!
//! `modules`, `symbols` and `fields` are owned by the upstream extraction
//! stage and are only ever read here. `telemetry`, `commands` and
//! `union_selections` are written by the merge.

pub mod schema;
pub mod sqlite;

use std::collections::HashMap;

use crate::error::StoreError;

pub use sqlite::SqliteStore;

pub type SymbolId = i64;
pub type FieldId = i64;
pub type ModuleId = i64;

pub type StoreResult<T> = Result<T, StoreError>;

/// A row of the `symbols` table. `target_symbol` is set iff the symbol is a
/// typedef alias of another symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRow {
	pub id: SymbolId,
	pub name: String,
	pub byte_size: Option<i64>,
	pub target_symbol: Option<SymbolId>,
}

/// A row of the `fields` table. `type_symbol` is the field's own type, which
/// may itself be an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
	pub id: FieldId,
	pub symbol: SymbolId,
	pub name: String,
	pub byte_offset: Option<i64>,
	pub type_symbol: Option<SymbolId>,
}

/// Identifies a row written by the merge; union selections point at exactly
/// one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordId {
	Telemetry(i64),
	Command(i64),
}

impl std::fmt::Display for RecordId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			RecordId::Telemetry(id) => write!(f, "telemetry #{}", id),
			RecordId::Command(id) => write!(f, "command #{}", id),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTelemetry {
	pub name: String,
	pub message_id: i64,
	pub macro_name: String,
	pub symbol: SymbolId,
	pub module: ModuleId,
	pub min_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommand {
	pub name: String,
	pub command_code: i64,
	pub message_id: i64,
	pub macro_name: String,
	pub symbol: SymbolId,
	pub module: ModuleId,
}

/// A persisted union selection: `union_parent` is the union-typed field,
/// `union_field` the selected member inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnionSelectionRow {
	pub id: i64,
	pub union_parent: FieldId,
	pub union_field: FieldId,
	pub owner: RecordId,
}

/// Every read and write the merge performs. Implemented by `SqliteStore`;
/// tests wrap it to observe traffic.
pub trait MetadataStore {
	/// All modules keyed by name.
	fn module_ids(&self) -> StoreResult<HashMap<String, ModuleId>>;

	/// Lowest id among symbols called `name`.
	fn symbol_id_by_name(&self, name: &str) -> StoreResult<Option<SymbolId>>;

	fn symbol(&self, id: SymbolId) -> StoreResult<Option<SymbolRow>>;

	/// Direct fields of a symbol, ordered by field id.
	fn fields_of(&self, symbol: SymbolId) -> StoreResult<Vec<FieldRow>>;

	fn find_telemetry(
		&self,
		name: &str,
		module: ModuleId,
		message_id: i64,
	) -> StoreResult<Option<i64>>;

	fn insert_telemetry(&self, record: &NewTelemetry) -> StoreResult<i64>;

	fn find_command(
		&self,
		name: &str,
		command_code: i64,
		module: ModuleId,
		message_id: i64,
	) -> StoreResult<Option<i64>>;

	fn insert_command(&self, record: &NewCommand) -> StoreResult<i64>;

	fn find_union_selection(
		&self,
		union_parent: FieldId,
		union_field: FieldId,
	) -> StoreResult<Option<UnionSelectionRow>>;

	fn insert_union_selection(
		&self,
		union_parent: FieldId,
		union_field: FieldId,
		owner: RecordId,
	) -> StoreResult<i64>;
}
