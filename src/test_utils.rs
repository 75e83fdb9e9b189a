//! Test utilities shared by the unit tests.
//!
//! Builds in-memory databases that look like the output of the upstream
//! symbol extraction stage, and a store wrapper that counts lookups.

#![cfg(test)]

use std::cell::Cell;
use std::collections::HashMap;

use rusqlite::{Connection, params};

use crate::store::{
	FieldId, FieldRow, MetadataStore, ModuleId, NewCommand, NewTelemetry, RecordId, StoreResult,
	SymbolId, SymbolRow, UnionSelectionRow,
};

const UPSTREAM_SCHEMA: &str = "
	PRAGMA foreign_keys = ON;
	CREATE TABLE modules(
		id INTEGER PRIMARY KEY,
		name TEXT NOT NULL UNIQUE);
	CREATE TABLE symbols(
		id INTEGER PRIMARY KEY,
		elf INTEGER,
		name TEXT NOT NULL,
		byte_size INTEGER,
		artifact INTEGER,
		long_description TEXT,
		short_description TEXT,
		target_symbol INTEGER,
		FOREIGN KEY (target_symbol) REFERENCES symbols(id));
	CREATE TABLE fields(
		id INTEGER PRIMARY KEY,
		symbol INTEGER NOT NULL,
		name TEXT NOT NULL,
		byte_offset INTEGER,
		type INTEGER,
		FOREIGN KEY (symbol) REFERENCES symbols(id),
		FOREIGN KEY (type) REFERENCES symbols(id));";

/// An in-memory database holding the empty upstream tables.
pub fn upstream_connection() -> Connection {
	let conn = Connection::open_in_memory().expect("open in-memory sqlite");
	conn.execute_batch(UPSTREAM_SCHEMA)
		.expect("create upstream schema");
	conn
}

/// Inserts upstream rows and hands back their ids.
pub struct Seed<'c> {
	conn: &'c Connection,
}

impl<'c> Seed<'c> {
	pub fn new(conn: &'c Connection) -> Self {
		Self { conn }
	}

	pub fn module(&self, name: &str) -> ModuleId {
		self.conn
			.execute("INSERT INTO modules(name) VALUES (?1)", [name])
			.expect("insert module");
		self.conn.last_insert_rowid()
	}

	pub fn symbol(&self, name: &str, byte_size: i64, target: Option<SymbolId>) -> SymbolId {
		self.conn
			.execute(
				"INSERT INTO symbols(name, byte_size, target_symbol) VALUES (?1, ?2, ?3)",
				params![name, byte_size, target],
			)
			.expect("insert symbol");
		self.conn.last_insert_rowid()
	}

	/// Points an existing symbol at a new alias target; used to build cycles.
	pub fn retarget(&self, symbol: SymbolId, target: SymbolId) {
		self.conn
			.execute(
				"UPDATE symbols SET target_symbol = ?1 WHERE id = ?2",
				params![target, symbol],
			)
			.expect("retarget symbol");
	}

	pub fn field(&self, owner: SymbolId, name: &str, offset: i64, ty: SymbolId) -> FieldId {
		self.conn
			.execute(
				"INSERT INTO fields(symbol, name, byte_offset, type) VALUES (?1, ?2, ?3, ?4)",
				params![owner, name, offset, ty],
			)
			.expect("insert field");
		self.conn.last_insert_rowid()
	}

	pub fn untyped_field(&self, owner: SymbolId, name: &str, offset: i64) -> FieldId {
		self.conn
			.execute(
				"INSERT INTO fields(symbol, name, byte_offset) VALUES (?1, ?2, ?3)",
				params![owner, name, offset],
			)
			.expect("insert field");
		self.conn.last_insert_rowid()
	}
}

/// The symbol layout used across tests:
///
/// ```text
/// NAV_STATUS_T { uint8 state; MODE_T mode; }     MODE_T -> MODE_UNION_T
/// MODE_UNION_T { uint8 safe_mode; uint8 science; }
/// ```
pub struct NavFixture {
	pub module: ModuleId,
	pub nav_status: SymbolId,
	pub mode_field: FieldId,
	pub safe_mode_field: FieldId,
	pub science_field: FieldId,
}

pub fn seed_nav(conn: &Connection) -> NavFixture {
	let seed = Seed::new(conn);
	let module = seed.module("nav");
	let u8_t = seed.symbol("uint8", 1, None);
	let mode_union = seed.symbol("MODE_UNION_T", 1, None);
	let mode_alias = seed.symbol("MODE_T", 1, Some(mode_union));
	let nav_status = seed.symbol("NAV_STATUS_T", 2, None);
	seed.field(nav_status, "state", 0, u8_t);
	let mode_field = seed.field(nav_status, "mode", 1, mode_alias);
	let safe_mode_field = seed.field(mode_union, "safe_mode", 0, u8_t);
	let science_field = seed.field(mode_union, "science", 0, u8_t);
	NavFixture {
		module,
		nav_status,
		mode_field,
		safe_mode_field,
		science_field,
	}
}

/// Delegates to another store while counting symbol-row lookups.
pub struct CountingStore<'s, S: MetadataStore> {
	inner: &'s S,
	pub symbol_reads: Cell<usize>,
}

impl<'s, S: MetadataStore> CountingStore<'s, S> {
	pub fn new(inner: &'s S) -> Self {
		Self {
			inner,
			symbol_reads: Cell::new(0),
		}
	}
}

impl<S: MetadataStore> MetadataStore for CountingStore<'_, S> {
	fn module_ids(&self) -> StoreResult<HashMap<String, ModuleId>> {
		self.inner.module_ids()
	}

	fn symbol_id_by_name(&self, name: &str) -> StoreResult<Option<SymbolId>> {
		self.inner.symbol_id_by_name(name)
	}

	fn symbol(&self, id: SymbolId) -> StoreResult<Option<SymbolRow>> {
		self.symbol_reads.set(self.symbol_reads.get() + 1);
		self.inner.symbol(id)
	}

	fn fields_of(&self, symbol: SymbolId) -> StoreResult<Vec<FieldRow>> {
		self.inner.fields_of(symbol)
	}

	fn find_telemetry(
		&self,
		name: &str,
		module: ModuleId,
		message_id: i64,
	) -> StoreResult<Option<i64>> {
		self.inner.find_telemetry(name, module, message_id)
	}

	fn insert_telemetry(&self, record: &NewTelemetry) -> StoreResult<i64> {
		self.inner.insert_telemetry(record)
	}

	fn find_command(
		&self,
		name: &str,
		command_code: i64,
		module: ModuleId,
		message_id: i64,
	) -> StoreResult<Option<i64>> {
		self.inner
			.find_command(name, command_code, module, message_id)
	}

	fn insert_command(&self, record: &NewCommand) -> StoreResult<i64> {
		self.inner.insert_command(record)
	}

	fn find_union_selection(
		&self,
		union_parent: FieldId,
		union_field: FieldId,
	) -> StoreResult<Option<UnionSelectionRow>> {
		self.inner.find_union_selection(union_parent, union_field)
	}

	fn insert_union_selection(
		&self,
		union_parent: FieldId,
		union_field: FieldId,
		owner: RecordId,
	) -> StoreResult<i64> {
		self.inner
			.insert_union_selection(union_parent, union_field, owner)
	}
}
