use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, params};

use crate::store::{
	FieldId, FieldRow, MetadataStore, ModuleId, NewCommand, NewTelemetry, RecordId, StoreResult,
	SymbolId, SymbolRow, UnionSelectionRow,
};

/// `MetadataStore` over a borrowed SQLite connection.
///
/// Borrowing (rather than owning) lets the orchestrator hand in a
/// `rusqlite::Transaction`, so every write lands in the caller's single
/// transaction and nothing is committed here.
pub struct SqliteStore<'c> {
	conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
	pub fn new(conn: &'c Connection) -> Self {
		Self { conn }
	}
}

impl MetadataStore for SqliteStore<'_> {
	fn module_ids(&self) -> StoreResult<HashMap<String, ModuleId>> {
		let mut stmt = self.conn.prepare("SELECT id, name FROM modules")?;
		let rows = stmt.query_map([], |row| {
			Ok((row.get::<_, String>(1)?, row.get::<_, ModuleId>(0)?))
		})?;
		let mut out = HashMap::new();
		for row in rows {
			let (name, id) = row?;
			out.insert(name, id);
		}
		Ok(out)
	}

	fn symbol_id_by_name(&self, name: &str) -> StoreResult<Option<SymbolId>> {
		let id = self
			.conn
			.query_row(
				"SELECT id FROM symbols WHERE name = ?1 ORDER BY id LIMIT 1",
				[name],
				|row| row.get(0),
			)
			.optional()?;
		Ok(id)
	}

	fn symbol(&self, id: SymbolId) -> StoreResult<Option<SymbolRow>> {
		let row = self
			.conn
			.query_row(
				"SELECT id, name, byte_size, target_symbol FROM symbols WHERE id = ?1",
				[id],
				|row| {
					Ok(SymbolRow {
						id: row.get(0)?,
						name: row.get(1)?,
						byte_size: row.get(2)?,
						target_symbol: row.get(3)?,
					})
				},
			)
			.optional()?;
		Ok(row)
	}

	fn fields_of(&self, symbol: SymbolId) -> StoreResult<Vec<FieldRow>> {
		let mut stmt = self.conn.prepare(
			"SELECT id, symbol, name, byte_offset, type FROM fields WHERE symbol = ?1 ORDER BY id",
		)?;
		let rows = stmt.query_map([symbol], |row| {
			Ok(FieldRow {
				id: row.get(0)?,
				symbol: row.get(1)?,
				name: row.get(2)?,
				byte_offset: row.get(3)?,
				type_symbol: row.get(4)?,
			})
		})?;
		Ok(rows.collect::<Result<Vec<_>, _>>()?)
	}

	fn find_telemetry(
		&self,
		name: &str,
		module: ModuleId,
		message_id: i64,
	) -> StoreResult<Option<i64>> {
		let id = self
			.conn
			.query_row(
				"SELECT id FROM telemetry WHERE name = ?1 AND module = ?2 AND message_id = ?3",
				params![name, module, message_id],
				|row| row.get(0),
			)
			.optional()?;
		Ok(id)
	}

	fn insert_telemetry(&self, record: &NewTelemetry) -> StoreResult<i64> {
		self.conn.execute(
			"INSERT INTO telemetry(name, message_id, macro, symbol, module, min_rate) \
			 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
			params![
				record.name,
				record.message_id,
				record.macro_name,
				record.symbol,
				record.module,
				record.min_rate,
			],
		)?;
		Ok(self.conn.last_insert_rowid())
	}

	fn find_command(
		&self,
		name: &str,
		command_code: i64,
		module: ModuleId,
		message_id: i64,
	) -> StoreResult<Option<i64>> {
		let id = self
			.conn
			.query_row(
				"SELECT id FROM commands \
				 WHERE name = ?1 AND command_code = ?2 AND module = ?3 AND message_id = ?4",
				params![name, command_code, module, message_id],
				|row| row.get(0),
			)
			.optional()?;
		Ok(id)
	}

	fn insert_command(&self, record: &NewCommand) -> StoreResult<i64> {
		self.conn.execute(
			"INSERT INTO commands(name, command_code, message_id, macro, symbol, module) \
			 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
			params![
				record.name,
				record.command_code,
				record.message_id,
				record.macro_name,
				record.symbol,
				record.module,
			],
		)?;
		Ok(self.conn.last_insert_rowid())
	}

	fn find_union_selection(
		&self,
		union_parent: FieldId,
		union_field: FieldId,
	) -> StoreResult<Option<UnionSelectionRow>> {
		let row = self
			.conn
			.query_row(
				"SELECT id, telemetry_item, command_item FROM union_selections \
				 WHERE union_parent = ?1 AND union_field = ?2",
				params![union_parent, union_field],
				|row| {
					Ok((
						row.get::<_, i64>(0)?,
						row.get::<_, Option<i64>>(1)?,
						row.get::<_, Option<i64>>(2)?,
					))
				},
			)
			.optional()?;

		// Rows written by other tools may carry neither owner; treat those as
		// absent so the caller's insert trips the uniqueness constraint loudly.
		Ok(row.and_then(|(id, telemetry, command)| {
			let owner = match (telemetry, command) {
				(Some(t), _) => RecordId::Telemetry(t),
				(None, Some(c)) => RecordId::Command(c),
				(None, None) => return None,
			};
			Some(UnionSelectionRow {
				id,
				union_parent,
				union_field,
				owner,
			})
		}))
	}

	fn insert_union_selection(
		&self,
		union_parent: FieldId,
		union_field: FieldId,
		owner: RecordId,
	) -> StoreResult<i64> {
		let (telemetry, command) = match owner {
			RecordId::Telemetry(id) => (Some(id), None),
			RecordId::Command(id) => (None, Some(id)),
		};
		self.conn.execute(
			"INSERT INTO union_selections(union_parent, union_field, telemetry_item, command_item) \
			 VALUES (?1, ?2, ?3, ?4)",
			params![union_parent, union_field, telemetry, command],
		)?;
		Ok(self.conn.last_insert_rowid())
	}
}
