use rusqlite::Connection;

use crate::store::StoreResult;

const TELEMETRY_TABLE: &str = "CREATE TABLE IF NOT EXISTS telemetry(
	id INTEGER PRIMARY KEY,
	name TEXT NOT NULL,
	message_id INTEGER NOT NULL,
	macro TEXT,
	symbol INTEGER NOT NULL,
	module INTEGER NOT NULL,
	min_rate REAL,
	FOREIGN KEY (symbol) REFERENCES symbols(id),
	FOREIGN KEY (module) REFERENCES modules(id),
	UNIQUE (name, module, message_id));";

const COMMANDS_TABLE: &str = "CREATE TABLE IF NOT EXISTS commands(
	id INTEGER PRIMARY KEY,
	name TEXT NOT NULL,
	command_code INTEGER NOT NULL,
	message_id INTEGER NOT NULL,
	macro TEXT,
	symbol INTEGER NOT NULL,
	module INTEGER NOT NULL,
	FOREIGN KEY (symbol) REFERENCES symbols(id),
	FOREIGN KEY (module) REFERENCES modules(id),
	UNIQUE (name, command_code, module, message_id));";

const UNION_SELECTIONS_TABLE: &str = "CREATE TABLE IF NOT EXISTS union_selections(
	id INTEGER PRIMARY KEY,
	union_parent INTEGER NOT NULL,
	union_field INTEGER NOT NULL,
	telemetry_item INTEGER,
	command_item INTEGER,
	FOREIGN KEY (union_parent) REFERENCES fields(id),
	FOREIGN KEY (union_field) REFERENCES fields(id),
	FOREIGN KEY (telemetry_item) REFERENCES telemetry(id),
	FOREIGN KEY (command_item) REFERENCES commands(id),
	CHECK ((telemetry_item IS NULL) <> (command_item IS NULL)),
	UNIQUE (union_parent, union_field));";

/// Creates the tables the merge writes into. Purely additive: existing
/// tables are left untouched, whatever their shape.
pub fn ensure_tables(conn: &Connection) -> StoreResult<()> {
	for ddl in [TELEMETRY_TABLE, COMMANDS_TABLE, UNION_SELECTIONS_TABLE] {
		conn.execute_batch(ddl)?;
	}
	log::debug!("output tables present: telemetry, commands, union_selections");
	Ok(())
}
