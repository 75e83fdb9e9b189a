/// Common test utilities and helpers for integration tests.
use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};

/// Ids of the rows seeded by `create_upstream_db`.
#[allow(dead_code)]
pub struct Seeded {
	pub nav_module: i64,
	pub nav_status: i64,
	pub mode_field: i64,
	pub safe_mode_field: i64,
	pub science_field: i64,
	pub reset_cmd: i64,
}

/// Create an on-disk database shaped like the output of the symbol
/// extraction stage:
///
/// - modules `cfs`, `nav`
/// - `NAV_STATUS_T { uint8 state; MODE_T mode; }` where `MODE_T` is a
///   typedef of the union `MODE_UNION_T { safe_mode; science; }`
/// - `NAV_RESET_CMD_T { uint8 hdr; MODE_T target; }`
pub fn create_upstream_db(path: &Path) -> Seeded {
	let conn = Connection::open(path).expect("open sqlite");
	conn.execute_batch(
		"CREATE TABLE modules(id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);
		 CREATE TABLE symbols(
			id INTEGER PRIMARY KEY, elf INTEGER, name TEXT NOT NULL, byte_size INTEGER,
			artifact INTEGER, long_description TEXT, short_description TEXT,
			target_symbol INTEGER REFERENCES symbols(id));
		 CREATE TABLE fields(
			id INTEGER PRIMARY KEY, symbol INTEGER NOT NULL REFERENCES symbols(id),
			name TEXT NOT NULL, byte_offset INTEGER, type INTEGER REFERENCES symbols(id));",
	)
	.expect("create upstream schema");

	let module = |name: &str| {
		conn.execute("INSERT INTO modules(name) VALUES (?1)", [name])
			.expect("insert module");
		conn.last_insert_rowid()
	};
	let symbol = |name: &str, size: i64, target: Option<i64>| {
		conn.execute(
			"INSERT INTO symbols(name, byte_size, target_symbol) VALUES (?1, ?2, ?3)",
			params![name, size, target],
		)
		.expect("insert symbol");
		conn.last_insert_rowid()
	};
	let field = |owner: i64, name: &str, offset: i64, ty: i64| {
		conn.execute(
			"INSERT INTO fields(symbol, name, byte_offset, type) VALUES (?1, ?2, ?3, ?4)",
			params![owner, name, offset, ty],
		)
		.expect("insert field");
		conn.last_insert_rowid()
	};

	module("cfs");
	let nav_module = module("nav");
	let u8_t = symbol("uint8", 1, None);
	let mode_union = symbol("MODE_UNION_T", 1, None);
	let mode_t = symbol("MODE_T", 1, Some(mode_union));
	let nav_status = symbol("NAV_STATUS_T", 2, None);
	field(nav_status, "state", 0, u8_t);
	let mode_field = field(nav_status, "mode", 1, mode_t);
	let safe_mode_field = field(mode_union, "safe_mode", 0, u8_t);
	let science_field = field(mode_union, "science", 0, u8_t);
	let reset_cmd = symbol("NAV_RESET_CMD_T", 2, None);
	field(reset_cmd, "hdr", 0, u8_t);
	field(reset_cmd, "target", 1, mode_t);

	Seeded {
		nav_module,
		nav_status,
		mode_field,
		safe_mode_field,
		science_field,
		reset_cmd,
	}
}

/// Write `yaml` next to the database and return its path.
pub fn write_document(dir: &Path, yaml: &str) -> PathBuf {
	let path = dir.join("modules.yaml");
	std::fs::write(&path, yaml).expect("write document");
	path
}

/// Row count of `table`, or `None` when the table does not exist.
#[allow(dead_code)]
pub fn count_rows(path: &Path, table: &str) -> Option<i64> {
	let conn = Connection::open(path).expect("open sqlite");
	let exists: i64 = conn
		.query_row(
			"SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
			[table],
			|r| r.get(0),
		)
		.expect("query sqlite_master");
	if exists == 0 {
		return None;
	}
	Some(
		conn.query_row(&format!("SELECT count(*) FROM {}", table), [], |r| r.get(0))
			.expect("count rows"),
	)
}
