use std::borrow::Cow;
use std::path::Path;

use rusqlite::Connection;

use crate::document::Document;
use crate::error::MergeError;
use crate::store::SqliteStore;
use crate::store::schema::ensure_tables;
use crate::walk::{MergeReport, TreeWalker};

/// Knobs for a single merge run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
	/// Slash-separated module path selecting the subtree to merge; `/` is
	/// the whole document.
	pub module_path: String,
	pub max_module_depth: usize,
	/// Walk and report, then roll back instead of committing.
	pub dry_run: bool,
}

impl Default for MergeOptions {
	fn default() -> Self {
		Self {
			module_path: "/".to_string(),
			max_module_depth: 64,
			dry_run: false,
		}
	}
}

/// Merges the document at `document_path` into the database at
/// `database_path` as one transaction.
pub fn merge_all(
	database_path: impl AsRef<Path>,
	document_path: impl AsRef<Path>,
	options: &MergeOptions,
) -> Result<MergeReport, MergeError> {
	let mut conn = Connection::open(database_path.as_ref())?;
	log::info!("opened database {}", database_path.as_ref().display());

	merge_with(&mut conn, options, || {
		Document::from_path(document_path.as_ref()).map(Cow::Owned)
	})
}

/// Merges an already loaded document into `conn`.
pub fn merge_document(
	conn: &mut Connection,
	document: &Document,
	options: &MergeOptions,
) -> Result<MergeReport, MergeError> {
	merge_with(conn, options, || Ok(Cow::Borrowed(document)))
}

/// Schema, load, select, walk, commit. Every write happens inside one
/// transaction; an error anywhere drops it, which rolls everything back.
fn merge_with<'d, F>(
	conn: &mut Connection,
	options: &MergeOptions,
	load: F,
) -> Result<MergeReport, MergeError>
where
	F: FnOnce() -> Result<Cow<'d, Document>, MergeError>,
{
	conn.pragma_update(None, "foreign_keys", true)?;
	let tx = conn.transaction()?;

	ensure_tables(&tx)?;
	let document = load()?;
	let roots = document.select_subtree(&options.module_path)?;
	log::info!(
		"merging {} module(s) under '{}'",
		roots.modules.len(),
		options.module_path
	);

	let store = SqliteStore::new(&tx);
	let mut report = TreeWalker::new(&store, options.max_module_depth)?.walk(roots)?;

	if options.dry_run {
		tx.rollback()?;
		log::info!("dry run: changes rolled back");
	} else {
		tx.commit()?;
		report.committed = true;
		log::info!("changes committed");
	}
	Ok(report)
}
