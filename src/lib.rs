pub mod config;
pub mod document;
pub mod error;
pub mod merge;
pub mod observability;
pub mod resolve;
pub mod store;
pub mod walk;

#[cfg(test)]
mod test_utils;

use anyhow::{Context, anyhow};

pub use error::{MergeError, ResolveError, StoreError, ValidationError};
pub use merge::{MergeOptions, merge_all, merge_document};
pub use walk::MergeReport;

/// Runs one merge as described by `settings`.
///
/// Fatal merge failures keep their `MergeError` inside the returned
/// `anyhow::Error`, so callers can `downcast_ref` it for an exit status.
pub fn run(settings: &config::Settings) -> anyhow::Result<MergeReport> {
	let database = settings
		.database
		.as_ref()
		.ok_or_else(|| anyhow!("no database given; pass --sqlite-path or set UMAP_DATABASE"))?;
	let document = settings
		.document
		.as_ref()
		.ok_or_else(|| anyhow!("no document given; pass --yaml-path or set UMAP_DOCUMENT"))?;

	let report = merge_all(database, document, &settings.merge_options()).with_context(|| {
		format!(
			"merging {} into {} failed",
			document.display(),
			database.display()
		)
	})?;
	Ok(report)
}
