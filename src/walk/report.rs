use serde::Serialize;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
	/// The declaration was kept with a substituted value.
	Warning,
	/// The declaration (or its union selection) was skipped.
	Error,
}

/// One finding about a declaration, addressed by its dotted document path
/// (e.g. `modules.nav.telemetry.NavStatus.msgID`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
	pub severity: Severity,
	pub path: String,
	pub message: String,
}

/// Rows written versus rows already present for one output table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
	pub inserted: usize,
	pub existing: usize,
}

impl Tally {
	pub fn record(&mut self, inserted: bool) {
		if inserted {
			self.inserted += 1;
		} else {
			self.existing += 1;
		}
	}
}

/// Outcome of a merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
	pub modules_visited: usize,
	pub telemetry: Tally,
	pub commands: Tally,
	pub union_selections: Tally,
	pub diagnostics: Vec<Diagnostic>,
	pub committed: bool,
}

impl MergeReport {
	pub fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
		let path = path.into();
		let message = message.into();
		log::warn!("{}: {}", path, message);
		self.diagnostics.push(Diagnostic {
			severity: Severity::Warning,
			path,
			message,
		});
	}

	pub fn invalid(&mut self, path: impl Into<String>, error: ValidationError) {
		let path = path.into();
		log::error!("{}: {}. Skipping.", path, error);
		self.diagnostics.push(Diagnostic {
			severity: Severity::Error,
			path,
			message: error.to_string(),
		});
	}

	pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
		self.diagnostics
			.iter()
			.filter(|d| d.severity == Severity::Warning)
	}

	pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
		self.diagnostics
			.iter()
			.filter(|d| d.severity == Severity::Error)
	}
}
