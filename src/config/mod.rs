use std::path::PathBuf;

use log::Level;
use serde::Deserialize;
use thiserror::Error;

use crate::merge::MergeOptions;

/// Runtime configuration for union-mapper.
///
/// Values are loaded from (in order): `/etc/union-mapper/union-mapper.json`,
/// the same file under the user config folders (all optional), and
/// environment variables prefixed with `UMAP_` (e.g. `UMAP_MODULE_PATH`).
/// Command line flags override whatever is loaded here.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct Settings {
	/// SQLite metadata database to merge into
	pub database: Option<PathBuf>,
	/// YAML module document to merge from
	pub document: Option<PathBuf>,
	/// Module subtree to merge; `/` is the whole document
	pub module_path: String,
	pub log_level: Level,
	pub max_module_depth: usize,
	pub dry_run: bool,
}

impl Default for Settings {
	fn default() -> Self {
		let merge = MergeOptions::default();
		Self {
			database: None,
			document: None,
			module_path: merge.module_path,
			log_level: Level::Info,
			max_module_depth: merge.max_module_depth,
			dry_run: merge.dry_run,
		}
	}
}

impl Settings {
	pub fn merge_options(&self) -> MergeOptions {
		MergeOptions {
			module_path: self.module_path.clone(),
			max_module_depth: self.max_module_depth,
			dry_run: self.dry_run,
		}
	}
}

#[derive(Debug, Error)]
pub enum SettingsError {
	#[error("configuration error: {0}")]
	Config(#[from] config::ConfigError),
}

const CONFIG_FILE: &str = "union-mapper.json";

pub fn load() -> Result<Settings, SettingsError> {
	let mut builder = config::Config::builder().add_source(
		config::File::with_name("/etc/union-mapper/union-mapper.json").required(false),
	);

	if let Some(folder) = dirs::config_dir() {
		let user_config_path = folder.join("union-mapper").join(CONFIG_FILE);
		builder = builder.add_source(config::File::from(user_config_path).required(false));
	}
	if let Some(folder) = dirs::config_local_dir() {
		let local_config_path = folder.join("union-mapper").join(CONFIG_FILE);
		builder = builder.add_source(config::File::from(local_config_path).required(false));
	}

	builder = builder.add_source(config::Environment::with_prefix("UMAP").separator("__"));

	let cfg = builder.build()?;

	let mut s: Settings = cfg.try_deserialize()?;

	// Read the individual variables directly as well; the `config` crate's
	// key mapping does not always pick up underscored names.
	if let Ok(db) = std::env::var("UMAP_DATABASE") {
		if !db.is_empty() {
			s.database = Some(PathBuf::from(db));
		}
	}
	if let Ok(doc) = std::env::var("UMAP_DOCUMENT") {
		if !doc.is_empty() {
			s.document = Some(PathBuf::from(doc));
		}
	}
	if let Ok(p) = std::env::var("UMAP_MODULE_PATH") {
		if !p.is_empty() {
			s.module_path = p;
		}
	}
	if let Ok(d) = std::env::var("UMAP_MAX_MODULE_DEPTH") {
		if let Ok(parsed) = d.parse::<usize>() {
			s.max_module_depth = parsed;
		}
	}
	if let Ok(d) = std::env::var("UMAP_DRY_RUN") {
		if let Ok(parsed) = d.parse::<bool>() {
			s.dry_run = parsed;
		}
	}
	if let Ok(l) = std::env::var("UMAP_LOG_LEVEL") {
		if !l.is_empty() {
			if let Ok(parsed) = l.parse::<Level>() {
				s.log_level = parsed;
			}
		}
	}

	Ok(s)
}
