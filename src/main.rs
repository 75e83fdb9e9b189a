use std::path::PathBuf;

use clap::Parser;
use log::Level;
use union_mapper::{MergeError, config, observability, run};

#[derive(Parser)]
#[command(
	name = "union-mapper",
	about = "union-mapper - merge telemetry and command definitions into a symbol database"
)]
struct Cli {
	/// YAML file with telemetry and command metadata
	#[arg(long = "yaml-path", visible_alias = "document", alias = "yaml_path")]
	yaml_path: Option<PathBuf>,
	/// SQLite database holding the extracted symbols
	#[arg(long = "sqlite-path", visible_alias = "database", alias = "sqlite_path")]
	sqlite_path: Option<PathBuf>,
	/// Module subtree to merge, e.g. `/` or `/cfs/nav`
	#[arg(long)]
	module_path: Option<String>,
	#[arg(long)]
	log_level: Option<Level>,
	/// Walk and report without committing
	#[arg(long)]
	dry_run: bool,
	/// Print the merge report as JSON on stdout
	#[arg(long)]
	json: bool,
}

impl Cli {
	fn apply(&self, settings: &mut config::Settings) {
		if let Some(p) = &self.yaml_path {
			settings.document = Some(p.clone());
		}
		if let Some(p) = &self.sqlite_path {
			settings.database = Some(p.clone());
		}
		if let Some(p) = &self.module_path {
			settings.module_path = p.clone();
		}
		if let Some(l) = self.log_level {
			settings.log_level = l;
		}
		if self.dry_run {
			settings.dry_run = true;
		}
	}
}

fn main() {
	let cli = Cli::parse();

	let mut settings = match config::load() {
		Ok(s) => s,
		Err(e) => {
			eprintln!("failed to load config, using defaults: {}", e);
			config::Settings::default()
		}
	};
	cli.apply(&mut settings);

	if let Err(e) = observability::init_logging(settings.log_level.to_level_filter()) {
		eprintln!("{}", e);
	}

	match run(&settings) {
		Ok(report) if cli.json => match serde_json::to_string_pretty(&report) {
			Ok(json) => println!("{}", json),
			Err(e) => {
				eprintln!("failed to encode report: {}", e);
				std::process::exit(1);
			}
		},
		Ok(report) => println!(
			"{} telemetry, {} command(s), {} union selection(s) inserted; {} warning(s), {} error(s){}",
			report.telemetry.inserted,
			report.commands.inserted,
			report.union_selections.inserted,
			report.warnings().count(),
			report.errors().count(),
			if report.committed { "" } else { " (not committed)" }
		),
		Err(e) => {
			log::error!("{:#}. Aborting", e);
			let code = e
				.downcast_ref::<MergeError>()
				.map(MergeError::exit_code)
				.unwrap_or(1);
			std::process::exit(code);
		}
	}
}
