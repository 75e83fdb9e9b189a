use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

/// Initialize colored, timestamped logging to stderr.
///
/// Stdout is left alone so the CLI can print its JSON report there.
pub fn init_logging(level: LevelFilter) -> anyhow::Result<()> {
	let colors = ColoredLevelConfig::new()
		.error(Color::Red)
		.warn(Color::Yellow)
		.info(Color::Green)
		.debug(Color::Cyan)
		.trace(Color::BrightBlack);

	fern::Dispatch::new()
		.format(move |out, message, record| {
			out.finish(format_args!(
				"{} {:<5} [{}] {}",
				chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
				colors.color(record.level()),
				record.target(),
				message
			))
		})
		.level(level)
		.chain(std::io::stderr())
		.apply()
		.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

	Ok(())
}

#[cfg(test)]
#[cfg(feature = "unit-tests")]
mod tests {
	use log::LevelFilter;

	#[test]
	fn logging_initializes_once() {
		// A logger can only be installed once per process; whichever call
		// comes second must fail cleanly rather than panic.
		let _ = super::init_logging(LevelFilter::Debug);
		assert!(super::init_logging(LevelFilter::Debug).is_err());
	}
}
