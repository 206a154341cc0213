use log::{Level, LevelFilter, Log, Metadata, Record};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
	fn enabled(&self, metadata: &Metadata<'_>) -> bool {
		metadata.level() <= log::max_level()
	}

	fn log(&self, record: &Record<'_>) {
		if !self.enabled(record.metadata()) {
			return;
		}
		eprintln!("[{}] {}: {}", level_label(record.level()), record.target(), record.args());
	}

	fn flush(&self) {}
}

/// Install the stderr logger; `-v` steps through info, debug, and trace.
pub(crate) fn init(verbosity: u8) {
	if log::set_logger(&LOGGER).is_ok() {
		log::set_max_level(level_filter(verbosity));
	}
}

fn level_filter(verbosity: u8) -> LevelFilter {
	match verbosity {
		0 => LevelFilter::Warn,
		1 => LevelFilter::Info,
		2 => LevelFilter::Debug,
		_ => LevelFilter::Trace,
	}
}

fn level_label(level: Level) -> &'static str {
	match level {
		Level::Error => "error",
		Level::Warn => "warn",
		Level::Info => "info",
		Level::Debug => "debug",
		Level::Trace => "trace",
	}
}

#[cfg(test)]
mod tests {
	use log::LevelFilter;

	use super::level_filter;

	#[test]
	fn verbosity_raises_level() {
		assert_eq!(level_filter(0), LevelFilter::Warn);
		assert_eq!(level_filter(1), LevelFilter::Info);
		assert_eq!(level_filter(2), LevelFilter::Debug);
		assert_eq!(level_filter(7), LevelFilter::Trace);
	}
}
