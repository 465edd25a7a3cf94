use crate::diagnostics::Level;

/// Maps a diagnostics threshold onto the `log` filter.
pub fn level_filter(level: Level) -> log::LevelFilter {
    match level {
        Level::Verbose => log::LevelFilter::Trace,
        Level::Info => log::LevelFilter::Info,
        Level::Warning => log::LevelFilter::Warn,
        Level::Error => log::LevelFilter::Error,
        Level::None => log::LevelFilter::Off,
    }
}

pub fn init_logger(level: Level) {
    env_logger::Builder::new()
        .filter_level(level_filter(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        assert_eq!(level_filter(Level::Verbose), log::LevelFilter::Trace);
        assert_eq!(level_filter(Level::Warning), log::LevelFilter::Warn);
        assert_eq!(level_filter(Level::None), log::LevelFilter::Off);
    }
}
