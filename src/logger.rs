//! A `log` backend that writes every record through a [`ColoredFormatter`].
use crate::formatter::ColoredFormatter;
use crate::level::Level;
use crate::record::Record;
use crate::rules::RuleUpdate;
use log::{LevelFilter, Log, Metadata, SetLoggerError};
use parking_lot::RwLock;
use std::io::{self, Write};

/// Stream the logger writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Stdout,
    Stderr,
}

/// Serializes rule changes against formatting: `log` takes the read side,
/// `update` the write side.
pub struct PaintLogger {
    formatter: RwLock<ColoredFormatter>,
    filter: LevelFilter,
    target: Target,
}

impl PaintLogger {
    pub fn new(formatter: ColoredFormatter) -> Self {
        Self {
            formatter: RwLock::new(formatter),
            filter: LevelFilter::Trace,
            target: Target::Stderr,
        }
    }

    pub fn with_filter(mut self, filter: LevelFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Install as the global `log` backend
    pub fn init(self) -> Result<&'static PaintLogger, SetLoggerError> {
        let filter = self.filter;
        let logger: &'static PaintLogger = Box::leak(Box::new(self));
        log::set_logger(logger)?;
        log::set_max_level(filter);
        Ok(logger)
    }

    pub fn update(&self, level: Level, updates: &RuleUpdate) {
        self.formatter.write().update(level, updates);
    }

    pub fn set_level_color(&self, level: Level, token: &str) {
        self.formatter.write().set_level_color(level, token);
    }

    /// Render a record the way `log` would write it, without the newline
    pub fn render(&self, record: &log::Record<'_>) -> String {
        let converted = Record::from_log(record);
        match self.formatter.read().format(&converted) {
            Ok(line) => line,
            // Never lose the message because the template is broken
            Err(e) => format!(
                "{}:{}:{} (format error: {})",
                converted.level, converted.name, converted.message, e
            ),
        }
    }

    fn write_line<W: Write>(&self, mut out: W, line: &str) {
        let _ = writeln!(out, "{}", line);
    }
}

impl Log for PaintLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.render(record);
        match self.target {
            Target::Stdout => self.write_line(io::stdout().lock(), &line),
            Target::Stderr => self.write_line(io::stderr().lock(), &line),
        }
    }

    fn flush(&self) {
        let _ = match self.target {
            Target::Stdout => io::stdout().flush(),
            Target::Stderr => io::stderr().flush(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_record<'a>(level: log::Level, args: std::fmt::Arguments<'a>) -> log::Record<'a> {
        log::Record::builder()
            .level(level)
            .target("app::db")
            .args(args)
            .file(Some("src/db.rs"))
            .line(Some(12))
            .module_path(Some("app::db"))
            .build()
    }

    #[test]
    fn test_render_uses_formatter() {
        let logger = PaintLogger::new(ColoredFormatter::new(
            "%(levelname)s %(name)s %(filename)s:%(lineno)d %(message)s",
        ));
        let line = logger.render(&log_record(log::Level::Warn, format_args!("disk at {}%", 91)));
        assert_eq!(line, "WARNING app::db db.rs:12 disk at 91%");
    }

    #[test]
    fn test_update_through_lock() {
        let logger = PaintLogger::new(ColoredFormatter::new("%(levelname)s"));
        logger.update(Level::Error, &RuleUpdate::new().field("levelname", ("<", ">")));
        let line = logger.render(&log_record(log::Level::Error, format_args!("x")));
        assert_eq!(line, "<ERROR>");

        logger.set_level_color(Level::Debug, "D");
        let line = logger.render(&log_record(log::Level::Trace, format_args!("x")));
        assert!(line.starts_with("DDEBUG"));
    }

    #[test]
    fn test_broken_template_falls_back() {
        let logger = PaintLogger::new(ColoredFormatter::new("%(missing)s"));
        let line = logger.render(&log_record(log::Level::Info, format_args!("hello")));
        assert!(line.starts_with("INFO:app::db:hello"));
        assert!(line.contains("format error"));
    }

    #[test]
    fn test_filter() {
        let logger = PaintLogger::new(ColoredFormatter::default()).with_filter(LevelFilter::Warn);
        let info = Metadata::builder().level(log::Level::Info).build();
        let error = Metadata::builder().level(log::Level::Error).build();
        assert!(!logger.enabled(&info));
        assert!(logger.enabled(&error));
    }
}
