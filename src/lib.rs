// src/lib.rs
pub mod colors;
pub mod config;
pub mod error;
pub mod formatter;
pub mod interpolate;
pub mod level;
pub mod logger;
pub mod placeholder;
pub mod record;
pub mod rewrite;
pub mod rules;

pub use error::*;

pub use colors::{init_terminal_colors, Back, Fore, Style};
pub use config::{FormatterConfig, StyleSpec};
pub use formatter::{ColoredFormatter, FormatterOptions, StyleMode, DEFAULT_FORMAT};
pub use level::Level;
pub use logger::{PaintLogger, Target};
pub use placeholder::{locate, Span};
pub use record::{FieldValue, LogRecord, Record};
pub use rewrite::rewrite;
pub use rules::{RuleSet, RuleStore, RuleUpdate, StylePair, FULL};
