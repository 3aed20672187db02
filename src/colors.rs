//! ANSI escape-code tables and the process-wide terminal color switch.
//!
//! The formatter itself treats style tokens as opaque strings; this module is
//! only where the usual tokens come from.
use is_terminal::IsTerminal;
use once_cell::sync::OnceCell;

/// Foreground colors
pub struct Fore;

impl Fore {
    pub const BLACK: &'static str = "\x1b[30m";
    pub const RED: &'static str = "\x1b[31m";
    pub const GREEN: &'static str = "\x1b[32m";
    pub const YELLOW: &'static str = "\x1b[33m";
    pub const BLUE: &'static str = "\x1b[34m";
    pub const MAGENTA: &'static str = "\x1b[35m";
    pub const CYAN: &'static str = "\x1b[36m";
    pub const WHITE: &'static str = "\x1b[37m";
    pub const RESET: &'static str = "\x1b[39m";

    pub const BRIGHT_BLACK: &'static str = "\x1b[90m";
    pub const BRIGHT_RED: &'static str = "\x1b[91m";
    pub const BRIGHT_GREEN: &'static str = "\x1b[92m";
    pub const BRIGHT_YELLOW: &'static str = "\x1b[93m";
    pub const BRIGHT_BLUE: &'static str = "\x1b[94m";
    pub const BRIGHT_MAGENTA: &'static str = "\x1b[95m";
    pub const BRIGHT_CYAN: &'static str = "\x1b[96m";
    pub const BRIGHT_WHITE: &'static str = "\x1b[97m";
}

/// Background colors
pub struct Back;

impl Back {
    pub const BLACK: &'static str = "\x1b[40m";
    pub const RED: &'static str = "\x1b[41m";
    pub const GREEN: &'static str = "\x1b[42m";
    pub const YELLOW: &'static str = "\x1b[43m";
    pub const BLUE: &'static str = "\x1b[44m";
    pub const MAGENTA: &'static str = "\x1b[45m";
    pub const CYAN: &'static str = "\x1b[46m";
    pub const WHITE: &'static str = "\x1b[47m";
    pub const RESET: &'static str = "\x1b[49m";

    pub const BRIGHT_BLACK: &'static str = "\x1b[100m";
    pub const BRIGHT_RED: &'static str = "\x1b[101m";
    pub const BRIGHT_GREEN: &'static str = "\x1b[102m";
    pub const BRIGHT_YELLOW: &'static str = "\x1b[103m";
    pub const BRIGHT_BLUE: &'static str = "\x1b[104m";
    pub const BRIGHT_MAGENTA: &'static str = "\x1b[105m";
    pub const BRIGHT_CYAN: &'static str = "\x1b[106m";
    pub const BRIGHT_WHITE: &'static str = "\x1b[107m";
}

/// Text style modifiers
pub struct Style;

impl Style {
    pub const BRIGHT: &'static str = "\x1b[1m";
    pub const DIM: &'static str = "\x1b[2m";
    pub const ITALIC: &'static str = "\x1b[3m";
    pub const UNDERLINE: &'static str = "\x1b[4m";
    pub const NORMAL: &'static str = "\x1b[22m";
    pub const RESET_ALL: &'static str = "\x1b[0m";
}

/// Which table a symbolic color name is looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTable {
    Fore,
    Back,
    Style,
}

/// Resolve a symbolic name ("red", "bright_blue", "dim", ...) to its escape code
pub fn lookup(table: ColorTable, name: &str) -> Option<&'static str> {
    let key = name.trim().to_lowercase().replace(['-', ' '], "_");

    match table {
        ColorTable::Style => match key.as_str() {
            "bright" | "bold" => Some(Style::BRIGHT),
            "dim" => Some(Style::DIM),
            "italic" => Some(Style::ITALIC),
            "underline" => Some(Style::UNDERLINE),
            "normal" => Some(Style::NORMAL),
            "reset" | "reset_all" => Some(Style::RESET_ALL),
            _ => None,
        },
        ColorTable::Fore => color_code(&key, true),
        ColorTable::Back => color_code(&key, false),
    }
}

const COLOR_NAMES: [&str; 8] = [
    "black",
    "red",
    "green",
    "yellow",
    "blue",
    "magenta",
    "cyan",
    "white",
];

const FORE_CODES: [&str; 8] = [
    Fore::BLACK,
    Fore::RED,
    Fore::GREEN,
    Fore::YELLOW,
    Fore::BLUE,
    Fore::MAGENTA,
    Fore::CYAN,
    Fore::WHITE,
];
const FORE_BRIGHT_CODES: [&str; 8] = [
    Fore::BRIGHT_BLACK,
    Fore::BRIGHT_RED,
    Fore::BRIGHT_GREEN,
    Fore::BRIGHT_YELLOW,
    Fore::BRIGHT_BLUE,
    Fore::BRIGHT_MAGENTA,
    Fore::BRIGHT_CYAN,
    Fore::BRIGHT_WHITE,
];
const BACK_CODES: [&str; 8] = [
    Back::BLACK,
    Back::RED,
    Back::GREEN,
    Back::YELLOW,
    Back::BLUE,
    Back::MAGENTA,
    Back::CYAN,
    Back::WHITE,
];
const BACK_BRIGHT_CODES: [&str; 8] = [
    Back::BRIGHT_BLACK,
    Back::BRIGHT_RED,
    Back::BRIGHT_GREEN,
    Back::BRIGHT_YELLOW,
    Back::BRIGHT_BLUE,
    Back::BRIGHT_MAGENTA,
    Back::BRIGHT_CYAN,
    Back::BRIGHT_WHITE,
];

fn color_code(key: &str, fore: bool) -> Option<&'static str> {
    if key == "reset" {
        return Some(if fore { Fore::RESET } else { Back::RESET });
    }
    let (bright, color) = match key.strip_prefix("bright_") {
        Some(rest) => (true, rest),
        None => (false, key),
    };
    let index = COLOR_NAMES.iter().position(|name| *name == color)?;
    let codes = match (fore, bright) {
        (true, false) => &FORE_CODES,
        (true, true) => &FORE_BRIGHT_CODES,
        (false, false) => &BACK_CODES,
        (false, true) => &BACK_BRIGHT_CODES,
    };
    Some(codes[index])
}

/// Escape codes used for default rules and markup tags
#[derive(Debug, Clone)]
pub struct Palette {
    pub debug: &'static str,    // Cyan
    pub info: &'static str,     // Green
    pub warning: &'static str,  // Yellow
    pub error: &'static str,    // Red
    pub critical: &'static str, // Bright red
    pub dim: &'static str,
    pub reset_fore: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn new(use_colors: bool) -> Self {
        if use_colors {
            Self {
                debug: Fore::CYAN,
                info: Fore::GREEN,
                warning: Fore::YELLOW,
                error: Fore::RED,
                critical: Fore::BRIGHT_RED,
                dim: Style::DIM,
                reset_fore: Fore::RESET,
                reset: Style::RESET_ALL,
            }
        } else {
            // All empty strings for no-color mode
            Self {
                debug: "",
                info: "",
                warning: "",
                error: "",
                critical: "",
                dim: "",
                reset_fore: "",
                reset: "",
            }
        }
    }

    /// Palette matching the process-wide color switch
    pub fn active() -> Self {
        Palette::new(colors_enabled())
    }
}

static COLORS_ENABLED: OnceCell<bool> = OnceCell::new();

/// Decide once per process whether escape codes should be emitted.
///
/// `preference` forces the decision (`--color` / `--no-color`); `None` checks
/// `NO_COLOR`, `FORCE_COLOR` and whether stderr is a terminal. Later calls
/// return the first decision unchanged.
pub fn init_terminal_colors(preference: Option<bool>) -> bool {
    init_terminal_colors_for(preference, std::io::stderr().is_terminal())
}

/// Same as `init_terminal_colors` for output that does not go to stderr
pub fn init_terminal_colors_for(preference: Option<bool>, is_terminal: bool) -> bool {
    *COLORS_ENABLED.get_or_init(|| should_use_colors(preference, is_terminal))
}

/// Whether `init_terminal_colors` enabled colors. False until it is called.
pub fn colors_enabled() -> bool {
    COLORS_ENABLED.get().copied().unwrap_or(false)
}

pub fn should_use_colors(preference: Option<bool>, is_terminal: bool) -> bool {
    if let Some(forced) = preference {
        return forced;
    }
    if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some_and(|v| !v.is_empty() && v != "0") {
        return true;
    }
    is_terminal
}
