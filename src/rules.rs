use crate::colors::{Palette, Style};
use crate::error::PaintError;
use crate::level::Level;
use indexmap::IndexMap;

/// Key of the whole-message rule
pub const FULL: &str = "FULL";

/// Record attributes every rule set starts out with
pub const FIELD_NAMES: [&str; 17] = [
    "asctime",
    "created",
    "filename",
    "funcName",
    "levelname",
    "levelno",
    "lineno",
    "module",
    "msecs",
    "message",
    "name",
    "pathname",
    "process",
    "processName",
    "relativeCreated",
    "thread",
    "threadName",
];

/// Style tokens placed before and after a field (or the whole line)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StylePair {
    pub prefix: String,
    pub suffix: String,
}

impl StylePair {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// A lone prefix, closed by the reset-all sequence
    pub fn with_reset(prefix: impl Into<String>) -> Self {
        Self::new(prefix, Style::RESET_ALL)
    }

    /// True when neither side carries any styling
    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty() && self.suffix.is_empty()
    }
}

impl<P: Into<String>, S: Into<String>> From<(P, S)> for StylePair {
    fn from((prefix, suffix): (P, S)) -> Self {
        StylePair::new(prefix, suffix)
    }
}

impl From<&str> for StylePair {
    fn from(prefix: &str) -> Self {
        StylePair::with_reset(prefix)
    }
}

impl From<String> for StylePair {
    fn from(prefix: String) -> Self {
        StylePair::with_reset(prefix)
    }
}

/// Field rules for a single level, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: IndexMap<String, StylePair>,
}

impl RuleSet {
    /// Every known field mapped to the empty pair
    pub fn neutral() -> Self {
        let rules = FIELD_NAMES
            .iter()
            .map(|name| (name.to_string(), StylePair::default()))
            .collect();
        Self { rules }
    }

    pub fn get(&self, field: &str) -> Option<&StylePair> {
        self.rules.get(field)
    }

    pub fn set(&mut self, field: &str, pair: impl Into<StylePair>) {
        self.rules.insert(field.to_string(), pair.into());
    }

    /// The whole-message pair, if one is set and not empty
    pub fn whole_message(&self) -> Option<&StylePair> {
        self.rules.get(FULL).filter(|pair| !pair.is_empty())
    }

    /// Field rules that actually style something, excluding `FULL`
    pub fn active_fields(&self) -> impl Iterator<Item = (&str, &StylePair)> {
        self.rules
            .iter()
            .filter(|(field, pair)| field.as_str() != FULL && !pair.is_empty())
            .map(|(field, pair)| (field.as_str(), pair))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StylePair)> {
        self.rules.iter().map(|(field, pair)| (field.as_str(), pair))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// A batch of field updates for one level, built like keyword arguments:
/// `RuleUpdate::new().field("message", Fore::RED).full((Fore::GREEN, Style::RESET_ALL))`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleUpdate {
    entries: Vec<(String, StylePair)>,
}

impl RuleUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, pair: impl Into<StylePair>) -> Self {
        self.entries.push((name.to_string(), pair.into()));
        self
    }

    pub fn full(self, pair: impl Into<StylePair>) -> Self {
        self.field(FULL, pair)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StylePair)> {
        self.entries.iter().map(|(name, pair)| (name.as_str(), pair))
    }
}

impl<K: AsRef<str>, V: Into<StylePair>> FromIterator<(K, V)> for RuleUpdate {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(RuleUpdate::new(), |update, (k, v)| update.field(k.as_ref(), v))
    }
}

/// Per-level rule sets owned by one formatter.
///
/// Not synchronized: `update` needs `&mut self`, so sharing a store between
/// threads that format and threads that reconfigure is the caller's job.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleStore {
    levels: [RuleSet; 5],
}

impl RuleStore {
    /// Neutral rule sets for every level
    pub fn neutral() -> Self {
        Self {
            levels: std::array::from_fn(|_| RuleSet::neutral()),
        }
    }

    /// Neutral rule sets with the `levelname` field colored per level.
    /// With a disabled palette the defaults are empty and style nothing.
    pub fn new(palette: &Palette) -> Self {
        let mut store = Self::neutral();
        for level in Level::ALL {
            let color = match level {
                Level::Debug => palette.debug,
                Level::Info => palette.info,
                Level::Warning => palette.warning,
                Level::Error => palette.error,
                Level::Critical => palette.critical,
            };
            store.levels[level.index()].set("levelname", StylePair::new(color, palette.reset));
        }
        store
    }

    pub fn get(&self, level: Level) -> &RuleSet {
        &self.levels[level.index()]
    }

    /// Look up by rank or name, failing with `InvalidLevel` for anything else
    pub fn get_by_name(&self, level: &str) -> Result<&RuleSet, PaintError> {
        let level: Level = level.parse()?;
        Ok(self.get(level))
    }

    /// Insert or replace field rules. Unknown field names are stored as is.
    pub fn update(&mut self, level: Level, updates: &RuleUpdate) {
        let rules = &mut self.levels[level.index()];
        for (field, pair) in updates.iter() {
            rules.set(field, pair.clone());
        }
    }

    pub fn update_by_name(&mut self, level: &str, updates: &RuleUpdate) -> Result<(), PaintError> {
        let level: Level = level.parse()?;
        self.update(level, updates);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Level, &RuleSet)> {
        Level::ALL.into_iter().map(move |level| (level, self.get(level)))
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        RuleStore::new(&Palette::active())
    }
}
