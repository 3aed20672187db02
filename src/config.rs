use crate::colors::{colors_enabled, lookup, ColorTable, Style};
use crate::error::{PaintError, Result};
use crate::formatter::{ColoredFormatter, FormatterOptions, StyleMode, DEFAULT_FORMAT};
use crate::level::Level;
use crate::rules::{RuleUpdate, StylePair};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a style is written in a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleSpec {
    /// `["\u001b[32m", "\u001b[0m"]`
    Pair(String, String),
    /// A lone prefix, closed by reset-all
    Prefix(String),
    /// `{fg: red, bg: black, style: bright}`
    Named {
        fg: Option<String>,
        bg: Option<String>,
        style: Option<String>,
    },
}

impl StyleSpec {
    /// Turn the style into tokens. Named colors resolve to nothing when
    /// `use_colors` is false, literal tokens are kept as written.
    pub fn resolve(&self, use_colors: bool) -> Result<StylePair> {
        match self {
            StyleSpec::Pair(prefix, suffix) => Ok(StylePair::new(prefix.as_str(), suffix.as_str())),
            StyleSpec::Prefix(prefix) => Ok(StylePair::with_reset(prefix.as_str())),
            StyleSpec::Named { fg, bg, style } => {
                let mut prefix = String::new();
                for (table, name) in [
                    (ColorTable::Style, style),
                    (ColorTable::Fore, fg),
                    (ColorTable::Back, bg),
                ] {
                    if let Some(name) = name {
                        let code = lookup(table, name).ok_or_else(|| {
                            PaintError::Config(format!("Unknown {:?} color '{}'", table, name))
                        })?;
                        prefix.push_str(code);
                    }
                }

                if !use_colors || prefix.is_empty() {
                    return Ok(StylePair::default());
                }
                Ok(StylePair::new(prefix, Style::RESET_ALL))
            }
        }
    }
}

/// Formatter settings as read from YAML or JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    pub format: Option<String>,
    pub datefmt: Option<String>,
    pub mode: StyleMode,
    pub markup: bool,
    /// Level name -> field name (or `FULL`) -> style
    pub levels: IndexMap<String, IndexMap<String, StyleSpec>>,
}

impl FormatterConfig {
    /// Load from a file; `.json` is parsed as JSON, everything else as YAML
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Resolve the per-level styles into rule updates
    pub fn rule_updates(&self, use_colors: bool) -> Result<Vec<(Level, RuleUpdate)>> {
        self.levels
            .iter()
            .map(|(level, fields)| -> Result<(Level, RuleUpdate)> {
                let level: Level = level.parse()?;
                let mut update = RuleUpdate::new();
                for (field, spec) in fields {
                    update = update.field(field, spec.resolve(use_colors)?);
                }
                Ok((level, update))
            })
            .collect()
    }

    /// Build a formatter, resolving named colors against the process color switch
    pub fn build(&self) -> Result<ColoredFormatter> {
        self.build_with(colors_enabled(), false)
    }

    pub fn build_with(&self, use_colors: bool, debug: bool) -> Result<ColoredFormatter> {
        let options = FormatterOptions {
            date_format: self.datefmt.clone(),
            mode: self.mode,
            markup: self.markup,
            debug,
        };
        let template = self.format.as_deref().unwrap_or(DEFAULT_FORMAT);
        let mut formatter = ColoredFormatter::with_options(template, options);
        for (level, update) in self.rule_updates(use_colors)? {
            formatter.update(level, &update);
        }
        Ok(formatter)
    }
}
