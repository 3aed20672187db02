use crate::colors::Palette;
use crate::error::{Result, TemplateError};
use crate::interpolate::{interpolate, render_value};
use crate::level::Level;
use crate::placeholder::{Locator, Placeholder, Span};
use crate::record::{FieldValue, LogRecord};
use crate::rewrite::rewrite;
use crate::rules::{RuleSet, RuleStore, RuleUpdate, StylePair};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Template used when none is given
pub const DEFAULT_FORMAT: &str = "%(levelname)s:%(name)s:%(message)s";

/// Where style tokens are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StyleMode {
    /// Splice tokens into the template; widths keep working because the
    /// interpolation step pads the value itself
    #[default]
    Template,
    /// Render each styled field first, wrap the bare value and restore the
    /// declared width with spaces outside the escape codes
    Value,
}

/// Formatter behavior besides the rules themselves
#[derive(Debug, Clone, Default)]
pub struct FormatterOptions {
    pub date_format: Option<String>,
    pub mode: StyleMode,
    /// Replace `<color>`, `</color>`, `<b>` and `</b>` tags in the template.
    /// Record values are never scanned for tags.
    pub markup: bool,
    pub debug: bool,
}

/// Colors log records per severity by rewriting a `%`-style template.
///
/// Rewritten templates are cached per level and rebuilt on every rule change,
/// so `format` never edits the template it was built with.
///
/// `format` takes `&self` and `update` takes `&mut self`: sharing one formatter
/// between threads that log and threads that reconfigure needs a lock around
/// it, as `PaintLogger` does.
#[derive(Debug, Clone)]
pub struct ColoredFormatter {
    template: String,
    options: FormatterOptions,
    palette: Palette,
    rules: RuleStore,
    // Template per level after markup tags, before any style rule
    marked: [String; 5],
    compiled: [String; 5],
    // Styled placeholder spans per level, rightmost first, for `StyleMode::Value`
    value_spans: [Vec<(Span, StylePair)>; 5],
}

impl ColoredFormatter {
    pub fn new(template: &str) -> Self {
        Self::with_options(template, FormatterOptions::default())
    }

    pub fn with_date_format(template: &str, date_format: &str) -> Self {
        Self::with_options(
            template,
            FormatterOptions {
                date_format: Some(date_format.to_string()),
                ..FormatterOptions::default()
            },
        )
    }

    pub fn with_options(template: &str, options: FormatterOptions) -> Self {
        let palette = Palette::active();
        let rules = RuleStore::new(&palette);
        let mut formatter = Self {
            template: template.to_string(),
            options,
            palette,
            rules,
            marked: Default::default(),
            compiled: Default::default(),
            value_spans: Default::default(),
        };
        for level in Level::ALL {
            formatter.recompile(level);
        }
        formatter
    }

    /// Build a formatter and apply per-level overrides keyed by level name.
    /// Levels not mentioned keep their defaults.
    pub fn with_overrides<I, K>(
        template: &str,
        date_format: Option<&str>,
        overrides: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (K, RuleUpdate)>,
        K: AsRef<str>,
    {
        let options = FormatterOptions {
            date_format: date_format.map(str::to_string),
            ..FormatterOptions::default()
        };
        let mut formatter = Self::with_options(template, options);
        for (level, updates) in overrides {
            formatter.update_by_name(level.as_ref(), &updates)?;
        }
        Ok(formatter)
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn options(&self) -> &FormatterOptions {
        &self.options
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    /// Insert or replace field rules for one level
    pub fn update(&mut self, level: Level, updates: &RuleUpdate) {
        self.rules.update(level, updates);
        self.recompile(level);
    }

    pub fn update_by_name(&mut self, level: &str, updates: &RuleUpdate) -> Result<()> {
        let level: Level = level.parse()?;
        self.update(level, updates);
        Ok(())
    }

    /// Shorthand for styling only `levelname`, closed by a full reset
    pub fn set_level_color(&mut self, level: Level, token: &str) {
        self.update(level, &RuleUpdate::new().field("levelname", token));
    }

    /// The template as rewritten for `level`
    pub fn colored_template(&self, level: Level) -> &str {
        &self.compiled[level.index()]
    }

    /// Like `colored_template` but without any closing tokens
    pub fn colored_template_without_reset(&self, level: Level) -> String {
        let mut prefixes = RuleSet::default();
        for (field, pair) in self.rules.get(level).iter() {
            prefixes.set(field, StylePair::new(pair.prefix.clone(), ""));
        }
        rewrite(&self.marked[level.index()], &prefixes)
    }

    /// Render one record into a colored line
    pub fn format<R: LogRecord + ?Sized>(&self, record: &R) -> Result<String> {
        let level = record.level();
        let lookup = |name: &str| self.lookup(record, name);

        match self.options.mode {
            StyleMode::Template => Ok(interpolate(self.colored_template(level), lookup)?),
            StyleMode::Value => self.format_values(level, lookup),
        }
    }

    fn recompile(&mut self, level: Level) {
        let marked = if self.options.markup {
            self.apply_markup(level)
        } else {
            self.template.clone()
        };
        let rewritten = rewrite(&marked, self.rules.get(level));
        if self.options.debug {
            eprintln!("paintlog: {} template: {:?}", level, rewritten);
        }
        self.compiled[level.index()] = rewritten;

        let mut spans: Vec<(Span, StylePair)> = self
            .rules
            .get(level)
            .active_fields()
            .filter_map(|(field, pair)| {
                Locator::new(field)?
                    .locate(&marked)
                    .map(|span| (span, pair.clone()))
            })
            .collect();
        // Replace right to left so earlier spans keep their offsets
        spans.sort_by(|a, b| b.0.start.cmp(&a.0.start));
        self.value_spans[level.index()] = spans;
        self.marked[level.index()] = marked;
    }

    fn lookup<R: LogRecord + ?Sized>(&self, record: &R, name: &str) -> Option<FieldValue> {
        if name == "asctime" {
            let created = record.created().unwrap_or_else(Local::now);
            return Some(FieldValue::Str(self.format_time(&created)));
        }
        record.field(name)
    }

    /// Render a timestamp with the date format, or `2024-01-31 12:00:00,123`
    pub fn format_time(&self, created: &DateTime<Local>) -> String {
        match &self.options.date_format {
            Some(date_format) => created.format(date_format).to_string(),
            None => format!(
                "{},{:03}",
                created.format("%Y-%m-%d %H:%M:%S"),
                created.timestamp_subsec_millis()
            ),
        }
    }

    /// Style rendered values instead of the template, padding outside the
    /// escape codes so columns line up
    fn format_values<F>(&self, level: Level, lookup: F) -> Result<String>
    where
        F: Fn(&str) -> Option<FieldValue>,
    {
        let marked = &self.marked[level.index()];
        if let Some(full) = self.rules.get(level).whole_message() {
            let line = interpolate(marked, &lookup)?;
            return Ok(format!("{}{}{}", full.prefix, line, full.suffix));
        }

        let mut template = marked.clone();
        for (span, pair) in &self.value_spans[level.index()] {
            let styled = Self::render_styled(marked, *span, pair, &lookup)?;
            template.replace_range(span.start..span.end, &styled.replace('%', "%%"));
        }

        Ok(interpolate(&template, &lookup)?)
    }

    fn render_styled<F>(
        template: &str,
        span: Span,
        pair: &StylePair,
        lookup: &F,
    ) -> Result<String>
    where
        F: Fn(&str) -> Option<FieldValue>,
    {
        let placeholder = Placeholder::parse(span.slice(template))
            .ok_or(TemplateError::Incomplete(span.start))?;
        let value = lookup(placeholder.field.as_str())
            .ok_or_else(|| TemplateError::MissingField(placeholder.field.clone()))?;

        // Zero padding is made of visible digits, so it can stay inside
        if placeholder.zero_pad && !placeholder.left_align {
            let rendered = render_value(&placeholder, &value)?;
            return Ok(format!("{}{}{}", pair.prefix, rendered, pair.suffix));
        }

        let bare = render_value(&placeholder.without_width(), &value)?;
        let width = placeholder.width.unwrap_or(0);
        let padding = " ".repeat(width.saturating_sub(bare.chars().count()));

        Ok(if placeholder.left_align {
            format!("{}{}{}{}", pair.prefix, bare, pair.suffix, padding)
        } else {
            format!("{}{}{}{}", padding, pair.prefix, bare, pair.suffix)
        })
    }

    /// Swap markup tags in the template for tokens. `%` in a token is
    /// escaped so interpolation prints it as written.
    fn apply_markup(&self, level: Level) -> String {
        let color = self
            .rules
            .get(level)
            .get("levelname")
            .map(|pair| pair.prefix.as_str())
            .unwrap_or("");
        let escape = |token: &str| token.replace('%', "%%");
        self.template
            .replace("<color>", &escape(color))
            .replace("</color>", &escape(self.palette.reset_fore))
            .replace("<b>", &escape(self.palette.dim))
            .replace("</b>", &escape(self.palette.reset))
    }
}

impl Default for ColoredFormatter {
    fn default() -> Self {
        ColoredFormatter::new(DEFAULT_FORMAT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::Style;
    use crate::error::PaintError;
    use crate::record::Record;
    use chrono::TimeZone;

    const TEMPLATE: &str = "%(name)s %(levelname)s %(message)s";

    fn record(level: Level) -> Record {
        Record::new("logger", level, "Something").with_location("/tmp", 23)
    }

    #[test]
    fn test_default_output_is_plain() {
        let formatter =
            ColoredFormatter::with_overrides(TEMPLATE, None, Vec::<(&str, RuleUpdate)>::new())
                .unwrap();
        assert_eq!(formatter.format(&record(Level::Info)).unwrap(), "logger INFO Something");
    }

    #[test]
    fn test_level_definition() {
        let formatter = ColoredFormatter::with_overrides(
            TEMPLATE,
            None,
            [("DEBUG", RuleUpdate::new().field("levelname", ("GREEN", "RESET")))],
        )
        .unwrap();
        assert_eq!(
            formatter.format(&record(Level::Debug)).unwrap(),
            "logger GREENDEBUGRESET Something"
        );
    }

    #[test]
    fn test_full_redefinition() {
        let formatter = ColoredFormatter::with_overrides(
            TEMPLATE,
            None,
            [(
                "DEBUG",
                RuleUpdate::new()
                    .field("levelname", ("RED", "OFF"))
                    .full(("GREEN", "RESET")),
            )],
        )
        .unwrap();
        assert_eq!(
            formatter.format(&record(Level::Debug)).unwrap(),
            "GREENlogger DEBUG SomethingRESET"
        );
    }

    #[test]
    fn test_invalid_override_level() {
        let result = ColoredFormatter::with_overrides(
            TEMPLATE,
            None,
            [("LOUD", RuleUpdate::new().field("message", "RED"))],
        );
        assert!(matches!(result, Err(PaintError::InvalidLevel(_))));
    }

    #[test]
    fn test_repeated_format_is_identical() {
        let mut formatter = ColoredFormatter::new(TEMPLATE);
        formatter.update(Level::Info, &RuleUpdate::new().field("message", ("<", ">")));
        let rec = record(Level::Info);
        let first = formatter.format(&rec).unwrap();
        let second = formatter.format(&rec).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "logger INFO <Something>");
        assert_eq!(formatter.template(), TEMPLATE);
    }

    #[test]
    fn test_levels_do_not_leak_into_each_other() {
        let mut formatter = ColoredFormatter::new(TEMPLATE);
        formatter.update(Level::Error, &RuleUpdate::new().full(("[", "]")));
        assert_eq!(
            formatter.format(&record(Level::Error)).unwrap(),
            "[logger ERROR Something]"
        );
        assert_eq!(formatter.format(&record(Level::Info)).unwrap(), "logger INFO Something");
    }

    #[test]
    fn test_set_level_color_shorthand() {
        let mut formatter = ColoredFormatter::new("%(levelname)s");
        formatter.set_level_color(Level::Warning, "Y");
        assert_eq!(
            formatter.rules().get(Level::Warning).get("levelname"),
            Some(&StylePair::new("Y", Style::RESET_ALL))
        );
        assert_eq!(
            formatter.format(&record(Level::Warning)).unwrap(),
            format!("YWARNING{}", Style::RESET_ALL)
        );
    }

    #[test]
    fn test_colored_template_with_and_without_reset() {
        let mut formatter = ColoredFormatter::new("%(message)s");
        formatter.update(Level::Info, &RuleUpdate::new().field("message", "RED"));
        assert_eq!(
            formatter.colored_template(Level::Info),
            format!("RED%(message)s{}", Style::RESET_ALL)
        );
        assert_eq!(formatter.colored_template_without_reset(Level::Info), "RED%(message)s");
    }

    #[test]
    fn test_template_mode_keeps_width_inside_codes() {
        let mut formatter = ColoredFormatter::new("%(levelname)-8s|");
        formatter.update(Level::Info, &RuleUpdate::new().field("levelname", ("<", ">")));
        assert_eq!(formatter.format(&record(Level::Info)).unwrap(), "<INFO    >|");
    }

    #[test]
    fn test_value_mode_pads_outside_codes() {
        let options = FormatterOptions {
            mode: StyleMode::Value,
            ..FormatterOptions::default()
        };
        let mut formatter = ColoredFormatter::with_options("%(levelname)-8s|%(name)8s|", options);
        formatter.update(
            Level::Info,
            &RuleUpdate::new()
                .field("levelname", ("\x1b[32m", "\x1b[0m"))
                .field("name", ("<", ">")),
        );
        assert_eq!(
            formatter.format(&record(Level::Info)).unwrap(),
            "\x1b[32mINFO\x1b[0m    |  <logger>|"
        );
    }

    #[test]
    fn test_value_mode_clamps_padding_and_escapes_percent() {
        let options = FormatterOptions {
            mode: StyleMode::Value,
            ..FormatterOptions::default()
        };
        let mut formatter = ColoredFormatter::with_options("%(message)-3s %(levelname)s", options);
        formatter.update(Level::Info, &RuleUpdate::new().field("message", ("<", ">")));
        let rec = Record::new("logger", Level::Info, "100% done");
        assert_eq!(formatter.format(&rec).unwrap(), "<100% done> INFO");
    }

    #[test]
    fn test_value_mode_full_rule() {
        let options = FormatterOptions {
            mode: StyleMode::Value,
            ..FormatterOptions::default()
        };
        let mut formatter = ColoredFormatter::with_options(TEMPLATE, options);
        formatter.update(Level::Debug, &RuleUpdate::new().full(("G", "R")));
        assert_eq!(
            formatter.format(&record(Level::Debug)).unwrap(),
            "Glogger DEBUG SomethingR"
        );
    }

    #[test]
    fn test_asctime_with_date_format() {
        let formatter = ColoredFormatter::with_date_format("%(asctime)s %(message)s", "%H:%M");
        let created = Local.with_ymd_and_hms(2024, 5, 1, 13, 45, 0).unwrap();
        let rec = record(Level::Info).with_created(created);
        assert_eq!(formatter.format(&rec).unwrap(), "13:45 Something");

        let formatter = ColoredFormatter::new("%(asctime)s");
        assert_eq!(formatter.format(&rec).unwrap(), "2024-05-01 13:45:00,000");
    }

    #[test]
    fn test_msecs_renders_as_float() {
        let created = Local.timestamp_millis_opt(1_700_000_000_250).unwrap();
        let rec = record(Level::Info).with_created(created);
        let formatter = ColoredFormatter::new("%(msecs)s|%(msecs)03d");
        assert_eq!(formatter.format(&rec).unwrap(), "250.0|250");
    }

    #[test]
    fn test_markup_tags() {
        let options = FormatterOptions {
            markup: true,
            ..FormatterOptions::default()
        };
        let mut formatter =
            ColoredFormatter::with_options("<color>%(levelname)s</color> %(message)s", options);
        formatter.update(Level::Error, &RuleUpdate::new().field("levelname", ("RED", "")));
        let out = formatter.format(&record(Level::Error)).unwrap();
        // The rule itself also applies to the placeholder
        assert!(out.starts_with("REDRED"));
        assert!(!out.contains("<color>"));
        assert!(!out.contains("</color>"));
    }

    #[test]
    fn test_markup_leaves_record_values_alone() {
        let message = "html is <b>bold</b> and <color>x</color>";
        for mode in [StyleMode::Template, StyleMode::Value] {
            let options = FormatterOptions {
                markup: true,
                mode,
                ..FormatterOptions::default()
            };
            let mut formatter =
                ColoredFormatter::with_options("<b>%(levelname)s</b> %(message)s", options);
            formatter.update(Level::Info, &RuleUpdate::new().field("message", ("<", ">")));
            let rec = Record::new("logger", Level::Info, message);
            assert_eq!(
                formatter.format(&rec).unwrap(),
                format!("INFO <{}>", message),
                "{:?}",
                mode
            );
        }
    }

    #[test]
    fn test_markup_tokens_with_percent_print_as_written() {
        let options = FormatterOptions {
            markup: true,
            ..FormatterOptions::default()
        };
        let mut formatter = ColoredFormatter::with_options("<color>%(message)s", options);
        formatter.update(Level::Info, &RuleUpdate::new().field("levelname", ("50%", "")));
        assert_eq!(formatter.colored_template(Level::Info), "50%%%(message)s");
        assert_eq!(formatter.format(&record(Level::Info)).unwrap(), "50%Something");
    }

    #[test]
    fn test_oversized_field_rule_is_ignored() {
        let mut formatter = ColoredFormatter::new(TEMPLATE);
        formatter.update(
            Level::Info,
            &RuleUpdate::new().field("a".repeat(3_000_000).as_str(), ("<", ">")),
        );
        assert_eq!(formatter.format(&record(Level::Info)).unwrap(), "logger INFO Something");
    }

    #[test]
    fn test_template_errors_propagate() {
        let formatter = ColoredFormatter::new("%(nope)s");
        assert!(matches!(
            formatter.format(&record(Level::Info)),
            Err(PaintError::Template(TemplateError::MissingField(_)))
        ));
    }
}
