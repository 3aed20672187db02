use regex::Regex;

/// Byte range `[start, end)` of a placeholder inside a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, template: &'a str) -> &'a str {
        &template[self.start..self.end]
    }
}

/// Finds `%(<field>)[-0-9.]*[dfs]` placeholders for one field name.
///
/// The anchor is the literal `%(`, so a run of `%%` escapes in front of a
/// placeholder never becomes part of the match.
#[derive(Debug, Clone)]
pub struct Locator {
    field: String,
    regex: Regex,
}

impl Locator {
    /// `None` when the pattern for `field` cannot be compiled, which happens
    /// for names past the regex size limit. Such a field matches nothing.
    pub fn new(field: &str) -> Option<Self> {
        let pattern = format!(r"%\({}\)[0-9.\-]*[dfs]", regex::escape(field));
        let regex = Regex::new(&pattern).ok()?;
        Some(Self {
            field: field.to_string(),
            regex,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Leftmost placeholder for this field, if any
    pub fn locate(&self, template: &str) -> Option<Span> {
        self.regex.find(template).map(|m| Span {
            start: m.start(),
            end: m.end(),
        })
    }
}

/// Span of the first placeholder rendering `field` in `template`
pub fn locate(template: &str, field: &str) -> Option<Span> {
    Locator::new(field)?.locate(template)
}

/// Conversion character of a placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Str,
    Int,
    Float,
}

impl Conversion {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            's' => Some(Conversion::Str),
            'd' => Some(Conversion::Int),
            'f' => Some(Conversion::Float),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Conversion::Str => 's',
            Conversion::Int => 'd',
            Conversion::Float => 'f',
        }
    }
}

/// Decoded `%(field)<flags><width>.<precision><conversion>` placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub field: String,
    pub left_align: bool,
    pub zero_pad: bool,
    pub width: Option<usize>,
    pub precision: Option<usize>,
    pub conversion: Conversion,
}

impl Placeholder {
    /// Parse exactly one placeholder, e.g. `%(created)-10.2f`.
    /// Returns `None` if `text` is not a single well-formed placeholder.
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.strip_prefix("%(")?;
        let close = rest.find(')')?;
        let field = &rest[..close];
        let tail = &rest[close + 1..];

        let (modifiers, conversion) = match tail.char_indices().last() {
            Some((idx, c)) => (&tail[..idx], Conversion::from_char(c)?),
            None => return None,
        };

        let mut left_align = false;
        let mut zero_pad = false;
        let mut chars = modifiers.char_indices().peekable();
        let mut digits_start = modifiers.len();
        while let Some(&(idx, c)) = chars.peek() {
            match c {
                '-' => left_align = true,
                '0' => zero_pad = true,
                _ => {
                    digits_start = idx;
                    break;
                }
            }
            chars.next();
        }

        let numeric = &modifiers[digits_start..];
        let (width_text, precision_text) = match numeric.split_once('.') {
            Some((w, p)) => (w, Some(p)),
            None => (numeric, None),
        };

        let width = parse_digits(width_text)?;
        let precision = match precision_text {
            // A bare '.' means precision 0, as in printf
            Some(p) => Some(parse_digits(p)?.unwrap_or(0)),
            None => None,
        };

        Some(Placeholder {
            field: field.to_string(),
            left_align,
            zero_pad,
            width,
            precision,
            conversion,
        })
    }

    /// The same placeholder without its width, so a value renders unpadded
    pub fn without_width(&self) -> Self {
        Placeholder {
            width: None,
            zero_pad: false,
            left_align: false,
            ..self.clone()
        }
    }
}

fn parse_digits(text: &str) -> Option<Option<usize>> {
    if text.is_empty() {
        return Some(None);
    }
    if !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok().map(Some)
}
