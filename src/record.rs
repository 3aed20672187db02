use crate::level::Level;
use chrono::{DateTime, Local, TimeZone};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::fmt;
use std::path::Path;

/// A renderable record attribute
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(f64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => f.write_str(s),
            FieldValue::Int(n) => write!(f, "{}", n),
            // Whole floats keep their ".0" like other log renderers do
            FieldValue::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            FieldValue::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Int(value as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

/// What the formatter needs from a record: its level and a lookup from
/// field name to value. Unknown names return `None`.
pub trait LogRecord {
    fn level(&self) -> Level;
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Creation time, used to render `asctime`
    fn created(&self) -> Option<DateTime<Local>> {
        None
    }
}

/// Reference point for `relativeCreated`
static START_TIME: Lazy<DateTime<Local>> = Lazy::new(Local::now);

/// Concrete record carrying the standard attributes plus free-form extras
#[derive(Debug, Clone)]
pub struct Record {
    pub name: String,
    pub level: Level,
    pub message: String,
    pub pathname: String,
    pub lineno: u32,
    pub func_name: Option<String>,
    pub module: Option<String>,
    pub created: DateTime<Local>,
    pub process: u32,
    pub process_name: String,
    pub thread: Option<u64>,
    pub thread_name: Option<String>,
    pub extra: IndexMap<String, FieldValue>,
}

impl Record {
    pub fn new(name: &str, level: Level, message: &str) -> Self {
        let current = std::thread::current();
        Self {
            name: name.to_string(),
            level,
            message: message.to_string(),
            pathname: String::new(),
            lineno: 0,
            func_name: None,
            module: None,
            created: Local::now(),
            process: std::process::id(),
            process_name: "MainProcess".to_string(),
            thread: None,
            thread_name: current.name().map(str::to_string),
            extra: IndexMap::new(),
        }
    }

    pub fn with_location(mut self, pathname: &str, lineno: u32) -> Self {
        self.pathname = pathname.to_string();
        self.lineno = lineno;
        self
    }

    pub fn with_func_name(mut self, func_name: &str) -> Self {
        self.func_name = Some(func_name.to_string());
        self
    }

    pub fn with_created(mut self, created: DateTime<Local>) -> Self {
        self.created = created;
        self
    }

    pub fn with_thread(mut self, thread: u64, thread_name: &str) -> Self {
        self.thread = Some(thread);
        self.thread_name = Some(thread_name.to_string());
        self
    }

    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.extra.insert(name.to_string(), value.into());
        self
    }

    /// Build a record from a `log` facade record
    pub fn from_log(record: &log::Record<'_>) -> Self {
        let mut built = Record::new(record.target(), record.level().into(), "");
        built.message = record.args().to_string();
        if let Some(file) = record.file() {
            built.pathname = file.to_string();
        }
        built.lineno = record.line().unwrap_or(0);
        built.module = record.module_path().map(str::to_string);
        built
    }

    /// Build a record from a JSON object such as one line of a JSON log.
    ///
    /// Level comes from `levelname`, `level` or `levelno`; time from `created`
    /// (epoch seconds). Any other key becomes an extra field.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, crate::error::PaintError> {
        let obj = value.as_object().ok_or_else(|| {
            crate::error::PaintError::Config("record must be a JSON object".to_string())
        })?;

        let level = match ["levelname", "level", "levelno"]
            .iter()
            .find_map(|key| obj.get(*key))
        {
            Some(serde_json::Value::String(s)) => s.parse()?,
            Some(serde_json::Value::Number(n)) => {
                let rank = n.as_u64().unwrap_or(0);
                Level::from_rank(u32::try_from(rank).unwrap_or(0))?
            }
            _ => Level::Info,
        };

        let text = |key: &str| obj.get(key).and_then(|v| v.as_str()).map(str::to_string);
        let mut record = Record::new(
            &text("name").unwrap_or_else(|| "root".to_string()),
            level,
            &["message", "msg"]
                .iter()
                .find_map(|key| text(*key))
                .unwrap_or_default(),
        );

        if let Some(path) = text("pathname") {
            record.pathname = path;
        }
        if let Some(lineno) = obj.get("lineno").and_then(|v| v.as_u64()) {
            record.lineno = u32::try_from(lineno).unwrap_or(u32::MAX);
        }
        record.func_name = text("funcName");
        record.module = text("module");
        if let Some(created) = obj.get("created").and_then(|v| v.as_f64()) {
            let secs = created.floor() as i64;
            let nanos = ((created - created.floor()) * 1e9) as u32;
            if let Some(ts) = Local.timestamp_opt(secs, nanos).single() {
                record.created = ts;
            }
        }

        const CONSUMED: [&str; 11] = [
            "levelname", "level", "levelno", "name", "message", "msg", "pathname",
            "lineno", "funcName", "module", "created",
        ];
        for (key, value) in obj {
            if CONSUMED.contains(&key.as_str()) {
                continue;
            }
            let field = match value {
                serde_json::Value::String(s) => FieldValue::Str(s.clone()),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(i) => FieldValue::Int(i),
                    None => FieldValue::Float(n.as_f64().unwrap_or(0.0)),
                },
                serde_json::Value::Null => FieldValue::Str(String::new()),
                other => FieldValue::Str(other.to_string()),
            };
            record.extra.insert(key.clone(), field);
        }

        Ok(record)
    }

    fn created_seconds(&self) -> f64 {
        self.created.timestamp() as f64 + self.created.timestamp_subsec_nanos() as f64 / 1e9
    }

    fn filename(&self) -> String {
        Path::new(&self.pathname)
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.pathname.clone())
    }

    fn module_name(&self) -> String {
        if let Some(module) = &self.module {
            return module.clone();
        }
        Path::new(&self.pathname)
            .file_stem()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Unknown module".to_string())
    }
}

impl LogRecord for Record {
    fn level(&self) -> Level {
        self.level
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "name" => FieldValue::Str(self.name.clone()),
            "message" => FieldValue::Str(self.message.clone()),
            "levelname" => FieldValue::Str(self.level.name().to_string()),
            "levelno" => FieldValue::Int(self.level.rank() as i64),
            "pathname" => FieldValue::Str(self.pathname.clone()),
            "filename" => FieldValue::Str(self.filename()),
            "module" => FieldValue::Str(self.module_name()),
            "lineno" => FieldValue::Int(self.lineno as i64),
            "funcName" => FieldValue::Str(self.func_name.clone().unwrap_or_default()),
            "created" => FieldValue::Float(self.created_seconds()),
            "msecs" => FieldValue::Float(self.created.timestamp_subsec_millis() as f64),
            "relativeCreated" => {
                let elapsed = self.created.signed_duration_since(*START_TIME);
                FieldValue::Float(elapsed.num_microseconds().unwrap_or(0) as f64 / 1000.0)
            }
            "process" => FieldValue::Int(self.process as i64),
            "processName" => FieldValue::Str(self.process_name.clone()),
            "thread" => FieldValue::Int(self.thread.unwrap_or(0) as i64),
            "threadName" => FieldValue::Str(
                self.thread_name
                    .clone()
                    .unwrap_or_else(|| "MainThread".to_string()),
            ),
            other => return self.extra.get(other).cloned(),
        };
        Some(value)
    }

    fn created(&self) -> Option<DateTime<Local>> {
        Some(self.created)
    }
}
