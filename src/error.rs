#[derive(Debug, thiserror::Error)]
pub enum PaintError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the `%`-style interpolation step. These come from the base
/// template itself and are never caused by injected style tokens.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemplateError {
    #[error("Record has no field '{0}'")]
    MissingField(String),

    #[error("Unsupported conversion '{conversion}' at offset {offset}")]
    UnsupportedConversion { conversion: char, offset: usize },

    #[error("Incomplete format at offset {0}")]
    Incomplete(usize),

    #[error("Field '{field}' cannot be rendered with %{conversion}")]
    TypeMismatch { field: String, conversion: char },
}

pub type Result<T> = std::result::Result<T, PaintError>;
