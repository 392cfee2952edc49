use thiserror::Error;

/// Errors surfaced by the invoice library.
///
/// Bad numeric input is never an error (it coerces to zero) and a form with
/// unparseable dates is reported as a suppressed sync, not through this type.
#[derive(Debug, Error)]
pub enum RacunError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid date {input:?}: {source}")]
    Date {
        input: String,
        source: chrono::ParseError,
    },

    #[error("unknown form field: {0}")]
    UnknownField(String),

    #[error("font error: {0}")]
    Font(String),

    #[error("image error: {0}")]
    Image(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("rasterization failed: {0}")]
    Rasterize(String),
}

pub type Result<T> = std::result::Result<T, RacunError>;
