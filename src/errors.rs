use thiserror::Error;

/// Errors produced while decoding logs, loading tables or replaying.
#[derive(Debug, Error)]
pub enum TenhouError {
    /// A log record is structurally broken (bad attribute list, bad
    /// integer list, record out of sequence with the round it needs).
    #[error("malformed `{tag}` record: {message}")]
    Format { tag: String, message: String },

    /// A packed wire value violates the bit format (call integer,
    /// tile id out of range).
    #[error("invalid {context} value {value:#x}")]
    Decode { context: &'static str, value: u32 },

    /// The replay cursor was driven out of sequence.
    #[error("replay state error: {0}")]
    State(String),

    /// A lookup table blob could not be read or has the wrong shape.
    #[error("lookup table error: {0}")]
    Table(String),
}

impl TenhouError {
    pub(crate) fn format(tag: &str, message: impl Into<String>) -> Self {
        TenhouError::Format {
            tag: tag.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TenhouError>;
