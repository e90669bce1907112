use std::fmt;

/// Errors surfaced on the control side.
///
/// The renderer itself never fails: dangling edges contribute nothing, values
/// are clamped and missing sample buffers render silence.
#[derive(Debug)]
pub enum Error {
    /// A lock-free queue had no free slot; the message was not sent.
    QueueFull { queue: &'static str },
    UnknownNodeType(String),
    UnknownParam(String),
    InvalidValue { key: &'static str, value: String },
    #[cfg(feature = "serde")]
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::QueueFull { queue } => write!(f, "{queue} queue is full"),
            Error::UnknownNodeType(name) => write!(f, "unknown node type `{name}`"),
            Error::UnknownParam(name) => write!(f, "unknown parameter `{name}`"),
            Error::InvalidValue { key, value } => write!(f, "invalid value `{value}` for `{key}`"),
            #[cfg(feature = "serde")]
            Error::Json(err) => write!(f, "invalid patch json: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "serde")]
            Error::Json(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
