use std::fmt::{Display, Formatter};

/// Error type for mixer and one-shot operations.
#[derive(Debug)]
pub enum MixError {
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },
    MissingClip(String),
    Settings(String),
}

impl Display for MixError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { kind, index, len } => {
                write!(f, "{} index {} out of range (len {})", kind, index, len)
            }
            Self::MissingClip(name) => write!(f, "missing clip: {}", name),
            Self::Settings(err) => write!(f, "settings error: {}", err),
        }
    }
}

impl std::error::Error for MixError {}

impl From<serde_json::Error> for MixError {
    fn from(value: serde_json::Error) -> Self {
        Self::Settings(value.to_string())
    }
}

impl From<std::io::Error> for MixError {
    fn from(value: std::io::Error) -> Self {
        Self::Settings(value.to_string())
    }
}
