use std::fmt;

use crate::model::EntityKind;

#[derive(Debug)]
pub enum AlignError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad language list, empty source id, etc.).
    ConfigValidation(String),
    /// A matcher was invoked for an entity kind it cannot handle. Fatal:
    /// aborts the whole run, never retried.
    UnsupportedEntityKind { matcher: String, kind: EntityKind },
    /// An auxiliary knowledge source failed to load. Recoverable: the
    /// source is skipped and the run continues.
    SourceUnavailable { source: String, reason: String },
    /// IO error outside source loading.
    Io(String),
}

impl AlignError {
    pub fn unsupported(matcher: &str, kind: EntityKind) -> Self {
        Self::UnsupportedEntityKind {
            matcher: matcher.into(),
            kind,
        }
    }
}

impl fmt::Display for AlignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnsupportedEntityKind { matcher, kind } => {
                write!(f, "matcher '{matcher}' does not support entity kind '{kind}'")
            }
            Self::SourceUnavailable { source, reason } => {
                write!(f, "knowledge source '{source}' unavailable: {reason}")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for AlignError {}
