use std::path::PathBuf;
use thiserror::Error;

/// Error type for host-facing runtime operations.
///
/// Status codes returned across the ABI never surface here directly; they
/// reach the host only when an operation the host itself requested fails.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("unknown environment")]
    UnknownEnv,

    #[error("environment has no registered exports")]
    NoExports,

    #[error("value is not callable")]
    NotCallable,

    #[error("native call failed with status {0}")]
    Status(i32),

    #[error("{0}")]
    Exception(HostException),

    #[error("promise is still pending")]
    PromisePending,

    #[error("value is not a promise")]
    NotAPromise,

    #[error("failed to read options at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse options at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The kind of host error an add-on raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    Error,
    TypeError,
    RangeError,
    SyntaxError,
}

impl ExceptionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::TypeError => "TypeError",
            Self::RangeError => "RangeError",
            Self::SyntaxError => "SyntaxError",
        }
    }
}

/// A pending exception surfaced to the host.
///
/// Produced when a native callback returns with the environment's
/// pending-exception slot occupied; the trampoline converts the stored
/// error value into this structured form so host code observes it as an
/// ordinary error.
#[derive(Debug, Clone)]
pub struct HostException {
    pub kind: ExceptionKind,
    pub message: String,
    pub code: Option<String>,
}

impl std::fmt::Display for HostException {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} [{}]: {}", self.kind.as_str(), code, self.message),
            None => write!(f, "{}: {}", self.kind.as_str(), self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exception_display_includes_code() {
        let exc = HostException {
            kind: ExceptionKind::TypeError,
            message: "bad".to_string(),
            code: Some("E_ARG".to_string()),
        };
        assert_eq!(exc.to_string(), "TypeError [E_ARG]: bad");
    }

    #[test]
    fn test_exception_display_without_code() {
        let exc = HostException {
            kind: ExceptionKind::RangeError,
            message: "out of range".to_string(),
            code: None,
        };
        assert_eq!(exc.to_string(), "RangeError: out of range");
    }
}
