use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while ingesting a report or touching the
/// history file. Each variant carries the offending path so the CLI can
/// print a one-line message without extra context.
#[derive(Debug, Error)]
pub enum Error {
    #[error("test report not found: {}", .0.display())]
    InputMissing(PathBuf),

    #[error("malformed XML in {}: {reason}", .path.display())]
    MalformedXml { path: PathBuf, reason: String },

    #[error("unexpected report shape in {}: {reason}", .path.display())]
    SchemaMismatch { path: PathBuf, reason: String },

    #[error("history file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("history file {} is not a JSON array of runs: {reason}", .path.display())]
    MalformedStore { path: PathBuf, reason: String },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl Error {
    /// Process exit code reported by the CLI: 2 for report input errors,
    /// 3 for history store errors, 1 for anything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InputMissing(_)
            | Error::MalformedXml { .. }
            | Error::SchemaMismatch { .. } => 2,
            Error::NotFound(_) | Error::MalformedStore { .. } | Error::Io { .. } => 3,
            Error::Unexpected(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::InputMissing(PathBuf::from("a.xml")).exit_code(), 2);
        assert_eq!(
            Error::MalformedXml {
                path: PathBuf::from("a.xml"),
                reason: "bad".to_string(),
            }
            .exit_code(),
            2
        );
        assert_eq!(Error::NotFound(PathBuf::from("h.json")).exit_code(), 3);
        assert_eq!(
            Error::Io {
                path: PathBuf::from("h.json"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk"),
            }
            .exit_code(),
            3
        );
        assert_eq!(
            Error::Unexpected(anyhow::anyhow!("surprise")).exit_code(),
            1
        );
    }

    #[test]
    fn test_message_includes_path() {
        let err = Error::SchemaMismatch {
            path: PathBuf::from("reports/junit.xml"),
            reason: "testsuite is missing tests".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("reports/junit.xml"));
        assert!(msg.contains("missing tests"));
    }
}
