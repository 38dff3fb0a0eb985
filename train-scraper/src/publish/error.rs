//! Publisher error types.

use std::path::PathBuf;

/// Errors raised while handing a snapshot to a sink.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Could not write to the sink
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not encode the document
    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PublishError::Io {
            path: PathBuf::from("/out/snapshot.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to write /out/snapshot.json: denied");
    }
}
