//! Unified error type for vidshrink.
//!
//! Every failure of a compression job funnels into [`Error`]. Engine failures
//! carry the [`EngineStage`] they happened in so the front end can report
//! them without knowing anything about ffmpeg.

use std::fmt;

/// The point in a job's lifecycle at which the engine failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStage {
    /// Locating and initializing the encoder.
    Load,
    /// Copying the source into the engine's working storage.
    Stage,
    /// Running the encode itself.
    Encode,
    /// Reading the encoded output back out of working storage.
    ReadBack,
}

impl fmt::Display for EngineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EngineStage::Load => "load",
            EngineStage::Stage => "stage",
            EngineStage::Encode => "encode",
            EngineStage::ReadBack => "read-back",
        };
        f.write_str(s)
    }
}

/// Unified error type covering all failure modes in vidshrink.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The media engine failed during one of its stages.
    #[error("Engine error [{stage}]: {message}")]
    Engine {
        /// Stage at which the engine failed.
        stage: EngineStage,
        /// Human-readable error description.
        message: String,
    },

    /// An external tool (ffmpeg) could not be found or run.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// Job input failed validation before the engine was touched.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration could not be parsed.
    #[error("Config error: {0}")]
    Config(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Convenience constructor for [`Error::Engine`].
    pub fn engine(stage: EngineStage, message: impl Into<String>) -> Self {
        Error::Engine {
            stage,
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Re-tag this error as an engine failure at `stage`.
    ///
    /// Engine errors keep their original stage; everything else is folded
    /// into an [`Error::Engine`] carrying the original description.
    pub fn at_stage(self, stage: EngineStage) -> Self {
        match self {
            e @ Error::Engine { .. } => e,
            Error::Validation(msg) => Error::Validation(msg),
            other => Error::engine(stage, other.to_string()),
        }
    }

    /// The engine stage this error belongs to, if any.
    pub fn stage(&self) -> Option<EngineStage> {
        match self {
            Error::Engine { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_display() {
        let err = Error::engine(EngineStage::Encode, "exit status 1");
        assert_eq!(err.to_string(), "Engine error [encode]: exit status 1");
        assert_eq!(err.stage(), Some(EngineStage::Encode));
    }

    #[test]
    fn tool_display() {
        let err = Error::tool("ffmpeg", "not found");
        assert_eq!(err.to_string(), "Tool error [ffmpeg]: not found");
        assert_eq!(err.stage(), None);
    }

    #[test]
    fn validation_display() {
        let err = Error::Validation("bitrate must be positive".into());
        assert_eq!(err.to_string(), "Validation error: bitrate must be positive");
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn at_stage_wraps_tool_errors() {
        let err = Error::tool("ffmpeg", "not found").at_stage(EngineStage::Load);
        assert_eq!(err.stage(), Some(EngineStage::Load));
        assert!(err.to_string().contains("ffmpeg"));
    }

    #[test]
    fn at_stage_keeps_existing_stage() {
        let err = Error::engine(EngineStage::Encode, "boom").at_stage(EngineStage::ReadBack);
        assert_eq!(err.stage(), Some(EngineStage::Encode));
    }

    #[test]
    fn at_stage_leaves_validation_alone() {
        let err = Error::Validation("bad".into()).at_stage(EngineStage::Stage);
        assert!(matches!(err, Error::Validation(_)));
    }
}
