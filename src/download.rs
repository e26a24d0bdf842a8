//! The downloadable result of a job.

use std::io::Write;
use std::path::{Path, PathBuf};

/// Name the encoded video is offered under.
pub const DOWNLOAD_NAME: &str = "compressed.mp4";

/// Encoded bytes plus the name and media type they should be saved with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl DownloadArtifact {
    /// Wrap an encoded MP4 under the standard download name.
    pub fn mp4(bytes: Vec<u8>) -> Self {
        Self {
            file_name: DOWNLOAD_NAME.to_string(),
            mime: "video/mp4",
            bytes,
        }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Where [`DownloadArtifact::save`] would write for `dest`.
    ///
    /// An existing directory gets the artifact's file name appended; any
    /// other path is used as-is.
    pub fn target_path(&self, dest: &Path) -> PathBuf {
        if dest.is_dir() {
            dest.join(&self.file_name)
        } else {
            dest.to_path_buf()
        }
    }

    /// Write the artifact to `dest` and return the final path.
    ///
    /// The bytes go to a temporary file next to the destination first and
    /// are renamed into place, so a failed save never leaves a truncated
    /// video behind.
    pub fn save(&self, dest: &Path) -> vs_core::Result<PathBuf> {
        let target = self.target_path(dest);
        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
        tmp.write_all(&self.bytes)?;
        tmp.flush()?;
        tmp.persist(&target).map_err(|e| e.error)?;

        tracing::info!("saved {} ({} bytes)", target.display(), self.bytes.len());
        Ok(target)
    }
}
