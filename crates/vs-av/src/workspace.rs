//! Working storage for the engine.
//!
//! A [`Workspace`] is a private temporary directory the encoder reads its
//! input from and writes its output to. Files are addressed by plain names;
//! nothing outside the directory can be reached through it.

use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory holding staged inputs and encoder outputs.
///
/// The directory and everything in it is removed when the workspace is
/// dropped.
///
/// # Example
///
/// ```no_run
/// use vs_av::Workspace;
///
/// # async fn example() -> vs_core::Result<()> {
/// let ws = Workspace::new()?;
/// ws.write("input", b"...").await?;
/// let bytes = ws.read("input").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    /// Create a fresh, empty workspace.
    pub fn new() -> vs_core::Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("vidshrink-")
            .tempdir()
            .map_err(|e| vs_core::Error::tool("workspace", format!("failed to create temp dir: {e}")))?;

        tracing::debug!("workspace at {}", temp_dir.path().display());
        Ok(Self { temp_dir })
    }

    /// Path to the workspace directory.
    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Resolve a plain file name to its path inside the workspace.
    ///
    /// Names containing path separators, `.` or `..` are rejected.
    pub fn path_of(&self, name: &str) -> vs_core::Result<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.temp_dir.path().join(name)),
            _ => Err(vs_core::Error::tool(
                "workspace",
                format!("invalid workspace file name: {name:?}"),
            )),
        }
    }

    /// Write `data` to `name`, replacing any previous content.
    pub async fn write(&self, name: &str, data: &[u8]) -> vs_core::Result<()> {
        let path = self.path_of(name)?;
        tokio::fs::write(&path, data).await.map_err(|e| {
            vs_core::Error::tool("workspace", format!("failed to write {name}: {e}"))
        })
    }

    /// Read the whole content of `name`.
    pub async fn read(&self, name: &str) -> vs_core::Result<Vec<u8>> {
        let path = self.path_of(name)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| vs_core::Error::tool("workspace", format!("failed to read {name}: {e}")))
    }

    /// Remove `name`. Removing a file that does not exist is not an error.
    pub async fn remove(&self, name: &str) -> vs_core::Result<()> {
        let path = self.path_of(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(vs_core::Error::tool(
                "workspace",
                format!("failed to remove {name}: {e}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_of_stays_inside_workspace() {
        let ws = Workspace::new().unwrap();
        let p = ws.path_of("output.mp4").unwrap();
        assert!(p.starts_with(ws.dir()));
        assert_eq!(p.file_name().unwrap(), "output.mp4");
    }

    #[test]
    fn path_of_rejects_traversal() {
        let ws = Workspace::new().unwrap();
        assert!(ws.path_of("../escape").is_err());
        assert!(ws.path_of("a/b").is_err());
        assert!(ws.path_of("/etc/passwd").is_err());
        assert!(ws.path_of("..").is_err());
        assert!(ws.path_of("").is_err());
    }

    #[tokio::test]
    async fn write_then_read() {
        let ws = Workspace::new().unwrap();
        ws.write("input", b"original").await.unwrap();
        assert_eq!(ws.read("input").await.unwrap(), b"original");

        ws.write("input", b"replaced").await.unwrap();
        assert_eq!(ws.read("input").await.unwrap(), b"replaced");
    }

    #[tokio::test]
    async fn read_missing_file_fails() {
        let ws = Workspace::new().unwrap();
        let err = ws.read("output.mp4").await.unwrap_err();
        assert!(err.to_string().contains("output.mp4"));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let ws = Workspace::new().unwrap();
        ws.write("input", b"x").await.unwrap();
        ws.remove("input").await.unwrap();
        ws.remove("input").await.unwrap();
        assert!(!ws.path_of("input").unwrap().exists());
    }

    #[test]
    fn drop_removes_directory() {
        let ws = Workspace::new().unwrap();
        let dir = ws.dir().to_path_buf();
        assert!(dir.exists());
        drop(ws);
        assert!(!dir.exists());
    }
}
