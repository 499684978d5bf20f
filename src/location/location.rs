use std::path::PathBuf;

use crate::error::Result;


/// Directory, where xpns keeps its configuration and data.
pub trait Location {
    /// Root directory of the location.
    fn root(&self) -> PathBuf;

    /// Path of a file directly inside the root.
    ///
    /// * `name` - file name
    fn file(&self, name: &str) -> PathBuf {
        self.root()
            .join(name)
    }

    /// Checks if root directory is present.
    fn exists(&self) -> bool {
        self.root()
            .is_dir()
    }

    /// Creates root directory (with parents) unless it is present.
    fn create_if_absent(&self) -> Result<()> {
        if self.exists() {
            return Ok(());
        }

        tracing::debug!(root = %self.root().display(), "creating data location");
        std::fs::create_dir_all(self.root())
            .map_err(Into::into)
    }
}
