use std::path::{Path, PathBuf};

use super::location::Location;


/// App's location rooted at an arbitrary directory.
#[derive(Clone, Debug)]
pub struct DirLocation {
    root: PathBuf,
}


impl DirLocation {
    /// Creates a location rooted at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        DirLocation { 
            root: root.as_ref().to_path_buf() 
        }
    }
}


impl Location for DirLocation {
    fn root(&self) -> PathBuf {
        self.root.clone()
    }
}


#[cfg(test)]
mod tests {
    use assert2::{assert, check};

    use super::*;

    #[test]
    fn creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let loc = DirLocation::new(dir.path().join("nested").join("data"));

        check!(!loc.exists());
        assert!(let Ok(()) = loc.create_if_absent());
        check!(loc.exists());

        // Second call is a no-op
        assert!(let Ok(()) = loc.create_if_absent());
    }
}
