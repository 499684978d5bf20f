use crate::error::Result;
use crate::location::Location;
use super::persistence::Persistence;


/// Extension of files with stored blobs.
const BLOB_EXTENSION: &str = "json";


/// Storage, that keeps each blob in a separate file
/// in the location's root.
///
/// Keys are turned into file names by replacing every character
/// except ASCII alphanumerics, `-` and `_` with `_`. Hence keys like
/// `a.b` and `a_b` share a file. Keys built from user identifiers
/// and collection names never collide this way.
pub struct FileStorage<L: Location> {
    /// Storage location provider
    loc: L
}


impl<L: Location> FileStorage<L> {
    /// Opens a storage in provided location, creating the
    /// location if necessary.
    /// 
    /// * `loc` - storage location provider
    pub fn open(loc: L) -> Result<Self> {
        loc.create_if_absent()?;

        Ok(FileStorage { 
            loc: loc 
        })
    }

    fn blob_path(&self, key: &str) -> std::path::PathBuf {
        //
        // Keys are built from user identifiers and collection
        // names, but I don't want a separator in a key to escape
        // the root folder anyway
        //

        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();

        self.loc
            .file(&file_name)
            .with_extension(BLOB_EXTENSION)
    }
}


impl<L: Location> Persistence for FileStorage<L> {
    fn load(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.blob_path(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, blob: &str) -> Result<()> {
        //
        // Write into a temporary file and then rename it,
        // so a reader never sees a half-written blob
        //

        let path = self.blob_path(key);
        let temp_path = path.with_extension("tmp");

        std::fs::write(&temp_path, blob)?;

        if let Err(e) = std::fs::rename(&temp_path, &path) {
            //
            // Blob is left as it was, so the temporary file is just garbage
            //

            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }

        Ok(())
    }
}
