use super::location::Location;


/// Root folder for app's data.
const ROOT_FOLDER: &str = ".xpns";


/// App's location based on current user's home directory.
///
/// Falls back to the working directory if home directory
/// cannot be determined.
pub struct HomeLocation;


impl HomeLocation {
    /// Just creates an instance.
    pub fn new() -> Self {
        HomeLocation
    }
}


impl Default for HomeLocation {
    fn default() -> Self {
        Self::new()
    }
}


impl Location for HomeLocation {
    fn root(&self) -> std::path::PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join(ROOT_FOLDER)
    }
}
