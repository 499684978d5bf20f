mod location;
mod home;
mod dir;

pub use self::location::Location;
pub use self::home::HomeLocation;
pub use self::dir::DirLocation;
