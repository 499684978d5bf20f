mod buffer;
mod kdf;
mod session;
mod accounts;

pub use self::kdf::KdfParams;
pub use self::session::{Session, User, UserId};
pub use self::accounts::Accounts;


/// Message shown when signing up with an email, that is taken.
const DUPLICATE_ACCOUNT: &str = "User with this email already exists";

/// Message shown on any login failure.
const INVALID_CREDENTIALS: &str = "Invalid email or password";
