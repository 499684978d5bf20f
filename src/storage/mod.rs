mod data;
mod persistence;
mod memory_storage;
mod file_storage;
mod db_storage;

pub use self::persistence::Persistence;
pub use self::memory_storage::MemoryStorage;
pub use self::file_storage::FileStorage;
pub use self::db_storage::DbStorage;
pub use self::data::*;


/// Builds a per-user storage key.
///
/// * `user` - stable user identifier
/// * `collection` - name of stored collection
pub(crate) fn user_key(user: &str, collection: &str) -> String {
    format!("{}_{}", user, collection)
}
