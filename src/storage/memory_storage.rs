use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::error::{Result, Error, ErrorKind};
use super::persistence::Persistence;


/// Storage, that keeps everything in memory.
///
/// Can be switched into read-only mode, so saves fail the same
/// way as they do when a real storage is out of quota.
#[derive(Default)]
pub struct MemoryStorage {
    blobs: RefCell<HashMap<String, String>>,
    read_only: Cell<bool>,
}


impl MemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes all subsequent saves fail (or succeed again).
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.blobs.borrow().len()
    }

    /// Checks if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.borrow().is_empty()
    }
}


impl Persistence for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs
            .borrow()
            .get(key)
            .cloned())
    }

    fn save(&self, key: &str, blob: &str) -> Result<()> {
        if self.read_only.get() {
            return Err(Error::new(ErrorKind::Persistence, "Storage is read-only")
                .with_extra(key));
        }

        self.blobs
            .borrow_mut()
            .insert(key.to_owned(), blob.to_owned());

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    #[test]
    fn save_replaces_blob() {
        let storage = MemoryStorage::new();
        check!(storage.load("1_funds").unwrap() == None);

        storage.save("1_funds", "[]").unwrap();
        storage.save("1_funds", "[1]").unwrap();

        check!(storage.load("1_funds").unwrap() == Some("[1]".to_owned()));
        check!(storage.len() == 1);
    }

    #[test]
    fn read_only_rejects_saves() {
        let storage = MemoryStorage::new();
        storage.set_read_only(true);

        let_assert!(Err(e) = storage.save("k", "v"));
        check!(e.is_recoverable());
        check!(storage.is_empty());
    }
}
