use std::path;

use rusqlite;

use crate::error::{Result, Error};
use crate::location::Location;
use super::persistence::Persistence;


/// Name of database file inside a location.
const DATABASE_FILE: &str = "database";


/// Storage implemented using SQLite.
///
/// Blobs are kept in a single key-value table.
pub struct DbStorage {
    /// Database connection
    db: rusqlite::Connection
}


impl DbStorage {
    /// Opens an existing database in provided location.
    ///
    /// * `loc` - storage location provider
    pub fn open<L: Location>(loc: &L) -> Result<Self> {
        Ok(DbStorage {
            db: rusqlite::Connection::open(Self::db_path(loc))?
        })
    }

    /// Creates a database in provided location.
    ///
    /// * `loc` - storage location provider
    pub fn create<L: Location>(loc: &L) -> Result<Self> {
        //
        // Create home path if it doesn't exist
        //

        loc.create_if_absent()?;

        //
        // Now I just open DB and create schema
        //

        let storage = Self::open(loc)?;
        storage
            .create_db()
            .and(Ok(storage))
    }

    /// Creates a database, that lives in memory only.
    pub fn in_memory() -> Result<Self> {
        let storage = DbStorage {
            db: rusqlite::Connection::open_in_memory()?
        };

        storage
            .create_db()
            .and(Ok(storage))
    }
}


impl Persistence for DbStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let statement_fmt = r#"
            SELECT blob
              FROM blobs
             WHERE key = ?1
        "#;

        let mut statement = self.db.prepare(statement_fmt)?;
        let mut rows = statement.query(rusqlite::params![key])?;

        //
        // Key is a primary key, hence there is at most one row
        //

        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, blob: &str) -> Result<()> {
        let statement_fmt = r#"
            INSERT INTO blobs (key, blob, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE
               SET blob = excluded.blob,
                   updated_at = excluded.updated_at
        "#;

        self.db
            .execute(statement_fmt, rusqlite::params![key, blob, chrono::Utc::now()])?;

        Ok(())
    }
}


impl DbStorage {
    fn create_db(&self) -> Result<()> {
        let create_statement = r#"
            CREATE TABLE IF NOT EXISTS blobs (
                key             TEXT        PRIMARY KEY,
                blob            TEXT        NOT NULL,
                updated_at      TEXT        NOT NULL
            );
        "#;

        self.db
            .execute_batch(create_statement)
            .map_err(Error::from)
    }

    fn db_path<L: Location>(loc: &L) -> path::PathBuf {
        loc.file(DATABASE_FILE)
    }
}


#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;
    use crate::error::ErrorKind;
    use crate::location::DirLocation;

    #[test]
    fn upsert_replaces_blob() {
        let storage = DbStorage::in_memory().unwrap();

        check!(storage.load("u_funds").unwrap() == None);
        storage.save("u_funds", "[]").unwrap();
        storage.save("u_funds", "[{}]").unwrap();

        check!(storage.load("u_funds").unwrap() == Some("[{}]".to_owned()));
    }

    #[test]
    fn created_database_can_be_reopened() {
        let dir = tempfile::tempdir().unwrap();
        let loc = DirLocation::new(dir.path().join("xpns"));

        let storage = DbStorage::create(&loc).unwrap();
        storage.save("users", "[]").unwrap();
        drop(storage);

        let storage = DbStorage::open(&loc).unwrap();
        check!(storage.load("users").unwrap() == Some("[]".to_owned()));
    }

    #[test]
    fn missing_schema_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DbStorage::open(&DirLocation::new(dir.path())).unwrap();

        let_assert!(Err(e) = storage.save("k", "v"));
        check!(e.kind() == ErrorKind::Persistence);
    }
}
