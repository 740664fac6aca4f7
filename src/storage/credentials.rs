// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded credential database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `credentials`: key → raw bytes
//!   - `session_key`: PKCS#8 PEM of the local session key
//!   - `delegation`: JSON-encoded delegation chain

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::StorageResult;

const CREDENTIALS: TableDefinition<&str, &[u8]> = TableDefinition::new("credentials");

pub const SESSION_KEY: &str = "session_key";
pub const DELEGATION: &str = "delegation";

pub struct CredentialDatabase {
    db: Database,
}

impl CredentialDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create the table so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CREDENTIALS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CREDENTIALS)?;
        Ok(table.get(key)?.map(|value| value.value().to_vec()))
    }

    pub fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CREDENTIALS)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CREDENTIALS)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Drop every stored credential.
    pub fn clear(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        write_txn.delete_table(CREDENTIALS)?;
        {
            let _ = write_txn.open_table(CREDENTIALS)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_db() -> (CredentialDatabase, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = CredentialDatabase::open(&dir.path().join("icp.redb")).unwrap();
        (db, dir)
    }

    #[test]
    fn put_and_get() {
        let (db, _dir) = temp_db();
        db.put(SESSION_KEY, b"pem bytes").unwrap();
        assert_eq!(db.get(SESSION_KEY).unwrap(), Some(b"pem bytes".to_vec()));
        assert_eq!(db.get(DELEGATION).unwrap(), None);
    }

    #[test]
    fn remove_deletes_one_entry() {
        let (db, _dir) = temp_db();
        db.put(SESSION_KEY, b"k").unwrap();
        db.put(DELEGATION, b"d").unwrap();
        db.remove(DELEGATION).unwrap();

        assert_eq!(db.get(DELEGATION).unwrap(), None);
        assert!(db.get(SESSION_KEY).unwrap().is_some());
    }

    #[test]
    fn clear_drops_all_entries_and_stays_usable() {
        let (db, _dir) = temp_db();
        db.put(SESSION_KEY, b"k").unwrap();
        db.put(DELEGATION, b"d").unwrap();
        db.clear().unwrap();

        assert_eq!(db.get(SESSION_KEY).unwrap(), None);
        assert_eq!(db.get(DELEGATION).unwrap(), None);

        db.put(DELEGATION, b"again").unwrap();
        assert_eq!(db.get(DELEGATION).unwrap(), Some(b"again".to_vec()));
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("icp.redb");
        {
            let db = CredentialDatabase::open(&path).unwrap();
            db.put(SESSION_KEY, b"persisted").unwrap();
        }
        let db = CredentialDatabase::open(&path).unwrap();
        assert_eq!(db.get(SESSION_KEY).unwrap(), Some(b"persisted".to_vec()));
    }
}
