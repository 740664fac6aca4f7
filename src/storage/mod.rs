// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Local State Module
//!
//! Client-side persisted state. Nothing here is authoritative; the remote
//! service owns all durable application data.
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   local_storage.json   # Key-value store (activity marker, client prefs)
//!   icp.redb             # Credential database (session key, delegation)
//! ```
//!
//! Sign-out and anonymous detection clear both wholesale; there is no
//! partial clear.

pub mod credentials;
pub mod local;
pub mod paths;

use std::sync::Arc;

pub use credentials::CredentialDatabase;
pub use local::KeyValueStore;
pub use paths::StoragePaths;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("storage lock poisoned")]
    Poisoned,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Handles to every piece of locally persisted state.
#[derive(Clone)]
pub struct LocalState {
    storage: Arc<KeyValueStore>,
    credentials: Arc<CredentialDatabase>,
}

impl LocalState {
    pub fn open(paths: &StoragePaths) -> StorageResult<Self> {
        std::fs::create_dir_all(paths.root())?;
        Ok(Self {
            storage: Arc::new(KeyValueStore::open(paths.local_storage())?),
            credentials: Arc::new(CredentialDatabase::open(&paths.credential_db())?),
        })
    }

    pub fn storage(&self) -> &Arc<KeyValueStore> {
        &self.storage
    }

    pub fn credentials(&self) -> &Arc<CredentialDatabase> {
        &self.credentials
    }

    /// Wipe the key-value store and the credential database.
    pub fn clear_all(&self) -> StorageResult<()> {
        self.storage.clear()?;
        self.credentials.clear()?;
        tracing::info!("Cleared local session state");
        Ok(())
    }
}
