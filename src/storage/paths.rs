// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the local state layout.

use std::path::{Path, PathBuf};

/// Default directory for locally persisted client state.
pub const DATA_ROOT: &str = ".wegrow";

/// Storage path utilities for local client state.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Key-value store file.
    pub fn local_storage(&self) -> PathBuf {
        self.root.join("local_storage.json")
    }

    /// Embedded credential database.
    pub fn credential_db(&self) -> PathBuf {
        self.root.join("icp.redb")
    }
}
