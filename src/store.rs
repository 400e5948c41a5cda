// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Persistence of collected and merged documents.

use crate::error::StoreError;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::debug;

/// Blob store addressed by document name
pub trait InventoryStore: Send + Sync {
    fn put(&self, name: &str, document: &Value) -> Result<(), StoreError>;
}

/// Writes each document as pretty-printed `<dir>/<name>.json`
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl InventoryStore for JsonFileStore {
    fn put(&self, name: &str, document: &Value) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name);

        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, document)?;
        writer.flush()?;

        debug!(path = %path.display(), "Wrote document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let document = json!({"clusters": [{"id": "c1"}]});

        store.put("clusters", &document).unwrap();

        let written = fs::read_to_string(dir.path().join("clusters.json")).unwrap();
        let parsed: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, document);
        assert!(written.contains('\n'));
    }

    #[test]
    fn test_put_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("run-1");
        let store = JsonFileStore::new(&nested);

        store.put("nodes", &json!({})).unwrap();

        assert!(nested.join("nodes.json").exists());
    }

    #[test]
    fn test_put_overwrites_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store.put("pods", &json!({"pods": [1, 2]})).unwrap();
        store.put("pods", &json!({"pods": []})).unwrap();

        let parsed: Value =
            serde_json::from_str(&fs::read_to_string(store.path_for("pods")).unwrap()).unwrap();
        assert_eq!(parsed, json!({"pods": []}));
    }
}
