//! In-memory storage service
//!
//! HashMap-backed implementation of [`StorageService`] used by the engine's
//! tests and by local dry runs. Mirrors the HTTP service's contract,
//! including the not-found and already-exists error shapes.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::StorageService;
use crate::error::{ClientError, Result};
use gantry_core::dto::session::FolderEntry;

#[derive(Debug, Default)]
struct Folder {
    dirs: HashSet<String>,
    files: HashMap<String, Vec<u8>>,
}

/// In-memory implementation of [`StorageService`]
///
/// Uses `Arc<Mutex<..>>` for thread-safe access across tasks; clones share
/// the same underlying folders.
#[derive(Debug, Clone, Default)]
pub struct MemoryFolderService {
    folders: Arc<Mutex<HashMap<String, Folder>>>,
}

impl MemoryFolderService {
    /// Creates a new, empty in-memory storage service
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a file exists, without going through the error contract
    pub fn has_file(&self, folder: &str, path: &str) -> bool {
        let folders = self.folders.lock().unwrap();
        folders
            .get(folder)
            .map(|f| f.files.contains_key(path))
            .unwrap_or(false)
    }
}

#[async_trait]
impl StorageService for MemoryFolderService {
    async fn create_folder(&self, name: &str) -> Result<()> {
        let mut folders = self.folders.lock().unwrap();
        if folders.contains_key(name) {
            return Err(ClientError::AlreadyExists(name.to_string()));
        }
        folders.insert(name.to_string(), Folder::default());
        Ok(())
    }

    async fn delete_folder(&self, name: &str) -> Result<()> {
        let mut folders = self.folders.lock().unwrap();
        if folders.remove(name).is_none() {
            return Err(ClientError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn list_folders(&self) -> Result<Vec<String>> {
        let folders = self.folders.lock().unwrap();
        let mut names: Vec<String> = folders.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn mkdir(&self, folder: &str, path: &str) -> Result<()> {
        let mut folders = self.folders.lock().unwrap();
        let entry = folders
            .get_mut(folder)
            .ok_or_else(|| ClientError::NotFound(folder.to_string()))?;
        if !entry.dirs.insert(path.to_string()) {
            return Err(ClientError::AlreadyExists(format!("{}/{}", folder, path)));
        }
        Ok(())
    }

    async fn list_entries(&self, folder: &str, path: &str) -> Result<Vec<FolderEntry>> {
        let folders = self.folders.lock().unwrap();
        let entry = folders
            .get(folder)
            .ok_or_else(|| ClientError::NotFound(folder.to_string()))?;

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path.trim_end_matches('/'))
        };

        let mut out = Vec::new();
        for dir in &entry.dirs {
            if let Some(rest) = dir.strip_prefix(&prefix) {
                if !rest.is_empty() && !rest.contains('/') {
                    out.push(FolderEntry {
                        name: rest.to_string(),
                        is_dir: true,
                    });
                }
            }
        }
        for file in entry.files.keys() {
            if let Some(rest) = file.strip_prefix(&prefix) {
                if !rest.is_empty() && !rest.contains('/') {
                    out.push(FolderEntry {
                        name: rest.to_string(),
                        is_dir: false,
                    });
                }
            }
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn upload(&self, folder: &str, path: &str, bytes: &[u8]) -> Result<()> {
        let mut folders = self.folders.lock().unwrap();
        let entry = folders
            .get_mut(folder)
            .ok_or_else(|| ClientError::NotFound(folder.to_string()))?;
        entry.files.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn download(&self, folder: &str, path: &str) -> Result<Vec<u8>> {
        let folders = self.folders.lock().unwrap();
        let entry = folders
            .get(folder)
            .ok_or_else(|| ClientError::NotFound(folder.to_string()))?;
        entry
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("{}/{}", folder, path)))
    }
}
