use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::collection::{self, CollectionInfo};
use crate::core::item::{self, Item};

use super::{Collection, StoreError};

/// On-disk form of one collection: a single JSON file per collection under
/// the lists directory, tombstoned items included.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCollection {
    id: String,
    title: Option<String>,
    mtime: NaiveDateTime,
    items: Vec<Item>,
}

/// Backing store for the unlinked state. Local collections are always
/// writable; "synchronizing" one is just re-reading the file, since every
/// mutation is written through before it returns.
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// The directory is created lazily by the config bootstrap; a missing
    /// directory surfaces as an I/O error on first use, not here.
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn load(&self, id: &str) -> Result<StoredCollection, StoreError> {
        let path = self.path(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn write(&self, stored: &StoredCollection) -> Result<(), StoreError> {
        let data = serde_json::to_string_pretty(stored)?;
        std::fs::write(self.path(&stored.id), data)?;
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<CollectionInfo>, StoreError> {
        let mut infos = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let data = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<StoredCollection>(&data) {
                Ok(stored) => infos.push(info_of(&stored)),
                Err(e) => {
                    log::warn!("Skipping unreadable collection file {:?}: {}", path, e);
                }
            }
        }
        Ok(infos)
    }

    /// Create an empty collection. If the requested id is already taken the
    /// store assigns a fresh one, mirroring what the linked service does.
    pub fn create(&self, id: &str, title: Option<&str>) -> Result<CollectionInfo, StoreError> {
        let id = if self.path(id).exists() {
            collection::new_collection_id()
        } else {
            id.to_string()
        };
        let stored = StoredCollection {
            id,
            title: title.map(str::to_string),
            mtime: chrono::Local::now().naive_local(),
            items: Vec::new(),
        };
        self.write(&stored)?;
        Ok(info_of(&stored))
    }

    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let path = self.path(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        std::fs::remove_file(path)?;
        Ok(())
    }

    pub fn snapshot(&self, id: &str) -> Result<Collection, StoreError> {
        let stored = self.load(id)?;
        let mut items: Vec<Item> = stored.items.iter().filter(|i| !i.deleted).cloned().collect();
        item::sort_items(&mut items);
        Ok(Collection {
            info: info_of(&stored),
            items,
        })
    }

    pub fn insert_item(&self, id: &str, item: Item) -> Result<(), StoreError> {
        let mut stored = self.load(id)?;
        stored.items.push(item);
        stored.mtime = chrono::Local::now().naive_local();
        self.write(&stored)
    }

    pub fn delete_item(&self, id: &str, item_id: Uuid) -> Result<(), StoreError> {
        let mut stored = self.load(id)?;
        match stored.items.iter_mut().find(|i| i.id == item_id) {
            Some(item) => item.deleted = true,
            None => {
                // Already gone; deleting twice is not an error.
                log::debug!("Delete of unknown item {} in {}", item_id, id);
                return Ok(());
            }
        }
        stored.mtime = chrono::Local::now().naive_local();
        self.write(&stored)
    }
}

fn info_of(stored: &StoredCollection) -> CollectionInfo {
    CollectionInfo {
        id: stored.id.clone(),
        title: stored.title.clone(),
        mtime: Some(stored.mtime),
        writable: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn create_assigns_fresh_id_on_collision() {
        let (_dir, store) = store();
        let first = store.create("same", Some("one")).unwrap();
        let second = store.create("same", Some("two")).unwrap();
        assert_eq!(first.id, "same");
        assert_ne!(second.id, "same");
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn tombstone_survives_on_disk_but_not_in_snapshot() {
        let (_dir, store) = store();
        let info = store.create("c1", Some("Chores")).unwrap();
        let item = Item::new("sweep");
        let item_id = item.id;
        store.insert_item(&info.id, item).unwrap();

        store.delete_item(&info.id, item_id).unwrap();

        let snapshot = store.snapshot(&info.id).unwrap();
        assert!(snapshot.items.is_empty());

        // The tombstone is still recorded in the file.
        let raw = std::fs::read_to_string(store.path(&info.id)).unwrap();
        assert!(raw.contains(&item_id.to_string()));
    }

    #[test]
    fn deleting_a_missing_item_is_a_no_op() {
        let (_dir, store) = store();
        let info = store.create("c1", None).unwrap();
        store.delete_item(&info.id, Uuid::new_v4()).unwrap();
    }

    #[test]
    fn missing_collection_is_not_found() {
        let (_dir, store) = store();
        assert!(matches!(
            store.snapshot("nope"),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(store.delete("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn unreadable_files_are_skipped_in_listing() {
        let (dir, store) = store();
        store.create("good", Some("Good")).unwrap();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();

        let infos = store.list().unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].id, "good");
    }
}
