pub mod keyring;
pub mod local;
pub mod remote;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::core::collection::{self, CollectionInfo};
use crate::core::item::Item;

use local::LocalStore;
use remote::RemoteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no such collection: {0}")]
    NotFound(String),
    #[error("authorization failed")]
    Unauthorized,
    #[error("collection is read-only")]
    ReadOnly,
    #[error("service error: {0}")]
    Http(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed collection data: {0}")]
    Format(#[from] serde_json::Error),
}

/// An open collection: its identity plus the current item snapshot.
/// Items are sorted and exclude tombstones. Dropping the snapshot is all it
/// takes to "close" the collection; nothing is held open behind it.
#[derive(Debug, Clone)]
pub struct Collection {
    pub info: CollectionInfo,
    pub items: Vec<Item>,
}

/// What a migration moved, including any ids the target store reassigned.
#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    pub collections: usize,
    pub items: usize,
    pub remapped: Vec<(String, String)>,
}

enum Backend {
    Local(LocalStore),
    Remote(RemoteStore),
}

/// Handle to whichever backing store is currently active. Cloning is cheap;
/// the handle is replaced wholesale (never mutated) when the user links or
/// unlinks an account, so clones captured by in-flight futures keep operating
/// on the store they started with.
#[derive(Clone)]
pub struct StoreManager {
    backend: Arc<Backend>,
}

impl fmt::Debug for StoreManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreManager")
            .field("backend", &self.describe())
            .finish()
    }
}

impl StoreManager {
    /// A store over local JSON files only.
    pub fn local(dir: &Path) -> Self {
        Self {
            backend: Arc::new(Backend::Local(LocalStore::new(dir))),
        }
    }

    /// A store backed by a linked account on the list service.
    pub fn linked(remote: RemoteStore) -> Self {
        Self {
            backend: Arc::new(Backend::Remote(remote)),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(*self.backend, Backend::Local(_))
    }

    pub fn describe(&self) -> &'static str {
        match *self.backend {
            Backend::Local(_) => "local",
            Backend::Remote(_) => "linked",
        }
    }

    pub async fn list_collections(&self) -> Result<Vec<CollectionInfo>, StoreError> {
        let mut infos = match &*self.backend {
            Backend::Local(store) => store.list()?,
            Backend::Remote(store) => store.list().await?,
        };
        collection::sort_collections(&mut infos);
        Ok(infos)
    }

    /// Create an empty collection with the given title and make it durable.
    /// The returned info is a summary only; the collection is opened lazily
    /// when the user selects it.
    pub async fn create_collection(&self, title: &str) -> Result<CollectionInfo, StoreError> {
        let id = collection::new_collection_id();
        match &*self.backend {
            Backend::Local(store) => store.create(&id, Some(title)),
            Backend::Remote(store) => store.create(&id, Some(title)).await,
        }
    }

    pub async fn delete_collection(&self, id: &str) -> Result<(), StoreError> {
        match &*self.backend {
            Backend::Local(store) => store.delete(id),
            Backend::Remote(store) => store.delete(id).await,
        }
    }

    pub async fn open_collection(&self, id: &str) -> Result<Collection, StoreError> {
        match &*self.backend {
            Backend::Local(store) => store.snapshot(id),
            Backend::Remote(store) => store.snapshot(id).await,
        }
    }

    pub async fn insert_item(&self, id: &str, text: &str) -> Result<(), StoreError> {
        let item = Item::new(text);
        match &*self.backend {
            Backend::Local(store) => store.insert_item(id, item),
            Backend::Remote(store) => store.insert_item(id, item).await,
        }
    }

    pub async fn delete_item(&self, id: &str, item_id: Uuid) -> Result<(), StoreError> {
        match &*self.backend {
            Backend::Local(store) => store.delete_item(id, item_id),
            Backend::Remote(store) => store.delete_item(id, item_id).await,
        }
    }

    /// Run a push/pull pass for one collection and return a fresh snapshot.
    /// The snapshot is taken only after pending changes are durable, so a
    /// caller that renders it can never observe state older than its own
    /// mutation.
    pub async fn synchronize(&self, id: &str) -> Result<Collection, StoreError> {
        match &*self.backend {
            Backend::Local(store) => store.snapshot(id),
            Backend::Remote(store) => store.synchronize(id).await,
        }
    }

    /// Recreate a collection with existing content, preserving item ids and
    /// creation times. The target may reassign the collection id; the final
    /// id is returned. Used by [`migrate`].
    async fn restore_collection(
        &self,
        id: &str,
        title: Option<&str>,
        items: &[Item],
    ) -> Result<String, StoreError> {
        match &*self.backend {
            Backend::Local(store) => {
                let info = store.create(id, title)?;
                for item in items {
                    store.insert_item(&info.id, item.clone())?;
                }
                Ok(info.id)
            }
            Backend::Remote(store) => {
                let info = store.create(id, title).await?;
                for item in items {
                    store.insert_item(&info.id, item.clone()).await?;
                }
                Ok(info.id)
            }
        }
    }
}

/// Move every collection in `from` into `to`. Titles, item text, item ids and
/// creation times are preserved; the target may reassign collection ids,
/// which is reported rather than hidden. Each collection is removed from the
/// source only once its copy is durable in the target, so a failure part-way
/// leaves the remainder where it was.
pub async fn migrate(
    from: &StoreManager,
    to: &StoreManager,
) -> Result<MigrationReport, StoreError> {
    let mut report = MigrationReport::default();

    for info in from.list_collections().await? {
        let collection = from.open_collection(&info.id).await?;
        let assigned = to
            .restore_collection(&info.id, info.title.as_deref(), &collection.items)
            .await?;

        log::info!(
            "Migrated collection {} ({} items){}",
            info.id,
            collection.items.len(),
            if assigned != info.id {
                format!(" -> {assigned}")
            } else {
                String::new()
            }
        );

        if assigned != info.id {
            report.remapped.push((info.id.clone(), assigned));
        }
        report.collections += 1;
        report.items += collection.items.len();

        from.delete_collection(&info.id).await?;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(dir: &Path) -> StoreManager {
        StoreManager::local(dir)
    }

    #[tokio::test]
    async fn create_then_list_shows_one_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = manager(dir.path());

        store.create_collection("Groceries").await.unwrap();

        let infos = store.list_collections().await.unwrap();
        let groceries: Vec<_> = infos
            .iter()
            .filter(|i| i.title.as_deref() == Some("Groceries"))
            .collect();
        assert_eq!(groceries.len(), 1);
    }

    #[tokio::test]
    async fn deleted_item_is_excluded_from_queries() {
        let dir = tempfile::tempdir().unwrap();
        let store = manager(dir.path());

        let info = store.create_collection("Chores").await.unwrap();
        store.insert_item(&info.id, "mow the lawn").await.unwrap();
        store.insert_item(&info.id, "dishes").await.unwrap();

        let open = store.open_collection(&info.id).await.unwrap();
        assert_eq!(open.items.len(), 2);

        let doomed = open.items[0].id;
        store.delete_item(&info.id, doomed).await.unwrap();

        let after = store.synchronize(&info.id).await.unwrap();
        assert_eq!(after.items.len(), 1);
        assert!(after.items.iter().all(|i| i.id != doomed));
    }

    #[tokio::test]
    async fn migration_preserves_content() {
        let src_dir = tempfile::tempdir().unwrap();
        let dst_dir = tempfile::tempdir().unwrap();
        let src = manager(src_dir.path());
        let dst = manager(dst_dir.path());

        let a = src.create_collection("Groceries").await.unwrap();
        src.insert_item(&a.id, "milk").await.unwrap();
        src.insert_item(&a.id, "eggs").await.unwrap();
        let b = src.create_collection("Movies").await.unwrap();
        src.insert_item(&b.id, "watch the classics").await.unwrap();

        let report = migrate(&src, &dst).await.unwrap();
        assert_eq!(report.collections, 2);
        assert_eq!(report.items, 3);

        // Source emptied, target has everything.
        assert!(src.list_collections().await.unwrap().is_empty());
        let infos = dst.list_collections().await.unwrap();
        assert_eq!(infos.len(), 2);

        let titles: Vec<_> = infos.iter().map(|i| i.label().to_string()).collect();
        assert!(titles.contains(&"Groceries".to_string()));
        assert!(titles.contains(&"Movies".to_string()));

        let groceries = infos
            .iter()
            .find(|i| i.title.as_deref() == Some("Groceries"))
            .unwrap();
        let open = dst.open_collection(&groceries.id).await.unwrap();
        let texts: Vec<_> = open.items.iter().map(|i| i.text.clone()).collect();
        assert_eq!(texts, vec!["milk".to_string(), "eggs".to_string()]);
    }

    #[tokio::test]
    async fn round_trip_migration_is_lossless() {
        let here = tempfile::tempdir().unwrap();
        let there = tempfile::tempdir().unwrap();
        let local = manager(here.path());
        let account = manager(there.path());

        let info = local.create_collection("Groceries").await.unwrap();
        local.insert_item(&info.id, "milk").await.unwrap();

        migrate(&local, &account).await.unwrap();
        migrate(&account, &local).await.unwrap();

        let infos = local.list_collections().await.unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].title.as_deref(), Some("Groceries"));

        let open = local.open_collection(&infos[0].id).await.unwrap();
        assert_eq!(open.items.len(), 1);
        assert_eq!(open.items[0].text, "milk");
    }
}
