use chrono::NaiveDateTime;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::collection::CollectionInfo;
use crate::core::item::{self, Item};

use super::{Collection, StoreError};

/// A collection as the list service represents it on the wire. The service
/// owns the persistence format; this is only the JSON view it serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WireCollection {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub mtime: Option<NaiveDateTime>,
    #[serde(default = "default_writable")]
    pub writable: bool,
    #[serde(default)]
    pub items: Vec<Item>,
}

fn default_writable() -> bool {
    true
}

/// Minimal JSON client for the list service, used while an account is linked.
pub struct RemoteStore {
    base_url: String,
    username: String,
    password: String,
    http: Client,
}

impl RemoteStore {
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self, StoreError> {
        let http = Client::builder()
            .build()
            .map_err(|e| StoreError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collections_url(&self) -> String {
        format!("{}/collections", self.base_url)
    }

    fn collection_url(&self, id: &str) -> String {
        format!("{}/collections/{id}", self.base_url)
    }

    fn items_url(&self, id: &str) -> String {
        format!("{}/collections/{id}/items", self.base_url)
    }

    fn item_url(&self, id: &str, item_id: Uuid) -> String {
        format!("{}/collections/{id}/items/{item_id}", self.base_url)
    }

    /// Validate the account by listing collections once.
    pub async fn probe(&self) -> Result<(), StoreError> {
        self.list().await.map(|_| ())
    }

    pub async fn list(&self) -> Result<Vec<CollectionInfo>, StoreError> {
        let resp = self
            .http
            .get(self.collections_url())
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| StoreError::Http(format!("list failed: {e}")))?;
        check_status(resp.status(), &self.collections_url())?;

        let wires: Vec<WireCollection> = resp
            .json()
            .await
            .map_err(|e| StoreError::Http(format!("malformed listing: {e}")))?;
        Ok(wires.iter().map(info_of).collect())
    }

    /// Create an empty collection under the requested id. The service may
    /// assign a different id; the echoed collection is authoritative. A
    /// create-only PUT keeps a retried request from clobbering an existing
    /// collection; on an id collision the service picks a fresh id itself.
    pub async fn create(&self, id: &str, title: Option<&str>) -> Result<CollectionInfo, StoreError> {
        let body = WireCollection {
            id: id.to_string(),
            title: title.map(str::to_string),
            mtime: Some(chrono::Local::now().naive_local()),
            writable: true,
            items: Vec::new(),
        };
        let url = self.collection_url(id);
        let resp = self
            .http
            .put(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("If-None-Match", "*")
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Http(format!("create failed: {e}")))?;
        check_status(resp.status(), &url)?;

        let created: WireCollection = resp
            .json()
            .await
            .map_err(|e| StoreError::Http(format!("malformed create response: {e}")))?;
        Ok(info_of(&created))
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let url = self.collection_url(id);
        let resp = self
            .http
            .delete(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| StoreError::Http(format!("delete failed: {e}")))?;
        check_status(resp.status(), &url)
    }

    pub async fn snapshot(&self, id: &str) -> Result<Collection, StoreError> {
        let url = self.collection_url(id);
        let resp = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| StoreError::Http(format!("open failed: {e}")))?;
        check_status(resp.status(), &url)?;

        let wire: WireCollection = resp
            .json()
            .await
            .map_err(|e| StoreError::Http(format!("malformed collection: {e}")))?;
        Ok(snapshot_of(wire))
    }

    /// The service applies changes as they arrive, so a push/pull pass is a
    /// fresh fetch of the collection.
    pub async fn synchronize(&self, id: &str) -> Result<Collection, StoreError> {
        self.snapshot(id).await
    }

    pub async fn insert_item(&self, id: &str, item: Item) -> Result<(), StoreError> {
        let url = self.items_url(id);
        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&item)
            .send()
            .await
            .map_err(|e| StoreError::Http(format!("insert failed: {e}")))?;
        check_status(resp.status(), &url)
    }

    pub async fn delete_item(&self, id: &str, item_id: Uuid) -> Result<(), StoreError> {
        let url = self.item_url(id, item_id);
        let resp = self
            .http
            .delete(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| StoreError::Http(format!("item delete failed: {e}")))?;
        check_status(resp.status(), &url)
    }
}

fn info_of(wire: &WireCollection) -> CollectionInfo {
    CollectionInfo {
        id: wire.id.clone(),
        title: wire.title.clone(),
        mtime: wire.mtime,
        writable: wire.writable,
    }
}

fn snapshot_of(wire: WireCollection) -> Collection {
    let info = info_of(&wire);
    let mut items: Vec<Item> = wire.items.into_iter().filter(|i| !i.deleted).collect();
    item::sort_items(&mut items);
    Collection { info, items }
}

fn check_status(status: StatusCode, url: &str) -> Result<(), StoreError> {
    match status {
        StatusCode::UNAUTHORIZED => Err(StoreError::Unauthorized),
        StatusCode::FORBIDDEN => Err(StoreError::ReadOnly),
        StatusCode::NOT_FOUND => Err(StoreError::NotFound(url.to_string())),
        s if s.is_success() => Ok(()),
        s => Err(StoreError::Http(format!("{url} returned {s}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RemoteStore {
        RemoteStore::new("https://lists.example.com/api/", "ada", "secret").unwrap()
    }

    #[test]
    fn urls_are_built_from_a_trimmed_base() {
        let s = store();
        assert_eq!(s.base_url(), "https://lists.example.com/api");
        assert_eq!(
            s.collection_url("abc"),
            "https://lists.example.com/api/collections/abc"
        );
        let item = Uuid::nil();
        assert_eq!(
            s.item_url("abc", item),
            format!("https://lists.example.com/api/collections/abc/items/{item}")
        );
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            check_status(StatusCode::UNAUTHORIZED, "u"),
            Err(StoreError::Unauthorized)
        ));
        assert!(matches!(
            check_status(StatusCode::FORBIDDEN, "u"),
            Err(StoreError::ReadOnly)
        ));
        assert!(matches!(
            check_status(StatusCode::NOT_FOUND, "u"),
            Err(StoreError::NotFound(_))
        ));
        assert!(check_status(StatusCode::OK, "u").is_ok());
        assert!(check_status(StatusCode::CREATED, "u").is_ok());
        assert!(matches!(
            check_status(StatusCode::BAD_GATEWAY, "u"),
            Err(StoreError::Http(_))
        ));
    }

    #[test]
    fn wire_collection_round_trips() {
        let wire = WireCollection {
            id: crate::core::collection::new_collection_id(),
            title: Some("Groceries".to_string()),
            mtime: Some(chrono::Local::now().naive_local()),
            writable: false,
            items: vec![Item::new("milk")],
        };
        let json = serde_json::to_string(&wire).unwrap();
        let back: WireCollection = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, wire.id);
        assert_eq!(back.title, wire.title);
        assert!(!back.writable);
        assert_eq!(back.items.len(), 1);
        assert_eq!(back.items[0].text, "milk");
    }

    #[test]
    fn writability_defaults_to_true_when_absent() {
        let wire: WireCollection = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert!(wire.writable);
        assert!(wire.items.is_empty());
    }

    #[test]
    fn snapshot_drops_tombstones_and_sorts() {
        let mut dead = Item::new("dead");
        dead.deleted = true;
        let wire = WireCollection {
            id: "abc".to_string(),
            title: None,
            mtime: None,
            writable: true,
            items: vec![Item::new("alive"), dead],
        };
        let snapshot = snapshot_of(wire);
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].text, "alive");
    }
}
