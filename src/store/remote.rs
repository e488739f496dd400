//! Remote document-store implementation of the character store.
//!
//! # What this module is
//! A thin client for the external managed document store's REST surface.
//! Documents live in hierarchical collections (`users/{uid}` with a
//! `characters` subcollection); the store assigns document ids and stamps
//! every write with an `updateTime`.
//!
//! # What this module is NOT
//! It is not a storage engine. Replication, indexing, and durability all
//! belong to the external service; this adapter owns transport details
//! only: request serialization, status mapping, and JSON decoding.
//!
//! # Consistency
//! `update_inventory` is a read-then-write. The write carries the read
//! document's `updateTime` as an `If-Match` precondition, so a concurrent
//! writer causes a precondition failure instead of a silent lost update.
//! There is no retry; the failure surfaces to the caller.
//!
//! # Error mapping
//! - HTTP 404 on a document read maps to `StoreError::NotFound`.
//! - HTTP 412 (precondition failed) and any other non-success status map to
//!   `StoreError::Unavailable`.
//! - Transport errors map to `StoreError::Unavailable`.
use super::{CharacterStore, StoreError, StoreResult};
use crate::model::inventory::merge_stack;
use crate::model::{Character, CharacterRecord, ItemStack};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the remote document store.
#[derive(Debug, Clone)]
pub struct RemoteStoreConfig {
    /// Root of the store's document tree, without a trailing slash.
    pub base_url: String,
    pub request_timeout: Duration,
}

impl RemoteStoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// A character document as the store returns it. The id and write stamp
/// live in the envelope, not in the document body.
#[derive(Debug, Deserialize)]
struct Document {
    id: String,
    data: StoredCharacter,
    #[serde(rename = "updateTime")]
    update_time: String,
}

#[derive(Debug, Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<Document>,
}

/// Stored body of a character document.
///
/// `inventory` is optional on read: documents written by earlier versions
/// of the service can lack the field, and callers of `update_inventory`
/// must see that as a malformed record rather than an empty inventory.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCharacter {
    name: String,
    level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    inventory: Option<Vec<ItemStack>>,
}

#[derive(Debug, Serialize)]
struct WriteRequest<T: Serialize> {
    data: T,
}

/// Character store backed by the remote document service.
pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteStore {
    /// Build a store client with an explicit request timeout.
    ///
    /// # Errors
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(config: &RemoteStoreConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("build document store client")?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn user_url(&self, uid: &str) -> String {
        format!("{}/users/{uid}", self.base_url)
    }

    fn collection_url(&self, uid: &str) -> String {
        format!("{}/users/{uid}/characters", self.base_url)
    }

    fn document_url(&self, uid: &str, id: &str) -> String {
        format!("{}/users/{uid}/characters/{id}", self.base_url)
    }

    /// Merge-write the user document's `timeChanged`, creating the user
    /// namespace if it does not exist yet.
    async fn touch_user(&self, uid: &str) -> StoreResult<()> {
        let body = WriteRequest {
            data: serde_json::json!({ "timeChanged": Utc::now().to_rfc3339() }),
        };
        let response = self
            .client
            .patch(self.user_url(uid))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        expect_success(response.status(), "touch user")?;
        Ok(())
    }

    async fn fetch_document(&self, uid: &str, id: &str) -> StoreResult<Option<Document>> {
        let response = self
            .client
            .get(self.document_url(uid, id))
            .send()
            .await
            .map_err(transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        expect_success(response.status(), "fetch character")?;
        let document = response.json::<Document>().await.map_err(transport)?;
        Ok(Some(document))
    }
}

#[async_trait]
impl CharacterStore for RemoteStore {
    async fn create_character(&self, uid: &str, name: &str) -> StoreResult<CharacterRecord> {
        self.touch_user(uid).await?;

        let character = Character::new(name);
        let body = WriteRequest {
            data: StoredCharacter {
                name: character.name.clone(),
                level: character.level,
                inventory: Some(character.inventory.clone()),
            },
        };
        let response = self
            .client
            .post(self.collection_url(uid))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        expect_success(response.status(), "create character")?;
        let document = response.json::<Document>().await.map_err(transport)?;
        metrics::counter!("roster_character_changes_total", "op" => "created").increment(1);
        Ok(CharacterRecord::from_character(document.id, character))
    }

    async fn list_characters(&self, uid: &str) -> StoreResult<Vec<CharacterRecord>> {
        let response = self
            .client
            .get(self.collection_url(uid))
            .send()
            .await
            .map_err(transport)?;
        // A user with no characters may not have a namespace yet; the store
        // reports that as 404 and we report it as an empty list.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        expect_success(response.status(), "list characters")?;
        let list = response.json::<DocumentList>().await.map_err(transport)?;
        Ok(list.documents.into_iter().map(into_record).collect())
    }

    async fn get_character(&self, uid: &str, id: &str) -> StoreResult<Option<CharacterRecord>> {
        Ok(self.fetch_document(uid, id).await?.map(into_record))
    }

    async fn update_inventory(
        &self,
        uid: &str,
        id: &str,
        delta: ItemStack,
    ) -> StoreResult<Vec<ItemStack>> {
        let document = self
            .fetch_document(uid, id)
            .await?
            .ok_or_else(|| StoreError::NotFound("character".into()))?;
        let mut inventory = document
            .data
            .inventory
            .ok_or_else(|| StoreError::NotFound("character record has no inventory".into()))?;
        merge_stack(&mut inventory, delta);

        let body = WriteRequest {
            data: serde_json::json!({ "inventory": inventory }),
        };
        let response = self
            .client
            .patch(self.document_url(uid, id))
            .header(reqwest::header::IF_MATCH, document.update_time)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(StoreError::NotFound("character".into()));
            }
            StatusCode::PRECONDITION_FAILED => {
                return Err(StoreError::Unavailable(anyhow!(
                    "inventory write lost a race with a concurrent update"
                )));
            }
            status => expect_success(status, "write inventory")?,
        }
        metrics::counter!("roster_inventory_updates_total").increment(1);
        Ok(inventory)
    }

    async fn delete_character(&self, uid: &str, id: &str) -> StoreResult<()> {
        let response = self
            .client
            .delete(self.document_url(uid, id))
            .send()
            .await
            .map_err(transport)?;
        // Store-level deletes are idempotent; an absent document is fine.
        if response.status() != StatusCode::NOT_FOUND {
            expect_success(response.status(), "delete character")?;
        }
        metrics::counter!("roster_character_changes_total", "op" => "deleted").increment(1);
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(transport)?;
        expect_success(response.status(), "store health probe")?;
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "remote"
    }
}

fn into_record(document: Document) -> CharacterRecord {
    CharacterRecord {
        id: document.id,
        name: document.data.name,
        level: document.data.level,
        inventory: document.data.inventory.unwrap_or_default(),
    }
}

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::Unavailable(anyhow::Error::new(err).context("document store request failed"))
}

fn expect_success(status: StatusCode, op: &str) -> StoreResult<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(StoreError::Unavailable(anyhow!(
            "document store returned {status} during {op}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, State};
    use axum::http::HeaderMap;
    use axum::response::IntoResponse;
    use axum::routing::{get, patch};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    /// A deterministic stand-in for the managed document store, small enough
    /// to keep these tests hermetic. Documents are (data, version) pairs;
    /// version doubles as the `updateTime` stamp.
    #[derive(Default)]
    struct FakeStore {
        users: HashMap<String, Value>,
        characters: HashMap<(String, String), (Value, u64)>,
        next_id: u64,
        /// When set, every read bumps the document version after serving,
        /// simulating a writer that lands between a read and its write.
        bump_after_read: bool,
    }

    type Shared = Arc<Mutex<FakeStore>>;

    fn doc_json(id: &str, data: &Value, version: u64) -> Value {
        json!({ "id": id, "data": data, "updateTime": version.to_string() })
    }

    async fn patch_user(
        State(state): State<Shared>,
        Path(uid): Path<String>,
        Json(body): Json<Value>,
    ) -> StatusCode {
        let mut store = state.lock().unwrap();
        let entry = store.users.entry(uid).or_insert_with(|| json!({}));
        if let (Some(entry), Some(incoming)) = (entry.as_object_mut(), body["data"].as_object()) {
            for (key, value) in incoming {
                entry.insert(key.clone(), value.clone());
            }
        }
        StatusCode::OK
    }

    async fn create_character(
        State(state): State<Shared>,
        Path(uid): Path<String>,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        let mut store = state.lock().unwrap();
        store.next_id += 1;
        let id = format!("c{}", store.next_id);
        let data = body["data"].clone();
        store
            .characters
            .insert((uid, id.clone()), (data.clone(), 1));
        (StatusCode::CREATED, Json(doc_json(&id, &data, 1)))
    }

    async fn list_characters(
        State(state): State<Shared>,
        Path(uid): Path<String>,
    ) -> impl IntoResponse {
        let store = state.lock().unwrap();
        if !store.users.contains_key(&uid) {
            return StatusCode::NOT_FOUND.into_response();
        }
        let documents: Vec<Value> = store
            .characters
            .iter()
            .filter(|((owner, _), _)| *owner == uid)
            .map(|((_, id), (data, version))| doc_json(id, data, *version))
            .collect();
        Json(json!({ "documents": documents })).into_response()
    }

    async fn get_character(
        State(state): State<Shared>,
        Path((uid, id)): Path<(String, String)>,
    ) -> impl IntoResponse {
        let mut store = state.lock().unwrap();
        let bump = store.bump_after_read;
        match store.characters.get_mut(&(uid, id.clone())) {
            Some((data, version)) => {
                let snapshot = doc_json(&id, data, *version);
                if bump {
                    *version += 1;
                }
                Json(snapshot).into_response()
            }
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn patch_character(
        State(state): State<Shared>,
        Path((uid, id)): Path<(String, String)>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        let mut store = state.lock().unwrap();
        let Some((data, version)) = store.characters.get_mut(&(uid, id.clone())) else {
            return StatusCode::NOT_FOUND.into_response();
        };
        let expected = headers
            .get(reqwest::header::IF_MATCH)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        if expected.as_deref() != Some(version.to_string().as_str()) {
            return StatusCode::PRECONDITION_FAILED.into_response();
        }
        if let (Some(entry), Some(incoming)) = (data.as_object_mut(), body["data"].as_object()) {
            for (key, value) in incoming {
                entry.insert(key.clone(), value.clone());
            }
        }
        *version += 1;
        let snapshot = doc_json(&id, data, *version);
        Json(snapshot).into_response()
    }

    async fn delete_character(
        State(state): State<Shared>,
        Path((uid, id)): Path<(String, String)>,
    ) -> StatusCode {
        let mut store = state.lock().unwrap();
        store.characters.remove(&(uid, id));
        StatusCode::NO_CONTENT
    }

    async fn spawn_fake_store() -> (SocketAddr, Shared) {
        let shared: Shared = Arc::new(Mutex::new(FakeStore::default()));
        let app = Router::new()
            .route("/", get(|| async { StatusCode::OK }))
            .route("/users/:uid", patch(patch_user))
            .route(
                "/users/:uid/characters",
                get(list_characters).post(create_character),
            )
            .route(
                "/users/:uid/characters/:id",
                get(get_character)
                    .patch(patch_character)
                    .delete(delete_character),
            )
            .with_state(shared.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app.into_make_service()).await;
        });
        (addr, shared)
    }

    fn remote_store(addr: SocketAddr) -> RemoteStore {
        RemoteStore::new(&RemoteStoreConfig::new(format!("http://{addr}"))).expect("client")
    }

    fn stack(item_id: &str, item_count: u64) -> ItemStack {
        ItemStack {
            item_id: item_id.to_string(),
            item_count,
        }
    }

    #[tokio::test]
    async fn create_get_list_round_trip() {
        let (addr, fake) = spawn_fake_store().await;
        let store = remote_store(addr);

        let record = store.create_character("u1", "Aria").await.expect("create");
        assert_eq!(record.name, "Aria");
        assert_eq!(record.level, 1);
        assert!(record.inventory.is_empty());
        assert!(!record.id.is_empty());

        // The user namespace got its timeChanged stamp as part of create.
        assert!(fake.lock().unwrap().users["u1"]["timeChanged"].is_string());

        let fetched = store
            .get_character("u1", &record.id)
            .await
            .expect("get")
            .expect("present");
        assert_eq!(fetched, record);

        let listed = store.list_characters("u1").await.expect("list");
        assert_eq!(listed, vec![record]);
    }

    #[tokio::test]
    async fn list_for_unknown_user_is_empty() {
        let (addr, _fake) = spawn_fake_store().await;
        let store = remote_store(addr);
        let listed = store.list_characters("nobody").await.expect("list");
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn update_inventory_merges_and_honors_precondition() {
        let (addr, fake) = spawn_fake_store().await;
        let store = remote_store(addr);
        let record = store.create_character("u1", "Aria").await.expect("create");

        let inventory = store
            .update_inventory("u1", &record.id, stack("potion", 3))
            .await
            .expect("update");
        assert_eq!(inventory, vec![stack("potion", 3)]);

        // Each update re-reads, so the second write carries the fresh stamp.
        let inventory = store
            .update_inventory("u1", &record.id, stack("potion", 3))
            .await
            .expect("update");
        assert_eq!(inventory, vec![stack("potion", 6)]);

        let version = fake.lock().unwrap().characters[&("u1".to_string(), record.id.clone())].1;
        assert_eq!(version, 3);
    }

    #[tokio::test]
    async fn update_inventory_surfaces_lost_race_as_unavailable() {
        let (addr, fake) = spawn_fake_store().await;
        let store = remote_store(addr);
        let record = store.create_character("u1", "Aria").await.expect("create");

        // Simulate a writer landing between our read and our write: the
        // fake bumps the version right after serving the read, so the
        // If-Match stamp we send is already stale.
        fake.lock().unwrap().bump_after_read = true;
        let err = store
            .update_inventory("u1", &record.id, stack("potion", 1))
            .await
            .expect_err("stale precondition");
        assert!(matches!(err, StoreError::Unavailable(_)));

        // The contested write changed nothing.
        fake.lock().unwrap().bump_after_read = false;
        let fetched = store
            .get_character("u1", &record.id)
            .await
            .expect("get")
            .expect("present");
        assert!(fetched.inventory.is_empty());
    }

    #[tokio::test]
    async fn update_inventory_missing_character_is_not_found() {
        let (addr, _fake) = spawn_fake_store().await;
        let store = remote_store(addr);
        let err = store
            .update_inventory("u1", "missing", stack("potion", 1))
            .await
            .expect_err("missing");
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn document_without_inventory_field_is_not_found() {
        let (addr, fake) = spawn_fake_store().await;
        let store = remote_store(addr);

        // Seed a legacy document lacking the inventory field.
        fake.lock().unwrap().characters.insert(
            ("u1".to_string(), "legacy".to_string()),
            (json!({ "name": "Old", "level": 4 }), 1),
        );

        let err = store
            .update_inventory("u1", "legacy", stack("potion", 1))
            .await
            .expect_err("malformed record");
        assert!(matches!(err, StoreError::NotFound(_)));

        // Reads tolerate the missing field and surface an empty inventory.
        let record = store
            .get_character("u1", "legacy")
            .await
            .expect("get")
            .expect("present");
        assert!(record.inventory.is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (addr, _fake) = spawn_fake_store().await;
        let store = remote_store(addr);
        let record = store.create_character("u1", "Aria").await.expect("create");

        store
            .delete_character("u1", &record.id)
            .await
            .expect("delete");
        store
            .delete_character("u1", &record.id)
            .await
            .expect("repeat delete");
        assert!(store
            .get_character("u1", &record.id)
            .await
            .expect("get")
            .is_none());
    }

    #[tokio::test]
    async fn health_check_probes_the_base_url() {
        let (addr, _fake) = spawn_fake_store().await;
        let store = remote_store(addr);
        store.health_check().await.expect("health");
        assert!(store.is_durable());
        assert_eq!(store.backend_name(), "remote");
    }
}
