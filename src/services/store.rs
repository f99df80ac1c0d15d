use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors surfaced by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("duplicate value for unique field `{0}`")]
    DuplicateKey(String),

    #[error("malformed document in `{collection}`: {reason}")]
    Corrupt {
        collection: &'static str,
        reason: String,
    },
}

/// The three document collections this service persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Events,
    Organizers,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Events => "events",
            Collection::Organizers => "organizers",
        }
    }
}

/// In-place document mutation, run under the store's per-entity
/// serialization point.
pub type Mutator = Box<dyn FnOnce(&mut Value) + Send>;

/// Generic document store consumed by the service layer.
///
/// Documents are JSON objects keyed by their `id` field. `find_all` returns
/// documents in no particular order; callers own ordering. The `update_with`
/// and `increment` operations are atomic with respect to each other and to
/// every other write on the same document, which is what closes the
/// read-modify-write races on review ratings and counters.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn find_by_id(&self, collection: Collection, id: &str)
        -> Result<Option<Value>, StoreError>;

    async fn find_all(&self, collection: Collection) -> Result<Vec<Value>, StoreError>;

    /// Documents whose top-level `field` equals `value`.
    async fn find_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError>;

    /// Insert a document (caller-set `id`), stamping creation timestamps.
    async fn insert(&self, collection: Collection, doc: Value) -> Result<Value, StoreError>;

    /// Insert, failing with `DuplicateKey` if another document already holds
    /// the same value for `unique_field`. Check and insert are one atomic
    /// step, the moral equivalent of a unique index.
    async fn insert_unique(
        &self,
        collection: Collection,
        doc: Value,
        unique_field: &str,
    ) -> Result<Value, StoreError>;

    /// Set the given top-level fields, refreshing `updated_at`.
    /// Returns false when no document has that id.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<bool, StoreError>;

    /// Apply an arbitrary mutation to one document under the write lock,
    /// refreshing `updated_at`. Returns false when no document has that id.
    async fn update_with(
        &self,
        collection: Collection,
        id: &str,
        mutator: Mutator,
    ) -> Result<bool, StoreError>;

    /// Push a value onto a top-level array field (created if missing).
    async fn append_to_list(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<bool, StoreError>;

    /// Atomically add `delta` to an integer field (missing counts as 0) and
    /// return the new value. None when no document has that id.
    async fn increment(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<Option<i64>, StoreError>;
}

#[derive(Default)]
struct Collections {
    users: HashMap<String, Value>,
    events: HashMap<String, Value>,
    organizers: HashMap<String, Value>,
}

impl Collections {
    fn map(&self, collection: Collection) -> &HashMap<String, Value> {
        match collection {
            Collection::Users => &self.users,
            Collection::Events => &self.events,
            Collection::Organizers => &self.organizers,
        }
    }

    fn map_mut(&mut self, collection: Collection) -> &mut HashMap<String, Value> {
        match collection {
            Collection::Users => &mut self.users,
            Collection::Events => &mut self.events,
            Collection::Organizers => &mut self.organizers,
        }
    }
}

/// In-memory document store behind a `tokio::sync::RwLock`.
///
/// Every write takes the write lock for its full duration, so each document
/// mutation is serialized; that is the concurrency guarantee the Repository
/// contract asks for. Injected as `Arc<dyn Repository>` at startup.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn now_value() -> Value {
    serde_json::to_value(Utc::now()).expect("timestamp serializes")
}

fn doc_id(collection: Collection, doc: &Value) -> Result<String, StoreError> {
    doc.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::Corrupt {
            collection: collection.as_str(),
            reason: "document is missing a string `id`".to_string(),
        })
}

fn stamp(doc: &mut Value, create: bool) {
    if let Some(obj) = doc.as_object_mut() {
        if create {
            obj.insert("created_at".to_string(), now_value());
        }
        obj.insert("updated_at".to_string(), now_value());
    }
}

#[async_trait]
impl Repository for MemoryStore {
    async fn find_by_id(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Value>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.map(collection).get(id).cloned())
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.map(collection).values().cloned().collect())
    }

    async fn find_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .map(collection)
            .values()
            .filter(|doc| doc.get(field) == Some(value))
            .cloned()
            .collect())
    }

    async fn insert(&self, collection: Collection, mut doc: Value) -> Result<Value, StoreError> {
        let id = doc_id(collection, &doc)?;
        stamp(&mut doc, true);
        let mut inner = self.inner.write().await;
        inner.map_mut(collection).insert(id, doc.clone());
        Ok(doc)
    }

    async fn insert_unique(
        &self,
        collection: Collection,
        mut doc: Value,
        unique_field: &str,
    ) -> Result<Value, StoreError> {
        let id = doc_id(collection, &doc)?;
        stamp(&mut doc, true);
        let needle = doc.get(unique_field).cloned().unwrap_or(Value::Null);

        let mut inner = self.inner.write().await;
        let map = inner.map_mut(collection);
        if map
            .values()
            .any(|existing| existing.get(unique_field) == Some(&needle))
        {
            return Err(StoreError::DuplicateKey(unique_field.to_string()));
        }
        map.insert(id, doc.clone());
        Ok(doc)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(doc) = inner.map_mut(collection).get_mut(id) else {
            return Ok(false);
        };
        if let Some(obj) = doc.as_object_mut() {
            for (key, value) in patch {
                obj.insert(key, value);
            }
        }
        stamp(doc, false);
        Ok(true)
    }

    async fn update_with(
        &self,
        collection: Collection,
        id: &str,
        mutator: Mutator,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(doc) = inner.map_mut(collection).get_mut(id) else {
            return Ok(false);
        };
        mutator(doc);
        stamp(doc, false);
        Ok(true)
    }

    async fn append_to_list(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(doc) = inner.map_mut(collection).get_mut(id) else {
            return Ok(false);
        };
        if let Some(obj) = doc.as_object_mut() {
            let list = obj.entry(field.to_string()).or_insert_with(|| Value::Array(vec![]));
            if let Some(items) = list.as_array_mut() {
                items.push(value);
            }
        }
        stamp(doc, false);
        Ok(true)
    }

    async fn increment(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<Option<i64>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(doc) = inner.map_mut(collection).get_mut(id) else {
            return Ok(None);
        };
        let mut next = delta;
        if let Some(obj) = doc.as_object_mut() {
            let current = obj.get(field).and_then(Value::as_i64).unwrap_or(0);
            next = current + delta;
            obj.insert(field.to_string(), Value::from(next));
        }
        stamp(doc, false);
        Ok(Some(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn user_doc(id: &str, email: &str) -> Value {
        json!({ "id": id, "name": "Ada", "email": email })
    }

    #[tokio::test]
    async fn insert_and_find() {
        let store = MemoryStore::new();
        let stored = store
            .insert(Collection::Users, user_doc("u1", "ada@example.com"))
            .await
            .unwrap();
        assert!(stored.get("created_at").is_some());

        let found = store
            .find_by_id(Collection::Users, "u1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["email"], "ada@example.com");

        let by_email = store
            .find_eq(Collection::Users, "email", &json!("ada@example.com"))
            .await
            .unwrap();
        assert_eq!(by_email.len(), 1);
    }

    #[tokio::test]
    async fn insert_unique_rejects_duplicates() {
        let store = MemoryStore::new();
        store
            .insert_unique(Collection::Users, user_doc("u1", "ada@example.com"), "email")
            .await
            .unwrap();

        let err = store
            .insert_unique(Collection::Users, user_doc("u2", "ada@example.com"), "email")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(field) if field == "email"));

        // The duplicate never landed.
        assert!(store
            .find_by_id(Collection::Users, "u2")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn update_refreshes_updated_at_only() {
        let store = MemoryStore::new();
        let stored = store
            .insert(Collection::Users, user_doc("u1", "ada@example.com"))
            .await
            .unwrap();
        let created = stored["created_at"].clone();

        let mut patch = Map::new();
        patch.insert("name".to_string(), json!("Grace"));
        assert!(store.update(Collection::Users, "u1", patch).await.unwrap());

        let doc = store
            .find_by_id(Collection::Users, "u1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc["name"], "Grace");
        assert_eq!(doc["created_at"], created);

        let mut patch = Map::new();
        patch.insert("name".to_string(), json!("x"));
        assert!(!store.update(Collection::Users, "missing", patch).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_increments_all_land() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert(Collection::Events, json!({ "id": "e1", "attendees": 0 }))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .increment(Collection::Events, "e1", "attendees", 1)
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let doc = store
            .find_by_id(Collection::Events, "e1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc["attendees"], 50);
    }

    #[tokio::test]
    async fn concurrent_update_with_serializes() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert(Collection::Events, json!({ "id": "e1", "reviews": [] }))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .update_with(
                        Collection::Events,
                        "e1",
                        Box::new(move |doc| {
                            let reviews = doc["reviews"].as_array_mut().unwrap();
                            reviews.push(json!({ "n": i }));
                            // Derived field computed from the full list while
                            // still holding the lock.
                            doc["count"] = json!(reviews.len());
                        }),
                    )
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let doc = store
            .find_by_id(Collection::Events, "e1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc["reviews"].as_array().unwrap().len(), 20);
        assert_eq!(doc["count"], 20);
    }

    #[tokio::test]
    async fn append_to_list_creates_missing_field() {
        let store = MemoryStore::new();
        store
            .insert(Collection::Users, user_doc("u1", "ada@example.com"))
            .await
            .unwrap();

        assert!(store
            .append_to_list(Collection::Users, "u1", "savedEvents", json!("e1"))
            .await
            .unwrap());

        let doc = store
            .find_by_id(Collection::Users, "u1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc["savedEvents"], json!(["e1"]));
    }

    #[tokio::test]
    async fn insert_requires_id() {
        let store = MemoryStore::new();
        let err = store
            .insert(Collection::Users, json!({ "name": "no id" }))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }
}
