use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use log::*;
use serde_json::{Map, Value};
use sse::{Changeable, RangeQuery, CREATED_BETWEEN, UPDATED_BETWEEN};
use std::sync::Arc;
use uuid::Uuid;

pub type DocumentId = Uuid;

/// In-memory documents stamped with their creation and last modification
/// time, queryable by either stamp.
///
/// Range queries select stamps in `[start_at, end_at]`. A write stamped in the
/// millisecond a poll used as its `end_at`, but stored after that poll ran, is
/// picked up by the next poll. Documents stamped exactly on a poll boundary
/// may arrive twice.
#[derive(Clone)]
pub struct Journal {
    collection_name: String,
    entries: Arc<DashMap<DocumentId, Entry>>,
}

#[derive(Debug, Clone)]
struct Entry {
    created_at: i64,
    updated_at: i64,
    fields: Map<String, Value>,
}

impl Entry {
    fn to_document(&self, id: &DocumentId) -> Value {
        let mut document = self.fields.clone();
        document.insert("id".to_string(), Value::String(id.to_string()));
        document.insert("created_at".to_string(), self.created_at.into());
        document.insert("updated_at".to_string(), self.updated_at.into());
        Value::Object(document)
    }

    fn stamp(&self, stamp: Stamp) -> i64 {
        match stamp {
            Stamp::Created => self.created_at,
            Stamp::Updated => self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Stamp {
    Created,
    Updated,
}

impl Journal {
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            collection_name: collection_name.into(),
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Stores a new document. Any `id` or stamp fields it carries are
    /// overwritten by the journal's own.
    pub fn insert(&self, fields: Map<String, Value>) -> Value {
        self.insert_at(fields, now())
    }

    /// Replaces the fields of an existing document, keeping its creation time.
    pub fn update(&self, id: &DocumentId, fields: Map<String, Value>) -> Option<Value> {
        self.update_at(id, fields, now())
    }

    /// Every document, oldest first.
    pub fn all(&self) -> Vec<Value> {
        self.select(Stamp::Created, |_| true)
    }

    fn insert_at(&self, fields: Map<String, Value>, at: i64) -> Value {
        let id = Uuid::new_v4();
        let entry = Entry {
            created_at: at,
            updated_at: at,
            fields,
        };
        let document = entry.to_document(&id);
        self.entries.insert(id, entry);

        debug!("Inserted document {id} into {}", self.collection_name);
        document
    }

    fn update_at(&self, id: &DocumentId, fields: Map<String, Value>, at: i64) -> Option<Value> {
        let mut entry = self.entries.get_mut(id)?;
        entry.fields = fields;
        entry.updated_at = at;

        debug!("Updated document {id} in {}", self.collection_name);
        Some(entry.to_document(id))
    }

    fn select(&self, stamp: Stamp, keep: impl Fn(i64) -> bool) -> Vec<Value> {
        let mut selected: Vec<(i64, DocumentId, Value)> = self
            .entries
            .iter()
            .filter(|entry| keep(entry.value().stamp(stamp)))
            .map(|entry| {
                (
                    entry.value().stamp(stamp),
                    *entry.key(),
                    entry.value().to_document(entry.key()),
                )
            })
            .collect();
        selected.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        selected.into_iter().map(|(_, _, document)| document).collect()
    }
}

impl Changeable for Journal {
    fn model_name(&self) -> &str {
        "Journal"
    }

    fn collection_name(&self) -> &str {
        &self.collection_name
    }

    fn range_query(&self, name: &str) -> Option<Arc<dyn RangeQuery>> {
        let stamp = match name {
            UPDATED_BETWEEN => Stamp::Updated,
            CREATED_BETWEEN => Stamp::Created,
            _ => return None,
        };

        Some(Arc::new(Between {
            journal: self.clone(),
            stamp,
        }))
    }
}

struct Between {
    journal: Journal,
    stamp: Stamp,
}

#[async_trait]
impl RangeQuery for Between {
    async fn between(&self, start_at: i64, end_at: i64) -> sse::error::Result<Vec<Value>> {
        Ok(self
            .journal
            .select(self.stamp, |at| start_at <= at && at <= end_at))
    }
}

fn now() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test fixtures are objects"),
        }
    }

    fn titles(documents: &[Value]) -> Vec<&str> {
        documents
            .iter()
            .map(|document| document["title"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_insert_assigns_id_and_stamps() {
        let journal = Journal::new("notes");

        let document = journal.insert_at(fields(json!({"title": "a", "id": "mine"})), 10);

        assert_ne!(document["id"], "mine");
        assert!(Uuid::parse_str(document["id"].as_str().unwrap()).is_ok());
        assert_eq!(document["created_at"], 10);
        assert_eq!(document["updated_at"], 10);
        assert_eq!(document["title"], "a");
    }

    #[test]
    fn test_update_keeps_creation_time() {
        let journal = Journal::new("notes");
        let inserted = journal.insert_at(fields(json!({"title": "a"})), 10);
        let id = Uuid::parse_str(inserted["id"].as_str().unwrap()).unwrap();

        let updated = journal
            .update_at(&id, fields(json!({"title": "b"})), 20)
            .unwrap();

        assert_eq!(updated["id"], inserted["id"]);
        assert_eq!(updated["created_at"], 10);
        assert_eq!(updated["updated_at"], 20);
        assert_eq!(updated["title"], "b");
    }

    #[test]
    fn test_update_unknown_document() {
        let journal = Journal::new("notes");

        assert!(journal
            .update_at(&Uuid::new_v4(), fields(json!({})), 20)
            .is_none());
    }

    #[tokio::test]
    async fn test_updated_between_includes_both_bounds() {
        let journal = Journal::new("notes");
        journal.insert_at(fields(json!({"title": "at start"})), 10);
        journal.insert_at(fields(json!({"title": "inside"})), 15);
        journal.insert_at(fields(json!({"title": "at end"})), 20);
        journal.insert_at(fields(json!({"title": "after"})), 21);

        let query = journal.range_query(UPDATED_BETWEEN).unwrap();
        let documents = query.between(10, 20).await.unwrap();

        assert_eq!(titles(&documents), vec!["at start", "inside", "at end"]);
    }

    #[tokio::test]
    async fn test_write_in_polled_millisecond_reaches_next_poll() {
        let journal = Journal::new("notes");
        let query = journal.range_query(UPDATED_BETWEEN).unwrap();

        assert!(query.between(0, 20).await.unwrap().is_empty());
        journal.insert_at(fields(json!({"title": "late"})), 20);

        assert_eq!(titles(&query.between(20, 30).await.unwrap()), vec!["late"]);
    }

    #[tokio::test]
    async fn test_created_between_ignores_updates() {
        let journal = Journal::new("notes");
        let old = journal.insert_at(fields(json!({"title": "old"})), 10);
        journal.insert_at(fields(json!({"title": "new"})), 30);
        let id = Uuid::parse_str(old["id"].as_str().unwrap()).unwrap();
        journal.update_at(&id, fields(json!({"title": "old, edited"})), 35);

        let created = journal.range_query(CREATED_BETWEEN).unwrap();
        let updated = journal.range_query(UPDATED_BETWEEN).unwrap();

        assert_eq!(titles(&created.between(20, 40).await.unwrap()), vec!["new"]);
        assert_eq!(
            titles(&updated.between(20, 40).await.unwrap()),
            vec!["new", "old, edited"]
        );
    }

    #[test]
    fn test_unknown_range_query() {
        let journal = Journal::new("notes");

        assert!(journal.range_query("deletedBetween").is_none());
        assert_eq!(journal.model_name(), "Journal");
        assert_eq!(journal.collection_name(), "notes");
    }

    #[test]
    fn test_all_is_ordered_by_creation() {
        let journal = Journal::new("notes");
        journal.insert_at(fields(json!({"title": "second"})), 20);
        journal.insert_at(fields(json!({"title": "first"})), 10);

        assert_eq!(titles(&journal.all()), vec!["first", "second"]);
    }
}
