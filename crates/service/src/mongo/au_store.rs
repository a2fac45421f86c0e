//! MongoDB-backed AU store using the official async driver.
//!
//! Documents look like `{_id: ObjectId, name, author, desc, link, created: Date}`.
//! `_id` is surfaced as the 24-char hex string in `Au::id`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::{Client, Collection};
use tracing::info;

use models::{au::now_millis, Au, AuId, NewAu};

use crate::aus::store::AuStore;
use crate::errors::ServiceError;

#[derive(Clone, Debug)]
pub struct MongoAuStore {
    collection: Collection<Document>,
}

impl MongoAuStore {
    pub fn new(collection: Collection<Document>) -> Self {
        Self { collection }
    }

    /// Connect, ping the server once so a bad URI fails at startup, and bind the collection.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Arc<Self>, ServiceError> {
        let client = Client::with_uri_str(uri).await.map_err(ServiceError::storage)?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }).await.map_err(ServiceError::storage)?;
        info!(database, collection, "connected to mongodb");
        Ok(Arc::new(Self::new(db.collection(collection))))
    }

    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }
}

fn new_au_to_document(au: &NewAu, created: DateTime<Utc>) -> Document {
    doc! {
        "name": au.name.as_str(),
        "author": au.author.as_str(),
        "desc": au.desc.as_str(),
        "link": au.link.as_str(),
        "created": BsonDateTime::from_millis(created.timestamp_millis()),
    }
}

fn document_to_au(doc: &Document) -> Result<Au, ServiceError> {
    let text = |key: &str| {
        doc.get_str(key)
            .map(str::to_string)
            .map_err(|e| ServiceError::Storage(format!("bad `{key}` in au document: {e}")))
    };
    let id = doc
        .get_object_id("_id")
        .map_err(|e| ServiceError::Storage(format!("bad `_id` in au document: {e}")))?;
    let created = doc
        .get_datetime("created")
        .map_err(|e| ServiceError::Storage(format!("bad `created` in au document: {e}")))?;
    let created = DateTime::<Utc>::from_timestamp_millis(created.timestamp_millis())
        .ok_or_else(|| ServiceError::Storage("`created` out of range".into()))?;

    Ok(Au {
        id: AuId::Object(id.to_hex()),
        name: text("name")?,
        author: text("author")?,
        desc: text("desc")?,
        link: doc.get_str("link").unwrap_or_default().to_string(),
        created,
    })
}

#[async_trait::async_trait]
impl AuStore for MongoAuStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn list(&self) -> Result<Vec<Au>, ServiceError> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "created": -1, "_id": -1 })
            .await
            .map_err(ServiceError::storage)?;
        let docs: Vec<Document> = cursor.try_collect().await.map_err(ServiceError::storage)?;
        docs.iter().map(document_to_au).collect()
    }

    async fn create(&self, au: NewAu) -> Result<Au, ServiceError> {
        let created = now_millis();
        let res = self
            .collection
            .insert_one(new_au_to_document(&au, created))
            .await
            .map_err(ServiceError::storage)?;
        let id = res
            .inserted_id
            .as_object_id()
            .ok_or_else(|| ServiceError::Storage("inserted _id is not an ObjectId".into()))?;
        Ok(au.into_au(AuId::Object(id.to_hex()), created))
    }

    async fn delete(&self, id: &str) -> Result<Option<Au>, ServiceError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let removed = self
            .collection
            .find_one_and_delete(doc! { "_id": oid })
            .await
            .map_err(ServiceError::storage)?;
        removed.as_ref().map(document_to_au).transpose()
    }
}
