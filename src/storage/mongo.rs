//! MongoDB adapter.
//!
//! Each post is one document in a single collection:
//! `{_id: ObjectId, title: string, content: string}`. This adapter owns the
//! translation between the external string id and the native 12-byte
//! `ObjectId`; nothing above the [`BlogStore`] contract ever sees the native
//! type.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

use super::error::{StorageError, StorageResult};
use super::record::Blog;
use super::store::BlogStore;

/// Timeout for establishing the initial connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// A blog post as stored in the collection.
#[derive(Debug, Serialize, Deserialize)]
struct BlogDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    content: String,
}

impl From<BlogDocument> for Blog {
    fn from(doc: BlogDocument) -> Self {
        Self {
            id: doc.id.to_hex(),
            title: doc.title,
            content: doc.content,
        }
    }
}

/// Document-store implementation of [`BlogStore`].
#[derive(Clone)]
pub struct MongoStore {
    collection: Collection<BlogDocument>,
}

impl std::fmt::Debug for MongoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoStore").finish_non_exhaustive()
    }
}

impl MongoStore {
    /// Connect to MongoDB and bind to the blog collection.
    ///
    /// Verifies reachability with a `ping` command before returning, so a
    /// bad address fails at startup rather than on the first request.
    pub async fn connect(url: &str, dbname: &str, collection: &str) -> StorageResult<Self> {
        let mut options = ClientOptions::parse(url)
            .await
            .map_err(|e| StorageError::connection(format!("invalid mongodb url: {e}")))?;
        options.connect_timeout = Some(CONNECT_TIMEOUT);
        options.server_selection_timeout = Some(CONNECT_TIMEOUT);

        let client = Client::with_options(options)
            .map_err(|e| StorageError::connection(format!("failed to build mongodb client: {e}")))?;
        let database = client.database(dbname);

        database
            .run_command(doc! {"ping": 1}, None)
            .await
            .map_err(|e| StorageError::connection(format!("mongodb ping failed: {e}")))?;

        tracing::info!(dbname, collection, "Connected to MongoDB");

        Ok(Self {
            collection: database.collection(collection),
        })
    }

    /// Parse an external string id into the native object id.
    fn parse_id(id: &str) -> StorageResult<ObjectId> {
        ObjectId::parse_str(id).map_err(|_| StorageError::invalid_argument("invalid blog id"))
    }
}

#[async_trait]
impl BlogStore for MongoStore {
    async fn create(&self, title: &str, content: &str) -> StorageResult<Blog> {
        // Insert without an _id so the server mints one; the acknowledgment
        // carries it back.
        let ack = self
            .collection
            .clone_with_type::<Document>()
            .insert_one(doc! {"title": title, "content": content}, None)
            .await
            .map_err(|e| {
                StorageError::invalid_argument(format!("there was an error creating a blog: {e}"))
            })?;

        // The acknowledgment id is a generic Bson value; anything other than
        // an ObjectId means the write did not produce a usable identifier.
        let id = match ack.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            other => {
                return Err(StorageError::invalid_argument(format!(
                    "insert acknowledgment carried a non-ObjectId _id: {other}"
                )));
            }
        };

        Ok(Blog {
            id,
            title: title.to_owned(),
            content: content.to_owned(),
        })
    }

    async fn get(&self, id: &str) -> StorageResult<Blog> {
        let oid = Self::parse_id(id)?;

        let found = self
            .collection
            .find_one(doc! {"_id": oid}, None)
            .await
            .map_err(|e| {
                StorageError::not_found(format!("there was an error finding blog {id}: {e}"))
            })?;

        found.map(Blog::from).ok_or_else(|| {
            StorageError::not_found(format!("no documents were found for id: {id}"))
        })
    }

    async fn update(&self, id: &str, title: &str, content: &str) -> StorageResult<Blog> {
        let oid = Self::parse_id(id)?;

        // Partial replace: only title and content are touched, _id is
        // immutable.
        let result = self
            .collection
            .update_one(
                doc! {"_id": oid},
                doc! {"$set": {"title": title, "content": content}},
                None,
            )
            .await
            .map_err(|e| {
                StorageError::invalid_argument(format!("blog {id} could not be updated: {e}"))
            })?;

        if result.matched_count == 0 {
            return Err(StorageError::invalid_argument(format!(
                "blog {id} could not be updated: no matching documents"
            )));
        }

        Ok(Blog {
            id: oid.to_hex(),
            title: title.to_owned(),
            content: content.to_owned(),
        })
    }

    async fn delete(&self, id: &str) -> StorageResult<String> {
        let oid = Self::parse_id(id)?;

        let result = self
            .collection
            .delete_one(doc! {"_id": oid}, None)
            .await
            .map_err(|e| {
                StorageError::invalid_argument(format!("unable to delete blog {id}: {e}"))
            })?;

        if result.deleted_count != 1 {
            return Err(StorageError::invalid_argument(format!(
                "unable to delete blog with id: {id}"
            )));
        }

        Ok(id.to_owned())
    }

    async fn list(&self, limit: i64) -> StorageResult<Vec<Blog>> {
        let options = FindOptions::builder().limit(limit).build();

        let mut cursor = self
            .collection
            .find(doc! {}, options)
            .await
            .map_err(|e| {
                StorageError::not_found(format!("there was an error listing blogs: {e}"))
            })?;

        let mut blogs = Vec::new();
        while let Some(document) = cursor.try_next().await.map_err(|e| {
            StorageError::invalid_argument(format!("there was an error reading blogs: {e}"))
        })? {
            blogs.push(document.into());
        }

        // The document store reports an empty result set as an explicit
        // no-documents condition; the relational adapter returns an empty
        // list instead.
        if blogs.is_empty() {
            return Err(StorageError::not_found("no documents were found"));
        }

        Ok(blogs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_rejects_malformed_input() {
        let err = MongoStore::parse_id("not-a-valid-id").unwrap_err();
        assert!(matches!(err, StorageError::InvalidArgument(ref m) if m == "invalid blog id"));
    }

    #[test]
    fn test_parse_id_round_trips_hex() {
        let oid = ObjectId::new();
        let parsed = MongoStore::parse_id(&oid.to_hex()).unwrap();
        assert_eq!(parsed, oid);
    }

    #[test]
    fn test_document_converts_to_record() {
        let oid = ObjectId::new();
        let doc = BlogDocument {
            id: oid,
            title: "Hello".to_string(),
            content: "World".to_string(),
        };

        let blog = Blog::from(doc);
        assert_eq!(blog.id, oid.to_hex());
        assert_eq!(blog.title, "Hello");
        assert_eq!(blog.content, "World");
    }
}
