//! In-memory [`BlogStore`] used by router unit tests.
//!
//! Mints incrementing integer ids and mirrors the contract's error
//! semantics: malformed ids and mutations that match nothing are
//! `InvalidArgument`, reads against missing posts are `NotFound`, and an
//! empty list is an empty, successful result.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::error::{StorageError, StorageResult};
use super::record::Blog;
use super::store::BlogStore;

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    blogs: BTreeMap<u64, (String, String)>,
}

fn parse_id(id: &str) -> StorageResult<u64> {
    id.parse()
        .map_err(|_| StorageError::invalid_argument("invalid blog id"))
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn create(&self, title: &str, content: &str) -> StorageResult<Blog> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner
            .blogs
            .insert(id, (title.to_owned(), content.to_owned()));

        Ok(Blog {
            id: id.to_string(),
            title: title.to_owned(),
            content: content.to_owned(),
        })
    }

    async fn get(&self, id: &str) -> StorageResult<Blog> {
        let key = parse_id(id)?;
        let inner = self.inner.lock().unwrap();

        inner
            .blogs
            .get(&key)
            .map(|(title, content)| Blog {
                id: id.to_owned(),
                title: title.clone(),
                content: content.clone(),
            })
            .ok_or_else(|| {
                StorageError::not_found(format!("no documents were found for id: {id}"))
            })
    }

    async fn update(&self, id: &str, title: &str, content: &str) -> StorageResult<Blog> {
        let key = parse_id(id)?;
        let mut inner = self.inner.lock().unwrap();

        match inner.blogs.get_mut(&key) {
            Some(entry) => {
                *entry = (title.to_owned(), content.to_owned());
                Ok(Blog {
                    id: id.to_owned(),
                    title: title.to_owned(),
                    content: content.to_owned(),
                })
            }
            None => Err(StorageError::invalid_argument(format!(
                "blog {id} could not be updated: no matching rows"
            ))),
        }
    }

    async fn delete(&self, id: &str) -> StorageResult<String> {
        let key = parse_id(id)?;
        let mut inner = self.inner.lock().unwrap();

        if inner.blogs.remove(&key).is_none() {
            return Err(StorageError::invalid_argument(format!(
                "unable to delete blog with id: {id}"
            )));
        }

        Ok(id.to_owned())
    }

    async fn list(&self, limit: i64) -> StorageResult<Vec<Blog>> {
        let inner = self.inner.lock().unwrap();

        Ok(inner
            .blogs
            .iter()
            .take(limit.max(0) as usize)
            .map(|(id, (title, content))| Blog {
                id: id.to_string(),
                title: title.clone(),
                content: content.clone(),
            })
            .collect())
    }
}
