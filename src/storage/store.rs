//! The storage contract every backend adapter implements.

use async_trait::async_trait;

use super::error::StorageResult;
use super::record::Blog;

/// Abstract store for blog posts.
///
/// The RPC layer holds exactly one implementation behind `Arc<dyn BlogStore>`,
/// chosen at startup, and never branches on which backend is live. Both
/// adapters implement the five operations with identical signatures and
/// identical error semantics:
///
/// - Malformed identifiers and mutations that match nothing are
///   `InvalidArgument`.
/// - Reads against missing records are `NotFound`.
/// - Backend errors are wrapped with context and re-signaled, never retried.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Insert a new post. The backend mints the identifier.
    async fn create(&self, title: &str, content: &str) -> StorageResult<Blog>;

    /// Fetch a post by its string identifier.
    async fn get(&self, id: &str) -> StorageResult<Blog>;

    /// Replace the title and content of an existing post. The id never
    /// changes.
    async fn update(&self, id: &str, title: &str, content: &str) -> StorageResult<Blog>;

    /// Remove a post. Returns the id that was removed.
    async fn delete(&self, id: &str) -> StorageResult<String>;

    /// Return up to `limit` posts in backend-native order.
    ///
    /// Callers are expected to pass a positive limit; the RPC layer
    /// substitutes the default before the contract is reached.
    async fn list(&self, limit: i64) -> StorageResult<Vec<Blog>>;
}
