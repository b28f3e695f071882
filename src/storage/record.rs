//! The blog record and its identifier conventions.

use serde::{Deserialize, Serialize};

/// A stored blog post.
///
/// The `id` is assigned by the backend at creation time and is immutable
/// thereafter. Its representation is backend-specific (a 24-char hex object
/// id for the document store, a decimal integer for the relational store)
/// but it is always carried as a string outside the owning adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    /// Backend-assigned identifier in string form.
    pub id: String,
    /// Post title.
    pub title: String,
    /// Post body.
    pub content: String,
}
