//! Quill - Blog Post RPC Service
//!
//! This crate provides a Twirp-style RPC service for managing blog posts
//! (title + content) with interchangeable persistence backends. It can be
//! used as a library by other Rust projects, or run as a standalone binary
//! with the `quill` executable.
//!
//! # Architecture
//!
//! - **Storage**: one [`BlogStore`](storage::BlogStore) contract with two
//!   adapters, [`MongoStore`](storage::MongoStore) (document store) and
//!   [`PostgresStore`](storage::PostgresStore) (relational store), selected
//!   at startup
//! - **Server**: Axum router exposing the five RPC methods at
//!   `/twirp/service.BlogService/<Method>` plus health probes
//! - **Config**: YAML configuration with CLI/env overrides

pub mod config;
pub mod server;
pub mod storage;

pub use server::{AppState, create_router};
pub use storage::{Blog, BlogStore, MongoStore, PostgresStore, StorageError};
