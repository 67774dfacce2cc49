//! Core types and trait definitions for the Sahaya scribe-matching platform.
//!
//! Deliberately free of HTTP and database dependencies: every other crate in
//! the workspace depends on this one, and this one depends only on the type
//! vocabulary (chrono, serde, uuid) plus thiserror.

// Store backends implement the `PlatformStore` trait with native `async fn`
// (stabilised in Rust 1.75). Suppress the advisory lint about `Send` bounds
// on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod matching;
pub mod profile;
pub mod rating;
pub mod request;
pub mod store;

pub use error::{DomainError, Error, ErrorKind, Result};
