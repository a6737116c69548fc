//! List Source - remote list API abstraction for PageHaus
//!
//! This crate provides the entity contract, the query identity used to
//! share caches, and the single-page fetcher that wraps a remote
//! "list entities" call.

pub mod entity;
pub mod errors;
pub mod fetcher;
pub mod json_source;
pub mod prelude;
pub mod query;
pub mod source;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use entity::Entity;
pub use errors::LoadError;
pub use fetcher::PagedFetcher;
pub use json_source::{JsonListSource, Transport};
pub use query::{FilterValue, QueryKey};
pub use source::{ListResponse, ListSource};
