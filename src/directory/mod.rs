//! The `directory` module is the exporter's view of a live namespace.
//!
//! `DirectoryService` is the seam the export walks through: it hands back the
//! namespace name and lazy, paged listings of queues, topics, subscriptions and
//! rules. `HttpDirectory` implements it against the management REST API; tests
//! substitute in-memory directories.
//!
//! - `records`: entity records as the service reports them, before normalization.
//! - `connection`: connection string parsing and shared access signatures.
//! - `atom`: decoding of the Atom XML feeds the management API returns.
//! - `client`: the HTTP implementation.

pub mod atom;
pub mod client;
pub mod connection;
pub mod records;

use async_trait::async_trait;
use futures::TryStreamExt;
use futures::stream::BoxStream;

use crate::utils::Result;

pub use client::{HttpConnector, HttpDirectory};
pub use connection::ConnectionString;
pub use records::{
    CorrelationRecord, FilterRecord, NamespaceProperties, QueueRecord, RuleRecord,
    SubscriptionRecord, TopicRecord,
};

/// A finite, non-restartable sequence of pages. The stream ends once the
/// listing is exhausted; an `Err` item aborts the listing.
pub type Pages<'a, T> = BoxStream<'a, Result<Vec<T>>>;

#[async_trait]
pub trait DirectoryService: Send + Sync {
    async fn namespace_properties(&self) -> Result<NamespaceProperties>;

    fn list_queues(&self) -> Pages<'_, QueueRecord>;

    fn list_topics(&self) -> Pages<'_, TopicRecord>;

    fn list_subscriptions(&self, topic: &str) -> Pages<'_, SubscriptionRecord>;

    fn list_rules(&self, topic: &str, subscription: &str) -> Pages<'_, RuleRecord>;
}

/// Opens a `DirectoryService` for one connection descriptor.
pub trait Connector {
    type Directory: DirectoryService;

    fn connect(&self, connection: &str) -> Result<Self::Directory>;
}

/// Consumes every page of a listing, keeping page order.
pub async fn drain<T>(mut pages: Pages<'_, T>) -> Result<Vec<T>> {
    let mut items = Vec::new();
    while let Some(page) = pages.try_next().await? {
        items.extend(page);
    }
    Ok(items)
}
