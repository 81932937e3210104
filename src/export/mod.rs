//! The `export` module turns live namespaces into an emulator configuration.
//!
//! - `walker`: lists one namespace's entities and normalizes their properties.
//! - `assemble`: groups namespaces and wraps them into the root document.
//!
//! Everything runs sequentially, one connection at a time, and the first error
//! anywhere ends the export.

pub mod assemble;
pub mod walker;

use tracing::info;

use crate::directory::Connector;
use crate::model::Config;
use crate::normalize::EntityFilter;
use crate::utils::Result;

pub use assemble::{aggregate, assemble};
pub use walker::walk_namespace;

/// Exports every connection in order and assembles the result.
///
/// Each directory lives only for the walk of its own connection.
pub async fn generate_config<C>(
    connector: &C,
    connections: &[String],
    filter: &EntityFilter,
    group: &str,
) -> Result<Config>
where
    C: Connector,
{
    let mut namespaces = Vec::with_capacity(connections.len());

    for (index, connection) in connections.iter().enumerate() {
        info!(connection = index + 1, total = connections.len(), "exporting namespace");
        let directory = connector.connect(connection)?;
        namespaces.push(walk_namespace(&directory, filter).await?);
    }

    Ok(assemble(aggregate(namespaces, group)))
}

#[cfg(test)]
mod tests;
