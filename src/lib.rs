//! # sbexport
//!
//! `sbexport` reads the topology of live messaging namespaces (queues, topics,
//! subscriptions and rules) through the management API and writes the
//! configuration document a local emulator loads at startup.
//!
//! The emulator is stricter than the hosted service, so the export normalizes
//! as it goes: message lifetimes are capped to one hour, duplicate detection
//! windows to five minutes, forwarding targets are reduced to entity paths,
//! and several namespaces can be folded into the single namespace the emulator
//! supports.
//!
//! ## Core Modules
//!
//! - `config`: runtime settings (file, environment, defaults).
//! - `directory`: the management API seam and its HTTP implementation.
//! - `export`: the namespace walk, grouping and document assembly.
//! - `model`: the emulator configuration document.
//! - `normalize`: name filtering, duration capping, forward-target cleanup.
//! - `utils`: error type and logging.

pub mod config;
pub mod directory;
pub mod export;
pub mod model;
pub mod normalize;
pub mod utils;
