//! SVK Registry - read-only artifact registry and query layer.
//!
//! Producers write knowledge, documents, decisions and audits to disk by
//! convention; this crate discovers and serves them through a fixed set of
//! query primitives.

pub mod access;
pub mod config;
pub mod ipc;
pub mod query;
pub mod registry;
pub mod scanner;
pub mod tree;
