//! Record and blob store adapters.
//!
//! `rest` talks to a PostgREST table plus an object-storage bucket; `memory`
//! keeps everything in-process for development and tests.

pub mod memory;
pub mod rest;

pub use memory::{MemoryBlobStore, MemoryRecordStore};
pub use rest::{RestBlobStore, RestRecordStore, RestStoreSettings};
