//! Concrete adapters for the pipeline's ports.

pub mod cache;
pub mod http;
pub mod providers;
pub mod stores;
