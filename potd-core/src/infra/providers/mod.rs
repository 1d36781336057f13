pub mod apod_api_provider;

pub use apod_api_provider::{APOD_DEFAULT_BASE, ApodApiProvider};
