//! Real-estate listing manager: a client for the listings/agents catalog API
//! with client-side filtering and an on-disk mirror of the estate list.

pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod mirror;
pub mod models;
pub mod state;

pub use catalog::{CatalogApi, CatalogOptions, HttpCatalogClient};
pub use error::CatalogError;
pub use filter::{filter_estates, FilterParams};
pub use mirror::{EstateMirror, FileMirror, MemoryMirror};
pub use state::ViewState;
