pub mod http;
pub mod traits;

pub use http::{CatalogOptions, HttpCatalogClient, DEFAULT_BASE_URL};
pub use traits::CatalogApi;
