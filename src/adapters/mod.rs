pub mod http;

pub use http::CatalogApiClient;
