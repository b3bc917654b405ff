pub mod loader;
pub mod schema;

pub use loader::{Catalog, DataLoadError, Format, catalog_from_str, load_catalog};
