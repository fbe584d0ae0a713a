//! The persistent catalog: schema, lookups and the upsert/migration engine.

mod catalog;
pub mod engine;
pub mod lookup;
pub mod schema;
pub mod url_key;

pub use catalog::Catalog;
pub use lookup::UrlMatch;
pub use url_key::UrlKey;
