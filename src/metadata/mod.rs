pub mod backend;
pub mod postgres;

pub use backend::MetadataStore;
pub use postgres::PgMetadataStore;
