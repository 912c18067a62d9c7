pub mod provider;
pub mod schema;
