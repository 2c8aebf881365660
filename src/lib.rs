pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod loader;
pub mod output;
pub mod query;
pub mod schema;
pub mod store;
pub mod xml;
