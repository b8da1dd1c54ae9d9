pub mod fixtures;
pub mod models;
pub mod store;
