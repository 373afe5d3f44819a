pub mod config;
pub mod flash;
pub mod image_types;
pub mod provider;
pub mod routes;
pub mod types;
pub mod upload;
