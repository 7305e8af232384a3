// src/infrastructure/mod.rs
pub mod config;
pub mod graphql;
pub mod renderer;
pub mod session;
pub mod storage;

pub use config::Config;
pub use graphql::GraphQlClient;
pub use session::FileSessionStore;
pub use storage::S3Storage;
